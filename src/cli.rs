use crate::build_info;
use crate::config::ProblemConfig;
use crate::geometry::*;
use clap::Parser;

#[cfg(feature = "profile-with-puffin")]
static PUFFIN_SERVER: std::sync::Mutex<Option<puffin_http::Server>> =
    std::sync::Mutex::new(None);

/// Parallel 3D Helmholtz solver.
/// Solves `∇²φ − aφ = ρ` on a box with Jacobi iteration, the grid is
/// split into z slabs, one per process.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Points along every axis, overridden per axis by --n-x/--n-y/--n-z.
    #[arg(short, long, default_value = "560")]
    pub domain_size: usize,

    #[arg(long)]
    pub n_x: Option<usize>,

    #[arg(long)]
    pub n_y: Option<usize>,

    /// Must be divisible by the number of processes.
    #[arg(long)]
    pub n_z: Option<usize>,

    /// Number of processes the z axis is split over.
    /// Under mpirun the world size is used instead.
    #[arg(short, long, default_value = "4")]
    pub processes: usize,

    /// Helmholtz constant.
    #[arg(short, long, default_value = "10e5")]
    pub a: f64,

    /// Stop once the global max change is at most this.
    #[arg(short, long, default_value = "10e-8")]
    pub epsilon: f64,

    /// Stop after this many rounds even if not converged.
    #[arg(short, long)]
    pub max_rounds: Option<usize>,

    /// Chunk size to use for parallelism.
    #[arg(short, long, default_value = "1000")]
    pub chunk_size: usize,

    /// Worker threads per process, shared by in-process ranks.
    #[arg(short, long, default_value = "8")]
    pub threads: usize,

    /// Print build information and quit
    #[arg(long)]
    pub build_info: bool,
}

impl Args {
    pub fn cli_setup(name: &str) -> Self {
        let args = Args::parse();

        if args.build_info {
            build_info::print_report(name);
            std::process::exit(0);
        }

        #[cfg(feature = "profile-with-puffin")]
        {
            let server_addr =
                format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT);
            println!(
                "Run this to view profiling data:  puffin_viewer {server_addr}"
            );
            match puffin_http::Server::new(&server_addr) {
                Ok(server) => {
                    if let Ok(mut slot) = PUFFIN_SERVER.lock() {
                        *slot = Some(server);
                    }
                    profiling::puffin::set_scopes_on(true);
                }
                Err(e) => eprintln!("Profiling server failed: {e}"),
            }
        }

        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .thread_name(|i| format!("rayon_thread_{}", i))
            .build_global()
        {
            eprintln!("Using existing thread pool: {e}");
        }

        args
    }

    /// Grid of the requested size on [-1, 1]³.
    pub fn to_config(&self) -> ProblemConfig {
        let axis = |n: Option<usize>| {
            Axis::new(n.unwrap_or(self.domain_size), -1.0, 2.0)
        };
        ProblemConfig {
            geometry: GridGeometry::new(
                axis(self.n_x),
                axis(self.n_y),
                axis(self.n_z),
            ),
            a: self.a,
            epsilon: self.epsilon,
            chunk_size: self.chunk_size,
            max_rounds: self.max_rounds,
        }
    }

    pub fn finish(&self) {
        #[cfg(feature = "profile-with-puffin")]
        {
            profiling::finish_frame!();
            println!("Flushing profiler");
            if let Ok(mut slot) = PUFFIN_SERVER.lock() {
                slot.take();
            }
        }
    }
}
