//! Run with
//!
//! mpirun -n 4 cargo run --release --features mpi --bin helmholtz_3d_mpi

use helmslab::cli::Args;
use helmslab::comm::{Communicator, MpiComm, ROOT};
use helmslab::geometry::SquaredRadius;
use helmslab::solver::solve_rank;
use std::process::ExitCode;

// Returning instead of `process::exit` lets the universe drop and
// finalize MPI on every rank.
fn main() -> ExitCode {
    let Some(universe) = mpi::initialize() else {
        eprintln!("Error: MPI was already initialized");
        return ExitCode::FAILURE;
    };
    let comm = MpiComm::new(universe.world());
    let root = comm.rank() == ROOT;

    let args = Args::cli_setup("helmholtz_3d_mpi");
    let config = args.to_config();

    if root {
        println!("EXAMPLE: helmholtz_3d_mpi");
        println!("GIT: {}", env!("GIT_DESCRIBE"));
        println!(
            "Grid: {} x {} x {}, processes: {}, a: {:e}, epsilon: {:e}",
            config.geometry.x.extent,
            config.geometry.y.extent,
            config.geometry.z.extent,
            comm.size(),
            config.a,
            config.epsilon
        );
    }

    // Every rank sees the same configuration, so all of them stop here
    // together and no collective is left waiting.
    if let Err(e) = config.validate(comm.size()) {
        if root {
            eprintln!("Error: {e}");
        }
        args.finish();
        return ExitCode::FAILURE;
    }

    match solve_rank(&config, &SquaredRadius, &comm) {
        Ok(Some(report)) => {
            println!("Rounds: {}", report.rounds);
            println!("Time taken: {:10.5}", report.elapsed.as_secs_f64());
            println!("Delta: {:10.5}", report.max_error);
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error on rank {}: {e}", comm.rank());
            comm.abort();
            return ExitCode::FAILURE;
        }
    }
    args.finish();
    ExitCode::SUCCESS
}
