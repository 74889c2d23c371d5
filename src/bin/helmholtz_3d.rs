use helmslab::cli::Args;
use helmslab::geometry::SquaredRadius;
use helmslab::solver::solve;

fn main() {
    let args = Args::cli_setup("helmholtz_3d");
    let config = args.to_config();

    println!("EXAMPLE: helmholtz_3d");
    println!("GIT: {}", env!("GIT_DESCRIBE"));
    println!(
        "Grid: {} x {} x {}, processes: {}, a: {:e}, epsilon: {:e}",
        config.geometry.x.extent,
        config.geometry.y.extent,
        config.geometry.z.extent,
        args.processes,
        config.a,
        config.epsilon
    );

    let report = match solve(&config, &SquaredRadius, args.processes) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            args.finish();
            std::process::exit(1);
        }
    };

    println!("Rounds: {}", report.rounds);
    println!("Time taken: {:10.5}", report.elapsed.as_secs_f64());
    println!("Delta: {:10.5}", report.max_error);
    args.finish();
}
