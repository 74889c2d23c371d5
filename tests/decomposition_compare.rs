use helmslab::config::*;
use helmslab::domain::*;
use helmslab::error::Error;
use helmslab::geometry::*;
use helmslab::solver::*;

use float_cmp::assert_approx_eq;

#[test]
fn small_cube_two_processes() {
    let config = ProblemConfig::cube(6, 1e5, 1e-6);
    let report = solve(&config, &SquaredRadius, 2).unwrap();
    assert_eq!(report.processes, 2);
    assert!(report.rounds > 0);
    assert!(report.global_max_delta <= 1e-6);
    assert_eq!(report.delta_history.len(), report.rounds);
    assert!(report.max_error < 1e-2);
    assert_eq!(
        report.solution.aabb(),
        &config.geometry.global_aabb()
    );
}

#[test]
fn fixed_rounds_match_across_process_counts() {
    let config = ProblemConfig::cube(6, 1.0, 1e-12)
        .with_max_rounds(25)
        .with_chunk_size(5);
    let serial = solve(&config, &SquaredRadius, 1).unwrap();
    assert_eq!(serial.rounds, 25);
    for processes in [2, 3, 6] {
        let report = solve(&config, &SquaredRadius, processes).unwrap();
        assert_eq!(report.rounds, serial.rounds);
        assert_eq!(report.delta_history, serial.delta_history);
        assert_eq!(report.solution.buffer(), serial.solution.buffer());
    }
}

#[test]
fn converged_error_matches_across_process_counts() {
    let config = ProblemConfig::cube(8, 1e3, 1e-9);
    let serial = solve(&config, &SquaredRadius, 1).unwrap();
    for processes in [2, 4] {
        let report = solve(&config, &SquaredRadius, processes).unwrap();
        assert_eq!(report.rounds, serial.rounds);
        assert_approx_eq!(
            f64,
            report.max_error,
            serial.max_error,
            epsilon = 1e-12
        );
    }
}

#[test]
fn non_cubic_grid() {
    let mut config = ProblemConfig::cube(5, 1e4, 1e-8);
    config.geometry.y = Axis::new(7, -1.0, 2.0);
    config.geometry.z = Axis::new(9, -1.0, 2.0);
    let serial = solve(&config, &SquaredRadius, 1).unwrap();
    let parallel = solve(&config, &SquaredRadius, 3).unwrap();
    assert!(parallel.max_error < 1e-4);
    assert_eq!(parallel.solution.buffer(), serial.solution.buffer());
}

#[test]
fn boundary_values_never_change() {
    let config = ProblemConfig::cube(6, 10.0, 1e-3).with_max_rounds(7);
    let geometry = &config.geometry;
    let report = solve(&config, &SquaredRadius, 3).unwrap();
    let aabb = geometry.global_aabb();
    for coord in aabb.coord_iter().filter(|c| geometry.is_boundary(c)) {
        let expected = SquaredRadius.value(&geometry.point(&coord));
        assert_eq!(report.solution.view(&coord), expected);
    }
    for coord in aabb.coord_iter().filter(|c| !geometry.is_boundary(c)) {
        assert_ne!(report.solution.view(&coord), UNRELAXED);
    }
}

#[test]
fn uneven_partition_is_rejected() {
    let config = ProblemConfig::cube(10, 1.0, 1e-3);
    match solve(&config, &SquaredRadius, 4) {
        Err(Error::InvalidPartition { nz, processes }) => {
            assert_eq!(nz, 10);
            assert_eq!(processes, 4);
        }
        other => panic!("expected partition error, got {:?}", other),
    }
    assert!(matches!(
        solve(&config, &SquaredRadius, 0),
        Err(Error::InvalidPartition { .. })
    ));
}

#[test]
fn invalid_parameters_are_rejected() {
    let config = ProblemConfig::cube(2, 1.0, 1e-3);
    assert!(matches!(
        solve(&config, &SquaredRadius, 1),
        Err(Error::InvalidGrid { .. })
    ));

    let config = ProblemConfig::cube(6, 1.0, 0.0);
    assert!(matches!(
        solve(&config, &SquaredRadius, 1),
        Err(Error::InvalidParameter(_))
    ));
}
