use super::*;
use crate::comm::*;
use crate::config::ProblemConfig;
use crate::domain::*;
use crate::error::{Error, Result};
use crate::geometry::*;
use std::time::{Duration, Instant};

/// One rank's share of the solve: its partition, both iterates and
/// the convergence state.
pub struct SlabSolver<'a, C: Communicator, F: ReferenceField> {
    config: &'a ProblemConfig,
    comm: &'a C,
    partition: Partition,
    engine: UpdateEngine<'a, F>,
    halo: HaloExchange,
    slabs: SlabPair,
    monitor: ConvergenceMonitor,
}

impl<'a, C: Communicator, F: ReferenceField> SlabSolver<'a, C, F> {
    pub fn new(
        config: &'a ProblemConfig,
        field: &'a F,
        comm: &'a C,
    ) -> Result<Self> {
        let partition =
            Partition::from_config(config, comm.rank(), comm.size())?;
        let engine = UpdateEngine::new(config, field, &partition);
        let slabs = SlabPair::initialize(
            &config.geometry,
            &partition,
            field,
            config.chunk_size,
        )?;
        // Every rank reaches the same decisions, only root reports
        // the per round values.
        let mut monitor = ConvergenceMonitor::from_config(config);
        if comm.rank() == ROOT {
            monitor = monitor.with_history();
        }
        Ok(SlabSolver {
            config,
            comm,
            halo: HaloExchange::new(&partition),
            partition,
            engine,
            slabs,
            monitor,
        })
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn slabs(&self) -> &SlabPair {
        &self.slabs
    }

    pub fn monitor(&self) -> &ConvergenceMonitor {
        &self.monitor
    }

    /// Relax every owned layer once and swap the iterates.
    /// Returns this rank's max change, the caller reduces it.
    ///
    /// The upper transfer wraps the lower one. Layers `2..layer_size`
    /// only read owned source layers and are computed while both are
    /// in flight, layer 1 once the lower ghost landed and
    /// `layer_size` once the upper one did.
    pub fn round(&mut self) -> Result<f64> {
        profiling::scope!("round");
        let comm = self.comm;
        let partition = &self.partition;
        let engine = &self.engine;
        let halo = &self.halo;
        let first = partition.first_layer();
        let last = partition.last_layer();

        let (source, target) = self.slabs.split_mut();
        let len = source.layer_len();
        // Sent from copies, the ghosts are written while they travel.
        let down = source.layer(first).to_vec();
        let up = source.layer(last).to_vec();
        let target = target.buffer_mut();
        let target_layer = |l: usize| l * len..(l + 1) * len;

        let buffer = source.buffer_mut();
        let (below, upper_ghost) =
            buffer.split_at_mut(partition.upper_ghost() * len);
        let below_max = halo.overlap(
            comm,
            Direction::Upper,
            &up,
            upper_ghost,
            || -> Result<f64> {
                let (lower_ghost, owned) = below.split_at_mut(len);
                // `owned` starts at layer 1.
                let interior = || {
                    (first + 1..last)
                        .map(|l| {
                            let window = (l - 2) * len..(l + 1) * len;
                            let input = &owned[window];
                            let out = &mut target[target_layer(l)];
                            engine.update_layer(partition, l, input, out)
                        })
                        .fold(0.0, f64::max)
                };
                let interior_max = halo.overlap(
                    comm,
                    Direction::Lower,
                    &down,
                    lower_ghost,
                    interior,
                )?;
                if first == last {
                    return Ok(interior_max);
                }
                let input = &below[..3 * len];
                let out = &mut target[target_layer(first)];
                let first_max =
                    engine.update_layer(partition, first, input, out);
                Ok(f64::max(interior_max, first_max))
            },
        )??;

        // Both ghosts are current from here on.
        let last_max = engine.update_layer(
            partition,
            last,
            source.neighborhood(last),
            &mut target[target_layer(last)],
        );

        self.slabs.swap();
        Ok(f64::max(below_max, last_max))
    }

    /// Iterate until the global max change drops to epsilon or the
    /// round limit is hit.
    pub fn run(&mut self) -> Result<()> {
        while self.monitor.should_continue() {
            let local_max = self.round()?;
            self.monitor.reduce_and_decide(self.comm, local_max)?;
        }
        Ok(())
    }

    /// Current iterate gathered on `root`.
    pub fn gather(&self, root: Rank) -> Result<Option<OwnedDomain<3>>> {
        gather_solution(
            self.comm,
            &self.config.geometry,
            self.slabs.source(),
            root,
        )
    }
}

/// Outcome of a solve, reported by the root rank.
#[derive(Debug)]
pub struct SolveReport {
    pub processes: usize,
    pub rounds: usize,
    /// Global max change of the last round.
    pub global_max_delta: f64,
    pub delta_history: Vec<f64>,
    /// Wall time of the iteration loop on the root rank.
    pub elapsed: Duration,
    /// Largest deviation of the gathered solution from the
    /// reference field.
    pub max_error: f64,
    pub solution: OwnedDomain<3>,
}

/// Everything one rank does: initialize, iterate, gather and verify.
/// The root rank returns the report, the others `None`.
pub fn solve_rank<C: Communicator, F: ReferenceField>(
    config: &ProblemConfig,
    field: &F,
    comm: &C,
) -> Result<Option<SolveReport>> {
    let mut solver = SlabSolver::new(config, field, comm)?;

    let start = Instant::now();
    solver.run()?;
    let elapsed = start.elapsed();

    let Some(solution) = solver.gather(ROOT)? else {
        return Ok(None);
    };
    let max_error =
        max_error(&solution, &config.geometry, field, config.chunk_size);
    let monitor = solver.monitor().clone();
    // Built on root, which recorded every round.
    Ok(Some(SolveReport {
        processes: comm.size(),
        rounds: monitor.rounds(),
        global_max_delta: monitor.global_max_delta(),
        delta_history: monitor.into_history(),
        elapsed,
        max_error,
        solution,
    }))
}

/// Solve on `processes` ranks of an in-process group.
/// The configuration is checked before any rank starts.
pub fn solve<F: ReferenceField>(
    config: &ProblemConfig,
    field: &F,
    processes: usize,
) -> Result<SolveReport> {
    config.validate(processes)?;
    let reports =
        run_group(processes, |comm| solve_rank(config, field, &comm))?;
    reports
        .into_iter()
        .flatten()
        .next()
        .ok_or(Error::InvalidRank {
            rank: ROOT,
            size: processes,
        })
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn single_layer_slabs_test() {
        let config = ProblemConfig::cube(4, 10.0, 1e-10).with_max_rounds(5);
        let one = solve(&config, &SquaredRadius, 1).unwrap();
        let four = solve(&config, &SquaredRadius, 4).unwrap();
        assert_eq!(one.rounds, 5);
        assert_eq!(four.rounds, 5);
        assert_eq!(one.delta_history, four.delta_history);
        assert_eq!(one.solution.buffer(), four.solution.buffer());
    }

    #[test]
    fn round_overwrites_every_interior_point_test() {
        let config = ProblemConfig::cube(5, 1.0, 1e-6);
        let results = run_group(1, |comm| {
            let mut solver = SlabSolver::new(&config, &SquaredRadius, &comm)?;
            let delta = solver.round()?;
            let source = solver.slabs().source();
            let p = *solver.partition();
            let mut unrelaxed = 0;
            for l in p.first_layer()..=p.last_layer() {
                unrelaxed += source
                    .layer(l)
                    .iter()
                    .filter(|v| **v == UNRELAXED)
                    .count();
            }
            Ok((delta, unrelaxed))
        })
        .unwrap();
        let (delta, unrelaxed) = results[0];
        assert!(delta > 100.0);
        assert_eq!(unrelaxed, 0);
    }

    #[test]
    fn history_recorded_on_root_only_test() {
        let config = ProblemConfig::cube(6, 10.0, 1e-12).with_max_rounds(3);
        let histories = run_group(3, |comm| {
            let mut solver = SlabSolver::new(&config, &SquaredRadius, &comm)?;
            solver.run()?;
            assert_eq!(solver.monitor().rounds(), 3);
            Ok(solver.monitor().clone().into_history())
        })
        .unwrap();
        assert_eq!(histories[0].len(), 3);
        assert!(histories[1].is_empty());
        assert!(histories[2].is_empty());
    }

    #[test]
    fn invalid_partition_test() {
        let config = ProblemConfig::cube(6, 1.0, 1e-3);
        match solve(&config, &SquaredRadius, 4) {
            Err(Error::InvalidPartition { nz, processes }) => {
                assert_eq!((nz, processes), (6, 4));
            }
            other => panic!("expected invalid partition, got {:?}", other),
        }
    }

    #[test]
    fn boundary_values_preserved_test() {
        let config = ProblemConfig::cube(6, 1e3, 1e-8);
        let report = solve(&config, &SquaredRadius, 2).unwrap();
        let geometry = &config.geometry;
        let aabb = geometry.global_aabb();
        for coord in aabb.coord_iter().filter(|c| geometry.is_boundary(c)) {
            let expected = SquaredRadius.value(&geometry.point(&coord));
            assert_eq!(report.solution.view(&coord), expected);
        }
    }
}
