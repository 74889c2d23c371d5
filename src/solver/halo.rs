use crate::comm::*;
use crate::domain::*;
use crate::error::Result;

/// Side of a slab a ghost layer sits on.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Direction {
    /// Toward rank - 1, ghost layer 0.
    Lower,
    /// Toward rank + 1, ghost layer `layer_size + 1`.
    Upper,
}

/// Boundary layer exchange with the neighbor on one side.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct HaloTransfer {
    pub direction: Direction,
    pub peer: Rank,
    pub send_tag: Tag,
    pub recv_tag: Tag,
}

impl HaloTransfer {
    /// Send `layer` to the neighbor and fill `ghost` from it,
    /// running `work` while both are in flight.
    pub fn overlap<C: Communicator, R>(
        &self,
        comm: &C,
        layer: &[f64],
        ghost: &mut [f64],
        work: impl FnOnce() -> R,
    ) -> Result<R> {
        profiling::scope!("halo::overlap");
        let exchange = Exchange {
            peer: self.peer,
            send: layer,
            send_tag: self.send_tag,
            recv: ghost,
            recv_tag: self.recv_tag,
        };
        comm.exchange(exchange, work)
    }
}

/// The halo transfers of one rank, at most one per side.
///
/// Every rank sends its first owned layer down and its last owned
/// layer up, and receives the neighbors' layers into its ghosts.
/// A layer travelling up carries `Tag::HaloUp` both ways, so the two
/// ends of one link agree on the tags without talking.
#[derive(Debug, Clone)]
pub struct HaloExchange {
    lower: Option<HaloTransfer>,
    upper: Option<HaloTransfer>,
}

impl HaloExchange {
    pub fn new(partition: &Partition) -> Self {
        let lower = partition.lower_neighbor().map(|peer| HaloTransfer {
            direction: Direction::Lower,
            peer,
            send_tag: Tag::HaloDown,
            recv_tag: Tag::HaloUp,
        });
        let upper = partition.upper_neighbor().map(|peer| HaloTransfer {
            direction: Direction::Upper,
            peer,
            send_tag: Tag::HaloUp,
            recv_tag: Tag::HaloDown,
        });
        HaloExchange { lower, upper }
    }

    pub fn transfer(&self, direction: Direction) -> Option<&HaloTransfer> {
        match direction {
            Direction::Lower => self.lower.as_ref(),
            Direction::Upper => self.upper.as_ref(),
        }
    }

    /// Run `work` while the transfer on `direction` is in flight and
    /// return once `ghost` holds the neighbor's layer.
    /// Without a neighbor on that side only `work` runs.
    pub fn overlap<C: Communicator, R>(
        &self,
        comm: &C,
        direction: Direction,
        layer: &[f64],
        ghost: &mut [f64],
        work: impl FnOnce() -> R,
    ) -> Result<R> {
        match self.transfer(direction) {
            Some(transfer) => transfer.overlap(comm, layer, ghost, work),
            None => Ok(work()),
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::config::ProblemConfig;
    use crate::geometry::SquaredRadius;

    /// Both ghosts of `slab` from its neighbors, upper transfer outside.
    fn fill_ghosts<C: Communicator>(
        comm: &C,
        p: &Partition,
        slab: &mut Slab,
    ) -> Result<()> {
        let halo = HaloExchange::new(p);
        let down = slab.layer(p.first_layer()).to_vec();
        let up = slab.layer(p.last_layer()).to_vec();
        let len = slab.layer_len();
        let (below, upper) =
            slab.buffer_mut().split_at_mut(p.upper_ghost() * len);
        halo.overlap(comm, Direction::Upper, &up, upper, || {
            let lower_ghost = &mut below[..len];
            halo.overlap(comm, Direction::Lower, &down, lower_ghost, || ())
        })?
    }

    #[test]
    fn transfers_follow_neighbors_test() {
        let config = ProblemConfig::cube(6, 1.0, 1e-3);
        let middle = Partition::from_config(&config, 1, 3).unwrap();
        let halo = HaloExchange::new(&middle);
        assert_eq!(
            halo.transfer(Direction::Lower),
            Some(&HaloTransfer {
                direction: Direction::Lower,
                peer: 0,
                send_tag: Tag::HaloDown,
                recv_tag: Tag::HaloUp,
            })
        );
        assert_eq!(halo.transfer(Direction::Upper).map(|t| t.peer), Some(2));

        let bottom = HaloExchange::new(&Partition::new(0, 3, 2));
        assert!(bottom.transfer(Direction::Lower).is_none());
        let top = HaloExchange::new(&Partition::new(2, 3, 2));
        assert!(top.transfer(Direction::Upper).is_none());
    }

    #[test]
    fn ghost_layers_match_neighbors_test() {
        let config = ProblemConfig::cube(6, 1.0, 1e-3);
        let size = 3;
        let slabs = run_group(size, |comm| {
            let p = Partition::from_config(&config, comm.rank(), size)?;
            let mut slab = Slab::try_new(&config.geometry, &p)?;
            for l in p.first_layer()..=p.last_layer() {
                slab.layer_mut(l).fill(p.global_z(l) as f64);
            }
            fill_ghosts(&comm, &p, &mut slab)?;
            Ok((p, slab))
        })
        .unwrap();

        for (p, slab) in &slabs {
            if p.lower_neighbor().is_some() {
                let z = p.global_z(0) as f64;
                assert!(slab.layer(0).iter().all(|v| *v == z));
            } else {
                assert!(slab.layer(0).iter().all(|v| *v == 0.0));
            }
            let upper = slab.layer(p.upper_ghost());
            if p.upper_neighbor().is_some() {
                let z = p.global_z(p.upper_ghost()) as f64;
                assert!(upper.iter().all(|v| *v == z));
            } else {
                assert!(upper.iter().all(|v| *v == 0.0));
            }
        }
    }

    #[test]
    fn overlap_returns_work_result_test() {
        let config = ProblemConfig::cube(4, 1.0, 1e-3);
        let size = 2;
        let results = run_group(size, |comm| {
            let p = Partition::from_config(&config, comm.rank(), size)?;
            let mut slab = Slab::try_new(&config.geometry, &p)?;
            slab.layer_mut(p.first_layer()).fill(1.0 + comm.rank() as f64);
            slab.layer_mut(p.last_layer()).fill(1.0 + comm.rank() as f64);
            let halo = HaloExchange::new(&p);
            let direction = match p.lower_neighbor() {
                Some(_) => Direction::Lower,
                None => Direction::Upper,
            };
            let ghost = match direction {
                Direction::Lower => 0,
                Direction::Upper => p.upper_ghost(),
            };
            let layer = match direction {
                Direction::Lower => slab.layer(p.first_layer()).to_vec(),
                Direction::Upper => slab.layer(p.last_layer()).to_vec(),
            };
            let mut received = vec![0.0; slab.layer_len()];
            let seen = halo.overlap(
                &comm,
                direction,
                &layer,
                &mut received,
                || slab.layer(ghost)[0],
            )?;
            Ok((seen, received[0]))
        })
        .unwrap();
        assert_eq!(results, vec![(0.0, 2.0), (0.0, 1.0)]);
    }

    #[test]
    fn single_rank_has_nothing_to_wait_on_test() {
        let config = ProblemConfig::cube(4, 1.0, 1e-3);
        let results = run_group(1, |comm| {
            let p = Partition::from_config(&config, 0, 1)?;
            let mut slab =
                Slab::initialize(&config.geometry, &p, &SquaredRadius, 4)?;
            let halo = HaloExchange::new(&p);
            assert!(halo.transfer(Direction::Lower).is_none());
            assert!(halo.transfer(Direction::Upper).is_none());
            let before = slab.buffer().to_vec();
            fill_ghosts(&comm, &p, &mut slab)?;
            Ok(slab.buffer() == &before[..])
        })
        .unwrap();
        assert_eq!(results, vec![true]);
    }

    #[test]
    fn repeated_rounds_stay_matched_test() {
        let config = ProblemConfig::cube(4, 1.0, 1e-3);
        let size = 2;
        let ghosts = run_group(size, |comm| {
            let p = Partition::from_config(&config, comm.rank(), size)?;
            let mut slab = Slab::try_new(&config.geometry, &p)?;
            let mut seen = Vec::new();
            for round in 0..4 {
                let value = (10 * comm.rank() + round) as f64;
                slab.layer_mut(p.first_layer()).fill(value);
                slab.layer_mut(p.last_layer()).fill(value);
                fill_ghosts(&comm, &p, &mut slab)?;
                let ghost = match p.lower_neighbor() {
                    Some(_) => 0,
                    None => p.upper_ghost(),
                };
                seen.push(slab.layer(ghost)[0]);
            }
            Ok(seen)
        })
        .unwrap();
        assert_eq!(ghosts[0], vec![10.0, 11.0, 12.0, 13.0]);
        assert_eq!(ghosts[1], vec![0.0, 1.0, 2.0, 3.0]);
    }
}
