use super::{Communicator, Exchange, Rank};
use crate::error::{Error, Result};
use mpi::collective::SystemOperation;
use mpi::topology::SimpleCommunicator;
use mpi::traits::{
    Communicator as MpiCommunicator, CommunicatorCollectives, Destination,
    Equivalence, Root, Source,
};

/// Exit code handed to `MPI_Abort`.
const ABORT_CODE: i32 = 1;

/// One rank of an MPI world, one process per rank under `mpirun`.
///
/// The universe returned by `mpi::initialize` must outlive this,
/// dropping it finalizes MPI.
pub struct MpiComm {
    world: SimpleCommunicator,
}

impl MpiComm {
    pub fn new(world: SimpleCommunicator) -> Self {
        MpiComm { world }
    }

    fn mpi_rank(&self, rank: Rank) -> Result<i32> {
        let size = self.size();
        match i32::try_from(rank) {
            Ok(r) if rank < size => Ok(r),
            _ => Err(Error::InvalidRank { rank, size }),
        }
    }
}

impl Communicator for MpiComm {
    fn rank(&self) -> Rank {
        self.world.rank() as Rank
    }

    fn size(&self) -> usize {
        self.world.size() as usize
    }

    /// Both transfers are immediate requests in one request scope,
    /// `work` runs before either is waited on.
    fn exchange<R>(
        &self,
        exchange: Exchange<'_>,
        work: impl FnOnce() -> R,
    ) -> Result<R> {
        let Exchange {
            peer,
            send,
            send_tag,
            recv,
            recv_tag,
        } = exchange;
        let process = self.world.process_at_rank(self.mpi_rank(peer)?);
        let expected = recv.len();
        let (result, status) = mpi::request::scope(|scope| {
            let send_request =
                process.immediate_send_with_tag(scope, send, send_tag.code());
            let recv_request = process.immediate_receive_into_with_tag(
                scope,
                recv,
                recv_tag.code(),
            );
            let result = work();
            profiling::scope!("comm::wait_recv");
            let status = recv_request.wait();
            send_request.wait();
            (result, status)
        });
        let actual = status.count(f64::equivalent_datatype()) as usize;
        if actual != expected {
            return Err(Error::MessageSize { expected, actual });
        }
        Ok(result)
    }

    fn all_reduce_max(&self, value: f64) -> Result<f64> {
        profiling::scope!("comm::all_reduce_max");
        let mut global = value;
        self.world
            .all_reduce_into(&value, &mut global, SystemOperation::max());
        Ok(global)
    }

    fn gather(&self, buffer: &[f64], root: Rank) -> Result<Option<Vec<f64>>> {
        profiling::scope!("comm::gather");
        let root_process = self.world.process_at_rank(self.mpi_rank(root)?);
        if self.rank() != root {
            root_process.gather_into(buffer);
            return Ok(None);
        }

        let values = buffer.len() * self.size();
        let mut result = Vec::new();
        result
            .try_reserve_exact(values)
            .map_err(|_| Error::Allocation { values })?;
        result.resize(values, 0.0);
        root_process.gather_into_root(buffer, &mut result[..]);
        Ok(Some(result))
    }

    /// Takes the whole world down, MPI has no way to stop one rank
    /// while the others keep waiting on it.
    fn abort(&self) {
        self.world.abort(ABORT_CODE)
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::comm::{Tag, ROOT};

    // MPI can be initialized once per process, so everything runs
    // in one test. Under plain `cargo test` the world has one rank.
    #[test]
    fn mpi_world_test() {
        let Some(universe) = mpi::initialize() else {
            return;
        };
        let comm = MpiComm::new(universe.world());
        let rank = comm.rank();
        let size = comm.size();

        let max = comm.all_reduce_max(rank as f64 + 0.5).unwrap();
        assert_eq!(max, (size - 1) as f64 + 0.5);

        // Pairwise exchange, with one rank both ends are this process.
        if size <= 2 {
            let peer = (rank + 1) % size;
            let send = [rank as f64; 3];
            let mut recv = [f64::NAN; 3];
            let exchange = Exchange {
                peer,
                send: &send,
                send_tag: Tag::HaloUp,
                recv: &mut recv,
                recv_tag: Tag::HaloUp,
            };
            assert!(comm.exchange(exchange, || true).unwrap());
            assert_eq!(recv, [peer as f64; 3]);
        }

        let gathered = comm.gather(&[rank as f64, 1.0], ROOT).unwrap();
        if rank == ROOT {
            let gathered = gathered.unwrap();
            assert_eq!(gathered.len(), 2 * size);
            for r in 0..size {
                assert_eq!(gathered[2 * r], r as f64);
            }
        } else {
            assert!(gathered.is_none());
        }

        assert!(matches!(
            comm.gather(&[1.0], size),
            Err(Error::InvalidRank { .. })
        ));
    }
}
