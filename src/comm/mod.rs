//! Message passing between the ranks of a process group.
//!
//! The solver only needs a paired send and receive with one neighbor
//! that can overlap local work, a max all-reduce and a gather to one
//! root. `Communicator` is that whole surface.
//!
//! `MpiComm` (feature `mpi`) runs it on an MPI world, one process per
//! rank. `ThreadComm` runs a group inside one process, one thread per
//! rank with channels between them; the tests and the default binary
//! use it.

#[cfg(feature = "mpi")]
mod mpi_comm;
mod thread_comm;

#[cfg(feature = "mpi")]
pub use mpi_comm::*;
pub use thread_comm::*;

use crate::error::Result;

pub type Rank = usize;

/// Rank that owns collective results.
pub const ROOT: Rank = 0;

/// Message kind, receives only match envelopes with the same tag.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Tag {
    /// Boundary layer travelling toward the next higher rank.
    HaloUp,
    /// Boundary layer travelling toward the next lower rank.
    HaloDown,
    Reduce,
    Broadcast,
    Gather,
}

impl Tag {
    /// Wire value of the tag.
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// A send and a receive with the same peer, in flight together.
#[derive(Debug)]
pub struct Exchange<'a> {
    pub peer: Rank,
    pub send: &'a [f64],
    pub send_tag: Tag,
    /// Filled with exactly `recv.len()` values from `peer`.
    pub recv: &'a mut [f64],
    pub recv_tag: Tag,
}

pub trait Communicator {
    fn rank(&self) -> Rank;

    fn size(&self) -> usize;

    /// Start both transfers of `exchange`, run `work` while they are
    /// in flight, then wait for both.
    /// Returns what `work` returned once `exchange.recv` is filled.
    fn exchange<R>(
        &self,
        exchange: Exchange<'_>,
        work: impl FnOnce() -> R,
    ) -> Result<R>;

    /// Every rank contributes one value, every rank gets the max back.
    fn all_reduce_max(&self, value: f64) -> Result<f64>;

    /// Concatenate every rank's `buffer` in rank order on `root`.
    /// All ranks must pass buffers of the same length.
    fn gather(&self, buffer: &[f64], root: Rank) -> Result<Option<Vec<f64>>>;

    /// Tell the rest of the group this rank can not continue.
    fn abort(&self);
}
