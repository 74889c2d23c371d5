//! Error types for helmslab

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The decomposed axis does not split evenly over the processes.
    #[error("grid of {nz} z layers cannot be split over {processes} processes")]
    InvalidPartition { nz: usize, processes: usize },

    #[error("axis {axis} has {extent} points, at least 3 are required")]
    InvalidGrid { axis: char, extent: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A slab or gather buffer could not be reserved.
    #[error("failed to allocate {values} values")]
    Allocation { values: usize },

    #[error("invalid rank {rank} for group of size {size}")]
    InvalidRank { rank: usize, size: usize },

    #[error("message of {actual} values, expected {expected}")]
    MessageSize { expected: usize, actual: usize },

    #[error("rank {peer} is no longer reachable")]
    Disconnected { peer: usize },

    /// Another rank of the group failed.
    #[error("process group aborted")]
    Aborted,

    #[error("rank {rank} panicked")]
    WorkerPanicked { rank: usize },

    #[error("failed to start rank thread: {0}")]
    Spawn(#[from] std::io::Error),
}
