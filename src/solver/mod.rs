//! The parallel Jacobi solve.
//!
//! Each round a rank starts its halo transfers, relaxes the layers
//! that do not touch a ghost layer, waits for the ghosts, relaxes the
//! two boundary adjacent layers, swaps its buffers and joins the
//! global max reduction that decides whether to go on.

pub mod convergence;
pub mod gather;
pub mod halo;
pub mod jacobi;
pub mod update;

pub use convergence::*;
pub use gather::*;
pub use halo::*;
pub use jacobi::*;
pub use update::*;
