//! This module has things for managing the domain,
//! which really means retrieving values based on grid coordinates.
//! Every process only holds a slab of the global grid,
//! views translate from global coordinates into buffer indices.

mod partition;
mod slab;
mod slab_pair;
mod view;

pub use partition::*;
pub use slab::*;
pub use slab_pair::*;
pub use view::*;
