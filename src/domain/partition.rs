use crate::config::ProblemConfig;
use crate::error::Result;
use crate::geometry::GridGeometry;
use crate::util::*;

/// Which contiguous run of z layers a rank owns.
/// Rank `r` owns global layers `[r * layer_size, (r + 1) * layer_size)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Partition {
    pub rank: usize,
    pub size: usize,
    pub layer_size: usize,
}

impl Partition {
    pub fn new(rank: usize, size: usize, layer_size: usize) -> Self {
        debug_assert!(rank < size);
        debug_assert!(layer_size > 0);
        Partition {
            rank,
            size,
            layer_size,
        }
    }

    pub fn from_config(
        config: &ProblemConfig,
        rank: usize,
        size: usize,
    ) -> Result<Self> {
        let layer_size = config.validate(size)?;
        Ok(Self::new(rank, size, layer_size))
    }

    /// Global z of local layer 0, the lower ghost layer.
    pub fn ghost_offset(&self) -> i32 {
        (self.rank * self.layer_size) as i32 - 1
    }

    pub fn global_z(&self, local_layer: usize) -> i32 {
        self.ghost_offset() + local_layer as i32
    }

    /// Local index of the first owned layer.
    pub fn first_layer(&self) -> usize {
        1
    }

    /// Local index of the last owned layer.
    pub fn last_layer(&self) -> usize {
        self.layer_size
    }

    /// Local index of the upper ghost layer.
    pub fn upper_ghost(&self) -> usize {
        self.layer_size + 1
    }

    pub fn lower_neighbor(&self) -> Option<usize> {
        if self.rank == 0 {
            None
        } else {
            Some(self.rank - 1)
        }
    }

    pub fn upper_neighbor(&self) -> Option<usize> {
        if self.rank + 1 == self.size {
            None
        } else {
            Some(self.rank + 1)
        }
    }

    /// Owned layers plus one ghost layer on each side, `[z, x, y]`.
    pub fn slab_aabb(&self, geometry: &GridGeometry) -> AABB<3> {
        let z_min = self.ghost_offset();
        let z_max = z_min + self.layer_size as i32 + 1;
        geometry.global_aabb().slice_along(0, z_min, z_max)
    }

    /// Owned layers only.
    pub fn owned_aabb(&self, geometry: &GridGeometry) -> AABB<3> {
        let z_min = self.global_z(self.first_layer());
        let z_max = self.global_z(self.last_layer());
        geometry.global_aabb().slice_along(0, z_min, z_max)
    }
}
