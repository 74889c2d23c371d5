use super::*;
use crate::error::Result;
use crate::geometry::*;
use crate::util::*;

/// Seed for interior points before the first round.
/// Far outside any solution value, so a point the update rule misses
/// shows up as a huge error.
pub const UNRELAXED: f64 = -1000.0;

/// One rank's piece of the global grid: `layer_size` owned z layers
/// plus a ghost layer on each side, laid out `[z, x, y]` with z outermost.
/// Local layer 0 and `layer_size + 1` are the ghosts.
pub struct Slab {
    domain: OwnedDomain<3>,
    layer_len: usize,
    layer_size: usize,
}

impl Slab {
    /// Zero filled slab for `partition`.
    pub fn try_new(
        geometry: &GridGeometry,
        partition: &Partition,
    ) -> Result<Self> {
        let domain = OwnedDomain::try_new(partition.slab_aabb(geometry))?;
        Ok(Slab {
            domain,
            layer_len: geometry.layer_len(),
            layer_size: partition.layer_size,
        })
    }

    /// Global boundary points get the reference value,
    /// everything else gets `UNRELAXED`.
    /// Ghost layers past the physical edge duplicate the edge layer.
    pub fn initialize<F: ReferenceField>(
        geometry: &GridGeometry,
        partition: &Partition,
        field: &F,
        chunk_size: usize,
    ) -> Result<Self> {
        profiling::scope!("slab::initialize");
        let mut slab = Self::try_new(geometry, partition)?;
        let z_last = geometry.z.last_index();
        slab.domain.par_set_values(
            |mut coord: Coord<3>| {
                coord[0] = coord[0].clamp(0, z_last);
                if geometry.is_boundary(&coord) {
                    field.value(&geometry.point(&coord))
                } else {
                    UNRELAXED
                }
            },
            chunk_size,
        );
        Ok(slab)
    }

    /// Values per z layer, `Nx * Ny`.
    pub fn layer_len(&self) -> usize {
        self.layer_len
    }

    #[track_caller]
    fn layer_range(&self, local_layer: usize) -> std::ops::Range<usize> {
        assert!(
            local_layer <= self.layer_size + 1,
            "layer {} outside slab of {} owned layers",
            local_layer,
            self.layer_size
        );
        let start = local_layer * self.layer_len;
        start..start + self.layer_len
    }

    #[track_caller]
    pub fn layer(&self, local_layer: usize) -> &[f64] {
        let range = self.layer_range(local_layer);
        &self.domain.buffer()[range]
    }

    #[track_caller]
    pub fn layer_mut(&mut self, local_layer: usize) -> &mut [f64] {
        let range = self.layer_range(local_layer);
        &mut self.domain.buffer_mut()[range]
    }

    /// `local_layer` with the layer below and above it, everything a
    /// seven point update of that layer reads.
    #[track_caller]
    pub fn neighborhood(&self, local_layer: usize) -> &[f64] {
        assert!(
            (1..=self.layer_size).contains(&local_layer),
            "layer {} has no neighborhood in a slab of {} owned layers",
            local_layer,
            self.layer_size
        );
        let start = (local_layer - 1) * self.layer_len;
        &self.domain.buffer()[start..start + 3 * self.layer_len]
    }

    /// All owned layers, ghosts excluded.
    pub fn owned(&self) -> &[f64] {
        let start = self.layer_len;
        let end = start + self.layer_size * self.layer_len;
        &self.domain.buffer()[start..end]
    }

    fn local_coord(&self, local_layer: usize, x: usize, y: usize) -> Coord<3> {
        let min = self.domain.aabb().min();
        vector![min[0] + local_layer as i32, x as i32, y as i32]
    }

    #[track_caller]
    pub fn get(&self, local_layer: usize, x: usize, y: usize) -> f64 {
        self.domain.view(&self.local_coord(local_layer, x, y))
    }

    #[track_caller]
    pub fn set(&mut self, local_layer: usize, x: usize, y: usize, value: f64) {
        let coord = self.local_coord(local_layer, x, y);
        self.domain.set_coord(&coord, value);
    }

    /// Copy the full extended slab, ghosts included.
    pub fn copy_from(&mut self, other: &Slab, chunk_size: usize) {
        debug_assert_eq!(self.domain.aabb(), other.domain.aabb());
        crate::par_slice::copy(
            other.domain.buffer(),
            self.domain.buffer_mut(),
            chunk_size,
        );
    }
}

impl DomainView<3> for Slab {
    fn aabb(&self) -> &AABB<3> {
        self.domain.aabb()
    }

    fn buffer(&self) -> &[f64] {
        self.domain.buffer()
    }

    fn buffer_mut(&mut self) -> &mut [f64] {
        self.domain.buffer_mut()
    }

    fn aabb_buffer_mut(&mut self) -> (&AABB<3>, &mut [f64]) {
        self.domain.aabb_buffer_mut()
    }
}
