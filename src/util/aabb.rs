use crate::util::indexing::*;
use crate::util::*;

/// Axis Aligned Bounding Box (AABB) for coordinate types.
/// Each instance is inclusive of both corners.
/// This class is responsible for alot of indexing operations,
/// where we map between a linear buffer and coordinates.
#[derive(Hash, Debug, Copy, Clone, Eq, PartialEq)]
pub struct AABB<const DIMENSION: usize> {
    pub bounds: Bounds<DIMENSION>,
}

impl<const DIMENSION: usize> AABB<DIMENSION> {
    /// Create AABB from raw bounds.
    #[inline]
    pub fn new(bounds: Bounds<DIMENSION>) -> Self {
        AABB { bounds }
    }

    /// Moving min to the origin, returns the exclusie size in each direction
    /// i.e. [0, 9]  would have exclusive size of 10.
    pub fn exclusive_bounds(&self) -> Coord<DIMENSION> {
        (self.bounds.column(1) - self.bounds.column(0)).add_scalar(1)
    }

    /// Return the number of coordinates contained in the instance.
    #[inline]
    pub fn buffer_size(&self) -> usize {
        real_buffer_size(&self.exclusive_bounds())
    }

    /// Return the linear index for a coord in the instance
    pub fn coord_to_linear(&self, coord: &Coord<DIMENSION>) -> usize {
        coord_to_linear(&(coord - self.min()), &self.exclusive_bounds())
    }

    /// Return the coordinate in the instance for a given linear index.
    pub fn linear_to_coord(&self, index: usize) -> Coord<DIMENSION> {
        linear_to_coord(index, &self.exclusive_bounds()) + self.min()
    }

    /// Check whether the instance contains a coordinate.
    pub fn contains(&self, coord: &Coord<DIMENSION>) -> bool {
        for d in 0..DIMENSION {
            if coord[d] < self.bounds[(d, 0)] || coord[d] > self.bounds[(d, 1)]
            {
                return false;
            }
        }
        true
    }

    /// Check whether another AABB is contained in the instance.
    pub fn contains_aabb(&self, other: &Self) -> bool {
        for d in 0..DIMENSION {
            if other.bounds[(d, 0)] < self.bounds[(d, 0)]
                || other.bounds[(d, 1)] > self.bounds[(d, 1)]
            {
                return false;
            }
        }
        true
    }

    /// Whether a coordinate sits on the outermost layer of the instance
    /// along any dimension.
    pub fn on_face(&self, coord: &Coord<DIMENSION>) -> bool {
        for d in 0..DIMENSION {
            if coord[d] == self.bounds[(d, 0)]
                || coord[d] == self.bounds[(d, 1)]
            {
                return true;
            }
        }
        false
    }

    /// Sub box spanning `[min, max]` along dimension `d`,
    /// all other dimensions unchanged.
    pub fn slice_along(&self, d: usize, min: i32, max: i32) -> Self {
        let mut result = *self;
        result.bounds[(d, 0)] = min;
        result.bounds[(d, 1)] = max;
        debug_assert!(result.check_validity());
        result
    }

    /// Return min corner.
    pub fn min(&self) -> Coord<DIMENSION> {
        self.bounds.column(0).into()
    }

    /// Check that max >= min
    pub fn check_validity(&self) -> bool {
        for d in 0..DIMENSION {
            if self.bounds[(d, 0)] > self.bounds[(d, 1)] {
                return false;
            }
        }
        true
    }

    /// Return iterator over contained coords
    /// in linear ordering.
    pub fn coord_iter(&self) -> impl Iterator<Item = Coord<DIMENSION>> + '_ {
        (0..self.buffer_size()).map(|i| self.linear_to_coord(i))
    }

    /// Linear buffer offsets for a set of neighbor offsets.
    pub fn coord_offset_to_linear<const NEIGHBORHOOD_SIZE: usize>(
        &self,
        coord_offsets: &[Coord<DIMENSION>; NEIGHBORHOOD_SIZE],
    ) -> [isize; NEIGHBORHOOD_SIZE] {
        // highest dimension goes the fastest
        let exclusive_bounds = self.exclusive_bounds();
        let mut linear_offsets = [0; NEIGHBORHOOD_SIZE];
        let mut accumulator = 1;
        for d in (0..DIMENSION).rev() {
            for o in 0..NEIGHBORHOOD_SIZE {
                linear_offsets[o] += coord_offsets[o][d] as isize * accumulator;
            }
            accumulator *= exclusive_bounds[d] as isize;
        }

        linear_offsets
    }
}
