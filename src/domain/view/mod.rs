mod chunk;
mod owned;

pub use chunk::*;
pub use owned::*;

use crate::util::*;
use rayon::prelude::*;

pub trait DomainView<const GRID_DIMENSION: usize>: Sync {
    fn aabb(&self) -> &AABB<GRID_DIMENSION>;

    fn buffer(&self) -> &[f64];

    fn buffer_mut(&mut self) -> &mut [f64];

    fn aabb_buffer_mut(&mut self) -> (&AABB<GRID_DIMENSION>, &mut [f64]);

    #[track_caller]
    fn view(&self, world_coord: &Coord<GRID_DIMENSION>) -> f64 {
        assert!(
            self.aabb().contains(world_coord),
            "{:?} does not contain {:?}",
            self.aabb(),
            world_coord
        );
        let index = self.aabb().coord_to_linear(world_coord);
        self.buffer()[index]
    }

    #[track_caller]
    fn set_coord(&mut self, world_coord: &Coord<GRID_DIMENSION>, value: f64) {
        assert!(
            self.aabb().contains(world_coord),
            "{:?} does not contain {:?}",
            self.aabb(),
            world_coord
        );
        let (aabb, buffer) = self.aabb_buffer_mut();
        buffer[aabb.coord_to_linear(world_coord)] = value;
    }

    fn par_modify_access<'a>(
        &'a mut self,
        chunk_size: usize,
    ) -> impl ParallelIterator<Item = DomainChunk<'a, GRID_DIMENSION>> {
        let (aabb, buffer) = self.aabb_buffer_mut();
        par_modify_access_impl(buffer, aabb, chunk_size)
    }

    fn par_set_values<F: Fn(Coord<GRID_DIMENSION>) -> f64 + Send + Sync>(
        &mut self,
        f: F,
        chunk_size: usize,
    ) {
        self.par_modify_access(chunk_size).for_each(
            |mut d: DomainChunk<'_, GRID_DIMENSION>| {
                d.coord_iter_mut().for_each(|(world_coord, value_mut)| {
                    *value_mut = f(world_coord);
                })
            },
        );
    }
}

/// Why not just put this into Domain::par_modify_access?
/// Rust compiler can't figure out how to borrow aabb and buffer
/// at the same time in this way.
/// By putting their borrows into one function call first we work around it.
fn par_modify_access_impl<'a, const GRID_DIMENSION: usize>(
    buffer: &'a mut [f64],
    aabb: &'a AABB<GRID_DIMENSION>,
    chunk_size: usize,
) -> impl ParallelIterator<Item = DomainChunk<'a, GRID_DIMENSION>> + 'a {
    buffer[0..aabb.buffer_size()]
        .par_chunks_mut(chunk_size)
        .enumerate()
        .map(move |(i, buffer_chunk): (usize, &mut [f64])| {
            let offset = i * chunk_size;
            DomainChunk::new(offset, aabb, buffer_chunk)
        })
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn par_set_values_test() {
        for chunk_size in [1, 7, 1000] {
            let bounds = AABB::new(matrix![-1, 2; 0, 3; 0, 4]);
            let mut domain = OwnedDomain::new(bounds);
            domain.par_set_values(
                |c| (100 * c[0] + 10 * c[1] + c[2]) as f64,
                chunk_size,
            );
            for c in bounds.coord_iter() {
                let e = (100 * c[0] + 10 * c[1] + c[2]) as f64;
                assert_eq!(domain.view(&c), e);
            }
        }
    }

    #[test]
    fn set_coord_test() {
        let bounds = AABB::new(matrix![0, 2; 0, 2]);
        let mut domain = OwnedDomain::new(bounds);
        domain.set_coord(&vector![1, 2], 3.5);
        assert_eq!(domain.view(&vector![1, 2]), 3.5);
        assert_eq!(domain.buffer()[5], 3.5);
    }

    #[test]
    #[should_panic]
    fn view_out_of_bounds_test() {
        let domain = OwnedDomain::new(AABB::new(matrix![0, 2; 0, 2]));
        domain.view(&vector![3, 0]);
    }
}
