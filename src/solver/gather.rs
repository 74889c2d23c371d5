use crate::comm::*;
use crate::domain::*;
use crate::error::Result;
use crate::geometry::*;
use rayon::prelude::*;

/// Collect every rank's owned layers into the full grid on `root`.
/// Ghost layers are not sent. Other ranks get `None`.
pub fn gather_solution<C: Communicator>(
    comm: &C,
    geometry: &GridGeometry,
    slab: &Slab,
    root: Rank,
) -> Result<Option<OwnedDomain<3>>> {
    profiling::scope!("gather_solution");
    comm.gather(slab.owned(), root)?
        .map(|buffer| OwnedDomain::from_buffer(geometry.global_aabb(), buffer))
        .transpose()
}

/// Largest `|φ - φ_ref|` over every point of `domain`.
pub fn max_error<F: ReferenceField, D: DomainView<3>>(
    domain: &D,
    geometry: &GridGeometry,
    field: &F,
    chunk_size: usize,
) -> f64 {
    profiling::scope!("max_error");
    let aabb = domain.aabb();
    domain
        .buffer()
        .par_chunks(chunk_size)
        .enumerate()
        .map(|(i, chunk)| {
            let start = i * chunk_size;
            chunk.iter().enumerate().fold(0.0, |m: f64, (j, v)| {
                let coord = aabb.linear_to_coord(start + j);
                let expected = field.value(&geometry.point(&coord));
                m.max((v - expected).abs())
            })
        })
        .reduce(|| 0.0, f64::max)
}
