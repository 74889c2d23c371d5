use crate::config::ProblemConfig;
use crate::domain::*;
use crate::geometry::*;
use crate::stencil::*;
use crate::util::*;
use rayon::prelude::*;

/// Relaxes single z layers of a slab, reading only source layers
/// and writing only the target layer.
pub struct UpdateEngine<'a, F: ReferenceField> {
    geometry: &'a GridGeometry,
    field: &'a F,
    a: f64,
    stencil: HelmholtzStencil,
    linear_offsets: [isize; 6],
    rows_per_task: usize,
}

impl<'a, F: ReferenceField> UpdateEngine<'a, F> {
    pub fn new(
        config: &'a ProblemConfig,
        field: &'a F,
        partition: &Partition,
    ) -> Self {
        let geometry = &config.geometry;
        let stencil = helmholtz_3d(
            geometry.x.spacing(),
            geometry.y.spacing(),
            geometry.z.spacing(),
            config.a,
        );
        let linear_offsets =
            stencil.stencil.linear_offsets(&partition.slab_aabb(geometry));
        UpdateEngine {
            geometry,
            field,
            a: config.a,
            stencil,
            linear_offsets,
            rows_per_task: config.chunk_size,
        }
    }

    /// Write the next iterate of `local_layer` into `target`,
    /// returns the largest change made in that layer.
    ///
    /// `neighborhood` holds the source layers `local_layer - 1`,
    /// `local_layer` and `local_layer + 1`, and the outer two must
    /// already hold current values.
    /// Global z boundary layers are copied through unchanged.
    /// Interior layers keep their X/Y edge values and relax every
    /// other point from its six neighbors.
    pub fn update_layer(
        &self,
        partition: &Partition,
        local_layer: usize,
        neighborhood: &[f64],
        target: &mut [f64],
    ) -> f64 {
        profiling::scope!("update_layer");
        let layer_len = target.len();
        debug_assert_eq!(neighborhood.len(), 3 * layer_len);
        let z = partition.global_z(local_layer);
        if self.geometry.is_z_boundary(z) {
            target.copy_from_slice(&neighborhood[layer_len..2 * layer_len]);
            return 0.0;
        }

        let n_x = self.geometry.x.extent;
        let n_y = self.geometry.y.extent;
        target
            .par_chunks_mut(n_y)
            .with_min_len(self.rows_per_task)
            .enumerate()
            .map(|(x, row)| {
                let x_edge = x == 0 || x == n_x - 1;
                let mut max_delta = 0.0;
                for (y, value) in row.iter_mut().enumerate() {
                    let center = layer_len + x * n_y + y;
                    let old = neighborhood[center];
                    if x_edge || y == 0 || y == n_y - 1 {
                        *value = old;
                        continue;
                    }
                    let coord = vector![z, x as i32, y as i32];
                    let p = self.geometry.point(&coord);
                    let rho = self.field.rhs(&p, self.a);
                    let args = Stencil::<3, 6>::gather_linear(
                        neighborhood,
                        center,
                        &self.linear_offsets,
                    );
                    let new = self.stencil.relax(&args, rho);
                    *value = new;
                    max_delta = f64::max(max_delta, (new - old).abs());
                }
                max_delta
            })
            .reduce(|| 0.0, f64::max)
    }
}
