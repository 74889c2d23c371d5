use crate::util::*;

/// For linear stencils, we can extract the weight for a neighbor
/// by passing in 1.0 for that neighbor and 0.0 for the others.
pub fn extract_weights<
    const NEIGHBORHOOD_SIZE: usize,
    F: Fn(&[f64; NEIGHBORHOOD_SIZE]) -> f64,
>(
    f: F,
) -> Values<NEIGHBORHOOD_SIZE> {
    let mut weights = Values::zeros();
    let mut arg_buffer = [0.0; NEIGHBORHOOD_SIZE];
    for n in 0..NEIGHBORHOOD_SIZE {
        arg_buffer[n] = 1.0;
        weights[n] = f(&arg_buffer);
        arg_buffer[n] = 0.0;
    }
    weights
}

/// A linear stencil is a set of neighbor offsets and one weight per offset.
pub struct Stencil<const GRID_DIMENSION: usize, const NEIGHBORHOOD_SIZE: usize>
{
    pub weights: Values<NEIGHBORHOOD_SIZE>,
    pub offsets: [Coord<GRID_DIMENSION>; NEIGHBORHOOD_SIZE],
}

impl<const GRID_DIMENSION: usize, const NEIGHBORHOOD_SIZE: usize>
    Stencil<GRID_DIMENSION, NEIGHBORHOOD_SIZE>
{
    pub fn new<F: Fn(&[f64; NEIGHBORHOOD_SIZE]) -> f64>(
        offsets: [[i32; GRID_DIMENSION]; NEIGHBORHOOD_SIZE],
        operation: F,
    ) -> Self {
        let weights = extract_weights(operation);
        Stencil {
            offsets: std::array::from_fn(|i| {
                Coord::from_column_slice(&offsets[i])
            }),
            weights,
        }
    }

    pub fn weights(&self) -> &Values<NEIGHBORHOOD_SIZE> {
        &self.weights
    }

    /// Neighbor offsets as buffer offsets for a domain laid out over `aabb`.
    pub fn linear_offsets(
        &self,
        aabb: &AABB<GRID_DIMENSION>,
    ) -> [isize; NEIGHBORHOOD_SIZE] {
        aabb.coord_offset_to_linear(&self.offsets)
    }

    pub fn apply(&self, args: &Values<NEIGHBORHOOD_SIZE>) -> f64 {
        self.weights.component_mul(args).sum()
    }

    /// Gather the neighbors of `center` straight out of a linear buffer.
    /// Caller guarantees every neighbor lies inside the buffer.
    #[inline]
    pub fn gather_linear(
        buffer: &[f64],
        center: usize,
        linear_offsets: &[isize; NEIGHBORHOOD_SIZE],
    ) -> Values<NEIGHBORHOOD_SIZE> {
        Values::from_fn(|n, _| {
            buffer[(center as isize + linear_offsets[n]) as usize]
        })
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn extract_weights() {
        {
            let s = Stencil::new([[1]], |args: &[f64; 1]| 2.0 * args[0]);
            let w = s.weights()[0];
            assert_approx_eq!(f64, w, 2.0);
        }

        {
            let s = Stencil::new([[1], [2], [3]], |args: &[f64; 3]| {
                2.0 * args[0] + 3.0 * args[1] + 5.0 * args[2]
            });
            let w = s.weights();
            assert_approx_eq!(f64, w[0], 2.0, ulps = 1);
            assert_approx_eq!(f64, w[1], 3.0, ulps = 1);
            assert_approx_eq!(f64, w[2], 5.0, ulps = 1);
        }
    }

    #[test]
    fn gather_linear_test() {
        let aabb = AABB::new(matrix![0, 2; 0, 2]);
        let buffer: Vec<f64> =
            (0..aabb.buffer_size()).map(|i| i as f64).collect();
        let s = Stencil::new(
            [[-1, 0], [1, 0], [0, -1], [0, 1]],
            |args: &[f64; 4]| args.iter().sum::<f64>() / 4.0,
        );
        let offsets = s.linear_offsets(&aabb);
        let center = aabb.coord_to_linear(&vector![1, 1]);
        let args = Stencil::<2, 4>::gather_linear(&buffer, center, &offsets);
        assert_eq!(args, Values::from([1.0, 7.0, 3.0, 5.0]));
        assert_approx_eq!(f64, s.apply(&args), 4.0);
    }
}
