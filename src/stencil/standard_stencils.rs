use crate::stencil::*;
use crate::util::*;

/// Seven point Jacobi relaxation for `∇²φ − aφ = ρ` on a grid with
/// spacings `h_x`, `h_y`, `h_z`.
/// Coordinates are ordered `[z, x, y]`, matching the slab layout.
/// The centre point does not take part in the neighbor sum, it is
/// replaced by
/// `(Σ φ_n / h_n² − ρ) / (2/h_x² + 2/h_y² + 2/h_z² + a)`.
pub struct HelmholtzStencil {
    pub stencil: Stencil<3, 6>,
    pub denominator: f64,
}

impl HelmholtzStencil {
    pub fn relax(&self, args: &Values<6>, rho: f64) -> f64 {
        self.stencil.apply(args) - rho / self.denominator
    }
}

pub fn helmholtz_3d(h_x: f64, h_y: f64, h_z: f64, a: f64) -> HelmholtzStencil {
    let inv_x = 1.0 / (h_x * h_x);
    let inv_y = 1.0 / (h_y * h_y);
    let inv_z = 1.0 / (h_z * h_z);
    let denominator = 2.0 * inv_x + 2.0 * inv_y + 2.0 * inv_z + a;
    let stencil = Stencil::new(
        [
            [-1, 0, 0],
            [1, 0, 0],
            [0, -1, 0],
            [0, 1, 0],
            [0, 0, -1],
            [0, 0, 1],
        ],
        move |args: &[f64; 6]| {
            let below = args[0];
            let above = args[1];
            let left = args[2];
            let right = args[3];
            let front = args[4];
            let back = args[5];
            ((below + above) * inv_z
                + (left + right) * inv_x
                + (front + back) * inv_y)
                / denominator
        },
    );
    HelmholtzStencil {
        stencil,
        denominator,
    }
}
