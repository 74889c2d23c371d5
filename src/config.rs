//! Run configuration
//!
//! Built once before the solve and passed by reference to every
//! component, nothing reads process wide globals.

use crate::error::{Error, Result};
use crate::geometry::*;

#[derive(Debug, Clone, PartialEq)]
pub struct ProblemConfig {
    pub geometry: GridGeometry,

    /// Helmholtz constant `a` in `∇²φ − aφ = ρ`.
    pub a: f64,

    /// Iteration stops once the global max change is `<= epsilon`.
    pub epsilon: f64,

    /// Work split for rayon loops inside one process.
    pub chunk_size: usize,

    /// Unbounded by default, an unreachable epsilon then never stops.
    pub max_rounds: Option<usize>,
}

impl ProblemConfig {
    /// 560³ points on [-1, 1]³ with a = 1e6 and epsilon = 1e-7.
    pub fn reference() -> Self {
        Self::cube(560, 10e5, 10e-8)
    }

    /// `n` points per axis on [-1, 1]³.
    pub fn cube(n: usize, a: f64, epsilon: f64) -> Self {
        let axis = Axis::new(n, -1.0, 2.0);
        ProblemConfig {
            geometry: GridGeometry::new(axis, axis, axis),
            a,
            epsilon,
            chunk_size: 1,
            max_rounds: None,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }

    /// Check the configuration for a run on `processes` ranks,
    /// returns the number of z layers each rank owns.
    pub fn validate(&self, processes: usize) -> Result<usize> {
        for (axis, extent) in [
            ('x', self.geometry.x.extent),
            ('y', self.geometry.y.extent),
            ('z', self.geometry.z.extent),
        ] {
            if extent < 3 {
                return Err(Error::InvalidGrid { axis, extent });
            }
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        if !(self.a.is_finite() && self.a >= 0.0) {
            return Err(Error::InvalidParameter(format!(
                "a must be non-negative, got {}",
                self.a
            )));
        }
        if self.chunk_size == 0 {
            return Err(Error::InvalidParameter(
                "chunk size must be positive".to_string(),
            ));
        }
        let nz = self.geometry.z.extent;
        if processes == 0 || nz % processes != 0 {
            return Err(Error::InvalidPartition { nz, processes });
        }
        Ok(nz / processes)
    }
}
