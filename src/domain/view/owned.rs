use super::*;
use crate::error::{Error, Result};
use crate::util::*;

#[derive(Debug)]
pub struct OwnedDomain<const GRID_DIMENSION: usize> {
    aabb: AABB<GRID_DIMENSION>,
    buffer: Vec<f64>,
}

impl<const GRID_DIMENSION: usize> OwnedDomain<GRID_DIMENSION> {
    pub fn new(aabb: AABB<GRID_DIMENSION>) -> Self {
        let buffer = vec![0.0; aabb.buffer_size()];
        OwnedDomain { aabb, buffer }
    }

    /// Like `new` but reports a failed allocation instead of aborting.
    pub fn try_new(aabb: AABB<GRID_DIMENSION>) -> Result<Self> {
        let values = aabb.buffer_size();
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(values)
            .map_err(|_| Error::Allocation { values })?;
        buffer.resize(values, 0.0);
        Ok(OwnedDomain { aabb, buffer })
    }

    pub fn from_buffer(
        aabb: AABB<GRID_DIMENSION>,
        buffer: Vec<f64>,
    ) -> Result<Self> {
        if buffer.len() != aabb.buffer_size() {
            return Err(Error::MessageSize {
                expected: aabb.buffer_size(),
                actual: buffer.len(),
            });
        }
        Ok(OwnedDomain { aabb, buffer })
    }
}

impl<const GRID_DIMENSION: usize> DomainView<GRID_DIMENSION>
    for OwnedDomain<GRID_DIMENSION>
{
    fn aabb(&self) -> &AABB<GRID_DIMENSION> {
        &self.aabb
    }

    fn buffer(&self) -> &[f64] {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut [f64] {
        &mut self.buffer
    }

    fn aabb_buffer_mut(&mut self) -> (&AABB<GRID_DIMENSION>, &mut [f64]) {
        (&self.aabb, &mut self.buffer)
    }
}
