use super::*;
use crate::error::Result;
use crate::geometry::*;

/// The two iterates of one rank.
/// `source` indexes the previous iterate, read only during a round;
/// the other slab is written. Swapping only moves the index.
pub struct SlabPair {
    slabs: [Slab; 2],
    source: usize,
}

impl SlabPair {
    pub fn new(source: Slab, target: Slab) -> Self {
        debug_assert_eq!(source.aabb(), target.aabb());
        SlabPair {
            slabs: [source, target],
            source: 0,
        }
    }

    /// Both buffers start from the same initialized slab.
    pub fn initialize<F: ReferenceField>(
        geometry: &GridGeometry,
        partition: &Partition,
        field: &F,
        chunk_size: usize,
    ) -> Result<Self> {
        let source = Slab::initialize(geometry, partition, field, chunk_size)?;
        let mut target = Slab::try_new(geometry, partition)?;
        target.copy_from(&source, chunk_size);
        Ok(Self::new(source, target))
    }

    pub fn source(&self) -> &Slab {
        &self.slabs[self.source]
    }

    pub fn target(&self) -> &Slab {
        &self.slabs[1 - self.source]
    }

    /// `(source, target)`
    pub fn split_mut(&mut self) -> (&mut Slab, &mut Slab) {
        let [a, b] = &mut self.slabs;
        if self.source == 0 {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// The target just written becomes the next round's source.
    pub fn swap(&mut self) {
        self.source = 1 - self.source;
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::config::ProblemConfig;

    #[test]
    fn swap_roles_test() {
        let config = ProblemConfig::cube(4, 1.0, 1e-3);
        let p = Partition::from_config(&config, 0, 1).unwrap();
        let mut pair =
            SlabPair::initialize(&config.geometry, &p, &SquaredRadius, 3)
                .unwrap();
        assert_eq!(pair.source().buffer(), pair.target().buffer());

        {
            let (source, target) = pair.split_mut();
            source.set(2, 1, 1, 1.0);
            target.set(2, 1, 1, 2.0);
        }
        let source_ptr = pair.source().buffer().as_ptr();
        let target_ptr = pair.target().buffer().as_ptr();
        pair.swap();
        assert_eq!(pair.source().buffer().as_ptr(), target_ptr);
        assert_eq!(pair.source().get(2, 1, 1), 2.0);
        assert_eq!(pair.target().get(2, 1, 1), 1.0);
        assert_eq!(pair.target().buffer().as_ptr(), source_ptr);

        pair.swap();
        assert_eq!(pair.source().buffer().as_ptr(), source_ptr);
    }
}
