//! Grid geometry
//!
//! Maps grid indices to physical coordinates and holds the analytic
//! field that seeds boundary values and checks the converged solution.
//! Grid coordinates are ordered `[z, x, y]` everywhere in this crate,
//! z being the decomposed (outermost) axis.

use crate::util::*;
use nalgebra::Vector3;

/// Physical position `(x, y, z)`.
pub type Point = Vector3<f64>;

/// `origin + index * span / (extent - 1)`
pub fn coordinate_of(
    index: i32,
    extent: usize,
    origin: f64,
    span: f64,
) -> f64 {
    origin + index as f64 * span / (extent - 1) as f64
}

/// One axis of the physical box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Axis {
    pub extent: usize,
    pub origin: f64,
    pub span: f64,
}

impl Axis {
    pub fn new(extent: usize, origin: f64, span: f64) -> Self {
        Axis {
            extent,
            origin,
            span,
        }
    }

    pub fn coordinate_of(&self, index: i32) -> f64 {
        coordinate_of(index, self.extent, self.origin, self.span)
    }

    pub fn spacing(&self) -> f64 {
        self.span / (self.extent - 1) as f64
    }

    pub fn last_index(&self) -> i32 {
        self.extent as i32 - 1
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridGeometry {
    pub x: Axis,
    pub y: Axis,
    pub z: Axis,
}

impl GridGeometry {
    pub fn new(x: Axis, y: Axis, z: Axis) -> Self {
        GridGeometry { x, y, z }
    }

    /// Box covering the whole global grid.
    pub fn global_aabb(&self) -> AABB<3> {
        AABB::new(matrix![
            0, self.z.last_index();
            0, self.x.last_index();
            0, self.y.last_index()
        ])
    }

    /// Values in one z layer.
    pub fn layer_len(&self) -> usize {
        self.x.extent * self.y.extent
    }

    pub fn point(&self, coord: &Coord<3>) -> Point {
        Point::new(
            self.x.coordinate_of(coord[1]),
            self.y.coordinate_of(coord[2]),
            self.z.coordinate_of(coord[0]),
        )
    }

    /// Index based test for the outermost layer along any axis.
    pub fn is_boundary(&self, coord: &Coord<3>) -> bool {
        self.global_aabb().on_face(coord)
    }

    /// First or last global z layer.
    pub fn is_z_boundary(&self, z: i32) -> bool {
        z == 0 || z == self.z.last_index()
    }
}

/// A fixed smooth scalar field.
/// `laplacian` is needed to build the right hand side
/// `ρ = ∇²φ − aφ` that makes the field an exact solution.
pub trait ReferenceField: Sync {
    fn value(&self, p: &Point) -> f64;

    fn laplacian(&self, p: &Point) -> f64;

    fn rhs(&self, p: &Point, a: f64) -> f64 {
        self.laplacian(p) - a * self.value(p)
    }
}

/// `φ = x² + y² + z²`
#[derive(Debug, Copy, Clone, Default)]
pub struct SquaredRadius;

impl ReferenceField for SquaredRadius {
    fn value(&self, p: &Point) -> f64 {
        p.x * p.x + p.y * p.y + p.z * p.z
    }

    fn laplacian(&self, _p: &Point) -> f64 {
        6.0
    }
}
