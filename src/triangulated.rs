//! Triangle-visitor seam between solids and the mesh encoders.

use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

/// One mesh vertex: position plus outward-facing normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<Real>,
    pub normal: Vector3<Real>,
}

impl Vertex {
    pub const fn new(position: Point3<Real>, normal: Vector3<Real>) -> Self {
        Vertex { position, normal }
    }
}

/// Anything that can stream itself out as triangles. The STL, GLB and STEP
/// B-rep encoders all consume shapes through this trait so they stay
/// independent of how the triangles were produced.
pub trait Triangulated3D {
    fn visit_triangles(&self, visitor: impl FnMut([Vertex; 3]));

    /// Convenience: collect the triangle stream into a `Vec`.
    fn triangles(&self) -> Vec<[Vertex; 3]> {
        let mut out = Vec::new();
        self.visit_triangles(|tri| out.push(tri));
        out
    }
}
