//! Tessellation of a [`Solid`] into a triangle mesh.
//!
//! Caps are triangulated by ear-cutting the outline polygon with the hole
//! rings as interiors, so hole subtraction stays exact at the tessellation
//! tolerance and deterministic in hole input order. Walls are straight quad
//! strips between the two cap planes.

use super::{signed_area, Cutout, Fidelity, Solid, HOLE_SEGMENTS};
use crate::errors::GenerateError;
use crate::float_types::{Real, EPSILON, TAU};
use crate::triangulated::{Triangulated3D, Vertex};
use geo::{LineString, Polygon as GeoPolygon, TriangulateEarcut};
use nalgebra::{Point2, Point3, Vector3};

/// An owned triangle soup. The output of [`Solid::tessellate`].
#[derive(Debug, Clone, PartialEq)]
pub struct TriMesh {
    triangles: Vec<[Vertex; 3]>,
}

impl TriMesh {
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

impl Triangulated3D for TriMesh {
    fn visit_triangles(&self, mut visitor: impl FnMut([Vertex; 3])) {
        for tri in &self.triangles {
            visitor(*tri);
        }
    }
}

/// Hole ring sampled counter-clockwise.
fn cutout_ring(cutout: &Cutout) -> Vec<Point2<Real>> {
    (0..HOLE_SEGMENTS)
        .map(|i| {
            let theta = TAU * (i as Real) / (HOLE_SEGMENTS as Real);
            Point2::new(
                cutout.center.x + cutout.radius * theta.cos(),
                cutout.center.y + cutout.radius * theta.sin(),
            )
        })
        .collect()
}

fn closed_line_string(ring: &[Point2<Real>]) -> LineString<Real> {
    let mut coords: Vec<(Real, Real)> = ring.iter().map(|p| (p.x, p.y)).collect();
    if let Some(&first) = coords.first() {
        coords.push(first);
    }
    LineString::from(coords)
}

/// Emit a wall strip along `ring` between z0 and z1. For a counter-clockwise
/// ring the triangles face away from the enclosed area, so outlines get
/// outward walls and clockwise hole rings get walls facing the hole axis.
fn wall_strip(triangles: &mut Vec<[Vertex; 3]>, ring: &[Point2<Real>], z0: Real, z1: Real) {
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len = (dx * dx + dy * dy).sqrt();
        if len < EPSILON {
            continue;
        }
        let normal = Vector3::new(dy / len, -dx / len, 0.0);
        let a0 = Vertex::new(Point3::new(a.x, a.y, z0), normal);
        let b0 = Vertex::new(Point3::new(b.x, b.y, z0), normal);
        let b1 = Vertex::new(Point3::new(b.x, b.y, z1), normal);
        let a1 = Vertex::new(Point3::new(a.x, a.y, z1), normal);
        triangles.push([a0, b0, b1]);
        triangles.push([a0, b1, a1]);
    }
}

impl Solid {
    /// Tessellate into a closed triangle mesh.
    ///
    /// Cutouts are honored only for [`Fidelity::Exact`] solids; an
    /// outline-only solid tessellates as the plain extrusion.
    pub fn tessellate(&self) -> Result<TriMesh, GenerateError> {
        if self.outline.len() < 3 {
            return Err(GenerateError::Geometry(format!(
                "outline has {} points, need at least 3",
                self.outline.len()
            )));
        }

        let cut = self.fidelity == Fidelity::Exact;
        let hole_rings: Vec<Vec<Point2<Real>>> = if cut {
            self.cutouts.iter().map(cutout_ring).collect()
        } else {
            Vec::new()
        };

        let interiors: Vec<LineString<Real>> = hole_rings
            .iter()
            .map(|ring| {
                // interiors are wound opposite to the exterior
                let mut reversed = ring.clone();
                reversed.reverse();
                closed_line_string(&reversed)
            })
            .collect();
        let polygon = GeoPolygon::new(closed_line_string(&self.outline), interiors);

        let cap = polygon.earcut_triangles();
        if cap.is_empty() {
            return Err(GenerateError::Geometry(
                "tessellation produced no cap triangles; outline may be degenerate or fully \
                 consumed by hole cuts"
                    .into(),
            ));
        }

        let mut triangles = Vec::with_capacity(cap.len() * 2 + self.outline.len() * 2);
        let (z0, z1) = (0.0, self.thickness);
        let up = Vector3::z();
        let down = -Vector3::z();

        for tri in &cap {
            let mut p = [
                Point2::new(tri.0.x, tri.0.y),
                Point2::new(tri.1.x, tri.1.y),
                Point2::new(tri.2.x, tri.2.y),
            ];
            if signed_area(&p) < 0.0 {
                p.swap(1, 2);
            }
            // top cap, counter-clockwise seen from +z
            triangles.push([
                Vertex::new(Point3::new(p[0].x, p[0].y, z1), up),
                Vertex::new(Point3::new(p[1].x, p[1].y, z1), up),
                Vertex::new(Point3::new(p[2].x, p[2].y, z1), up),
            ]);
            // bottom cap, mirrored winding
            triangles.push([
                Vertex::new(Point3::new(p[0].x, p[0].y, z0), down),
                Vertex::new(Point3::new(p[2].x, p[2].y, z0), down),
                Vertex::new(Point3::new(p[1].x, p[1].y, z0), down),
            ]);
        }

        wall_strip(&mut triangles, &self.outline, z0, z1);
        for ring in &hole_rings {
            let mut reversed = ring.clone();
            reversed.reverse();
            wall_strip(&mut triangles, &reversed, z0, z1);
        }

        Ok(TriMesh { triangles })
    }
}

/// Plain axis-aligned box mesh used by the fallback strategy: 6 faces, 12
/// triangles, outward axis-aligned normals. Holes are never subtracted here.
pub fn box_mesh(width: Real, height: Real, thickness: Real) -> TriMesh {
    let p = |x: Real, y: Real, z: Real| Point3::new(x, y, z);
    let (w, h, t) = (width, height, thickness);
    let mut triangles = Vec::with_capacity(12);

    let mut face = |normal: Vector3<Real>, quad: [Point3<Real>; 4]| {
        let v: Vec<Vertex> = quad.iter().map(|&q| Vertex::new(q, normal)).collect();
        triangles.push([v[0], v[1], v[2]]);
        triangles.push([v[0], v[2], v[3]]);
    };

    // bottom (z=0) and top (z=t)
    face(-Vector3::z(), [p(0.0, 0.0, 0.0), p(0.0, h, 0.0), p(w, h, 0.0), p(w, 0.0, 0.0)]);
    face(Vector3::z(), [p(0.0, 0.0, t), p(w, 0.0, t), p(w, h, t), p(0.0, h, t)]);
    // front (y=0) and back (y=h)
    face(-Vector3::y(), [p(0.0, 0.0, 0.0), p(w, 0.0, 0.0), p(w, 0.0, t), p(0.0, 0.0, t)]);
    face(Vector3::y(), [p(0.0, h, 0.0), p(0.0, h, t), p(w, h, t), p(w, h, 0.0)]);
    // left (x=0) and right (x=w)
    face(-Vector3::x(), [p(0.0, 0.0, 0.0), p(0.0, 0.0, t), p(0.0, h, t), p(0.0, h, 0.0)]);
    face(Vector3::x(), [p(w, 0.0, 0.0), p(w, h, 0.0), p(w, h, t), p(w, 0.0, t)]);

    TriMesh { triangles }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solid::rectangle_outline;

    fn rect_solid(cutouts: Vec<Cutout>, fidelity: Fidelity) -> Solid {
        Solid {
            outline: rectangle_outline(100.0, 50.0),
            thickness: 5.0,
            cutouts,
            fidelity,
        }
    }

    #[test]
    fn box_mesh_has_twelve_outward_triangles() {
        let mesh = box_mesh(100.0, 50.0, 5.0);
        assert_eq!(mesh.len(), 12);
        mesh.visit_triangles(|tri| {
            // winding must agree with the stored normal
            let a = tri[0].position;
            let edge1 = tri[1].position - a;
            let edge2 = tri[2].position - a;
            let computed = edge1.cross(&edge2);
            assert!(computed.dot(&tri[0].normal) > 0.0);
        });
    }

    #[test]
    fn plain_extrusion_tessellates_like_a_box() {
        let mesh = rect_solid(Vec::new(), Fidelity::Exact).tessellate().unwrap();
        // 2 cap triangles per side + 2 per wall edge
        assert_eq!(mesh.len(), 12);
    }

    #[test]
    fn cutouts_add_hole_ring_geometry_in_exact_mode_only() {
        let cutout = Cutout {
            center: Point2::new(50.0, 25.0),
            radius: 5.0,
            depth: 5.0,
        };
        let exact = rect_solid(vec![cutout], Fidelity::Exact).tessellate().unwrap();
        let outline_only = rect_solid(vec![cutout], Fidelity::OutlineOnly)
            .tessellate()
            .unwrap();
        assert!(exact.len() > outline_only.len());
        assert_eq!(outline_only.len(), 12);
    }

    #[test]
    fn degenerate_outline_is_a_geometry_error() {
        let solid = Solid {
            outline: vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)],
            thickness: 5.0,
            cutouts: Vec::new(),
            fidelity: Fidelity::Exact,
        };
        assert!(solid.tessellate().is_err());
    }
}
