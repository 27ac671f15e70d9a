//! Internal shape representation produced by the builders.
//!
//! A [`Solid`] is deliberately simple: a closed outline polygon in the XY
//! plane, a straight extrusion depth, and a list of cylindrical cutouts.
//! It is created per generation request, handed to the encoders, and
//! discarded; nothing here touches the filesystem.

pub mod tessellate;

use crate::float_types::{Real, EPSILON, FRAC_PI_2, TAU};
use nalgebra::Point2;

/// Segments used to discretize a full circle outline.
pub const CIRCLE_SEGMENTS: usize = 64;
/// Segments per quarter-circle corner fillet.
pub const CORNER_SEGMENTS: usize = 8;
/// Segments used to discretize a hole ring.
pub const HOLE_SEGMENTS: usize = 32;
/// Minimum width of the `Line` shape outline in mm.
pub const MIN_LINE_WIDTH: Real = 5.0;

/// How faithfully the solid reflects the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fidelity {
    /// Kernel-built: holes are cut, fillets applied.
    Exact,
    /// Fallback-built: outline only; cutouts are metadata and are not
    /// subtracted from any 3D output.
    OutlineOnly,
}

/// One cylindrical through-cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cutout {
    pub center: Point2<Real>,
    pub radius: Real,
    /// Cut depth; always the full extrusion thickness for through-holes.
    pub depth: Real,
}

/// Builder output: outline + extrusion + cutouts.
#[derive(Debug, Clone, PartialEq)]
pub struct Solid {
    /// Closed outline, counter-clockwise, first point not repeated.
    pub outline: Vec<Point2<Real>>,
    pub thickness: Real,
    /// In input order. Order is irrelevant geometrically but kept
    /// deterministic for reproducible output.
    pub cutouts: Vec<Cutout>,
    pub fidelity: Fidelity,
}

impl Solid {
    /// Axis-aligned bounds of the outline as (min, max).
    pub fn bounds(&self) -> (Point2<Real>, Point2<Real>) {
        let mut min = Point2::new(Real::INFINITY, Real::INFINITY);
        let mut max = Point2::new(Real::NEG_INFINITY, Real::NEG_INFINITY);
        for p in &self.outline {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }
}

/// Twice the signed area of a closed ring (positive for counter-clockwise).
pub(crate) fn signed_area(ring: &[Point2<Real>]) -> Real {
    let mut sum = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum
}

/// Normalize a ring to counter-clockwise orientation.
fn ensure_ccw(mut ring: Vec<Point2<Real>>) -> Vec<Point2<Real>> {
    if signed_area(&ring) < 0.0 {
        ring.reverse();
    }
    ring
}

/// Axis-aligned rectangle (0,0)-(w,0)-(w,h)-(0,h).
pub fn rectangle_outline(width: Real, height: Real) -> Vec<Point2<Real>> {
    vec![
        Point2::new(0.0, 0.0),
        Point2::new(width, 0.0),
        Point2::new(width, height),
        Point2::new(0.0, height),
    ]
}

/// Rectangle with the four corners filleted by `radius`, traced
/// counter-clockwise starting on the bottom edge. The radius is clamped to
/// half the smaller side so opposing fillets never overlap.
pub fn rounded_rectangle_outline(width: Real, height: Real, radius: Real) -> Vec<Point2<Real>> {
    let r = radius.min(width * 0.5).min(height * 0.5);
    if r <= EPSILON {
        return rectangle_outline(width, height);
    }
    // (corner center, arc start angle); each arc sweeps +90 degrees
    let corners = [
        (Point2::new(width - r, r), -FRAC_PI_2),
        (Point2::new(width - r, height - r), 0.0),
        (Point2::new(r, height - r), FRAC_PI_2),
        (Point2::new(r, r), FRAC_PI_2 * 2.0),
    ];
    let mut outline = Vec::with_capacity(4 * (CORNER_SEGMENTS + 1));
    for (center, start) in corners {
        for i in 0..=CORNER_SEGMENTS {
            let theta = start + FRAC_PI_2 * (i as Real) / (CORNER_SEGMENTS as Real);
            outline.push(Point2::new(
                center.x + r * theta.cos(),
                center.y + r * theta.sin(),
            ));
        }
    }
    outline
}

/// Circle of the given diameter, centered at the origin.
pub fn circle_outline(diameter: Real) -> Vec<Point2<Real>> {
    let radius = diameter * 0.5;
    (0..CIRCLE_SEGMENTS)
        .map(|i| {
            let theta = TAU * (i as Real) / (CIRCLE_SEGMENTS as Real);
            Point2::new(radius * theta.cos(), radius * theta.sin())
        })
        .collect()
}

/// Regular pentagon inscribed in a circle of the given diameter, centered at
/// the origin. First vertex at 12 o'clock, vertices counter-clockwise.
pub fn pentagon_outline(diameter: Real) -> Vec<Point2<Real>> {
    let radius = diameter * 0.5;
    (0..5)
        .map(|i| {
            let theta = FRAC_PI_2 + TAU * (i as Real) / 5.0;
            Point2::new(radius * theta.cos(), radius * theta.sin())
        })
        .collect()
}

/// Thin rectangle for the `Line` shape: max(thickness, 5) wide, `height`
/// tall, centered at the origin.
pub fn line_outline(thickness: Real, height: Real) -> Vec<Point2<Real>> {
    let w = thickness.max(MIN_LINE_WIDTH);
    let (hw, hh) = (w * 0.5, height * 0.5);
    vec![
        Point2::new(-hw, -hh),
        Point2::new(hw, -hh),
        Point2::new(hw, hh),
        Point2::new(-hw, hh),
    ]
}

/// Closed polygon from caller-supplied points. Returns `None` when fewer
/// than 3 points are supplied; callers degrade to the rectangle outline.
pub fn custom_outline(points: &[[Real; 2]]) -> Option<Vec<Point2<Real>>> {
    if points.len() < 3 {
        return None;
    }
    let mut ring: Vec<Point2<Real>> =
        points.iter().map(|p| Point2::new(p[0], p[1])).collect();
    // Drop an explicitly repeated closing point; the ring is implicitly closed.
    if ring.len() > 3 {
        let (first, last) = (ring[0], ring[ring.len() - 1]);
        if (first.x - last.x).abs() < EPSILON && (first.y - last.y).abs() < EPSILON {
            ring.pop();
        }
    }
    Some(ensure_ccw(ring))
}
