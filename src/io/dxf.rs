//! DXF (tag-value) 2D drawing export.
//!
//! The drawing is always written by this template writer, whichever build
//! strategy produced the 3D artifacts; hand-emitting the tag stream keeps
//! the output byte-stable across locales and DXF library versions. All
//! coordinates are in the input millimeter frame: unlike the 3D builders,
//! circle/pentagon/line outlines and hole centers are *not* re-centered.

use crate::config::{PartConfig, PlateShape};
use crate::errors::GenerateError;
use crate::float_types::Real;
use crate::solid::{line_outline, pentagon_outline};
use std::fmt::Display;
use std::fmt::Write as _;
use std::path::Path;

/// Layer carrying the part outline.
pub const OUTLINE_LAYER: &str = "OUTLINE";
/// Layer carrying the drilled holes.
pub const HOLE_LAYER: &str = "CIRCLES";

struct TagWriter {
    out: String,
}

impl TagWriter {
    fn new() -> Self {
        TagWriter { out: String::new() }
    }

    fn tag(&mut self, code: i32, value: impl Display) {
        let _ = writeln!(self.out, "{code:>3}");
        let _ = writeln!(self.out, "{value}");
    }

    fn entity(&mut self, name: &str, layer: &str) {
        self.tag(0, name);
        self.tag(8, layer);
    }

    fn vertex(&mut self, x: Real, y: Real) {
        self.tag(10, x);
        self.tag(20, y);
    }

    fn closed_polyline(&mut self, layer: &str, points: &[(Real, Real)]) {
        self.entity("LWPOLYLINE", layer);
        self.tag(90, points.len());
        self.tag(70, 1); // closed
        for &(x, y) in points {
            self.vertex(x, y);
        }
    }

    fn line(&mut self, layer: &str, from: (Real, Real), to: (Real, Real)) {
        self.entity("LINE", layer);
        self.vertex(from.0, from.1);
        self.tag(11, to.0);
        self.tag(21, to.1);
    }

    fn arc(&mut self, layer: &str, center: (Real, Real), radius: Real, start: Real, end: Real) {
        self.entity("ARC", layer);
        self.vertex(center.0, center.1);
        self.tag(40, radius);
        self.tag(50, start);
        self.tag(51, end);
    }

    fn circle(&mut self, layer: &str, center: (Real, Real), radius: Real) {
        self.entity("CIRCLE", layer);
        self.vertex(center.0, center.1);
        self.tag(40, radius);
    }
}

fn vendor_comment_block(w: &mut TagWriter, config: &PartConfig) {
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S");
    w.tag(999, format!("Material: {}", config.material));
    w.tag(
        999,
        format!(
            "Dimensions: {}x{}x{} mm",
            config.width, config.height, config.thickness
        ),
    );
    w.tag(999, format!("Color: {}", config.color.as_deref().unwrap_or("natural")));
    w.tag(999, format!("CornerRadius: {}", config.corner_radius));
    w.tag(999, format!("Holes: {}", config.holes.len()));
    w.tag(999, format!("Generated: {timestamp}"));
    if let Some(details) = &config.assembly_details {
        w.tag(999, format!("AssemblyDetails: {details}"));
    }
}

fn header_section(w: &mut TagWriter) {
    w.tag(0, "SECTION");
    w.tag(2, "HEADER");
    w.tag(9, "$ACADVER");
    w.tag(1, "AC1015");
    w.tag(9, "$INSUNITS");
    w.tag(70, 4); // millimeters
    w.tag(9, "$MEASUREMENT");
    w.tag(70, 1); // metric
    w.tag(0, "ENDSEC");
}

fn tables_section(w: &mut TagWriter) {
    w.tag(0, "SECTION");
    w.tag(2, "TABLES");

    w.tag(0, "TABLE");
    w.tag(2, "LTYPE");
    w.tag(70, 1);
    w.tag(0, "LTYPE");
    w.tag(2, "CONTINUOUS");
    w.tag(70, 0);
    w.tag(3, "Solid line");
    w.tag(72, 65);
    w.tag(73, 0);
    w.tag(40, 0.0);
    w.tag(0, "ENDTAB");

    w.tag(0, "TABLE");
    w.tag(2, "LAYER");
    w.tag(70, 2);
    for (name, color) in [(OUTLINE_LAYER, 1), (HOLE_LAYER, 5)] {
        w.tag(0, "LAYER");
        w.tag(2, name);
        w.tag(70, 0);
        w.tag(62, color);
        w.tag(6, "CONTINUOUS");
        w.tag(290, 1);
    }
    w.tag(0, "ENDTAB");
    w.tag(0, "ENDSEC");
}

/// Rounded rectangle as 4 straight edges and 4 quarter arcs, traced from
/// (r, 0). Arc angles are degrees, counter-clockwise start to end.
fn rounded_rectangle_entities(w: &mut TagWriter, width: Real, height: Real, radius: Real) {
    let r = radius.min(width * 0.5).min(height * 0.5);
    w.line(OUTLINE_LAYER, (r, 0.0), (width - r, 0.0));
    w.arc(OUTLINE_LAYER, (width - r, r), r, 270.0, 0.0);
    w.line(OUTLINE_LAYER, (width, r), (width, height - r));
    w.arc(OUTLINE_LAYER, (width - r, height - r), r, 0.0, 90.0);
    w.line(OUTLINE_LAYER, (width - r, height), (r, height));
    w.arc(OUTLINE_LAYER, (r, height - r), r, 90.0, 180.0);
    w.line(OUTLINE_LAYER, (0.0, height - r), (0.0, r));
    w.arc(OUTLINE_LAYER, (r, r), r, 180.0, 270.0);
}

fn outline_entities(w: &mut TagWriter, config: &PartConfig) {
    let (width, height) = (config.width, config.height);
    let rectangle = [(0.0, 0.0), (width, 0.0), (width, height), (0.0, height)];
    match config.shape {
        PlateShape::Rectangle => {
            if config.corner_radius > 0.0 {
                rounded_rectangle_entities(w, width, height, config.corner_radius);
            } else {
                w.closed_polyline(OUTLINE_LAYER, &rectangle);
            }
        },
        PlateShape::Circle => {
            w.circle(OUTLINE_LAYER, (width * 0.5, height * 0.5), width * 0.5);
        },
        PlateShape::Pentagon => {
            let points: Vec<(Real, Real)> = pentagon_outline(width)
                .iter()
                .map(|p| (p.x + width * 0.5, p.y + height * 0.5))
                .collect();
            w.closed_polyline(OUTLINE_LAYER, &points);
        },
        PlateShape::Line => {
            let points: Vec<(Real, Real)> = line_outline(config.thickness, height)
                .iter()
                .map(|p| (p.x + width * 0.5, p.y + height * 0.5))
                .collect();
            w.closed_polyline(OUTLINE_LAYER, &points);
        },
        PlateShape::Custom => {
            if config.custom_points.len() >= 3 {
                let points: Vec<(Real, Real)> =
                    config.custom_points.iter().map(|p| (p[0], p[1])).collect();
                w.closed_polyline(OUTLINE_LAYER, &points);
            } else {
                w.closed_polyline(OUTLINE_LAYER, &rectangle);
            }
        },
    }
}

/// Render the complete drawing. `vendor_block` adds the non-standard 999
/// comment block and is set only for fallback-originated drawings.
pub fn drawing_string(config: &PartConfig, vendor_block: bool) -> String {
    let mut w = TagWriter::new();
    if vendor_block {
        vendor_comment_block(&mut w, config);
    }
    header_section(&mut w);
    tables_section(&mut w);

    w.tag(0, "SECTION");
    w.tag(2, "ENTITIES");
    outline_entities(&mut w, config);
    for hole in &config.holes {
        w.circle(HOLE_LAYER, (hole.x, hole.y), hole.diameter / 2.0);
    }
    w.tag(0, "ENDSEC");
    w.tag(0, "EOF");
    w.out
}

pub fn write_drawing(
    config: &PartConfig,
    vendor_block: bool,
    path: &Path,
) -> Result<(), GenerateError> {
    std::fs::write(path, drawing_string(config, vendor_block))
        .map_err(|e| GenerateError::encoding(path, e))
}
