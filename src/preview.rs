//! Raster preview rendering: top, front and isometric projections of the
//! configured plate, written as PNG with the part metadata embedded as
//! tEXt key/value chunks.
//!
//! Previews are best-effort. Any failure here is logged and skipped; the
//! engine never aborts a generation request over a missing image.

use crate::config::{PartConfig, PlateShape};
use crate::float_types::{Real, TAU};
use crate::solid::{circle_outline, line_outline, pentagon_outline, rounded_rectangle_outline};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::warn;

const CANVAS_WIDTH: u32 = 800;
const CANVAS_HEIGHT: u32 = 600;
const MARGIN: Real = 60.0;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const OUTLINE: Rgba<u8> = Rgba([30, 30, 30, 255]);
const HOLE: Rgba<u8> = Rgba([60, 90, 200, 255]);
const FACE_TOP: Rgba<u8> = Rgba([210, 210, 218, 255]);
const FACE_FRONT: Rgba<u8> = Rgba([165, 165, 178, 255]);
const FACE_SIDE: Rgba<u8> = Rgba([120, 120, 134, 255]);

fn put(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn draw_line(img: &mut RgbaImage, a: (Real, Real), b: (Real, Real), color: Rgba<u8>) {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0);
    for i in 0..=(steps as i64) {
        let t = i as Real / steps;
        put(
            img,
            (a.0 + dx * t).round() as i64,
            (a.1 + dy * t).round() as i64,
            color,
        );
    }
}

fn draw_closed_polyline(img: &mut RgbaImage, points: &[(Real, Real)], color: Rgba<u8>) {
    for i in 0..points.len() {
        draw_line(img, points[i], points[(i + 1) % points.len()], color);
    }
}

fn draw_circle(img: &mut RgbaImage, center: (Real, Real), radius: Real, color: Rgba<u8>) {
    let segments = 64;
    let points: Vec<(Real, Real)> = (0..segments)
        .map(|i| {
            let theta = TAU * (i as Real) / (segments as Real);
            (center.0 + radius * theta.cos(), center.1 + radius * theta.sin())
        })
        .collect();
    draw_closed_polyline(img, &points, color);
}

/// Even-odd scanline fill.
fn fill_polygon(img: &mut RgbaImage, points: &[(Real, Real)], color: Rgba<u8>) {
    let min_y = points.iter().map(|p| p.1).fold(Real::INFINITY, Real::min).floor() as i64;
    let max_y = points.iter().map(|p| p.1).fold(Real::NEG_INFINITY, Real::max).ceil() as i64;
    for y in min_y.max(0)..=max_y.min(img.height() as i64 - 1) {
        let scan = y as Real + 0.5;
        let mut crossings = Vec::new();
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            if (a.1 <= scan) != (b.1 <= scan) {
                crossings.push(a.0 + (scan - a.1) / (b.1 - a.1) * (b.0 - a.0));
            }
        }
        crossings.sort_by(|p, q| p.partial_cmp(q).unwrap());
        for pair in crossings.chunks_exact(2) {
            for x in pair[0].round() as i64..=pair[1].round() as i64 {
                put(img, x, y, color);
            }
        }
    }
}

/// Outline of the configured shape in the input millimeter frame, matching
/// the 2D drawing encoder's view of the part.
fn plan_outline(config: &PartConfig) -> Vec<(Real, Real)> {
    let (w, h) = (config.width, config.height);
    let centered = |points: Vec<nalgebra::Point2<Real>>| -> Vec<(Real, Real)> {
        points.iter().map(|p| (p.x + w * 0.5, p.y + h * 0.5)).collect()
    };
    match config.shape {
        PlateShape::Rectangle if config.corner_radius > 0.0 => {
            rounded_rectangle_outline(w, h, config.corner_radius)
                .iter()
                .map(|p| (p.x, p.y))
                .collect()
        },
        PlateShape::Rectangle => vec![(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)],
        PlateShape::Circle => centered(circle_outline(w)),
        PlateShape::Pentagon => centered(pentagon_outline(w)),
        PlateShape::Line => centered(line_outline(config.thickness, h)),
        PlateShape::Custom => {
            if config.custom_points.len() >= 3 {
                config.custom_points.iter().map(|p| (p[0], p[1])).collect()
            } else {
                vec![(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
            }
        },
    }
}

fn blank_canvas() -> RgbaImage {
    RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, BACKGROUND)
}

/// Proportional fit of a w×h extent into the canvas margins.
fn fit_scale(extent_w: Real, extent_h: Real) -> Real {
    let sx = (CANVAS_WIDTH as Real - 2.0 * MARGIN) / extent_w;
    let sy = (CANVAS_HEIGHT as Real - 2.0 * MARGIN) / extent_h;
    sx.min(sy)
}

fn render_top(config: &PartConfig) -> RgbaImage {
    let mut img = blank_canvas();
    let scale = fit_scale(config.width, config.height);
    let ox = (CANVAS_WIDTH as Real - config.width * scale) * 0.5;
    let oy = (CANVAS_HEIGHT as Real - config.height * scale) * 0.5;
    // canvas y runs downward
    let to_px =
        |x: Real, y: Real| (ox + x * scale, CANVAS_HEIGHT as Real - (oy + y * scale));

    let outline: Vec<(Real, Real)> =
        plan_outline(config).iter().map(|&(x, y)| to_px(x, y)).collect();
    draw_closed_polyline(&mut img, &outline, OUTLINE);

    for hole in &config.holes {
        let center = to_px(hole.x, hole.y);
        draw_circle(&mut img, center, hole.diameter * 0.5 * scale, HOLE);
    }
    img
}

fn render_front(config: &PartConfig) -> RgbaImage {
    let mut img = blank_canvas();
    // thickness exaggerated x10 so thin plates stay visible
    let silhouette_h = config.thickness * 10.0;
    let scale = fit_scale(config.width, silhouette_h);
    let ox = (CANVAS_WIDTH as Real - config.width * scale) * 0.5;
    let oy = (CANVAS_HEIGHT as Real - silhouette_h * scale) * 0.5;
    let quad = [
        (ox, oy),
        (ox + config.width * scale, oy),
        (ox + config.width * scale, oy + silhouette_h * scale),
        (ox, oy + silhouette_h * scale),
    ];
    fill_polygon(&mut img, &quad, FACE_FRONT);
    draw_closed_polyline(&mut img, &quad, OUTLINE);
    img
}

/// 30-degree axonometric projection of the bounding box, y-up.
fn iso_project(x: Real, y: Real, z: Real) -> (Real, Real) {
    let (sin30, cos30) = (30.0_f64.to_radians().sin(), 30.0_f64.to_radians().cos());
    ((x - y) * cos30, (x + y) * sin30 + z)
}

fn render_isometric(config: &PartConfig) -> RgbaImage {
    let mut img = blank_canvas();
    let (w, h, t) = (config.width, config.height, config.thickness);

    let corners = [
        (0.0, 0.0, 0.0),
        (w, 0.0, 0.0),
        (w, h, 0.0),
        (0.0, h, 0.0),
        (0.0, 0.0, t),
        (w, 0.0, t),
        (w, h, t),
        (0.0, h, t),
    ];
    let projected: Vec<(Real, Real)> =
        corners.iter().map(|&(x, y, z)| iso_project(x, y, z)).collect();
    let min_u = projected.iter().map(|p| p.0).fold(Real::INFINITY, Real::min);
    let max_u = projected.iter().map(|p| p.0).fold(Real::NEG_INFINITY, Real::max);
    let min_v = projected.iter().map(|p| p.1).fold(Real::INFINITY, Real::min);
    let max_v = projected.iter().map(|p| p.1).fold(Real::NEG_INFINITY, Real::max);
    let scale = fit_scale(max_u - min_u, max_v - min_v);
    let ox = (CANVAS_WIDTH as Real - (max_u - min_u) * scale) * 0.5;
    let oy = (CANVAS_HEIGHT as Real - (max_v - min_v) * scale) * 0.5;
    let to_px = |p: (Real, Real)| {
        (
            ox + (p.0 - min_u) * scale,
            CANVAS_HEIGHT as Real - (oy + (p.1 - min_v) * scale),
        )
    };
    let px: Vec<(Real, Real)> = projected.iter().map(|&p| to_px(p)).collect();

    // back-to-front: front face (y=0), right face (x=w), top face (z=t)
    for (face, color) in [
        ([0, 1, 5, 4], FACE_FRONT),
        ([1, 2, 6, 5], FACE_SIDE),
        ([4, 5, 6, 7], FACE_TOP),
    ] {
        let quad: Vec<(Real, Real)> = face.iter().map(|&i| px[i]).collect();
        fill_polygon(&mut img, &quad, color);
        draw_closed_polyline(&mut img, &quad, OUTLINE);
    }
    img
}

fn metadata_chunks(config: &PartConfig, view: &str) -> Vec<(String, String)> {
    let mut chunks = vec![
        ("Material".to_string(), config.material.as_str().to_string()),
        ("Width".to_string(), config.width.to_string()),
        ("Height".to_string(), config.height.to_string()),
        ("Thickness".to_string(), config.thickness.to_string()),
        (
            "Color".to_string(),
            config.color.clone().unwrap_or_else(|| "natural".to_string()),
        ),
        ("Holes".to_string(), config.holes.len().to_string()),
        ("View".to_string(), view.to_string()),
        (
            "Generated".to_string(),
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        ),
    ];
    if let Some(details) = &config.assembly_details {
        chunks.push(("AssemblyDetails".to_string(), details.clone()));
    }
    chunks
}

/// PNG with tEXt metadata. The `image` crate's PNG encoder does not expose
/// text chunks, so the raw buffer goes through `png` directly.
fn write_png(
    path: &Path,
    img: &RgbaImage,
    texts: &[(String, String)],
) -> Result<(), Box<dyn std::error::Error>> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    let mut encoder = png::Encoder::new(writer, img.width(), img.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    for (key, value) in texts {
        encoder.add_text_chunk(key.clone(), value.clone())?;
    }
    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(img.as_raw())?;
    Ok(())
}

/// Render all preview views into `output_dir`. Returns the paths actually
/// written; a failing view is logged and dropped, never fatal.
pub fn render_previews(config: &PartConfig, output_dir: &Path, filename_base: &str) -> Vec<PathBuf> {
    let views: [(&str, fn(&PartConfig) -> RgbaImage); 3] = [
        ("top", render_top),
        ("front", render_front),
        ("isometric", render_isometric),
    ];

    let mut paths = Vec::new();
    for (view, render) in views {
        let path = output_dir.join(format!("{filename_base}_preview_{view}.png"));
        let img = render(config);
        match write_png(&path, &img, &metadata_chunks(config, view)) {
            Ok(()) => paths.push(path),
            Err(error) => {
                warn!(view, %error, "preview rendering failed; skipping view");
                let _ = std::fs::remove_file(&path);
            },
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_projection_keeps_x_and_y_symmetric() {
        let a = iso_project(10.0, 0.0, 0.0);
        let b = iso_project(0.0, 10.0, 0.0);
        assert!((a.0 + b.0).abs() < 1e-9);
        assert!((a.1 - b.1).abs() < 1e-9);
    }

    #[test]
    fn top_view_draws_outline_pixels() {
        let img = render_top(&PartConfig::default());
        let non_white = img.pixels().filter(|p| p.0 != [255, 255, 255, 255]).count();
        assert!(non_white > 0);
    }
}
