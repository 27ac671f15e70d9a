//! Generation strategies.
//!
//! The engine is polymorphic over a small capability set: building the
//! solid, encoding the 3D exchange file, and encoding the render mesh.
//! [`KernelStrategy`] is the precision path; [`FallbackStrategy`] produces
//! deterministic template output (optionally delegating STEP generation to
//! an external kernel process) so the system degrades gracefully when the
//! precision path is disabled.

mod external;
mod fallback;
mod kernel;

pub use external::{ExternalKernel, KernelRequest};
pub use fallback::FallbackStrategy;
pub use kernel::KernelStrategy;

use crate::config::{PartConfig, PlateShape};
use crate::errors::GenerateError;
use crate::float_types::Real;
use crate::solid::{
    circle_outline, custom_outline, line_outline, pentagon_outline, rectangle_outline, Cutout,
    Solid,
};
use nalgebra::Point2;
use std::path::{Path, PathBuf};

/// One interchangeable generation path. Implementations are stateless
/// across requests; everything request-scoped flows through the arguments.
pub trait GenerationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// True for the precision kernel path. Template-only concerns (the DXF
    /// vendor comment block, validator material checks) key off this.
    fn is_precise(&self) -> bool;

    /// Construct the internal shape representation. Pure: no filesystem,
    /// `config` untouched.
    fn build(&self, config: &PartConfig) -> Result<Solid, GenerateError>;

    /// Write the 3D exchange file.
    fn encode_step(
        &self,
        config: &PartConfig,
        solid: &Solid,
        path: &Path,
    ) -> Result<(), GenerateError>;

    /// Write the render mesh next to the other artifacts and return the
    /// path actually produced (the extension may differ from the request
    /// when mesh conversion degrades). Every file touched is appended to
    /// `written` so the orchestrator can clean up on failure.
    fn encode_mesh(
        &self,
        config: &PartConfig,
        solid: &Solid,
        output_dir: &Path,
        filename_base: &str,
        written: &mut Vec<PathBuf>,
    ) -> Result<PathBuf, GenerateError>;
}

/// Outline and hole frame shared by both strategies.
///
/// Centered shapes (circle, pentagon, line) re-express hole centers
/// relative to the outline center; rectangle and custom outlines keep the
/// input frame. The 2D drawing encoder never re-centers; the asymmetry is
/// part of the format contract.
pub(crate) fn outline_and_holes(
    config: &PartConfig,
    rounded_corners: bool,
) -> (Vec<Point2<Real>>, Vec<Cutout>) {
    let recenter = |hole_x: Real, hole_y: Real| -> Point2<Real> {
        Point2::new(hole_x - config.width * 0.5, hole_y - config.height * 0.5)
    };

    let (outline, recentered) = match config.shape {
        PlateShape::Rectangle => {
            let outline = if rounded_corners && config.corner_radius > 0.0 {
                crate::solid::rounded_rectangle_outline(
                    config.width,
                    config.height,
                    config.corner_radius,
                )
            } else {
                rectangle_outline(config.width, config.height)
            };
            (outline, false)
        },
        PlateShape::Circle => (circle_outline(config.width), true),
        PlateShape::Pentagon => (pentagon_outline(config.width), true),
        PlateShape::Line => (line_outline(config.thickness, config.height), true),
        PlateShape::Custom => match custom_outline(&config.custom_points) {
            Some(outline) => (outline, false),
            // fewer than 3 points: degrade to the rectangle case
            None => (rectangle_outline(config.width, config.height), false),
        },
    };

    let cutouts = config
        .holes
        .iter()
        .map(|hole| Cutout {
            center: if recentered {
                recenter(hole.x, hole.y)
            } else {
                Point2::new(hole.x, hole.y)
            },
            radius: hole.diameter * 0.5,
            depth: config.thickness,
        })
        .collect();

    (outline, cutouts)
}
