//! Template strategy: no geometric kernel, only arithmetic and templates.

use super::{outline_and_holes, ExternalKernel, GenerationStrategy};
use crate::config::PartConfig;
use crate::errors::GenerateError;
use crate::io::{step, stl};
use crate::solid::tessellate::box_mesh;
use crate::solid::{Fidelity, Solid};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Deterministic fallback. Shapes keep their outlines but holes stay
/// metadata (no boolean subtraction) and rectangle corners stay straight;
/// the render mesh is a plain box. When an external kernel process is
/// configured it takes over STEP generation, otherwise the template writer
/// runs.
#[derive(Debug, Default)]
pub struct FallbackStrategy {
    external: Option<ExternalKernel>,
}

impl FallbackStrategy {
    pub fn new(external: Option<ExternalKernel>) -> Self {
        FallbackStrategy { external }
    }
}

impl GenerationStrategy for FallbackStrategy {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn is_precise(&self) -> bool {
        false
    }

    fn build(&self, config: &PartConfig) -> Result<Solid, GenerateError> {
        // corner_radius is informational here: straight corners only
        let (outline, cutouts) = outline_and_holes(config, false);
        debug!(points = outline.len(), holes = cutouts.len(), "fallback outline built");
        Ok(Solid {
            outline,
            thickness: config.thickness,
            cutouts,
            fidelity: Fidelity::OutlineOnly,
        })
    }

    fn encode_step(
        &self,
        config: &PartConfig,
        _solid: &Solid,
        path: &Path,
    ) -> Result<(), GenerateError> {
        match &self.external {
            Some(kernel) => kernel.generate_step(config, path),
            None => step::write_fallback_step(config, path),
        }
    }

    fn encode_mesh(
        &self,
        config: &PartConfig,
        _solid: &Solid,
        output_dir: &Path,
        filename_base: &str,
        written: &mut Vec<PathBuf>,
    ) -> Result<PathBuf, GenerateError> {
        let mesh = box_mesh(config.width, config.height, config.thickness);
        let mut comments = vec![
            format!("Material: {}", config.material),
            format!(
                "Dimensions: {}x{}x{} mm",
                config.width, config.height, config.thickness
            ),
            format!("Color: {}", config.color.as_deref().unwrap_or("natural")),
            format!("Holes: {}", config.holes.len()),
        ];
        if let Some(details) = &config.assembly_details {
            comments.push(format!("AssemblyDetails: {details}"));
        }

        let path = output_dir.join(format!("{filename_base}.stl"));
        written.push(path.clone());
        std::fs::write(&path, stl::to_stl_ascii(&mesh, &config.part_label(), &comments))
            .map_err(|e| GenerateError::encoding(&path, e))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Hole;

    #[test]
    fn fallback_solid_keeps_holes_as_metadata_only() {
        let config = PartConfig {
            holes: vec![Hole::new("h1", 50.0, 50.0, 10.0)],
            corner_radius: 10.0,
            ..PartConfig::default()
        };
        let solid = FallbackStrategy::default().build(&config).unwrap();
        assert_eq!(solid.fidelity, Fidelity::OutlineOnly);
        assert_eq!(solid.cutouts.len(), 1);
        // straight corners: the radius stays informational
        assert_eq!(solid.outline.len(), 4);
        // and the tessellation ignores the cutout
        assert_eq!(solid.tessellate().unwrap().len(), 12);
    }
}
