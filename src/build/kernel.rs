//! Precision strategy: exact tessellated solids, B-rep STEP, GLB mesh.

use super::{outline_and_holes, GenerationStrategy};
use crate::config::PartConfig;
use crate::errors::GenerateError;
use crate::io::{glb, step, stl};
use crate::solid::{Fidelity, Solid};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// In-process geometric kernel: holes are boolean-subtracted from the
/// extrusion (in input order) and rectangle corners are filleted.
#[derive(Debug, Default)]
pub struct KernelStrategy;

impl GenerationStrategy for KernelStrategy {
    fn name(&self) -> &'static str {
        "kernel"
    }

    fn is_precise(&self) -> bool {
        true
    }

    fn build(&self, config: &PartConfig) -> Result<Solid, GenerateError> {
        let (outline, cutouts) = outline_and_holes(config, true);
        let solid = Solid {
            outline,
            thickness: config.thickness,
            cutouts,
            fidelity: Fidelity::Exact,
        };
        // Cut early so a degenerate configuration surfaces as a geometry
        // failure here instead of a half-written artifact set later.
        let mesh = solid.tessellate()?;
        debug!(triangles = mesh.len(), holes = solid.cutouts.len(), "kernel solid built");
        Ok(solid)
    }

    fn encode_step(
        &self,
        config: &PartConfig,
        solid: &Solid,
        path: &Path,
    ) -> Result<(), GenerateError> {
        let mesh = solid.tessellate()?;
        step::write_kernel_step(config, solid, &mesh, path)
    }

    fn encode_mesh(
        &self,
        config: &PartConfig,
        solid: &Solid,
        output_dir: &Path,
        filename_base: &str,
        written: &mut Vec<PathBuf>,
    ) -> Result<PathBuf, GenerateError> {
        let mesh = solid.tessellate()?;

        // Intermediate surface mesh first, then the compact container.
        let stl_path = output_dir.join(format!("{filename_base}.stl"));
        written.push(stl_path.clone());
        let stl_bytes = stl::to_stl_binary(&mesh)
            .map_err(|e| GenerateError::encoding(&stl_path, e))?;
        std::fs::write(&stl_path, stl_bytes)
            .map_err(|e| GenerateError::encoding(&stl_path, e))?;

        let glb_path = output_dir.join(format!("{filename_base}.glb"));
        written.push(glb_path.clone());
        let glb_bytes = glb::to_glb(&mesh, &config.part_label());
        match std::fs::write(&glb_path, glb_bytes) {
            Ok(()) => {
                // container written; the intermediate mesh is consumed
                let _ = std::fs::remove_file(&stl_path);
                Ok(glb_path)
            },
            Err(error) => {
                // conversion failure is recoverable: hand back the STL
                warn!(%error, "GLB conversion failed; keeping intermediate STL");
                let _ = std::fs::remove_file(&glb_path);
                Ok(stl_path)
            },
        }
    }
}
