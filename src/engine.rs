//! Generation orchestrator.
//!
//! [`Engine`] owns capability detection and one [`GenerationStrategy`], runs
//! a full artifact set per request (STEP, DXF drawing, render mesh, preview
//! images, validation report) and guarantees that a failed request leaves no
//! partial files behind.

use crate::build::{ExternalKernel, FallbackStrategy, GenerationStrategy, KernelStrategy};
use crate::config::{part_metadata, PartConfig, PartMetadata};
use crate::errors::GenerateError;
use crate::preview;
use crate::validate::{validate_step, ValidationReport};
use crate::io::dxf;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Deployment-time switches. All default to the full-featured setup; the
/// environment variables exist for hosts without the kernel or without a
/// need for preview rendering.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Use the in-process precision kernel. Off means template fallback.
    pub kernel_enabled: bool,
    /// External kernel executable, tried only when the in-process kernel is
    /// disabled.
    pub kernel_command: Option<PathBuf>,
    pub previews_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            kernel_enabled: true,
            kernel_command: None,
            previews_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Read the switches from the process environment:
    /// `PLATECAD_DISABLE_KERNEL`, `PLATECAD_KERNEL_CMD`,
    /// `PLATECAD_DISABLE_PREVIEWS`.
    pub fn from_env() -> Self {
        EngineConfig {
            kernel_enabled: std::env::var_os("PLATECAD_DISABLE_KERNEL").is_none(),
            kernel_command: std::env::var_os("PLATECAD_KERNEL_CMD").map(PathBuf::from),
            previews_enabled: std::env::var_os("PLATECAD_DISABLE_PREVIEWS").is_none(),
        }
    }
}

/// What this engine instance can actually do, probed once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub kernel: bool,
    pub subprocess: bool,
    pub previews: bool,
}

/// Everything one successful generation run produced.
#[derive(Debug)]
pub struct GeneratedArtifacts {
    pub step: PathBuf,
    pub drawing: PathBuf,
    /// Render mesh. GLB from the kernel path, STL otherwise.
    pub mesh: PathBuf,
    pub previews: Vec<PathBuf>,
    pub validation: ValidationReport,
    pub metadata: PartMetadata,
}

pub struct Engine {
    capabilities: Capabilities,
    strategy: Box<dyn GenerationStrategy>,
}

impl Engine {
    /// Probe capabilities and pick the strategy. The external kernel probe
    /// runs here exactly once; requests never re-probe.
    pub fn new(config: EngineConfig) -> Self {
        let external = if config.kernel_enabled {
            None
        } else {
            config.kernel_command.and_then(ExternalKernel::probe)
        };
        let capabilities = Capabilities {
            kernel: config.kernel_enabled,
            subprocess: external.is_some(),
            previews: config.previews_enabled,
        };
        let strategy: Box<dyn GenerationStrategy> = if config.kernel_enabled {
            Box::new(KernelStrategy::default())
        } else {
            Box::new(FallbackStrategy::new(external))
        };
        info!(
            kernel = capabilities.kernel,
            subprocess = capabilities.subprocess,
            previews = capabilities.previews,
            strategy = strategy.name(),
            "engine ready"
        );
        Engine { capabilities, strategy }
    }

    /// Shorthand for `Engine::new(EngineConfig::from_env())`.
    pub fn from_env() -> Self {
        Engine::new(EngineConfig::from_env())
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Generate the full artifact set for `config` under `output_dir`, file
    /// names starting with `filename_base`. The configuration is validated
    /// at entry; on any error every file written so far is removed before
    /// the error is returned.
    pub fn generate(
        &self,
        config: &PartConfig,
        output_dir: &Path,
        filename_base: &str,
    ) -> Result<GeneratedArtifacts, GenerateError> {
        config.validate()?;
        std::fs::create_dir_all(output_dir)
            .map_err(|e| GenerateError::encoding(output_dir, e))?;

        let mut written: Vec<PathBuf> = Vec::new();
        match self.try_generate(config, output_dir, filename_base, &mut written) {
            Ok(artifacts) => Ok(artifacts),
            Err(e) => {
                warn!(error = %e, "generation failed, removing partial artifacts");
                for path in written {
                    if let Err(remove_err) = std::fs::remove_file(&path) {
                        if path.exists() {
                            warn!(path = %path.display(), error = %remove_err, "cleanup failed");
                        }
                    }
                }
                Err(e)
            }
        }
    }

    fn try_generate(
        &self,
        config: &PartConfig,
        output_dir: &Path,
        filename_base: &str,
        written: &mut Vec<PathBuf>,
    ) -> Result<GeneratedArtifacts, GenerateError> {
        let solid = self.strategy.build(config)?;

        let step = output_dir.join(format!("{filename_base}.step"));
        written.push(step.clone());
        self.strategy.encode_step(config, &solid, &step)?;

        let drawing = output_dir.join(format!("{filename_base}.dxf"));
        written.push(drawing.clone());
        dxf::write_drawing(config, !self.strategy.is_precise(), &drawing)?;

        let mesh = self
            .strategy
            .encode_mesh(config, &solid, output_dir, filename_base, written)?;

        let previews = if self.capabilities.previews {
            let paths = preview::render_previews(config, output_dir, filename_base);
            written.extend(paths.iter().cloned());
            paths
        } else {
            Vec::new()
        };

        let validation = validate_step(&step, config);
        info!(
            step = %step.display(),
            valid = validation.valid,
            warnings = validation.warnings.len(),
            "artifacts generated"
        );

        Ok(GeneratedArtifacts {
            step,
            drawing,
            mesh,
            previews,
            validation,
            metadata: part_metadata(config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_defaults_to_full_feature_set() {
        // assumes the test runner does not set PLATECAD_* variables
        let config = EngineConfig::from_env();
        assert!(config.kernel_enabled);
        assert!(config.previews_enabled);
        assert!(config.kernel_command.is_none());
    }

    #[test]
    fn disabled_kernel_selects_fallback_strategy() {
        let engine = Engine::new(EngineConfig {
            kernel_enabled: false,
            kernel_command: None,
            previews_enabled: false,
        });
        assert_eq!(engine.strategy_name(), "fallback");
        assert!(!engine.capabilities().kernel);
        assert!(!engine.capabilities().subprocess);
    }

    #[test]
    fn default_engine_uses_kernel() {
        let engine = Engine::new(EngineConfig::default());
        assert_eq!(engine.strategy_name(), "kernel");
        assert!(engine.capabilities().kernel);
    }
}
