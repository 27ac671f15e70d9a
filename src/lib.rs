//! Parametric generation of flat plastic plates.
//!
//! From one declarative [`PartConfig`] the engine produces a manufacturing
//! artifact set: a STEP exchange file, a 2D DXF drawing, a render mesh
//! (GLB or STL) and PNG preview images, then validates the STEP output and
//! reports what it found.
//!
//! Two strategies exist behind one trait. The precision kernel tessellates
//! the real outline with drilled holes; the fallback path runs with no
//! geometric kernel at all and produces template files that downstream
//! tooling still accepts. Which one runs is decided once at
//! [`Engine::new`] from the [`EngineConfig`] switches.
//!
//! ```no_run
//! use platecad::{Engine, EngineConfig, PartConfig};
//!
//! let engine = Engine::new(EngineConfig::from_env());
//! let config = PartConfig { width: 440.0, height: 220.0, ..PartConfig::default() };
//! let artifacts = engine.generate(&config, "output".as_ref(), "plate_440x220")?;
//! println!("{}", artifacts.validation.message);
//! # Ok::<(), platecad::GenerateError>(())
//! ```

#![forbid(unsafe_code)]

pub mod build;
pub mod config;
pub mod engine;
pub mod errors;
pub mod float_types;
pub mod io;
pub mod preview;
pub mod solid;
pub mod triangulated;
pub mod validate;

pub use config::{part_metadata, Hole, Material, PartConfig, PartMetadata, PlateShape};
pub use engine::{Capabilities, Engine, EngineConfig, GeneratedArtifacts};
pub use errors::GenerateError;
pub use float_types::Real;
pub use validate::{validate_step, ValidationReport};
