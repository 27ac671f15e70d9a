//! Post-export STEP validation.
//!
//! The validator re-reads a produced exchange file as plain text and checks
//! structural markers plus numeric fidelity against the originating
//! configuration. It is informational: hard structural problems flip
//! `valid`, everything else accumulates as warnings and the caller decides
//! what to do with them.

use crate::config::PartConfig;
use crate::float_types::Real;
use crate::io::step::{FALLBACK_MARKER, STEP_FOOTER_TOKEN, STEP_HEADER_TOKEN};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Minimum plausible size of a real STEP file in bytes.
pub const MIN_STEP_FILE_SIZE: u64 = 100;

/// Outcome of validating one exchange file. Immutable, returned to the
/// caller next to the artifact paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub message: String,
    pub file_size: u64,
}

/// Textual representations under which a millimeter dimension counts as
/// "clearly referenced" in the file.
fn dimension_found(content: &str, value: Real) -> bool {
    let raw = format!("{value}");
    let base = if value == value.trunc() {
        format!("{}", value as i64)
    } else {
        raw.clone()
    };
    let variations = [
        base.clone(),
        format!("{base}."),
        raw.clone(),
        format!("{raw}."),
        format!("({base}"),
        format!("{raw}mm"),
    ];
    variations.iter().any(|needle| content.contains(needle.as_str()))
}

/// Validate a produced STEP file against the configuration it came from.
/// Read-only; never touches anything but the given path.
pub fn validate_step(path: &Path, config: &PartConfig) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let file_size = match std::fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(_) => {
            return ValidationReport {
                valid: false,
                errors: vec!["STEP file does not exist".to_string()],
                warnings,
                message: "File not found".to_string(),
                file_size: 0,
            };
        },
    };

    if file_size == 0 {
        errors.push("STEP file is empty (0 bytes)".to_string());
    } else if file_size < MIN_STEP_FILE_SIZE {
        errors.push(format!("STEP file is too small ({file_size} bytes)"));
    }

    match std::fs::read(path).map(String::from_utf8) {
        Ok(Ok(content)) => {
            if !content.starts_with(STEP_HEADER_TOKEN) {
                errors.push(format!(
                    "Invalid STEP format: missing {STEP_HEADER_TOKEN} header"
                ));
            }
            if !content.contains(STEP_FOOTER_TOKEN) {
                errors.push(format!(
                    "Invalid STEP format: missing {STEP_FOOTER_TOKEN} footer"
                ));
            }

            // Kernel exports are not required to carry the material string;
            // only fallback-originated content promises it.
            let material = config.material.as_str();
            let material_found = content.contains(material)
                || content.contains(&material.replace(' ', "_"))
                || content.contains(&material.replace(' ', ""));
            if !material_found && content.contains(FALLBACK_MARKER) {
                warnings.push(format!("Material \"{material}\" not found in STEP file"));
            }

            for (label, value) in [
                ("Width", config.width),
                ("Height", config.height),
                ("Thickness", config.thickness),
            ] {
                if !dimension_found(&content, value) {
                    warnings.push(format!(
                        "{label} dimension ({value}mm) not clearly referenced"
                    ));
                }
            }

            let hole_count = config.holes.len();
            if hole_count > 0
                && !content.contains("CYLINDRICAL_SURFACE")
                && !content.contains("CIRCLE")
                && !content.contains(&hole_count.to_string())
            {
                warnings.push(format!(
                    "Expected {hole_count} holes but no cylindrical surfaces found"
                ));
            }
        },
        Ok(Err(utf8_error)) => {
            errors.push(format!("Error reading STEP file: {utf8_error}"));
        },
        Err(io_error) => {
            errors.push(format!("Error reading STEP file: {io_error}"));
        },
    }

    let valid = errors.is_empty();
    let message = if valid {
        let mut message = format!("Valid STEP file ({file_size} bytes)");
        if !warnings.is_empty() {
            message.push_str(&format!(" with {} warning(s)", warnings.len()));
        }
        message
    } else {
        format!("Invalid STEP file: {} error(s)", errors.len())
    };

    ValidationReport { valid, errors, warnings, message, file_size }
}
