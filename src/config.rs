//! Declarative part configuration: the input value the engine works from.
//!
//! A [`PartConfig`] describes one flat plastic plate: its outline shape,
//! dimensions, material and the through-holes to drill. Every field has a
//! defined default so partially-specified configurations deserialize without
//! any runtime presence checks.

use crate::errors::GenerateError;
use crate::float_types::Real;
use serde::{Deserialize, Serialize};

/// Allowed width range in millimeters.
pub const WIDTH_RANGE: (Real, Real) = (50.0, 3000.0);
/// Allowed height range in millimeters.
pub const HEIGHT_RANGE: (Real, Real) = (50.0, 2000.0);
/// Allowed thickness range in millimeters.
pub const THICKNESS_RANGE: (Real, Real) = (1.0, 50.0);
/// Maximum hole diameter in millimeters.
pub const MAX_HOLE_DIAMETER: Real = 100.0;

/// Outline shape vocabulary. Fixed and small on purpose: this is a plate
/// configurator, not a solid modeler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateShape {
    #[default]
    Rectangle,
    Circle,
    Pentagon,
    Line,
    Custom,
}

/// Sheet material the plate is cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Material {
    #[default]
    #[serde(rename = "PE 500")]
    Pe500,
    #[serde(rename = "PE 1000")]
    Pe1000,
    #[serde(rename = "PP")]
    Pp,
    #[serde(rename = "POM")]
    Pom,
}

impl Material {
    /// Display name as used in CAD file metadata, e.g. `"PE 500"`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Material::Pe500 => "PE 500",
            Material::Pe1000 => "PE 1000",
            Material::Pp => "PP",
            Material::Pom => "POM",
        }
    }

    /// Same name with spaces replaced by underscores, for identifiers
    /// embedded in STEP labels.
    pub fn label(&self) -> String {
        self.as_str().replace(' ', "_")
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One circular through-hole. Center coordinates are millimeters in the same
/// frame as the outline: x from the left edge, y from the bottom edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    pub id: String,
    pub x: Real,
    pub y: Real,
    pub diameter: Real,
}

impl Hole {
    pub fn new(id: impl Into<String>, x: Real, y: Real, diameter: Real) -> Self {
        Hole { id: id.into(), x, y, diameter }
    }
}

/// Immutable description of one part. See the field-level docs for ranges;
/// [`PartConfig::validate`] enforces them at the `generate` boundary, and
/// everything downstream of that check assumes a valid value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartConfig {
    pub shape: PlateShape,
    /// Width in mm, 50..=3000. For circles this is the diameter.
    pub width: Real,
    /// Height in mm, 50..=2000.
    pub height: Real,
    /// Thickness in mm, 1..=50.
    pub thickness: Real,
    pub material: Material,
    pub color: Option<String>,
    pub assembly_details: Option<String>,
    /// Corner rounding radius, rectangle shape only. Zero means sharp corners.
    pub corner_radius: Real,
    /// Outline vertices for [`PlateShape::Custom`]. Fewer than 3 points
    /// degrades to the rectangle outline.
    pub custom_points: Vec<[Real; 2]>,
    pub holes: Vec<Hole>,
}

impl Default for PartConfig {
    fn default() -> Self {
        PartConfig {
            shape: PlateShape::Rectangle,
            width: 100.0,
            height: 100.0,
            thickness: 5.0,
            material: Material::default(),
            color: None,
            assembly_details: None,
            corner_radius: 0.0,
            custom_points: Vec::new(),
            holes: Vec::new(),
        }
    }
}

impl PartConfig {
    /// Boundary validation. `Engine::generate` runs this at entry; the
    /// builders and encoders past that point assume a valid value.
    pub fn validate(&self) -> Result<(), GenerateError> {
        fn check(name: &str, value: Real, range: (Real, Real)) -> Result<(), GenerateError> {
            if !value.is_finite() || value < range.0 || value > range.1 {
                return Err(GenerateError::Configuration(format!(
                    "{name} {value} out of range [{}, {}] mm",
                    range.0, range.1
                )));
            }
            Ok(())
        }
        check("width", self.width, WIDTH_RANGE)?;
        check("height", self.height, HEIGHT_RANGE)?;
        check("thickness", self.thickness, THICKNESS_RANGE)?;
        if self.corner_radius < 0.0 || !self.corner_radius.is_finite() {
            return Err(GenerateError::Configuration(format!(
                "corner_radius {} must be non-negative",
                self.corner_radius
            )));
        }
        for hole in &self.holes {
            if !hole.x.is_finite() || !hole.y.is_finite() || hole.x < 0.0 || hole.y < 0.0 {
                return Err(GenerateError::Configuration(format!(
                    "hole {} center ({}, {}) must be finite and non-negative",
                    hole.id, hole.x, hole.y
                )));
            }
            if !hole.diameter.is_finite()
                || hole.diameter <= 0.0
                || hole.diameter > MAX_HOLE_DIAMETER
            {
                return Err(GenerateError::Configuration(format!(
                    "hole {} diameter {} out of range (0, {}] mm",
                    hole.id, hole.diameter, MAX_HOLE_DIAMETER
                )));
            }
        }
        Ok(())
    }

    /// STEP part label, e.g. `PlasticPart_PE_500`.
    pub fn part_label(&self) -> String {
        format!("PlasticPart_{}", self.material.label())
    }
}

/// Derived metadata block returned alongside generated artifacts, mirroring
/// what order-management callers expect to log and surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartMetadata {
    pub width: Real,
    pub height: Real,
    pub thickness: Real,
    pub material: String,
    pub holes_count: usize,
    pub area_mm2: Real,
    pub volume_mm3: Real,
    pub generated_at: String,
    pub assembly_details: Option<String>,
}

/// Compute the metadata block for a configuration.
pub fn part_metadata(config: &PartConfig) -> PartMetadata {
    let area = config.width * config.height;
    PartMetadata {
        width: config.width,
        height: config.height,
        thickness: config.thickness,
        material: config.material.as_str().to_string(),
        holes_count: config.holes.len(),
        area_mm2: area,
        volume_mm3: area * config.thickness,
        generated_at: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        assembly_details: config.assembly_details.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_names_round_trip_through_serde() {
        for material in [Material::Pe500, Material::Pe1000, Material::Pp, Material::Pom] {
            let json = serde_json::to_string(&material).unwrap();
            assert_eq!(json, format!("\"{}\"", material.as_str()));
            let back: Material = serde_json::from_str(&json).unwrap();
            assert_eq!(back, material);
        }
    }

    #[test]
    fn partial_config_deserializes_with_defaults() {
        let config: PartConfig =
            serde_json::from_str(r#"{"width": 440.0, "height": 220.0, "material": "PP"}"#)
                .unwrap();
        assert_eq!(config.shape, PlateShape::Rectangle);
        assert_eq!(config.thickness, 5.0);
        assert!(config.holes.is_empty());
        assert_eq!(config.material, Material::Pp);
    }

    #[test]
    fn validate_rejects_out_of_range_dimensions() {
        let config = PartConfig { width: 10.0, ..PartConfig::default() };
        assert!(config.validate().is_err());

        let config = PartConfig {
            holes: vec![Hole::new("h1", 10.0, 10.0, 150.0)],
            ..PartConfig::default()
        };
        assert!(config.validate().is_err());

        assert!(PartConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_finite_hole_fields() {
        let nan = Real::NAN;
        for hole in [
            Hole::new("h1", nan, 10.0, 8.0),
            Hole::new("h1", 10.0, nan, 8.0),
            Hole::new("h1", 10.0, 10.0, nan),
            Hole::new("h1", Real::INFINITY, 10.0, 8.0),
            Hole::new("h1", 10.0, 10.0, Real::INFINITY),
        ] {
            let config = PartConfig { holes: vec![hole.clone()], ..PartConfig::default() };
            assert!(config.validate().is_err(), "accepted hole {hole:?}");
        }
    }
}
