//! STEP (ISO-10303-21) export.
//!
//! Two independent writers share nothing but the document framing: the
//! kernel writer serializes the tessellated solid as a faceted B-rep with
//! cylindrical-surface records for every hole, while the fallback writer
//! emits a minimal template whose numeric content the validator can recover
//! from text alone.

use crate::config::PartConfig;
use crate::errors::GenerateError;
use crate::float_types::{tolerance, Real};
use crate::solid::tessellate::TriMesh;
use crate::solid::Solid;
use crate::triangulated::Triangulated3D;
use nalgebra::Point3;
use std::fmt::Write as _;
use std::path::Path;

/// Canonical header token; STEP files must begin with this.
pub const STEP_HEADER_TOKEN: &str = "ISO-10303-21";
/// Canonical footer token; STEP files must contain this.
pub const STEP_FOOTER_TOKEN: &str = "END-ISO-10303-21";
/// Originating-system marker identifying a fallback-generated file.
pub const FALLBACK_MARKER: &str = "PlateCAD Fallback";

/// STEP real literal: integral values get the standard trailing dot.
fn step_real(value: Real) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}.", value as i64)
    } else {
        format!("{value}")
    }
}

/// Entity accumulator with monotonically numbered `#n=…;` records.
struct StepBuilder {
    entities: Vec<String>,
    next_id: usize,
}

impl StepBuilder {
    fn new() -> Self {
        StepBuilder { entities: Vec::new(), next_id: 1 }
    }

    fn add(&mut self, body: String) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.entities.push(format!("#{id}={body};"));
        id
    }

    /// Verbatim line in the DATA section (comments and the like).
    fn raw(&mut self, line: String) {
        self.entities.push(line);
    }

    fn cartesian_point(&mut self, p: Point3<Real>) -> usize {
        self.add(format!(
            "CARTESIAN_POINT('',({},{},{}))",
            step_real(p.x),
            step_real(p.y),
            step_real(p.z)
        ))
    }

    fn direction(&mut self, x: Real, y: Real, z: Real) -> usize {
        self.add(format!(
            "DIRECTION('',({},{},{}))",
            step_real(x),
            step_real(y),
            step_real(z)
        ))
    }

    fn finish(self, config: &PartConfig, originating_system: &str) -> String {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S");
        let mut out = String::new();
        let _ = writeln!(out, "{STEP_HEADER_TOKEN};");
        let _ = writeln!(out, "HEADER;");
        let _ = writeln!(
            out,
            "FILE_DESCRIPTION(('Plastic Part - {}','Width: {}mm, Height: {}mm, Thickness: {}mm'),'2;1');",
            config.material, config.width, config.height, config.thickness
        );
        let _ = writeln!(
            out,
            "FILE_NAME('plastic_part.step','{timestamp}',('Plate Configurator'),(''),('{originating_system}'),'','');"
        );
        let _ = writeln!(out, "FILE_SCHEMA(('AUTOMOTIVE_DESIGN'));");
        let _ = writeln!(out, "ENDSEC;");
        let _ = writeln!(out, "DATA;");
        for entity in &self.entities {
            let _ = writeln!(out, "{entity}");
        }
        let _ = writeln!(out, "ENDSEC;");
        let _ = writeln!(out, "{STEP_FOOTER_TOKEN};");
        out
    }
}

/// Product structure and the Material/Width/Height/Thickness/HoleCount
/// property records shared by both writers.
fn product_entities(builder: &mut StepBuilder, config: &PartConfig) -> usize {
    let product = builder.add(format!(
        "PRODUCT('{}','{} - {}x{}x{}mm - {} holes','Part generated by Plate Configurator')",
        config.part_label(),
        config.material,
        config.width,
        config.height,
        config.thickness,
        config.holes.len()
    ));
    let formation = builder.add(format!("PRODUCT_DEFINITION_FORMATION('','',#{product})"));
    let app = builder.add("APPLICATION_CONTEXT('automotive design')".to_string());
    let def_context =
        builder.add(format!("PRODUCT_DEFINITION_CONTEXT('part definition',#{app},'design')"));
    let definition = builder.add(format!(
        "PRODUCT_DEFINITION('design','',#{formation},#{def_context})"
    ));
    builder.add(format!("PRODUCT_RELATED_PRODUCT_CATEGORY('part',$,(#{product}))"));

    builder.add(format!(
        "PROPERTY_DEFINITION('material','{}',#{definition})",
        config.material
    ));
    builder.add(format!("PROPERTY_DEFINITION('width','{}',#{definition})", config.width));
    builder.add(format!("PROPERTY_DEFINITION('height','{}',#{definition})", config.height));
    builder.add(format!(
        "PROPERTY_DEFINITION('thickness','{}',#{definition})",
        config.thickness
    ));
    builder.add(format!(
        "PROPERTY_DEFINITION('hole_count','{}',#{definition})",
        config.holes.len()
    ));
    definition
}

/// Serialize the kernel-built boundary representation.
///
/// Mesh vertices are deduplicated within [`tolerance`] into shared
/// `CARTESIAN_POINT` records, each triangle becomes a `POLY_LOOP` face, and
/// each cutout contributes `CYLINDRICAL_SURFACE` + `CIRCLE` records so the
/// drilled holes stay recoverable from the text.
pub fn kernel_step_string(config: &PartConfig, solid: &Solid, mesh: &TriMesh) -> String {
    let mut builder = StepBuilder::new();
    product_entities(&mut builder, config);

    for cutout in &solid.cutouts {
        let origin = builder.cartesian_point(Point3::new(cutout.center.x, cutout.center.y, 0.0));
        let axis = builder.direction(0.0, 0.0, 1.0);
        let reference = builder.direction(1.0, 0.0, 0.0);
        let placement =
            builder.add(format!("AXIS2_PLACEMENT_3D('',#{origin},#{axis},#{reference})"));
        builder.add(format!(
            "CYLINDRICAL_SURFACE('',#{placement},{})",
            step_real(cutout.radius)
        ));
        builder.add(format!("CIRCLE('',#{placement},{})", step_real(cutout.radius)));
    }

    // Faceted B-rep over the tessellation, with shared vertex points.
    let mut points: Vec<Point3<Real>> = Vec::new();
    let mut point_ids: Vec<usize> = Vec::new();
    let eps = tolerance();
    let mut point_id = |builder: &mut StepBuilder, p: Point3<Real>| -> usize {
        for (i, existing) in points.iter().enumerate() {
            if (existing - p).norm() < eps {
                return point_ids[i];
            }
        }
        let id = builder.cartesian_point(p);
        points.push(p);
        point_ids.push(id);
        id
    };

    let mut face_ids = Vec::new();
    mesh.visit_triangles(|tri| {
        let a = point_id(&mut builder, tri[0].position);
        let b = point_id(&mut builder, tri[1].position);
        let c = point_id(&mut builder, tri[2].position);
        let poly_loop = builder.add(format!("POLY_LOOP('',(#{a},#{b},#{c}))"));
        face_ids.push(builder.add(format!("FACE_OUTER_BOUND('',#{poly_loop},.T.)")));
    });
    let face_list: Vec<String> = face_ids.iter().map(|id| format!("#{id}")).collect();
    let shell = builder.add(format!("CLOSED_SHELL('',({}))", face_list.join(",")));
    builder.add(format!("MANIFOLD_SOLID_BREP('{}',#{shell})", config.part_label()));

    builder.finish(config, "PlateCAD")
}

/// Minimal but syntactically valid STEP document built from the raw
/// configuration: metadata comments, the shared property records, and
/// synthetic numbered geometry records.
pub fn fallback_step_string(config: &PartConfig) -> String {
    let mut builder = StepBuilder::new();
    product_entities(&mut builder, config);

    builder.raw(format!("/* Material: {} */", config.material));
    builder.raw(format!("/* Width: {} mm */", config.width));
    builder.raw(format!("/* Height: {} mm */", config.height));
    builder.raw(format!("/* Thickness: {} mm */", config.thickness));
    builder.raw(format!("/* Holes: {} */", config.holes.len()));

    builder.cartesian_point(Point3::new(0.0, 0.0, 0.0));
    builder.direction(0.0, 0.0, 1.0);
    builder.direction(1.0, 0.0, 0.0);
    builder.cartesian_point(Point3::new(config.width, config.height, config.thickness));

    for hole in &config.holes {
        let center = builder.cartesian_point(Point3::new(hole.x, hole.y, 0.0));
        builder.add(format!("CIRCLE('',#{center},{})", step_real(hole.diameter / 2.0)));
    }

    builder.finish(config, FALLBACK_MARKER)
}

pub fn write_kernel_step(
    config: &PartConfig,
    solid: &Solid,
    mesh: &TriMesh,
    path: &Path,
) -> Result<(), GenerateError> {
    std::fs::write(path, kernel_step_string(config, solid, mesh))
        .map_err(|e| GenerateError::encoding(path, e))
}

pub fn write_fallback_step(config: &PartConfig, path: &Path) -> Result<(), GenerateError> {
    std::fs::write(path, fallback_step_string(config))
        .map_err(|e| GenerateError::encoding(path, e))
}
