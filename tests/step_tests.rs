use platecad::build::{GenerationStrategy, KernelStrategy};
use platecad::config::{Hole, Material, PartConfig};
use platecad::io::step::{
    fallback_step_string, kernel_step_string, FALLBACK_MARKER, STEP_FOOTER_TOKEN,
    STEP_HEADER_TOKEN,
};

fn plate_with_holes() -> PartConfig {
    PartConfig {
        width: 440.0,
        height: 220.0,
        thickness: 5.0,
        material: Material::Pp,
        holes: vec![
            Hole::new("h1", 40.0, 40.0, 8.5),
            Hole::new("h2", 400.0, 180.0, 8.5),
        ],
        ..PartConfig::default()
    }
}

#[test]
fn fallback_step_is_a_recoverable_template() {
    let step = fallback_step_string(&plate_with_holes());

    assert!(step.starts_with(STEP_HEADER_TOKEN));
    assert!(step.contains(STEP_FOOTER_TOKEN));
    assert!(step.contains("FILE_SCHEMA(('AUTOMOTIVE_DESIGN'));"));
    assert!(step.contains(FALLBACK_MARKER));

    // numeric content recoverable from plain text
    assert!(step.contains("/* Material: PP */"));
    assert!(step.contains("/* Width: 440 mm */"));
    assert!(step.contains("CARTESIAN_POINT('',(440.,220.,5.))"));
    assert!(step.contains("PROPERTY_DEFINITION('width','440'"));
    assert!(step.contains("PROPERTY_DEFINITION('hole_count','2'"));

    // one circle record per hole, radius not diameter
    assert_eq!(step.matches("CIRCLE('',").count(), 2);
    assert!(step.contains(",4.25)"));
}

#[test]
fn fallback_step_carries_the_part_label() {
    let step = fallback_step_string(&PartConfig::default());
    assert!(step.contains("PRODUCT('PlasticPart_PE_500'"));
}

#[test]
fn kernel_step_serializes_a_closed_brep_with_hole_surfaces() {
    let config = plate_with_holes();
    let strategy = KernelStrategy;
    let solid = strategy.build(&config).unwrap();
    let mesh = solid.tessellate().unwrap();
    let step = kernel_step_string(&config, &solid, &mesh);

    assert!(step.starts_with(STEP_HEADER_TOKEN));
    assert!(step.contains(STEP_FOOTER_TOKEN));
    assert!(!step.contains(FALLBACK_MARKER));

    assert_eq!(step.matches("CYLINDRICAL_SURFACE").count(), 2);
    assert_eq!(step.matches("MANIFOLD_SOLID_BREP").count(), 1);
    assert_eq!(step.matches("CLOSED_SHELL").count(), 1);
    assert!(step.matches("POLY_LOOP").count() >= 12);

    // rectangle holes keep the input frame in the cylinder placements
    assert!(step.contains("CARTESIAN_POINT('',(40.,40.,0.))"));
}

#[test]
fn kernel_step_shares_vertex_points_between_faces() {
    let config = PartConfig::default();
    let strategy = KernelStrategy;
    let solid = strategy.build(&config).unwrap();
    let mesh = solid.tessellate().unwrap();
    let step = kernel_step_string(&config, &solid, &mesh);

    // a plain box has 8 distinct corners, not 36 triangle vertices
    assert_eq!(step.matches("CARTESIAN_POINT").count(), 8);
}
