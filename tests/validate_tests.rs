use platecad::config::{Hole, Material, PartConfig};
use platecad::io::step::write_fallback_step;
use platecad::validate::validate_step;
use platecad::Real;

#[test]
fn missing_file_is_invalid_with_zero_size() {
    let dir = tempfile::tempdir().unwrap();
    let report = validate_step(&dir.path().join("nope.step"), &PartConfig::default());

    assert!(!report.valid);
    assert_eq!(report.errors, vec!["STEP file does not exist".to_string()]);
    assert_eq!(report.message, "File not found");
    assert_eq!(report.file_size, 0);
}

#[test]
fn zero_byte_file_reports_empty_plus_structure_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.step");
    std::fs::write(&path, "").unwrap();

    let report = validate_step(&path, &PartConfig::default());
    assert!(!report.valid);
    assert_eq!(report.file_size, 0);
    assert!(report.errors.contains(&"STEP file is empty (0 bytes)".to_string()));
    assert_eq!(report.message, format!("Invalid STEP file: {} error(s)", report.errors.len()));
}

#[test]
fn truncated_file_is_too_small() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiny.step");
    std::fs::write(&path, "ISO-10303-21;").unwrap();

    let report = validate_step(&path, &PartConfig::default());
    assert!(!report.valid);
    assert!(report.errors.iter().any(|e| e.contains("too small")));
    assert!(report.errors.iter().any(|e| e.contains("END-ISO-10303-21")));
}

#[test]
fn fallback_output_round_trips_clean() {
    let config = PartConfig {
        width: 440.0,
        height: 220.0,
        thickness: 5.0,
        material: Material::Pp,
        holes: vec![Hole::new("h1", 40.0, 40.0, 8.5)],
        ..PartConfig::default()
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plate.step");
    write_fallback_step(&config, &path).unwrap();

    let report = validate_step(&path, &config);
    assert!(report.valid, "unexpected errors: {:?}", report.errors);
    assert!(report.errors.is_empty());
    assert!(report.warnings.is_empty(), "unexpected warnings: {:?}", report.warnings);
    assert_eq!(report.message, format!("Valid STEP file ({} bytes)", report.file_size));
}

#[test]
fn material_warning_fires_only_for_fallback_marked_files() {
    let config = PartConfig { material: Material::Pom, ..PartConfig::default() };
    let body = "X".repeat(200);

    let dir = tempfile::tempdir().unwrap();

    // fallback-marked file without the material string warns
    let marked = dir.path().join("marked.step");
    std::fs::write(
        &marked,
        format!("ISO-10303-21;\n/* PlateCAD Fallback 100 5 */\n{body}\nEND-ISO-10303-21;\n"),
    )
    .unwrap();
    let report = validate_step(&marked, &config);
    assert!(report.valid);
    assert!(report.warnings.iter().any(|w| w.contains("Material \"POM\"")));

    // the same content without the marker does not
    let unmarked = dir.path().join("unmarked.step");
    std::fs::write(
        &unmarked,
        format!("ISO-10303-21;\n/* kernel 100 5 */\n{body}\nEND-ISO-10303-21;\n"),
    )
    .unwrap();
    let report = validate_step(&unmarked, &config);
    assert!(!report.warnings.iter().any(|w| w.contains("Material")));
}

#[test]
fn unreferenced_dimensions_warn_without_invalidating() {
    let config = PartConfig { width: 437.0, height: 213.0, ..PartConfig::default() };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dims.step");
    std::fs::write(
        &path,
        format!("ISO-10303-21;\n{}\nthickness 5mm\nEND-ISO-10303-21;\n", "Y".repeat(150)),
    )
    .unwrap();

    let report = validate_step(&path, &config);
    assert!(report.valid);
    assert!(report
        .warnings
        .contains(&"Width dimension (437mm) not clearly referenced".to_string()));
    assert!(report
        .warnings
        .contains(&"Height dimension (213mm) not clearly referenced".to_string()));
    assert!(!report.warnings.iter().any(|w| w.starts_with("Thickness")));
    assert_eq!(
        report.message,
        format!("Valid STEP file ({} bytes) with 2 warning(s)", report.file_size)
    );
}

#[test]
fn hole_warning_when_no_circular_evidence_exists() {
    let holes: Vec<Hole> = (0..7)
        .map(|i| Hole::new(format!("h{i}"), 40.0 + 5.0 * Real::from(i), 40.0, 8.0))
        .collect();
    let config = PartConfig { holes, ..PartConfig::default() };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("holes.step");
    // dimensions referenced so only the hole warning remains
    std::fs::write(
        &path,
        format!("ISO-10303-21;\nwidth 100mm height 100mm thick 5mm\n{}\nEND-ISO-10303-21;\n", "Z".repeat(150)),
    )
    .unwrap();

    let report = validate_step(&path, &config);
    assert!(report
        .warnings
        .contains(&"Expected 7 holes but no cylindrical surfaces found".to_string()));
}
