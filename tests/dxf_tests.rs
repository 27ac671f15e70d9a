use platecad::config::{Hole, PartConfig, PlateShape};
use platecad::io::dxf::{drawing_string, HOLE_LAYER, OUTLINE_LAYER};

fn occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn sharp_rectangle_is_one_closed_polyline_with_four_vertices() {
    let config = PartConfig { width: 440.0, height: 220.0, ..PartConfig::default() };
    let dxf = drawing_string(&config, false);

    assert_eq!(occurrences(&dxf, "LWPOLYLINE"), 1);
    // vertex count tag then the closed flag
    assert!(dxf.contains(" 90\n4\n 70\n1\n"));
    // corners in the input frame
    assert!(dxf.contains(" 10\n0\n 20\n0\n"));
    assert!(dxf.contains(" 10\n440\n 20\n220\n"));
}

#[test]
fn rounded_rectangle_uses_four_lines_and_four_arcs() {
    let config = PartConfig {
        width: 200.0,
        height: 100.0,
        corner_radius: 10.0,
        ..PartConfig::default()
    };
    let dxf = drawing_string(&config, false);

    assert_eq!(occurrences(&dxf, "\nARC\n"), 4);
    assert_eq!(occurrences(&dxf, "\nLINE\n"), 4);
    assert_eq!(occurrences(&dxf, "LWPOLYLINE"), 0);

    // quarter-arc angle pairs, counter-clockwise from the bottom-right corner
    assert!(dxf.contains(" 50\n270\n 51\n0\n"));
    assert!(dxf.contains(" 50\n0\n 51\n90\n"));
    assert!(dxf.contains(" 50\n90\n 51\n180\n"));
    assert!(dxf.contains(" 50\n180\n 51\n270\n"));
}

#[test]
fn corner_radius_is_clamped_to_half_the_short_side() {
    let config = PartConfig {
        width: 200.0,
        height: 100.0,
        corner_radius: 500.0,
        ..PartConfig::default()
    };
    let dxf = drawing_string(&config, false);
    // arc radius tag carries the clamped value
    assert!(dxf.contains(" 40\n50\n"));
    assert!(!dxf.contains(" 40\n500\n"));
}

#[test]
fn holes_stay_in_the_input_frame_on_their_own_layer() {
    let config = PartConfig {
        width: 400.0,
        height: 200.0,
        holes: vec![Hole::new("h1", 150.0, 120.0, 8.5)],
        ..PartConfig::default()
    };
    let dxf = drawing_string(&config, false);
    let expected = format!("  0\nCIRCLE\n  8\n{HOLE_LAYER}\n 10\n150\n 20\n120\n 40\n4.25\n");
    assert!(dxf.contains(&expected), "missing hole circle entity:\n{dxf}");
}

#[test]
fn circle_plate_is_a_single_circle_centered_in_the_frame() {
    let config = PartConfig {
        shape: PlateShape::Circle,
        width: 200.0,
        height: 200.0,
        ..PartConfig::default()
    };
    let dxf = drawing_string(&config, false);
    let expected = format!("  0\nCIRCLE\n  8\n{OUTLINE_LAYER}\n 10\n100\n 20\n100\n 40\n100\n");
    assert!(dxf.contains(&expected));
}

#[test]
fn custom_outline_with_too_few_points_degrades_to_the_rectangle() {
    let config = PartConfig {
        shape: PlateShape::Custom,
        custom_points: vec![[0.0, 0.0], [50.0, 50.0]],
        ..PartConfig::default()
    };
    let dxf = drawing_string(&config, false);
    assert!(dxf.contains(" 90\n4\n"));
}

#[test]
fn vendor_comment_block_appears_only_when_requested() {
    let config = PartConfig {
        color: Some("black".to_string()),
        assembly_details: Some("M8 inserts".to_string()),
        ..PartConfig::default()
    };

    let plain = drawing_string(&config, false);
    assert!(!plain.contains("999"));

    let annotated = drawing_string(&config, true);
    assert!(annotated.contains("999\nMaterial: PE 500\n"));
    assert!(annotated.contains("999\nDimensions: 100x100x5 mm\n"));
    assert!(annotated.contains("999\nColor: black\n"));
    assert!(annotated.contains("999\nAssemblyDetails: M8 inserts\n"));
}

#[test]
fn drawing_declares_millimeters_and_both_layers() {
    let dxf = drawing_string(&PartConfig::default(), false);
    assert!(dxf.contains("$ACADVER"));
    assert!(dxf.contains("AC1015"));
    assert!(dxf.contains("$INSUNITS\n 70\n4\n"));
    assert!(dxf.contains(OUTLINE_LAYER));
    assert!(dxf.contains(HOLE_LAYER));
    assert!(dxf.ends_with("  0\nEOF\n"));
}
