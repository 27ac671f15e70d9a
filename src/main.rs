// main.rs
//
// Small demonstration driver: generate the artifact set for a few plate
// configurations into ./output. Pass a JSON file path to generate from
// your own configuration instead.

use platecad::{Engine, EngineConfig, Hole, PartConfig, PlateShape};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let engine = Engine::new(EngineConfig::from_env());
    let output = std::path::Path::new("output");

    if let Some(path) = std::env::args().nth(1) {
        let config: PartConfig = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        report(&engine, &config, output, "plate")?;
        return Ok(());
    }

    // Plain rectangle with two mounting holes.
    let rectangle = PartConfig {
        width: 440.0,
        height: 220.0,
        thickness: 8.0,
        corner_radius: 10.0,
        holes: vec![
            Hole::new("h1", 40.0, 40.0, 8.5),
            Hole::new("h2", 400.0, 40.0, 8.5),
        ],
        ..PartConfig::default()
    };
    report(&engine, &rectangle, output, "rectangle_440x220")?;

    // Circular blank, no holes.
    let disc = PartConfig {
        shape: PlateShape::Circle,
        width: 200.0,
        height: 200.0,
        thickness: 5.0,
        ..PartConfig::default()
    };
    report(&engine, &disc, output, "disc_200")?;

    Ok(())
}

fn report(
    engine: &Engine,
    config: &PartConfig,
    output: &std::path::Path,
    base: &str,
) -> Result<(), platecad::GenerateError> {
    let artifacts = engine.generate(config, output, base)?;
    println!("{base}:");
    println!("  step    {}", artifacts.step.display());
    println!("  drawing {}", artifacts.drawing.display());
    println!("  mesh    {}", artifacts.mesh.display());
    for preview in &artifacts.previews {
        println!("  preview {}", preview.display());
    }
    println!("  {}", artifacts.validation.message);
    Ok(())
}
