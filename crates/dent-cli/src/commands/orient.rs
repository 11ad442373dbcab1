//! dent orient command - rotate a model by preset or explicit angles.

use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use dent_mesh::Mesh;
use dent_model::OrientationRequest;
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct OrientResult {
    input: String,
    output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    preset: Option<String>,
    rotation: [f64; 3],
    vertices: usize,
    faces: usize,
}

pub fn run(
    input: &Path,
    output_path: &Path,
    preset: Option<&str>,
    rotation: Option<&[f64]>,
    cli: &Cli,
) -> Result<()> {
    let config = cli.load_config()?;

    let rotation = match rotation {
        Some(&[x, y, z]) => Some([x, y, z]),
        Some(values) => bail!("--rotation takes three values X,Y,Z, got {}", values.len()),
        None => None,
    };
    let request = OrientationRequest {
        preset: preset.map(str::to_string),
        rotation,
    };

    let mut mesh = Mesh::load(input).with_context(|| format!("Failed to load mesh from {:?}", input))?;

    if preset.is_some_and(|name| config.presets.get(name).is_none()) && rotation.is_some() {
        output::warning(
            "Unknown preset, using the explicit rotation instead",
            cli.format,
            cli.quiet,
        );
    }

    let degrees = dent_model::orient(&mut mesh, &request, &config.presets)?;

    mesh.save(output_path)
        .with_context(|| format!("Failed to save mesh to {:?}", output_path))?;

    let result = OrientResult {
        input: input.display().to_string(),
        output: output_path.display().to_string(),
        preset: preset.filter(|name| config.presets.get(name).is_some()).map(str::to_string),
        rotation: degrees,
        vertices: mesh.vertex_count(),
        faces: mesh.face_count(),
    };

    match cli.format {
        OutputFormat::Json => output::print(&result, cli.format, cli.quiet)?,
        OutputFormat::Text => {
            output::success(
                &format!(
                    "Rotated by ({:.1}, {:.1}, {:.1})° and saved to {}",
                    degrees[0],
                    degrees[1],
                    degrees[2],
                    output_path.display()
                ),
                cli.format,
                cli.quiet,
            );
            if let Some(name) = &result.preset {
                output::info(&format!("  {}: {}", "Preset".cyan(), name), cli.format, cli.quiet);
            }
        }
    }

    Ok(())
}
