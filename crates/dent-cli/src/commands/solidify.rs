//! dent solidify command - close an open scan into a solid with walls.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use dent_mesh::Mesh;
use dent_model::{SolidifyBuilder, SolidifyStats};
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct SolidifyResult<'a> {
    input: String,
    output: String,
    #[serde(flatten)]
    stats: &'a SolidifyStats,
}

pub fn run(input: &Path, output_path: &Path, thickness: Option<f64>, cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    let mesh = Mesh::load(input).with_context(|| format!("Failed to load mesh from {:?}", input))?;

    let mut builder = SolidifyBuilder::new(&mesh).with_params(config.solidify);
    if let Some(mm) = thickness {
        builder = builder.thickness(mm);
    }

    output::info(
        &format!("Solidifying with {:.2}mm walls...", builder.params().thickness),
        cli.format,
        cli.quiet,
    );

    let solid = builder.build()?;

    solid
        .mesh
        .save(output_path)
        .with_context(|| format!("Failed to save solid mesh to {:?}", output_path))?;

    let stats = &solid.stats;
    match cli.format {
        OutputFormat::Json => output::print(
            &SolidifyResult {
                input: input.display().to_string(),
                output: output_path.display().to_string(),
                stats,
            },
            cli.format,
            cli.quiet,
        )?,
        OutputFormat::Text => {
            if let Some(reason) = &stats.fallback_reason {
                output::warning(
                    &format!("Boundary stitching skipped, result is open: {}", reason),
                    cli.format,
                    cli.quiet,
                );
            }
            output::success(
                &format!("Saved solid to {}", output_path.display()),
                cli.format,
                cli.quiet,
            );
            if !cli.quiet {
                println!("  {}: {}", "Input faces".cyan(), stats.input_faces);
                println!(
                    "  {}: {} outer + {} inner + {} stitch",
                    "Faces".cyan(),
                    stats.outer_faces,
                    stats.inner_faces,
                    stats.stitch_faces
                );
                println!(
                    "  {}: {} loop(s), {} edges",
                    "Boundary".cyan(),
                    stats.boundary_loops,
                    stats.boundary_edges
                );
                println!(
                    "  {}: {}",
                    "Watertight".cyan(),
                    if stats.watertight { "yes".green() } else { "no".yellow() }
                );
            }
        }
    }

    Ok(())
}
