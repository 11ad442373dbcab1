//! dent info command - display model statistics.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use dent_mesh::Mesh;
use dent_model::ModelInfo;
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct InfoReport<'a> {
    path: String,
    #[serde(flatten)]
    info: &'a ModelInfo,
}

pub fn run(input: &Path, cli: &Cli) -> Result<()> {
    let mesh = Mesh::load(input).with_context(|| format!("Failed to load mesh from {:?}", input))?;
    let info = ModelInfo::from_mesh(&mesh)?;

    match cli.format {
        OutputFormat::Json => output::print(
            &InfoReport {
                path: input.display().to_string(),
                info: &info,
            },
            cli.format,
            cli.quiet,
        )?,
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Model Information".bold().underline());
                println!("  {}: {}", "File".cyan(), input.display());
                println!("  {}: {}", "Vertices".cyan(), info.vertices);
                println!("  {}: {}", "Faces".cyan(), info.faces);
                println!(
                    "  {}: {}",
                    "Watertight".cyan(),
                    if info.watertight { "yes".green() } else { "no".yellow() }
                );

                if let Some(b) = &info.bounds {
                    let [sx, sy, sz] = b.size();
                    println!("  {}: {:.2} x {:.2} x {:.2} mm", "Dimensions".cyan(), sx, sy, sz);
                    println!(
                        "  {}: ({:.2}, {:.2}, {:.2})",
                        "Min bounds".cyan(),
                        b.min[0],
                        b.min[1],
                        b.min[2]
                    );
                    println!(
                        "  {}: ({:.2}, {:.2}, {:.2})",
                        "Max bounds".cyan(),
                        b.max[0],
                        b.max[1],
                        b.max[2]
                    );
                }

                match info.volume {
                    Some(vol) => println!("  {}: {:.2} mm³", "Volume".cyan(), vol),
                    None => println!("  {}: n/a (open mesh)", "Volume".cyan()),
                }
                println!("  {}: {:.2} mm²", "Surface area".cyan(), info.surface_area);
            }
        }
    }

    Ok(())
}
