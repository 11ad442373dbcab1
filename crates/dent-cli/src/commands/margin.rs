//! dent margin commands - detect, refine and export margin lines.
//!
//! Points travel between subcommands as JSON arrays of
//! `{"x", "y", "z", "confidence"}` objects.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use dent_mesh::Mesh;
use dent_model::{MarginPoint, detect_margin_detailed, export_pts, positions, pts_file_name, refine_margin};
use serde::Serialize;

use crate::{Cli, MarginCommands, OutputFormat, output};

#[derive(Serialize)]
struct DetectResult {
    input: String,
    output: String,
    points: usize,
    candidates: usize,
    filtered: usize,
    curvature_filtered: bool,
    threshold: f64,
}

#[derive(Serialize)]
struct RefineResult {
    input: String,
    output: String,
    points: usize,
    smoothness: f64,
}

#[derive(Serialize)]
struct ExportResult {
    input: String,
    output: String,
    points: usize,
    case: String,
    tooth: String,
}

pub fn run(command: &MarginCommands, cli: &Cli) -> Result<()> {
    match command {
        MarginCommands::Detect {
            input,
            output,
            height_offset,
            density,
            sensitivity,
        } => detect(input, output, *height_offset, *density, *sensitivity, cli),
        MarginCommands::Refine {
            input,
            output,
            smoothness,
        } => refine(input, output, *smoothness, cli),
        MarginCommands::Export {
            input,
            output,
            case,
            tooth,
        } => export(input, output.as_deref(), case, tooth, cli),
    }
}

fn detect(
    input: &Path,
    output_path: &Path,
    height_offset: Option<f64>,
    density: Option<usize>,
    sensitivity: Option<f64>,
    cli: &Cli,
) -> Result<()> {
    let mut params = cli.load_config()?.margin;
    if let Some(v) = height_offset {
        params.height_offset = v;
    }
    if let Some(v) = density {
        params.density = v;
    }
    if let Some(v) = sensitivity {
        params.sensitivity = v;
    }

    let mesh = Mesh::load(input).with_context(|| format!("Failed to load mesh from {:?}", input))?;
    let detection = detect_margin_detailed(&mesh, &params)?;
    write_points(output_path, &detection.points)?;

    if !detection.curvature_filtered {
        output::warning(
            "Candidate scoring failed, margin points are unfiltered",
            cli.format,
            cli.quiet,
        );
    }

    let result = DetectResult {
        input: input.display().to_string(),
        output: output_path.display().to_string(),
        points: detection.points.len(),
        candidates: detection.candidate_count,
        filtered: detection.filtered_count,
        curvature_filtered: detection.curvature_filtered,
        threshold: detection.threshold,
    };

    match cli.format {
        OutputFormat::Json => output::print(&result, cli.format, cli.quiet)?,
        OutputFormat::Text => {
            output::success(
                &format!("Detected {} margin points", result.points),
                cli.format,
                cli.quiet,
            );
            if !cli.quiet {
                println!("  {}: z > {:.3}", "Threshold".cyan(), result.threshold);
                println!(
                    "  {}: {} above threshold, {} kept",
                    "Candidates".cyan(),
                    result.candidates,
                    result.filtered
                );
                println!("  {}: {}", "Saved".cyan(), output_path.display());
            }
        }
    }

    Ok(())
}

fn refine(input: &Path, output_path: &Path, smoothness: Option<f64>, cli: &Cli) -> Result<()> {
    let mut params = cli.load_config()?.refine;
    if let Some(s) = smoothness {
        params.smoothness = s;
    }

    let points = read_points(input)?;
    let refined = refine_margin(&points, &params)?;
    write_points(output_path, &refined)?;

    let result = RefineResult {
        input: input.display().to_string(),
        output: output_path.display().to_string(),
        points: refined.len(),
        smoothness: params.smoothness,
    };

    match cli.format {
        OutputFormat::Json => output::print(&result, cli.format, cli.quiet)?,
        OutputFormat::Text => output::success(
            &format!(
                "Refined {} points (smoothness {}) to {}",
                result.points,
                result.smoothness,
                output_path.display()
            ),
            cli.format,
            cli.quiet,
        ),
    }

    Ok(())
}

fn export(input: &Path, output_path: Option<&Path>, case: &str, tooth: &str, cli: &Cli) -> Result<()> {
    let points = read_points(input)?;
    let document = export_pts(&positions(&points), case, tooth)?;

    let output_path = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(pts_file_name(case, tooth)));
    std::fs::write(&output_path, document)
        .with_context(|| format!("Failed to write PTS file {:?}", output_path))?;

    let result = ExportResult {
        input: input.display().to_string(),
        output: output_path.display().to_string(),
        points: points.len(),
        case: case.to_string(),
        tooth: tooth.to_string(),
    };

    match cli.format {
        OutputFormat::Json => output::print(&result, cli.format, cli.quiet)?,
        OutputFormat::Text => output::success(
            &format!("Exported {} points to {}", result.points, output_path.display()),
            cli.format,
            cli.quiet,
        ),
    }

    Ok(())
}

fn read_points(path: &Path) -> Result<Vec<MarginPoint>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read points from {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid points file {:?}", path))
}

fn write_points(path: &Path, points: &[MarginPoint]) -> Result<()> {
    let json = serde_json::to_string_pretty(points)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write points to {:?}", path))
}
