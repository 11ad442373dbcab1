//! dent presets command - list orientation presets.

use anyhow::Result;
use colored::Colorize;

use crate::{Cli, OutputFormat, output};

pub fn run(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;

    match cli.format {
        // Serializes as an ordered name -> [x, y, z] object.
        OutputFormat::Json => output::print(&config.presets, cli.format, cli.quiet)?,
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Orientation Presets (degrees X, Y, Z)".bold().underline());
                for (name, [x, y, z]) in config.presets.iter() {
                    println!("  {:<14} {:>7.1} {:>7.1} {:>7.1}", name.cyan(), x, y, z);
                }
            }
        }
    }

    Ok(())
}
