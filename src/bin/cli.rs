// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! csgvr CLI

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use csgvr::geometry::{analyze, BooleanOp, Color, Primitive};
use csgvr::{io, BooleanModeller, CsgConfig};
use nalgebra::Vector3;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "csgvr")]
#[command(about = "Polyhedral CSG boolean engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print the inputs before running
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Combine two primitive shapes
    Boolean {
        /// Operation: union, difference or intersection
        op: BooleanOp,

        /// First shape, e.g. cube:1, sphere:0.7:24, cylinder:2:0.5, cone:2:1:0
        a: Primitive,

        /// Second shape
        b: Primitive,

        /// Translation applied to the second shape (x,y,z)
        #[arg(long, value_name = "X,Y,Z", allow_hyphen_values = true)]
        offset: Option<String>,

        /// Write the result as binary STL
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print statistics as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Engine configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for ray perturbation
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Write it to a file instead
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Boolean {
            op,
            a,
            b,
            offset,
            output,
            json,
            config,
            seed,
        } => {
            let mut config = match config {
                Some(path) => CsgConfig::from_file(path)?,
                None => CsgConfig::load()?,
            };
            if seed.is_some() {
                config.seed = seed;
            }
            let offset = offset.as_deref().map(parse_offset).transpose()?;
            boolean_command(op, &a, &b, offset, output, json, &config, cli.verbose)?;
        }
        Commands::Config { output } => {
            let config = CsgConfig::load()?;
            match output {
                Some(path) => {
                    config.save(&path)?;
                    println!("{} Wrote {}", "✓".green(), path.display());
                }
                None => print!("{}", toml::to_string_pretty(&config)?),
            }
        }
        Commands::Version => {
            println!("csgvr v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn boolean_command(
    op: BooleanOp,
    a: &Primitive,
    b: &Primitive,
    offset: Option<Vector3<f64>>,
    output: Option<PathBuf>,
    json: bool,
    config: &CsgConfig,
    verbose: bool,
) -> Result<()> {
    let mesh_a = a.to_mesh_with_color(Color::SKY);
    let mut mesh_b = b.to_mesh_with_color(Color::WHITE);
    if let Some(offset) = offset {
        mesh_b.translate(offset);
    }

    if verbose {
        println!(
            "{} {} ({} triangles) {} {} ({} triangles)",
            "ℹ".bright_blue(),
            format!("{a:?}").bold(),
            mesh_a.triangle_count(),
            op.to_string().cyan(),
            format!("{b:?}").bold(),
            mesh_b.triangle_count()
        );
    }

    let start = std::time::Instant::now();
    let modeller = BooleanModeller::new(&mesh_a, &mesh_b, config).with_context(|| format!("{op} failed"))?;
    let result = modeller.apply(op);
    let elapsed = start.elapsed();

    if modeller.is_partial() {
        eprintln!(
            "{} Result may be incomplete: splitting hit the growth limit or a ray kept grazing faces",
            "⚠".yellow()
        );
    }

    let stats = analyze(&result);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        stats.print();
        println!("{} {} in {:.2?}", "✓".green(), op, elapsed);
    }

    if let Some(path) = output {
        io::export_stl(&result, &path)?;
        println!("{} Wrote {}", "✓".green(), path.display());
    }

    Ok(())
}

fn parse_offset(value: &str) -> Result<Vector3<f64>> {
    let parts = value
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("invalid offset '{value}'"))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(anyhow!("offset needs three components, got '{value}'")),
    }
}
