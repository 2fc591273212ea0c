// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use serde_derive::Serialize;

use sakura::loaders::read_lines;
use sakura::models::Line;

/// Dump the line master as JSON on stdout.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the line master CSV
    line_file: PathBuf,
}

#[derive(Serialize)]
struct LinesDump {
    lines: Vec<Line>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let lines = read_lines(&args.line_file)?;
    let dump = LinesDump { lines };
    println!("{}", serde_json::to_string(&dump)?);

    Ok(())
}
