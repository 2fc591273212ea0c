// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use sakura::connectivity::leader_assignments;
use sakura::loaders::{read_joins, read_stations};
use sakura::rail_graph::build_rail_graph;
use sakura::registries::StationRegistry;

/// Build the full station graph and print the connected-component
/// assignment (station_cd,leader) as CSV on stdout.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the station master CSV
    station_file: PathBuf,

    /// Path to the join master CSV
    join_file: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let stations = read_stations(&args.station_file)?;
    let registry = StationRegistry::new(&stations);
    let joins = read_joins(&args.join_file)?;
    info!(
        "loaded {} stations and {} joins",
        stations.len(),
        joins.len()
    );

    let graph = build_rail_graph(&registry, &joins, |_| true);
    info!(
        "graph has {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let assignments = leader_assignments(&graph)?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "station_cd,leader")?;
    for (station_code, leader_code) in assignments {
        writeln!(out, "{station_code},{leader_code}")?;
    }
    out.flush()?;

    Ok(())
}
