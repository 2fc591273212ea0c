// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_derive::Serialize;
use tracing::info;

use sakura::loaders::{read_next_hop_matrix, read_nodes, read_stations, read_tour};
use sakura::registries::StationRegistry;
use sakura::tour_expansion::{NodeTable, expand_tour};

/// Expand a coarse solver tour into the full ordered station sequence and
/// print it as JSON on stdout.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the station master CSV
    station_file: PathBuf,

    /// Path to the node table (node.csv) from the routing run
    node_file: PathBuf,

    /// Path to the solver's tour output
    tour_file: PathBuf,

    /// Path to the next-hop matrix (shortest_path.csv) from the routing run
    path_file: PathBuf,
}

#[derive(Serialize)]
struct TourStop {
    station_code: i32,
}

#[derive(Serialize)]
struct TourDump {
    tour: Vec<TourStop>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let stations = read_stations(&args.station_file)?;
    let registry = StationRegistry::new(&stations);
    let nodes = read_nodes(&args.node_file)?;
    let node_table = NodeTable::new(&nodes);
    let tour = read_tour(&args.tour_file)?;
    let next_hops = read_next_hop_matrix(&args.path_file)?;
    info!(
        "expanding a {}-stop coarse tour over {} nodes",
        tour.len(),
        node_table.len()
    );

    let sequence = expand_tour(&tour, &node_table, &next_hops)?;

    let mut stops = Vec::with_capacity(sequence.len());
    for station_code in sequence {
        // The station master must cover every code in the node table; a gap
        // means the inputs were not produced together.
        let station = registry
            .get(station_code)
            .with_context(|| format!("station {station_code} missing from master"))?;
        stops.push(TourStop {
            station_code: station.station_code,
        });
    }

    let dump = TourDump { tour: stops };
    println!("{}", serde_json::to_string(&dump)?);

    Ok(())
}
