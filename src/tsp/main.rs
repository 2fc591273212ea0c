// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use sakura::export::{write_next_hop_matrix, write_node_table, write_solver_matrix};
use sakura::loaders::{read_groups, read_joins, read_stations};
use sakura::rail_graph::build_rail_graph;
use sakura::registries::{GroupRegistry, StationRegistry};
use sakura::routing::all_pairs_next_hops;

/// Build the graph restricted to the anchor station's connected component,
/// run the all-pairs next-hop engine over it, and persist the routing
/// artifacts for the external solver.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the station master CSV
    station_file: PathBuf,

    /// Path to the join master CSV
    join_file: PathBuf,

    /// Path to the component assignment CSV (station_cd,leader) produced by
    /// the group tool
    group_file: PathBuf,

    /// Directory receiving shortest_path.csv, node.csv and railway.tsp
    output_dir: PathBuf,

    /// Station code anchoring the accepted component (Tokyo by default)
    #[arg(long, default_value_t = 1130101)]
    anchor: i32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let stations = read_stations(&args.station_file)?;
    let registry = StationRegistry::new(&stations);
    let joins = read_joins(&args.join_file)?;
    let groups = GroupRegistry::new(&read_groups(&args.group_file)?);
    info!(
        "loaded {} stations and {} joins",
        stations.len(),
        joins.len()
    );

    let anchor = args.anchor;
    let graph = build_rail_graph(&registry, &joins, |station| {
        groups.is_same(station.station_code, anchor)
    });
    info!(
        "restricted graph has {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let table = all_pairs_next_hops(&graph, &registry)?;
    info!("computed {0} x {0} routing table", table.node_count());

    write_next_hop_matrix(&args.output_dir.join("shortest_path.csv"), &table)?;
    write_node_table(&args.output_dir.join("node.csv"), graph.arena())?;
    write_solver_matrix(&args.output_dir.join("railway.tsp"), &table)?;
    info!("routing artifacts written to {}", args.output_dir.display());

    Ok(())
}
