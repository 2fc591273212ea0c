//! Text artifacts persisted by the routing pipeline: the next-hop matrix,
//! the node table, and the solver input matrix in TSPLIB dialect.
//!
//! Row formatting is fanned out over rayon workers (one worker per row) and
//! the finished lines are concatenated in row order, so file contents are
//! deterministic regardless of completion order. All writes happen after the
//! compute phase.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::rail_graph::NodeArena;
use crate::routing::RoutingTable;

/// One line per origin node: the next-hop node id toward every destination,
/// each value followed by a comma. Row = origin, column = destination; the
/// loader in `loaders` consumes the same orientation.
pub fn format_next_hop_rows(table: &RoutingTable) -> Vec<String> {
    table
        .next_hop
        .par_iter()
        .map(|row| {
            let mut line = String::with_capacity(row.len() * 4);
            for next in row {
                line.push_str(&next.to_string());
                line.push(',');
            }
            line
        })
        .collect()
}

pub fn write_next_hop_matrix(path: &Path, table: &RoutingTable) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for line in format_next_hop_rows(table) {
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

/// `node_id,station_cd` header plus one row per node in ascending id order.
pub fn write_node_table(path: &Path, arena: &NodeArena) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "node_id,station_cd")?;
    for node in arena.iter() {
        writeln!(writer, "{},{}", node.node_id, node.station_code)?;
    }
    Ok(())
}

/// Integer matrix rows for the solver: nearest-integer kilometers, `-1` for
/// unreachable pairs, every value followed by a single space.
pub fn format_solver_rows(table: &RoutingTable) -> Vec<String> {
    table
        .dist
        .par_iter()
        .map(|row| {
            let mut line = String::with_capacity(row.len() * 4);
            for distance in row {
                if distance.is_infinite() {
                    line.push_str("-1 ");
                } else {
                    line.push_str(&(distance.round() as i64).to_string());
                    line.push(' ');
                }
            }
            line
        })
        .collect()
}

/// TSPLIB EXPLICIT / FULL_MATRIX problem file. The matrix section is packed
/// row-major with no line break between rows, terminated by `EOF`.
pub fn write_solver_matrix(path: &Path, table: &RoutingTable) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "NAME : railway")?;
    writeln!(writer, "COMMENT : Japanese railway problem")?;
    writeln!(writer, "TYPE : tsp")?;
    writeln!(writer, "DIMENSION : {}", table.node_count())?;
    writeln!(writer, "EDGE_WEIGHT_TYPE : EXPLICIT")?;
    writeln!(writer, "EDGE_WEIGHT_FORMAT : FULL_MATRIX")?;
    writeln!(writer, "EDGE_WEIGHT_SECTION")?;
    for line in format_solver_rows(table) {
        write!(writer, "{line}")?;
    }
    writeln!(writer)?;
    writeln!(writer, "EOF")?;
    Ok(())
}
