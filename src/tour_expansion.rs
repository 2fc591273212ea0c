//! Expansion of a coarse solver tour into the full station sequence.

use ahash::AHashMap;
use thiserror::Error;

use crate::models::Node;

/// Errors here mean the tour, node table and next-hop matrix were not
/// produced together; expansion aborts rather than emit a wrong tour.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TourExpansionError {
    #[error("tour references node {0} which is absent from the node table")]
    UnknownNode(u32),
    #[error("no next hop recorded from node {from} toward node {to}")]
    MissingNextHop { from: u32, to: u32 },
    #[error("walk from node {from} toward node {to} did not terminate")]
    InconsistentRoute { from: u32, to: u32 },
}

/// Persisted next-hop matrix, reloaded from a prior run.
/// Indexed `[origin][destination]`, the orientation the export writes.
pub struct NextHopTable {
    next: Vec<Vec<i32>>,
}

impl NextHopTable {
    pub fn from_rows(rows: Vec<Vec<i32>>) -> Self {
        Self { next: rows }
    }

    pub fn node_count(&self) -> usize {
        self.next.len()
    }

    /// Next node to step to from `from` toward `to`; `None` when either id
    /// is outside the matrix or no hop was recorded.
    pub fn next(&self, from: u32, to: u32) -> Option<i32> {
        let hop = *self.next.get(from as usize)?.get(to as usize)?;
        if hop < 0 { None } else { Some(hop) }
    }
}

/// Node table reloaded from a prior run's `node.csv`. Ids must match the run
/// that produced the next-hop matrix exactly.
pub struct NodeTable {
    station_by_id: AHashMap<u32, i32>,
}

impl NodeTable {
    pub fn new(nodes: &[Node]) -> Self {
        let station_by_id = nodes
            .iter()
            .map(|node| (node.node_id, node.station_code))
            .collect();
        Self { station_by_id }
    }

    pub fn station_code(&self, node_id: u32) -> Option<i32> {
        self.station_by_id.get(&node_id).copied()
    }

    pub fn len(&self) -> usize {
        self.station_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.station_by_id.is_empty()
    }
}

/// Walk the cyclic tour edge by edge and emit every station actually
/// traversed.
///
/// For each consecutive pair, including the wrap-around from the last stop
/// back to the first, the segment emits every node from its start up to but
/// excluding its end; the end is emitted as the first element of the next
/// segment. A walk longer than the node table itself means the table is
/// cyclic and the routing state inconsistent, which is fatal.
pub fn expand_tour(
    tour: &[u32],
    nodes: &NodeTable,
    table: &NextHopTable,
) -> Result<Vec<i32>, TourExpansionError> {
    let mut sequence = Vec::new();

    for (index, &start) in tour.iter().enumerate() {
        let target = tour[(index + 1) % tour.len()];
        let mut current = start;
        let mut steps = 0usize;

        while current != target {
            let station_code = nodes
                .station_code(current)
                .ok_or(TourExpansionError::UnknownNode(current))?;
            sequence.push(station_code);

            let next = table
                .next(current, target)
                .ok_or(TourExpansionError::MissingNextHop {
                    from: current,
                    to: target,
                })?;
            current = next as u32;

            steps += 1;
            if steps >= nodes.len() {
                return Err(TourExpansionError::InconsistentRoute {
                    from: start,
                    to: target,
                });
            }
        }
    }

    Ok(sequence)
}
