//! Connected-component partition of the station graph.

use anyhow::{Context, Result};

use crate::rail_graph::RailGraph;

/// Union-Find (Disjoint Set Union) for O(n α(n)) connected component detection
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]); // Path compression
        }
        self.parent[x]
    }

    pub fn union(&mut self, x: usize, y: usize) {
        let px = self.find(x);
        let py = self.find(y);
        if px == py {
            return;
        }
        // Union by rank
        if self.rank[px] < self.rank[py] {
            self.parent[px] = py;
        } else if self.rank[px] > self.rank[py] {
            self.parent[py] = px;
        } else {
            self.parent[py] = px;
            self.rank[px] += 1;
        }
    }
}

/// For every node id, the representative node id of its connected component.
/// Two nodes share a leader iff some path of graph edges connects them; the
/// specific leader is an arbitrary but deterministic member of the component
/// for a fixed edge iteration order.
pub fn component_leaders(graph: &RailGraph) -> Vec<u32> {
    let n = graph.node_count();
    let mut dsu = UnionFind::new(n);
    for (from, to) in graph.edges() {
        dsu.union(from as usize, to as usize);
    }
    (0..n).map(|id| dsu.find(id) as u32).collect()
}

/// The persisted connectivity assignment: one (station code, leader station
/// code) pair per node, in ascending node-id order.
pub fn leader_assignments(graph: &RailGraph) -> Result<Vec<(i32, i32)>> {
    let leaders = component_leaders(graph);
    let mut rows = Vec::with_capacity(leaders.len());
    for (node_id, leader_id) in leaders.iter().enumerate() {
        let station_code = graph
            .arena()
            .get(node_id as u32)
            .with_context(|| format!("node {node_id} missing from arena"))?
            .station_code;
        let leader_code = graph
            .arena()
            .get(*leader_id)
            .with_context(|| format!("leader node {leader_id} missing from arena"))?
            .station_code;
        rows.push((station_code, leader_code));
    }
    Ok(rows)
}
