//! Undirected station graph: dense node ids over an owned arena, a
//! canonically ordered edge set, and the builder that derives both from the
//! join master plus per-group interchange cliques.

use std::collections::BTreeSet;

use ahash::{AHashMap, AHashSet};
use itertools::Itertools;

use crate::models::{Join, Node, Station};
use crate::registries::StationRegistry;

/// Owns the nodes. Ids are a contiguous range [0, N) in insertion order,
/// with exactly one node per participating station code.
#[derive(Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    id_by_station: AHashMap<i32, u32>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node for a station code not seen before and return its id.
    fn insert(&mut self, station_code: i32) -> u32 {
        debug_assert!(!self.id_by_station.contains_key(&station_code));
        let node_id = self.nodes.len() as u32;
        self.nodes.push(Node {
            node_id,
            station_code,
        });
        self.id_by_station.insert(station_code, node_id);
        node_id
    }

    pub fn get(&self, node_id: u32) -> Option<&Node> {
        self.nodes.get(node_id as usize)
    }

    pub fn id_for_station(&self, station_code: i32) -> Option<u32> {
        self.id_by_station.get(&station_code).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}

/// Undirected multigraph collapsed to a simple graph: parallel edges
/// deduplicate into the adjacency sets, the edge set stores each pair once
/// in (low, high) order, and self-loops are never stored.
pub struct RailGraph {
    arena: NodeArena,
    edges: BTreeSet<(u32, u32)>,
    adjacency: Vec<AHashSet<u32>>,
}

impl RailGraph {
    pub fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            edges: BTreeSet::new(),
            adjacency: Vec::new(),
        }
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Register a station as a graph vertex, allocating the next dense id.
    pub fn add_station_node(&mut self, station_code: i32) -> u32 {
        let node_id = self.arena.insert(station_code);
        self.adjacency.push(AHashSet::new());
        node_id
    }

    /// Idempotent undirected insertion. Self-loops are rejected.
    pub fn add_edge(&mut self, node1: u32, node2: u32) {
        if node1 == node2 {
            return;
        }
        debug_assert!((node1 as usize) < self.adjacency.len());
        debug_assert!((node2 as usize) < self.adjacency.len());
        self.adjacency[node1 as usize].insert(node2);
        self.adjacency[node2 as usize].insert(node1);

        let edge = (node1.min(node2), node1.max(node2));
        self.edges.insert(edge);
    }

    /// Neighbors of a valid node id.
    pub fn neighbors(&self, node_id: u32) -> &AHashSet<u32> {
        &self.adjacency[node_id as usize]
    }

    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edges.iter().copied()
    }
}

impl Default for RailGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the station graph from the join master.
///
/// Joins referencing a station code absent from the master are dropped.
/// `accept` gates which stations may become vertices: a join is skipped
/// entirely when a not-yet-seen endpoint is rejected (the unrestricted build
/// passes `|_| true`; the anchor-restricted build passes a component test).
/// Node ids are therefore a deterministic function of join order.
///
/// After the joins, every station group owning two or more vertices gets a
/// clique of interchange edges between its member nodes, modelling free
/// transfer inside one physical complex.
pub fn build_rail_graph<F>(registry: &StationRegistry, joins: &[Join], accept: F) -> RailGraph
where
    F: Fn(&Station) -> bool,
{
    let mut graph = RailGraph::new();

    for join in joins {
        let Some(station1) = registry.get(join.station_code1) else {
            continue;
        };
        let Some(station2) = registry.get(join.station_code2) else {
            continue;
        };

        let node1 = match graph.arena().id_for_station(station1.station_code) {
            Some(id) => id,
            None => {
                if !accept(station1) {
                    continue;
                }
                graph.add_station_node(station1.station_code)
            }
        };
        let node2 = match graph.arena().id_for_station(station2.station_code) {
            Some(id) => id,
            None => {
                if !accept(station2) {
                    continue;
                }
                graph.add_station_node(station2.station_code)
            }
        };

        graph.add_edge(node1, node2);
    }

    // Interchange cliques. Group codes are gathered from accepted stations
    // that made it into the graph, and walked in sorted order so edge
    // iteration stays reproducible.
    let mut group_codes: BTreeSet<i32> = BTreeSet::new();
    for station in registry.iter() {
        if graph.arena().id_for_station(station.station_code).is_none() {
            continue;
        }
        if !accept(station) {
            continue;
        }
        group_codes.insert(station.station_group_code);
    }

    for group_code in group_codes {
        let members = registry.in_group(group_code);
        if members.len() <= 1 {
            continue;
        }
        for (station1, station2) in members.iter().tuple_combinations() {
            let Some(node1) = graph.arena().id_for_station(station1.station_code) else {
                continue;
            };
            let Some(node2) = graph.arena().id_for_station(station2.station_code) else {
                continue;
            };
            graph.add_edge(node1, node2);
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(code: i32, group: i32) -> Station {
        Station {
            station_code: code,
            station_group_code: group,
            station_name: format!("station-{code}"),
            line_code: 1,
            prefecture_code: 13,
            post: String::new(),
            address: String::new(),
            lon: 0.0,
            lat: 0.0,
        }
    }

    fn join(code1: i32, code2: i32) -> Join {
        Join {
            line_code: 1,
            station_code1: code1,
            station_code2: code2,
        }
    }

    #[test]
    fn node_ids_are_dense_and_follow_join_order() {
        let stations = vec![station(30, 3), station(20, 2), station(10, 1)];
        let registry = StationRegistry::new(&stations);
        let joins = vec![join(20, 30), join(30, 10)];

        let graph = build_rail_graph(&registry, &joins, |_| true);

        assert_eq!(graph.node_count(), 3);
        // First-seen order while iterating joins, not station-file order.
        assert_eq!(graph.arena().id_for_station(20), Some(0));
        assert_eq!(graph.arena().id_for_station(30), Some(1));
        assert_eq!(graph.arena().id_for_station(10), Some(2));
        let ids: Vec<u32> = graph.arena().iter().map(|n| n.node_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn edge_insertion_is_idempotent_and_canonical() {
        let mut graph = RailGraph::new();
        let a = graph.add_station_node(100);
        let b = graph.add_station_node(200);

        graph.add_edge(a, b);
        graph.add_edge(b, a);
        graph.add_edge(a, b);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.neighbors(a).len(), 1);
        assert_eq!(graph.neighbors(b).len(), 1);
        assert_eq!(graph.edges().next(), Some((a.min(b), a.max(b))));
    }

    #[test]
    fn self_loops_are_rejected() {
        let mut graph = RailGraph::new();
        let a = graph.add_station_node(100);
        graph.add_edge(a, a);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.neighbors(a).is_empty());
    }

    #[test]
    fn joins_with_unknown_stations_are_dropped() {
        let stations = vec![station(1, 1), station(2, 2)];
        let registry = StationRegistry::new(&stations);
        let joins = vec![join(1, 999), join(999, 2), join(1, 2)];

        let graph = build_rail_graph(&registry, &joins, |_| true);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn station_group_becomes_interchange_clique() {
        // Three co-grouped stations with no direct joins between them; they
        // enter the graph through joins to outside stations.
        let stations = vec![
            station(1, 100),
            station(2, 100),
            station(3, 100),
            station(10, 200),
            station(11, 201),
            station(12, 202),
        ];
        let registry = StationRegistry::new(&stations);
        let joins = vec![join(1, 10), join(2, 11), join(3, 12)];

        let graph = build_rail_graph(&registry, &joins, |_| true);
        assert_eq!(graph.node_count(), 6);

        let n1 = graph.arena().id_for_station(1).unwrap();
        let n2 = graph.arena().id_for_station(2).unwrap();
        let n3 = graph.arena().id_for_station(3).unwrap();
        assert!(graph.neighbors(n1).contains(&n2));
        assert!(graph.neighbors(n1).contains(&n3));
        assert!(graph.neighbors(n2).contains(&n3));
        // 3 join edges + 3 clique edges
        assert_eq!(graph.edge_count(), 6);
    }

    #[test]
    fn restricted_build_skips_rejected_endpoints() {
        let stations = vec![station(1, 1), station(2, 2), station(3, 3)];
        let registry = StationRegistry::new(&stations);
        let joins = vec![join(1, 2), join(2, 3)];

        // Only stations 1 and 2 are inside the accepted component.
        let graph = build_rail_graph(&registry, &joins, |s| s.station_code != 3);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.arena().id_for_station(3).is_none());
    }
}
