//! All-pairs shortest-path / next-hop engine.
//!
//! One Dijkstra sweep per root node, fanned out over rayon workers. Each
//! sweep owns the distance row and predecessor column for its root, so the
//! parallel phase needs no locking; rows are assembled in index order
//! afterwards.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use anyhow::{Context, Result};
use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::geodesy::{Coordinate, calc_distance};
use crate::rail_graph::RailGraph;
use crate::registries::StationRegistry;

/// Sentinel for "no next hop" (self or unreachable).
pub const NO_NEXT_HOP: i32 = -1;

/// Derived, immutable once computed.
///
/// `dist[u][v]` is the shortest-path distance in kilometers from `u` to `v`
/// (`f64::INFINITY` when unreachable, `0.0` on the diagonal). `next_hop` is
/// indexed `[origin][destination]`: the neighbor of `origin` to step to when
/// walking a shortest path toward `destination`.
pub struct RoutingTable {
    pub dist: Vec<Vec<f64>>,
    pub next_hop: Vec<Vec<i32>>,
}

impl RoutingTable {
    pub fn node_count(&self) -> usize {
        self.dist.len()
    }
}

/// Dense symmetric edge-cost matrix in kilometers, `INFINITY` where no edge
/// exists. Costs come from the Hubeny distance between the endpoint
/// stations' coordinates.
pub fn edge_cost_matrix(graph: &RailGraph, registry: &StationRegistry) -> Result<Vec<Vec<f64>>> {
    let n = graph.node_count();
    let mut cost = vec![vec![f64::INFINITY; n]; n];

    for (from, to) in graph.edges() {
        let station1 = station_for_node(graph, registry, from)?;
        let station2 = station_for_node(graph, registry, to)?;
        let distance = calc_distance(
            Coordinate {
                lat: station1.lat,
                lon: station1.lon,
            },
            Coordinate {
                lat: station2.lat,
                lon: station2.lon,
            },
        );
        cost[from as usize][to as usize] = distance;
        cost[to as usize][from as usize] = distance;
    }

    Ok(cost)
}

fn station_for_node<'a>(
    graph: &RailGraph,
    registry: &'a StationRegistry,
    node_id: u32,
) -> Result<&'a crate::models::Station> {
    let node = graph
        .arena()
        .get(node_id)
        .with_context(|| format!("node {node_id} missing from arena"))?;
    registry
        .get(node.station_code)
        .with_context(|| format!("station {} missing from master", node.station_code))
}

/// Single-source sweep from `root`: distances to every node and, for every
/// node, its predecessor in the shortest-path tree rooted at `root`
/// (`NO_NEXT_HOP` for the root itself and for unreachable nodes).
fn shortest_path_sweep(graph: &RailGraph, cost: &[Vec<f64>], root: u32) -> (Vec<f64>, Vec<i32>) {
    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut predecessor = vec![NO_NEXT_HOP; n];

    dist[root as usize] = 0.0;
    let mut frontier: BinaryHeap<Reverse<(OrderedFloat<f64>, u32)>> = BinaryHeap::new();
    frontier.push(Reverse((OrderedFloat(0.0), root)));

    while let Some(Reverse((OrderedFloat(d), current))) = frontier.pop() {
        if d > dist[current as usize] {
            continue;
        }
        for &neighbor in graph.neighbors(current) {
            let candidate = d + cost[current as usize][neighbor as usize];
            if candidate < dist[neighbor as usize] {
                dist[neighbor as usize] = candidate;
                predecessor[neighbor as usize] = current as i32;
                frontier.push(Reverse((OrderedFloat(candidate), neighbor)));
            }
        }
    }

    (dist, predecessor)
}

/// Run one sweep per node in parallel and assemble the routing table.
///
/// The sweep rooted at `v` yields distance row `dist[v]` and predecessor
/// column `next_hop[..][v]`: because the graph is undirected with symmetric
/// costs, the predecessor of `u` in the tree rooted at `v` is exactly the
/// neighbor of `u` on a shortest path from `u` to `v`.
pub fn all_pairs_next_hops(graph: &RailGraph, registry: &StationRegistry) -> Result<RoutingTable> {
    let n = graph.node_count();
    let cost = edge_cost_matrix(graph, registry)?;

    let sweeps: Vec<(Vec<f64>, Vec<i32>)> = (0..n as u32)
        .into_par_iter()
        .map(|root| shortest_path_sweep(graph, &cost, root))
        .collect();

    let mut dist = Vec::with_capacity(n);
    let mut next_hop = vec![vec![NO_NEXT_HOP; n]; n];
    for (root, (row, predecessors)) in sweeps.into_iter().enumerate() {
        for (node, &pred) in predecessors.iter().enumerate() {
            next_hop[node][root] = pred;
        }
        dist.push(row);
    }

    Ok(RoutingTable { dist, next_hop })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Join, Station};
    use crate::rail_graph::build_rail_graph;

    fn station(code: i32, group: i32, lat: f64, lon: f64) -> Station {
        Station {
            station_code: code,
            station_group_code: group,
            station_name: format!("station-{code}"),
            line_code: 1,
            prefecture_code: 13,
            post: String::new(),
            address: String::new(),
            lon,
            lat,
        }
    }

    fn join(code1: i32, code2: i32) -> Join {
        Join {
            line_code: 1,
            station_code1: code1,
            station_code2: code2,
        }
    }

    /// A(0,0) - B(0,1) - C(0,2) joined in a path, distinct groups.
    fn path_fixture() -> (StationRegistry, RailGraph) {
        let stations = vec![
            station(1, 10, 0.0, 0.0),
            station(2, 20, 0.0, 1.0),
            station(3, 30, 0.0, 2.0),
        ];
        let registry = StationRegistry::new(&stations);
        let joins = vec![join(1, 2), join(2, 3)];
        let graph = build_rail_graph(&registry, &joins, |_| true);
        (registry, graph)
    }

    #[test]
    fn diagonal_is_zero_and_selfhop_undefined() {
        let (registry, graph) = path_fixture();
        let table = all_pairs_next_hops(&graph, &registry).unwrap();
        for u in 0..table.node_count() {
            assert_eq!(table.dist[u][u], 0.0);
            assert_eq!(table.next_hop[u][u], NO_NEXT_HOP);
        }
    }

    #[test]
    fn distances_are_symmetric() {
        let (registry, graph) = path_fixture();
        let table = all_pairs_next_hops(&graph, &registry).unwrap();
        let n = table.node_count();
        for u in 0..n {
            for v in 0..n {
                assert_eq!(table.dist[u][v], table.dist[v][u], "asymmetry at ({u}, {v})");
            }
        }
    }

    #[test]
    fn next_hop_crosses_the_middle_station() {
        let (registry, graph) = path_fixture();
        let table = all_pairs_next_hops(&graph, &registry).unwrap();

        let a = graph.arena().id_for_station(1).unwrap() as usize;
        let b = graph.arena().id_for_station(2).unwrap() as usize;
        let c = graph.arena().id_for_station(3).unwrap() as usize;

        // No direct A-C edge, so the only shortest path is through B.
        assert_eq!(table.next_hop[a][c], b as i32);
        assert_eq!(table.next_hop[c][a], b as i32);
        assert_eq!(table.next_hop[a][b], b as i32);

        let via = table.dist[a][b] + table.dist[b][c];
        assert!((table.dist[a][c] - via).abs() < 1e-9);
    }

    #[test]
    fn walking_next_hops_reproduces_recorded_distance() {
        let (registry, graph) = path_fixture();
        let cost = edge_cost_matrix(&graph, &registry).unwrap();
        let table = all_pairs_next_hops(&graph, &registry).unwrap();
        let n = table.node_count();

        for u in 0..n {
            for v in 0..n {
                if u == v || table.dist[u][v].is_infinite() {
                    continue;
                }
                let mut current = u;
                let mut walked = 0.0;
                let mut steps = 0;
                while current != v {
                    let next = table.next_hop[current][v];
                    assert_ne!(next, NO_NEXT_HOP, "dead end walking {u} -> {v}");
                    walked += cost[current][next as usize];
                    current = next as usize;
                    steps += 1;
                    assert!(steps < n, "walk {u} -> {v} exceeded {n} steps");
                }
                assert!(
                    (walked - table.dist[u][v]).abs() < 1e-9,
                    "walked {walked} but recorded {}",
                    table.dist[u][v]
                );
            }
        }
    }

    #[test]
    fn unreachable_pairs_are_infinite_with_no_hop() {
        let stations = vec![
            station(1, 10, 0.0, 0.0),
            station(2, 20, 0.0, 1.0),
            station(3, 30, 10.0, 10.0),
            station(4, 40, 10.0, 11.0),
        ];
        let registry = StationRegistry::new(&stations);
        let joins = vec![join(1, 2), join(3, 4)];
        let graph = build_rail_graph(&registry, &joins, |_| true);
        let table = all_pairs_next_hops(&graph, &registry).unwrap();

        let a = graph.arena().id_for_station(1).unwrap() as usize;
        let c = graph.arena().id_for_station(3).unwrap() as usize;
        assert!(table.dist[a][c].is_infinite());
        assert_eq!(table.next_hop[a][c], NO_NEXT_HOP);
    }

    #[test]
    fn dropped_join_leaves_other_distances_untouched() {
        let stations = vec![
            station(1, 10, 0.0, 0.0),
            station(2, 20, 0.0, 1.0),
            station(3, 30, 0.0, 2.0),
        ];
        let registry = StationRegistry::new(&stations);

        let clean = vec![join(1, 2), join(2, 3)];
        let with_ghost = vec![join(1, 2), join(2, 9999), join(2, 3)];

        let graph1 = build_rail_graph(&registry, &clean, |_| true);
        let graph2 = build_rail_graph(&registry, &with_ghost, |_| true);
        let table1 = all_pairs_next_hops(&graph1, &registry).unwrap();
        let table2 = all_pairs_next_hops(&graph2, &registry).unwrap();

        assert_eq!(graph1.node_count(), graph2.node_count());
        for u in 0..table1.node_count() {
            for v in 0..table1.node_count() {
                assert_eq!(table1.dist[u][v], table2.dist[u][v]);
            }
        }
    }
}
