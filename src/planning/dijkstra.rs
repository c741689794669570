//! Single-source shortest paths over a [`CostGraph`].
//!
//! Dijkstra without a color map: the heap may hold stale duplicate
//! entries, and a popped entry worse than the recorded cost is skipped.
//! Edges with infinite cost are pruned at iteration time.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

use super::graph::{CostGraph, Vertex};

/// Result of a shortest-path search.
///
/// `cost[v]` is the accumulated path cost or `+inf` when v is unreachable;
/// `predecessor` traces any reachable v back to the start vertex.
#[derive(Clone, Debug)]
pub struct ShortestPaths {
    pub cost: Vec<f32>,
    pub predecessor: Vec<Vertex>,
}

/// Heap entry ordered by cost.
#[derive(Clone, Debug)]
struct QueueEntry {
    vertex: Vertex,
    cost: f32,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.vertex == other.vertex
    }
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (lower cost = higher priority)
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compute shortest paths from `start` to every vertex.
pub fn shortest_paths<G: CostGraph>(graph: &G, start: Vertex) -> ShortestPaths {
    let t = Instant::now();
    let n = graph.num_vertices();
    let mut cost = vec![f32::INFINITY; n];
    let mut predecessor: Vec<Vertex> = (0..n).collect();
    let mut open = BinaryHeap::new();

    cost[start] = 0.0;
    open.push(QueueEntry {
        vertex: start,
        cost: 0.0,
    });

    while let Some(entry) = open.pop() {
        let u = entry.vertex;
        // A stale entry: a shorter route to u was already settled.
        if entry.cost > cost[u] {
            continue;
        }

        for e in graph.out_edges(u) {
            let edge_cost = graph.cost(e);
            if !edge_cost.is_finite() {
                continue;
            }
            let Some(v) = graph.target(e) else {
                continue;
            };
            let candidate = entry.cost + edge_cost;
            if candidate < cost[v] {
                cost[v] = candidate;
                predecessor[v] = u;
                open.push(QueueEntry {
                    vertex: v,
                    cost: candidate,
                });
            }
        }
    }

    tracing::info!(
        "Dijkstra ({} pts): {:.3} s",
        n,
        t.elapsed().as_secs_f32()
    );
    ShortestPaths { cost, predecessor }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::graph::EdgeId;
    use approx::assert_relative_eq;

    /// Hand-rolled graph: dense cost matrix, K slots per vertex.
    struct MatrixGraph {
        k: usize,
        targets: Vec<Option<Vertex>>,
        costs: Vec<f32>,
    }

    impl MatrixGraph {
        fn new(n: usize, k: usize, edges: &[(Vertex, Vertex, f32)]) -> Self {
            let mut targets = vec![None; n * k];
            let mut costs = vec![f32::INFINITY; n * k];
            let mut fill = vec![0_usize; n];
            for &(u, v, c) in edges {
                let slot = fill[u];
                assert!(slot < k);
                targets[u * k + slot] = Some(v);
                costs[u * k + slot] = c;
                fill[u] += 1;
            }
            Self { k, targets, costs }
        }
    }

    impl CostGraph for MatrixGraph {
        fn num_vertices(&self) -> usize {
            self.targets.len() / self.k
        }
        fn out_degree(&self) -> usize {
            self.k
        }
        fn target(&self, e: EdgeId) -> Option<Vertex> {
            self.targets[e]
        }
        fn cost(&self, e: EdgeId) -> f32 {
            self.costs[e]
        }
    }

    #[test]
    fn test_start_invariants() {
        let g = MatrixGraph::new(3, 2, &[(0, 1, 1.0), (1, 2, 1.0)]);
        let sp = shortest_paths(&g, 0);

        assert_relative_eq!(sp.cost[0], 0.0);
        assert_eq!(sp.predecessor[0], 0);
    }

    #[test]
    fn test_picks_cheaper_indirect_route() {
        // Direct 0->2 costs 5, the detour through 1 costs 3.
        let g = MatrixGraph::new(3, 2, &[(0, 2, 5.0), (0, 1, 1.0), (1, 2, 2.0)]);
        let sp = shortest_paths(&g, 0);

        assert_relative_eq!(sp.cost[2], 3.0);
        assert_eq!(sp.predecessor[2], 1);
        assert_eq!(sp.predecessor[1], 0);
    }

    #[test]
    fn test_unreachable_vertices_stay_infinite() {
        let g = MatrixGraph::new(4, 2, &[(0, 1, 1.0), (2, 3, 1.0)]);
        let sp = shortest_paths(&g, 0);

        assert!(sp.cost[1].is_finite());
        assert!(sp.cost[2].is_infinite());
        assert!(sp.cost[3].is_infinite());
    }

    #[test]
    fn test_infinite_edges_are_pruned() {
        let g = MatrixGraph::new(2, 2, &[(0, 1, f32::INFINITY)]);
        let sp = shortest_paths(&g, 0);

        assert!(sp.cost[1].is_infinite());
    }

    #[test]
    fn test_predecessor_chains_reach_start() {
        // Small grid-ish graph with several equal-cost routes.
        let edges = &[
            (0, 1, 1.0),
            (0, 2, 1.0),
            (1, 3, 1.0),
            (2, 3, 1.0),
            (3, 4, 1.0),
            (1, 4, 2.5),
        ];
        let g = MatrixGraph::new(5, 3, edges);
        let sp = shortest_paths(&g, 0);

        for v in 0..5 {
            assert!(sp.cost[v].is_finite());
            let mut steps = 0;
            let mut cursor = v;
            while cursor != 0 {
                cursor = sp.predecessor[cursor];
                steps += 1;
                assert!(steps <= 5, "predecessor chain from {} too long", v);
            }
        }
        assert_relative_eq!(sp.cost[4], 3.0);
    }

    #[test]
    fn test_repeated_runs_agree() {
        let edges = &[(0, 1, 1.5), (1, 2, 0.5), (0, 2, 2.5), (2, 0, 0.1)];
        let g = MatrixGraph::new(3, 3, edges);

        let a = shortest_paths(&g, 0);
        let b = shortest_paths(&g, 0);
        assert_eq!(a.cost, b.cost);
    }
}
