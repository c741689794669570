//! The point cloud as a directed graph with implicit edges.
//!
//! Vertices are point indices; the out-edges of vertex `u` are its K
//! neighbor slots, encoded as edge id `u * K + j`. No adjacency is
//! materialized: the cost function decides which edges logically exist
//! (finite cost) at query time.

use std::ops::Range;

use super::labels::Label;
use super::spatial::NeighborTable;

/// Index of a point in the per-cycle point set.
pub type Vertex = usize;

/// Encoded edge: `source * out_degree + slot`.
pub type EdgeId = usize;

/// Directed graph with implicit, cost-gated edges.
///
/// The shortest-path engine is generic over this trait; any graph exposing
/// slot-encoded out-edges and a cost can be searched.
pub trait CostGraph {
    fn num_vertices(&self) -> usize;

    /// Out-edge slots per vertex.
    fn out_degree(&self) -> usize;

    /// Target vertex of an edge, `None` for an unfilled neighbor slot.
    fn target(&self, e: EdgeId) -> Option<Vertex>;

    /// Edge cost; `+inf` means the edge is logically absent.
    fn cost(&self, e: EdgeId) -> f32;

    fn out_edges(&self, u: Vertex) -> Range<EdgeId> {
        u * self.out_degree()..(u + 1) * self.out_degree()
    }

    fn source(&self, e: EdgeId) -> Vertex {
        e / self.out_degree()
    }

    /// Neighbor slot of an edge within its source row.
    fn slot(&self, e: EdgeId) -> usize {
        e % self.out_degree()
    }
}

/// Traversability view over one cycle's points, labels, and NN tables.
pub struct TraversabilityGraph<'a> {
    points: &'a [[f32; 3]],
    labels: &'a [Label],
    nn: &'a NeighborTable,
    max_pitch: f32,
    radius: f32,
}

impl<'a> TraversabilityGraph<'a> {
    pub fn new(
        points: &'a [[f32; 3]],
        labels: &'a [Label],
        nn: &'a NeighborTable,
        max_pitch: f32,
        radius: f32,
    ) -> Self {
        Self {
            points,
            labels,
            nn,
            max_pitch,
            radius,
        }
    }
}

impl CostGraph for TraversabilityGraph<'_> {
    fn num_vertices(&self) -> usize {
        self.points.len()
    }

    fn out_degree(&self) -> usize {
        self.nn.k()
    }

    fn target(&self, e: EdgeId) -> Option<Vertex> {
        self.nn.neighbor(self.source(e), self.slot(e))
    }

    /// Edge cost: Euclidean length scaled by relative inclination.
    ///
    /// Absent slots, non-traversable targets, edges longer than the
    /// neighborhood radius, and edges steeper than `max_pitch` cost `+inf`.
    /// Zero-length edges (self matches, duplicate points) cost 0.
    fn cost(&self, e: EdgeId) -> f32 {
        let u = self.source(e);
        let Some(v) = self.nn.neighbor(u, self.slot(e)) else {
            return f32::INFINITY;
        };
        if self.labels[v] != Label::Traversable {
            return f32::INFINITY;
        }
        let d = self.nn.sq_distance(u, self.slot(e)).sqrt();
        if d > self.radius {
            return f32::INFINITY;
        }
        if d == 0.0 {
            return 0.0;
        }
        let height_diff = (self.points[v][2] - self.points[u][2]).abs();
        let inclination = (height_diff / d).min(1.0).asin();
        if inclination > self.max_pitch {
            return f32::INFINITY;
        }
        let slope_factor = if self.max_pitch > 0.0 {
            inclination / self.max_pitch
        } else {
            0.0
        };
        d * (1.0 + slope_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::labels::label_from_normals;
    use crate::planning::spatial::SpatialIndex;
    use approx::assert_relative_eq;

    struct Fixture {
        points: Vec<[f32; 3]>,
        labels: Vec<Label>,
        nn: NeighborTable,
        max_pitch: f32,
        radius: f32,
    }

    impl Fixture {
        fn new(points: Vec<[f32; 3]>, normals: Vec<[f32; 3]>, max_pitch: f32, radius: f32) -> Self {
            let labels = label_from_normals(&normals, max_pitch, max_pitch);
            let index = SpatialIndex::build(&points);
            let nn = index.knn_table(&points, 4);
            Self {
                points,
                labels,
                nn,
                max_pitch,
                radius,
            }
        }

        fn graph(&self) -> TraversabilityGraph<'_> {
            TraversabilityGraph::new(
                &self.points,
                &self.labels,
                &self.nn,
                self.max_pitch,
                self.radius,
            )
        }

        /// Edge id of the slot of `u` targeting `v`.
        fn edge(&self, u: Vertex, v: Vertex) -> EdgeId {
            let g = self.graph();
            g.out_edges(u)
                .find(|&e| g.target(e) == Some(v))
                .unwrap_or_else(|| panic!("no slot of {} targets {}", u, v))
        }
    }

    #[test]
    fn test_edge_encoding_round_trip() {
        let f = Fixture::new(
            (0..6).map(|i| [i as f32, 0.0, 0.0]).collect(),
            vec![[0.0, 0.0, 1.0]; 6],
            0.5,
            1.5,
        );
        let g = f.graph();

        assert_eq!(g.num_vertices(), 6);
        assert_eq!(g.out_degree(), 4);
        for u in 0..g.num_vertices() {
            for e in g.out_edges(u) {
                assert_eq!(g.source(e), u);
                assert!(g.slot(e) < g.out_degree());
            }
        }
    }

    #[test]
    fn test_flat_edge_cost_is_distance() {
        let f = Fixture::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            vec![[0.0, 0.0, 1.0]; 2],
            0.5,
            1.5,
        );
        let g = f.graph();

        assert_relative_eq!(g.cost(f.edge(0, 1)), 1.0);
        // Self match costs nothing.
        assert_relative_eq!(g.cost(f.edge(0, 0)), 0.0);
    }

    #[test]
    fn test_inclined_edge_cost_scales_with_pitch() {
        // 45-degree step with a generous pitch limit.
        let max_pitch = 60.0_f32.to_radians();
        let f = Fixture::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 1.0]],
            vec![[0.0, 0.0, 1.0]; 2],
            max_pitch,
            3.0,
        );
        let g = f.graph();

        let d = 2.0_f32.sqrt();
        let inclination = 45.0_f32.to_radians();
        assert_relative_eq!(
            g.cost(f.edge(0, 1)),
            d * (1.0 + inclination / max_pitch),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_edge_into_non_traversable_is_infinite() {
        let f = Fixture::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            vec![[0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
            0.5,
            1.5,
        );
        let g = f.graph();

        assert!(g.cost(f.edge(0, 1)).is_infinite());
        // The reverse edge targets a traversable vertex and stays finite.
        assert_relative_eq!(g.cost(f.edge(1, 0)), 1.0);
    }

    #[test]
    fn test_edge_beyond_radius_is_infinite() {
        let f = Fixture::new(
            vec![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
            vec![[0.0, 0.0, 1.0]; 2],
            0.5,
            1.5,
        );
        assert!(f.graph().cost(f.edge(0, 1)).is_infinite());
    }

    #[test]
    fn test_edge_steeper_than_max_pitch_is_infinite() {
        let f = Fixture::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 1.0]],
            vec![[0.0, 0.0, 1.0]; 2],
            30.0_f32.to_radians(),
            3.0,
        );
        assert!(f.graph().cost(f.edge(0, 1)).is_infinite());
    }

    #[test]
    fn test_zero_max_pitch_rejects_any_climb() {
        let f = Fixture::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.001], [0.0, 1.0, 0.0]],
            vec![[0.0, 0.0, 1.0]; 3],
            0.0,
            1.5,
        );
        let g = f.graph();

        // Any height difference is too steep for a zero pitch limit.
        assert!(g.cost(f.edge(0, 1)).is_infinite());
        // A perfectly level edge still costs its length.
        assert_relative_eq!(g.cost(f.edge(0, 2)), 1.0);
    }

    #[test]
    fn test_unfilled_slot_is_infinite() {
        let f = Fixture::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            vec![[0.0, 0.0, 1.0]; 2],
            0.5,
            1.5,
        );
        let g = f.graph();

        // k = 4 over two points leaves two unfilled slots per row.
        let empty: Vec<EdgeId> = g.out_edges(0).filter(|&e| g.target(e).is_none()).collect();
        assert_eq!(empty.len(), 2);
        for e in empty {
            assert!(g.cost(e).is_infinite());
        }
    }

    #[test]
    fn test_costs_are_nonnegative() {
        let f = Fixture::new(
            (0..10)
                .map(|i| [(i % 5) as f32, (i / 5) as f32, (i % 3) as f32 * 0.1])
                .collect(),
            vec![[0.0, 0.0, 1.0]; 10],
            0.5,
            1.5,
        );
        let g = f.graph();

        for u in 0..g.num_vertices() {
            for e in g.out_edges(u) {
                let c = g.cost(e);
                assert!(c >= 0.0 || c.is_infinite());
                assert!(!c.is_nan());
            }
        }
    }
}
