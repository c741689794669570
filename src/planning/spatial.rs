//! k-d tree wrapper and the dense neighbor tables it produces.

use kiddo::{KdTree, SquaredEuclidean};
use std::time::Instant;

/// Sentinel for a neighbor slot past the effective result count.
pub const INVALID_NEIGHBOR: i32 = -1;

/// Dense N x K table of neighbor indices and squared distances.
///
/// Row `v` lists the nearest neighbors of query `v`, closest first; the
/// first entry is normally `v` itself. Slots past the effective count hold
/// [`INVALID_NEIGHBOR`] and infinite distance, but consumers must also
/// tolerate valid indices there.
#[derive(Debug, Clone)]
pub struct NeighborTable {
    k: usize,
    neighbors: Vec<i32>,
    distances: Vec<f32>,
}

impl NeighborTable {
    /// Neighbors per query row.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of query rows.
    pub fn num_queries(&self) -> usize {
        if self.k == 0 { 0 } else { self.neighbors.len() / self.k }
    }

    /// Target vertex of slot `j` of query `v`, if the slot is filled.
    #[inline]
    pub fn neighbor(&self, v: usize, j: usize) -> Option<usize> {
        let index = self.neighbors[v * self.k + j];
        (index >= 0).then_some(index as usize)
    }

    /// Squared distance of slot `j` of query `v`.
    #[inline]
    pub fn sq_distance(&self, v: usize, j: usize) -> f32 {
        self.distances[v * self.k + j]
    }
}

/// Exact k-nearest-neighbor index over 3D points.
pub struct SpatialIndex {
    tree: KdTree<f32, 3>,
    len: usize,
}

impl SpatialIndex {
    /// Build the index over point positions.
    pub fn build(points: &[[f32; 3]]) -> Self {
        let start = Instant::now();
        let mut tree = KdTree::new();
        for (i, p) in points.iter().enumerate() {
            tree.add(p, i as u64);
        }
        tracing::debug!(
            "Built k-d index for {} pts: {:.3} s",
            points.len(),
            start.elapsed().as_secs_f32()
        );
        Self {
            tree,
            len: points.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Nearest point to `query` as `(index, squared_distance)`.
    pub fn nearest(&self, query: &[f32; 3]) -> Option<(usize, f32)> {
        if self.len == 0 {
            return None;
        }
        let found = self.tree.nearest_one::<SquaredEuclidean>(query);
        Some((found.item as usize, found.distance))
    }

    /// k nearest neighbors for every query, as a dense [`NeighborTable`].
    pub fn knn_table(&self, queries: &[[f32; 3]], k: usize) -> NeighborTable {
        let start = Instant::now();
        let mut neighbors = vec![INVALID_NEIGHBOR; queries.len() * k];
        let mut distances = vec![f32::INFINITY; queries.len() * k];
        for (i, q) in queries.iter().enumerate() {
            let found = self.tree.nearest_n::<SquaredEuclidean>(q, k);
            for (j, n) in found.iter().enumerate() {
                neighbors[i * k + j] = n.item as i32;
                distances[i * k + j] = n.distance;
            }
        }
        tracing::debug!(
            "NN table ({} pts, k={}): {:.3} s",
            queries.len(),
            k,
            start.elapsed().as_secs_f32()
        );
        NeighborTable {
            k,
            neighbors,
            distances,
        }
    }
}
