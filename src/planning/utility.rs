//! Per-vertex exploration utility.
//!
//! Reward grows with the distance to the nearest historical viewpoint
//! (clipped), plus a directional bias toward the configured frontier
//! subspace.

use std::time::Instant;

use crate::config::UtilityConfig;

use super::spatial::SpatialIndex;

/// Compute the utility of every point from a viewpoint snapshot.
///
/// An empty snapshot degrades to the start position as the only viewpoint
/// (logged, not an error). The bias term can drive the utility negative
/// for points behind `frontier_x_threshold`.
pub fn exploration_utility(
    points: &[[f32; 3]],
    viewpoints: &[[f32; 3]],
    start_position: [f32; 3],
    neighborhood_radius: f32,
    config: &UtilityConfig,
) -> Vec<f32> {
    let t = Instant::now();
    let fallback = [start_position];
    let viewpoints: &[[f32; 3]] = if viewpoints.is_empty() {
        tracing::warn!("No viewpoints gathered, using start position only");
        &fallback
    } else {
        viewpoints
    };

    let index = SpatialIndex::build(viewpoints);
    let offset = config.radius_multiplier * neighborhood_radius;
    let utility = points
        .iter()
        .map(|p| {
            let observed = index.nearest(p).map(|(_, sq)| sq.sqrt()).unwrap_or(0.0);
            let reward = config.utility_gain
                * (observed - offset).clamp(0.0, config.utility_clip_max);
            reward + config.utility_gain * (p[0] - config.frontier_x_threshold).min(0.0)
        })
        .collect();

    tracing::info!(
        "Vertex utility ({} pts, {} viewpoints): {:.3} s",
        points.len(),
        viewpoints.len(),
        t.elapsed().as_secs_f32()
    );
    utility
}
