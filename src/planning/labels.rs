//! Per-point traversability labels.
//!
//! Labeling runs in two passes: a normal-direction pass over every point,
//! then a neighborhood refinement that demotes points whose local height
//! range exceeds the roughness threshold.

use nalgebra::Vector3;
use std::time::Instant;

use super::spatial::NeighborTable;

/// Traversability label; the discriminant is the wire encoding.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Traversable = 0,
    Unknown = 1,
    Obstacle = 2,
}

impl Label {
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Label each point from its normal direction.
///
/// With `t = cos(max(max_pitch, max_roll))`: `n.z >= t` is roughly
/// horizontal facing up (traversable), `|n.z| < t` is roughly vertical in
/// either orientation (obstacle), anything else is unknown.
pub fn label_from_normals(normals: &[[f32; 3]], max_pitch: f32, max_roll: f32) -> Vec<Label> {
    let start = Instant::now();
    let max_slope = max_pitch.max(max_roll);
    let min_z = max_slope.cos();

    let mut n_traversable = 0_usize;
    let mut n_obstacle = 0_usize;
    let mut n_unknown = 0_usize;
    let labels = normals
        .iter()
        .map(|n| {
            if n[2] >= min_z {
                n_traversable += 1;
                Label::Traversable
            } else if n[2].abs() < min_z {
                n_obstacle += 1;
                Label::Obstacle
            } else {
                n_unknown += 1;
                Label::Unknown
            }
        })
        .collect();

    tracing::info!(
        "Normal labels ({} pts): {} trav., {} obs., {} unk.: {:.3} s",
        normals.len(),
        n_traversable,
        n_obstacle,
        n_unknown,
        start.elapsed().as_secs_f32()
    );
    labels
}

/// Demote traversable points whose neighborhood is too rough.
///
/// For each traversable point v, neighbor displacements are projected onto
/// v's normal; neighbors farther than `radius` in v's tangent plane are
/// ignored. Once the running height range of the retained neighbors
/// exceeds `max_nn_height_diff`, v becomes `Unknown`. Only the
/// Traversable -> Unknown transition is possible.
pub fn refine_labels(
    points: &[[f32; 3]],
    normals: &[[f32; 3]],
    nn: &NeighborTable,
    radius: f32,
    max_nn_height_diff: f32,
    labels: &mut [Label],
) {
    let start = Instant::now();
    let mut n_traversable = 0_usize;
    let mut n_adjusted = 0_usize;

    for v in 0..labels.len() {
        if labels[v] != Label::Traversable {
            continue;
        }
        n_traversable += 1;

        let p_v = Vector3::from(points[v]);
        let n_v = Vector3::from(normals[v]);
        let mut min_height_diff = f32::INFINITY;
        let mut max_height_diff = f32::NEG_INFINITY;

        for j in 0..nn.k() {
            let Some(w) = nn.neighbor(v, j) else {
                continue;
            };
            let displacement = Vector3::from(points[w]) - p_v;
            let height_diff = n_v.dot(&displacement);
            let in_plane = displacement - height_diff * n_v;
            if in_plane.norm() > radius {
                continue;
            }
            min_height_diff = min_height_diff.min(height_diff);
            max_height_diff = max_height_diff.max(height_diff);
            if max_height_diff - min_height_diff > max_nn_height_diff {
                labels[v] = Label::Unknown;
                n_adjusted += 1;
                break;
            }
        }
    }

    tracing::info!(
        "Refined labels ({} pts): {} - {} = {} trav.: {:.3} s",
        labels.len(),
        n_traversable,
        n_adjusted,
        n_traversable - n_adjusted,
        start.elapsed().as_secs_f32()
    );
}
