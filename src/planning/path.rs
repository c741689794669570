//! Goal selection and path tracing.

use nalgebra::{Matrix3, UnitQuaternion, Vector3};

use crate::frames::Pose3;

use super::graph::Vertex;

/// Steps shorter than this reuse the previous orientation.
const MIN_STEP: f32 = 1e-6;

/// The selected goal vertex and the per-vertex final costs.
#[derive(Clone, Debug)]
pub struct GoalSelection {
    pub goal: Vertex,
    pub final_cost: Vec<f32>,
}

/// Pick the vertex minimizing `path_cost - utility`.
///
/// Ties break toward the smallest vertex index; when nothing beats the
/// start vertex (all other path costs infinite) the start is the goal.
pub fn select_goal(path_cost: &[f32], utility: &[f32], v_start: Vertex) -> GoalSelection {
    let final_cost: Vec<f32> = path_cost
        .iter()
        .zip(utility)
        .map(|(c, u)| c - u)
        .collect();

    let mut goal = v_start;
    let mut goal_cost = f32::INFINITY;
    for (v, &cost) in final_cost.iter().enumerate() {
        if cost < goal_cost {
            goal_cost = cost;
            goal = v;
        }
    }
    GoalSelection { goal, final_cost }
}

/// Walk the predecessor array from goal back to start.
///
/// Returns the vertex sequence start-first. The walk stops at any
/// self-predecessor, so it terminates even on an inconsistent array.
pub fn trace_path(predecessor: &[Vertex], v_start: Vertex, v_goal: Vertex) -> Vec<Vertex> {
    let mut indices = Vec::new();
    let mut v = v_goal;
    loop {
        indices.push(v);
        if v == v_start || predecessor[v] == v {
            break;
        }
        v = predecessor[v];
    }
    indices.reverse();
    indices
}

/// Expand traced vertices into oriented poses, starting from the raw
/// start pose.
///
/// Each vertex faces its travel direction: local x along the step from
/// the previous pose, local z along the vertex normal, y completing the
/// frame.
pub fn path_poses(
    indices: &[Vertex],
    points: &[[f32; 3]],
    normals: &[[f32; 3]],
    start: &Pose3,
) -> Vec<Pose3> {
    let mut poses = Vec::with_capacity(indices.len() + 1);
    poses.push(*start);

    let mut prev = *start;
    for &v in indices {
        let position = Vector3::from(points[v]);
        let step = position - prev.position;
        let orientation = if step.norm() < MIN_STEP {
            prev.orientation
        } else {
            let x = step.normalize();
            let z = Vector3::from(normals[v]);
            let y = z.cross(&x);
            let m = Matrix3::from_columns(&[x, y, z]);
            UnitQuaternion::from_matrix(&m)
        };
        prev = Pose3 {
            position,
            orientation,
        };
        poses.push(prev);
    }
    poses
}
