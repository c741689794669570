//! MargaNav - Traversability-graph exploration planner.
//!
//! Consumes point clouds carrying positions and surface normals together
//! with the robot pose, and produces a navigable path toward the frontier
//! that best trades travel cost against exploration gain.
//!
//! # Plan cycle
//!
//! Each input cloud runs one cycle:
//!
//! 1. Validate the cloud layout, age, frame, and required fields.
//! 2. Look up the robot pose in the cloud's frame.
//! 3. Label every point traversable / obstacle / unknown from its normal,
//!    then refine labels from neighborhood roughness.
//! 4. Build a k-d index and the dense kNN tables; view them as a directed
//!    graph whose implicit edges are gated by a kinematic cost function.
//! 5. Run Dijkstra from the vertex nearest the robot.
//! 6. Score every vertex by distance to the nearest historical viewpoint
//!    plus a directional frontier bias.
//! 7. Select the vertex minimizing path cost minus utility and trace the
//!    oriented pose sequence to it.
//!
//! # Architecture
//!
//! ```text
//! threads/        plan thread + viewpoint sampler
//! planner         plan-cycle controller (C8)
//! planning/       labels, spatial index, graph, dijkstra, utility, path
//! viewpoints      shared viewpoint store
//! cloud, frames,  data model and host-facing ports
//! output
//! config, error   ambient concerns
//! ```
//!
//! The transport that delivers clouds and consumes paths lives in the
//! host: implement [`FrameLookup`] and [`PlanSink`], push clouds through
//! [`threads::cloud_queue`], and hand both to [`threads::spawn_threads`].

pub mod cloud;
pub mod config;
pub mod error;
pub mod frames;
pub mod output;
pub mod planner;
pub mod planning;
pub mod threads;
pub mod viewpoints;

pub use cloud::{now_secs, FieldType, PointField, RecordCloud};
pub use config::{PlannerConfig, K_MAX};
pub use error::{PlannerError, Result};
pub use frames::{FrameLookup, Pose3, Transform3};
pub use output::{DiagnosticStage, PlanSink, PlannedPath};
pub use planner::Planner;
pub use planning::{
    exploration_utility, label_from_normals, refine_labels, select_goal, shortest_paths,
    CostGraph, Label, NeighborTable, ShortestPaths, SpatialIndex, TraversabilityGraph, Vertex,
};
pub use viewpoints::ViewpointStore;
