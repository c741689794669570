//! Core planning algorithms.
//!
//! One plan cycle flows bottom-up through this module:
//! labels from normals -> k-d index and NN tables -> label refinement ->
//! traversability graph -> shortest paths -> utility -> goal and path.

pub mod dijkstra;
pub mod graph;
pub mod labels;
pub mod path;
pub mod spatial;
pub mod utility;

pub use dijkstra::{shortest_paths, ShortestPaths};
pub use graph::{CostGraph, EdgeId, TraversabilityGraph, Vertex};
pub use labels::{label_from_normals, refine_labels, Label};
pub use path::{path_poses, select_goal, trace_path, GoalSelection};
pub use spatial::{NeighborTable, SpatialIndex, INVALID_NEIGHBOR};
pub use utility::exploration_utility;
