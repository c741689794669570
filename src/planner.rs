//! Plan-cycle controller.
//!
//! Owns the configuration, the shared viewpoint store, the frame-lookup
//! handle, and the output sink. Each input cloud runs one cycle: validate,
//! locate the robot, label, build the graph, search, score, trace, publish.

use std::sync::Arc;
use std::time::Duration;

use crate::cloud::{self, now_secs, RecordCloud};
use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};
use crate::frames::{FrameLookup, Pose3};
use crate::output::{DiagnosticStage, PlanSink, PlannedPath};
use crate::planning::{
    exploration_utility, label_from_normals, path_poses, refine_labels, select_goal,
    shortest_paths, trace_path, SpatialIndex, TraversabilityGraph,
};
use crate::viewpoints::ViewpointStore;

/// How long a plan cycle waits for the robot pose.
const POSE_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// The planner controller.
pub struct Planner<S: PlanSink> {
    config: PlannerConfig,
    frames: Arc<dyn FrameLookup>,
    viewpoints: Arc<ViewpointStore>,
    sink: S,
}

impl<S: PlanSink> Planner<S> {
    pub fn new(mut config: PlannerConfig, frames: Arc<dyn FrameLookup>, sink: S) -> Self {
        config.normalize();
        let viewpoints = Arc::new(ViewpointStore::with_capacity_hint(
            config.viewpoints.update_freq,
            config.frames.robot_frames.len(),
        ));
        Self {
            config,
            frames,
            viewpoints,
            sink,
        }
    }

    /// The store shared with the viewpoint sampler.
    pub fn viewpoints(&self) -> Arc<ViewpointStore> {
        Arc::clone(&self.viewpoints)
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Run one plan cycle for an input cloud.
    ///
    /// Returns an error (and publishes nothing) when the cloud is invalid
    /// or the robot pose is unavailable.
    pub fn handle_cloud(&mut self, cloud: &RecordCloud) -> Result<()> {
        self.validate(cloud)?;
        let start = self.lookup_start(cloud)?;
        self.plan(cloud, start)
    }

    fn validate(&self, cloud: &RecordCloud) -> Result<()> {
        cloud.check_layout()?;
        if cloud.is_empty() {
            return Err(PlannerError::InputInvalid("empty cloud".to_string()));
        }
        let age = now_secs() - cloud.stamp;
        if age > self.config.cloud.max_cloud_age {
            return Err(PlannerError::InputInvalid(format!(
                "cloud {:.1} s > {:.1} s old",
                age, self.config.cloud.max_cloud_age
            )));
        }
        let map_frame = &self.config.cloud.map_frame;
        if !map_frame.is_empty() && *map_frame != cloud.frame_id {
            return Err(PlannerError::InputInvalid(format!(
                "cloud frame {} does not match map frame {}",
                cloud.frame_id, map_frame
            )));
        }
        cloud.float3_run(&self.config.cloud.position_name)?;
        cloud.float3_run(&self.config.cloud.normal_name)?;
        Ok(())
    }

    fn lookup_start(&self, cloud: &RecordCloud) -> Result<Pose3> {
        let tf = self
            .frames
            .lookup(
                &cloud.frame_id,
                &self.config.frames.robot_frame,
                now_secs(),
                POSE_LOOKUP_TIMEOUT,
            )
            .map_err(|e| PlannerError::FrameUnavailable(format!("robot position: {}", e)))?;
        Ok(tf.to_pose())
    }

    fn plan(&mut self, cloud: &RecordCloud, start: Pose3) -> Result<()> {
        let t = &self.config.traversability;
        let positions = cloud.extract_vec3(&self.config.cloud.position_name)?;
        let normals = cloud.extract_vec3(&self.config.cloud.normal_name)?;
        let mut debug = cloud::with_diagnostic_fields(cloud);

        // Preliminary labels from normal directions.
        let mut labels = label_from_normals(&normals, t.max_pitch, t.max_roll);
        let encoded: Vec<u8> = labels.iter().map(|l| l.as_u8()).collect();
        debug.fill_u8("normal_label", &encoded)?;
        self.sink.publish_cloud(DiagnosticStage::NormalLabels, &debug);

        // NN graph, then neighborhood refinement.
        let index = SpatialIndex::build(&positions);
        let nn = index.knn_table(&positions, t.neighborhood_knn);
        refine_labels(
            &positions,
            &normals,
            &nn,
            t.neighborhood_radius,
            t.max_nn_height_diff,
            &mut labels,
        );
        let encoded: Vec<u8> = labels.iter().map(|l| l.as_u8()).collect();
        debug.fill_u8("final_label", &encoded)?;
        self.sink.publish_cloud(DiagnosticStage::FinalLabels, &debug);

        // The vertex nearest the robot starts the search.
        let start_position = [start.position.x, start.position.y, start.position.z];
        let Some((v_start, _)) = index.nearest(&start_position) else {
            return Err(PlannerError::InputInvalid("empty cloud".to_string()));
        };

        let graph = TraversabilityGraph::new(
            &positions,
            &labels,
            &nn,
            t.max_pitch,
            t.neighborhood_radius,
        );
        let paths = shortest_paths(&graph, v_start);
        debug.fill_f32("path_cost", &paths.cost)?;
        self.sink.publish_cloud(DiagnosticStage::PathCost, &debug);

        let snapshot = self.viewpoints.snapshot();
        let utility = exploration_utility(
            &positions,
            &snapshot,
            start_position,
            t.neighborhood_radius,
            &self.config.utility,
        );
        debug.fill_f32("utility", &utility)?;
        self.sink.publish_cloud(DiagnosticStage::Utility, &debug);

        let selection = select_goal(&paths.cost, &utility, v_start);
        debug.fill_f32("final_cost", &selection.final_cost)?;
        self.sink.publish_cloud(DiagnosticStage::FinalCost, &debug);
        tracing::info!(
            "Goal position: {:.1}, {:.1}, {:.1}",
            positions[selection.goal][0],
            positions[selection.goal][1],
            positions[selection.goal][2]
        );

        let poses = if selection.goal == v_start {
            tracing::warn!("No goal beyond the start vertex, emitting single-pose path");
            vec![start]
        } else {
            let indices = trace_path(&paths.predecessor, v_start, selection.goal);
            path_poses(&indices, &positions, &normals, &start)
        };
        let path = PlannedPath {
            frame_id: cloud.frame_id.clone(),
            stamp: now_secs(),
            poses,
        };
        tracing::info!("Path length: {}", path.poses.len());
        self.sink.publish_path(&path);
        Ok(())
    }
}
