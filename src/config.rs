//! Configuration loading for the planner.

use crate::error::{PlannerError, Result};
use serde::Deserialize;
use std::path::Path;

/// Hard upper bound on `neighborhood_knn`.
pub const K_MAX: usize = 32;

/// Main configuration structure.
#[derive(Clone, Debug, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub cloud: CloudConfig,
    #[serde(default)]
    pub frames: FrameConfig,
    #[serde(default)]
    pub traversability: TraversabilityConfig,
    #[serde(default)]
    pub utility: UtilityConfig,
    #[serde(default)]
    pub viewpoints: ViewpointConfig,

    /// Maximum number of buffered input clouds (default: 5)
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
}

/// Input-cloud acceptance settings.
#[derive(Clone, Debug, Deserialize)]
pub struct CloudConfig {
    /// Field name identifying the x,y,z position run (default: "x")
    #[serde(default = "default_position_name")]
    pub position_name: String,

    /// Field name identifying the normal_x,y,z run (default: "normal_x")
    #[serde(default = "default_normal_name")]
    pub normal_name: String,

    /// Expected cloud frame; empty disables the check (default: "")
    #[serde(default)]
    pub map_frame: String,

    /// Reject clouds older than this many seconds (default: 5.0)
    #[serde(default = "default_max_cloud_age")]
    pub max_cloud_age: f64,
}

/// Robot frame settings.
#[derive(Clone, Debug, Deserialize)]
pub struct FrameConfig {
    /// Primary robot frame for pose lookup (default: "base_footprint")
    #[serde(default = "default_robot_frame")]
    pub robot_frame: String,

    /// Frames sampled as viewpoints; `robot_frame` is appended on
    /// normalize if missing (default: [])
    #[serde(default)]
    pub robot_frames: Vec<String>,
}

/// Traversability and graph-construction settings.
#[derive(Clone, Debug, Deserialize)]
pub struct TraversabilityConfig {
    /// Maximum traversable pitch in radians (default: 30 degrees)
    #[serde(default = "default_max_angle")]
    pub max_pitch: f32,

    /// Maximum traversable roll in radians (default: 30 degrees)
    #[serde(default = "default_max_angle")]
    pub max_roll: f32,

    /// K in the NN graph; must be in 1..=K_MAX (default: 12)
    #[serde(default = "default_neighborhood_knn")]
    pub neighborhood_knn: usize,

    /// Maximum edge length and in-plane neighborhood radius in meters
    /// (default: 0.5)
    #[serde(default = "default_neighborhood_radius")]
    pub neighborhood_radius: f32,

    /// Roughness threshold for label refinement in meters (default: 0.15)
    #[serde(default = "default_max_nn_height_diff")]
    pub max_nn_height_diff: f32,
}

/// Exploration-utility constants.
#[derive(Clone, Debug, Deserialize)]
pub struct UtilityConfig {
    /// Gain applied to both the distance reward and the directional bias
    /// (default: 3.0)
    #[serde(default = "default_utility_gain")]
    pub utility_gain: f32,

    /// Multiple of the neighborhood radius subtracted from the
    /// nearest-viewpoint distance (default: 2.0)
    #[serde(default = "default_radius_multiplier")]
    pub radius_multiplier: f32,

    /// Saturation of the distance reward in meters (default: 5.0)
    #[serde(default = "default_utility_clip_max")]
    pub utility_clip_max: f32,

    /// Preferred-frontier x threshold in the cloud frame (default: 10.0)
    #[serde(default = "default_frontier_x_threshold")]
    pub frontier_x_threshold: f32,
}

/// Viewpoint sampling settings.
#[derive(Clone, Debug, Deserialize)]
pub struct ViewpointConfig {
    /// Sampling rate in Hz (default: 1.0)
    #[serde(default = "default_update_freq")]
    pub update_freq: f32,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            position_name: default_position_name(),
            normal_name: default_normal_name(),
            map_frame: String::new(),
            max_cloud_age: default_max_cloud_age(),
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            robot_frame: default_robot_frame(),
            robot_frames: Vec::new(),
        }
    }
}

impl Default for TraversabilityConfig {
    fn default() -> Self {
        Self {
            max_pitch: default_max_angle(),
            max_roll: default_max_angle(),
            neighborhood_knn: default_neighborhood_knn(),
            neighborhood_radius: default_neighborhood_radius(),
            max_nn_height_diff: default_max_nn_height_diff(),
        }
    }
}

impl Default for UtilityConfig {
    fn default() -> Self {
        Self {
            utility_gain: default_utility_gain(),
            radius_multiplier: default_radius_multiplier(),
            utility_clip_max: default_utility_clip_max(),
            frontier_x_threshold: default_frontier_x_threshold(),
        }
    }
}

impl Default for ViewpointConfig {
    fn default() -> Self {
        Self {
            update_freq: default_update_freq(),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            cloud: CloudConfig::default(),
            frames: FrameConfig::default(),
            traversability: TraversabilityConfig::default(),
            utility: UtilityConfig::default(),
            viewpoints: ViewpointConfig::default(),
            queue_size: default_queue_size(),
        }
    }
}

// Default value functions
fn default_position_name() -> String {
    "x".to_string()
}
fn default_normal_name() -> String {
    "normal_x".to_string()
}
fn default_max_cloud_age() -> f64 {
    5.0
}
fn default_robot_frame() -> String {
    "base_footprint".to_string()
}
fn default_max_angle() -> f32 {
    30.0_f32.to_radians()
}
fn default_neighborhood_knn() -> usize {
    12
}
fn default_neighborhood_radius() -> f32 {
    0.5
}
fn default_max_nn_height_diff() -> f32 {
    0.15
}
fn default_utility_gain() -> f32 {
    3.0
}
fn default_radius_multiplier() -> f32 {
    2.0
}
fn default_utility_clip_max() -> f32 {
    5.0
}
fn default_frontier_x_threshold() -> f32 {
    10.0
}
fn default_update_freq() -> f32 {
    1.0
}
fn default_queue_size() -> usize {
    5
}

impl PlannerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PlannerError::Config(format!("Failed to read config file: {}", e)))?;
        let mut config: PlannerConfig = toml::from_str(&content)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Ensure the primary robot frame is sampled as a viewpoint source.
    pub fn normalize(&mut self) {
        if !self.frames.robot_frames.contains(&self.frames.robot_frame) {
            self.frames.robot_frames.push(self.frames.robot_frame.clone());
        }
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        let t = &self.traversability;
        if t.neighborhood_knn == 0 || t.neighborhood_knn > K_MAX {
            return Err(PlannerError::Config(format!(
                "neighborhood_knn {} outside 1..={}",
                t.neighborhood_knn, K_MAX
            )));
        }
        if t.neighborhood_radius <= 0.0 {
            return Err(PlannerError::Config(format!(
                "neighborhood_radius {} must be positive",
                t.neighborhood_radius
            )));
        }
        if self.viewpoints.update_freq <= 0.0 {
            return Err(PlannerError::Config(format!(
                "viewpoints update_freq {} must be positive",
                self.viewpoints.update_freq
            )));
        }
        Ok(())
    }
}
