//! Coordinate-frame lookup port.
//!
//! The planner never talks to a transform service directly; hosts implement
//! [`FrameLookup`] over whatever transport they use.

use nalgebra::{UnitQuaternion, Vector3};
use std::time::Duration;

use crate::error::Result;

/// A rigid transform: translation plus unit-quaternion rotation.
#[derive(Debug, Clone, Copy)]
pub struct Transform3 {
    pub translation: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl Transform3 {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Interpret the transform as the pose of its source frame.
    pub fn to_pose(&self) -> Pose3 {
        Pose3 {
            position: self.translation,
            orientation: self.rotation,
        }
    }
}

/// A 3D pose: position plus orientation.
#[derive(Debug, Clone, Copy)]
pub struct Pose3 {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
}

impl Pose3 {
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        }
    }
}

/// Frame lookup service.
///
/// Implementations resolve the transform of `source_frame` expressed in
/// `target_frame`, blocking up to `timeout`. `time` is seconds since the
/// Unix epoch; `0.0` requests the latest transform available.
pub trait FrameLookup: Send + Sync {
    fn lookup(
        &self,
        target_frame: &str,
        source_frame: &str,
        time: f64,
        timeout: Duration,
    ) -> Result<Transform3>;
}
