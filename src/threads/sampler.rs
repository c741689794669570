//! Viewpoint sampler: periodically captures robot positions in the map
//! frame.
//!
//! Lookup failures skip the sample; the loop never aborts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::PlannerConfig;
use crate::frames::FrameLookup;
use crate::viewpoints::ViewpointStore;

pub(crate) fn run(
    config: PlannerConfig,
    frames: Arc<dyn FrameLookup>,
    store: Arc<ViewpointStore>,
    shutdown: Arc<AtomicBool>,
) {
    let freq = config.viewpoints.update_freq.max(1e-3);
    let period = Duration::from_secs_f32(1.0 / freq);
    tracing::info!("Viewpoint sampler started ({:.1} Hz)", freq);

    while !shutdown.load(Ordering::Acquire) {
        let tick = Instant::now();
        sample_once(&config, frames.as_ref(), &store);

        while tick.elapsed() < period {
            if shutdown.load(Ordering::Acquire) {
                return;
            }
            std::thread::sleep(Duration::from_millis(50).min(period));
        }
    }

    tracing::info!("Viewpoint sampler shutting down");
}

/// Capture the current position of every configured robot frame.
pub(crate) fn sample_once(
    config: &PlannerConfig,
    frames: &dyn FrameLookup,
    store: &ViewpointStore,
) {
    let map_frame = &config.cloud.map_frame;
    if map_frame.is_empty() {
        tracing::error!("Cannot gather robot positions without a map frame");
        return;
    }
    for frame in &config.frames.robot_frames {
        // Take the last transform available, don't wait.
        match frames.lookup(map_frame, frame, 0.0, Duration::ZERO) {
            Ok(tf) => {
                store.append([tf.translation.x, tf.translation.y, tf.translation.z]);
            }
            Err(e) => {
                tracing::warn!("Could not get {} position: {}", frame, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PlannerError, Result};
    use crate::frames::Transform3;
    use nalgebra::Vector3;

    struct FrameMap {
        known: Vec<(String, Vector3<f32>)>,
    }

    impl FrameLookup for FrameMap {
        fn lookup(
            &self,
            _target_frame: &str,
            source_frame: &str,
            _time: f64,
            _timeout: Duration,
        ) -> Result<Transform3> {
            self.known
                .iter()
                .find(|(name, _)| name == source_frame)
                .map(|(_, translation)| Transform3 {
                    translation: *translation,
                    ..Transform3::identity()
                })
                .ok_or_else(|| PlannerError::FrameUnavailable(source_frame.to_string()))
        }
    }

    fn config_with_frames(frames: &[&str]) -> PlannerConfig {
        let mut config = PlannerConfig::default();
        config.cloud.map_frame = "map".to_string();
        config.frames.robot_frames = frames.iter().map(|f| f.to_string()).collect();
        config
    }

    #[test]
    fn test_sample_once_appends_every_frame() {
        let config = config_with_frames(&["uav1", "uav2"]);
        let frames = FrameMap {
            known: vec![
                ("uav1".to_string(), Vector3::new(1.0, 0.0, 0.0)),
                ("uav2".to_string(), Vector3::new(0.0, 2.0, 0.0)),
            ],
        };
        let store = ViewpointStore::new();

        sample_once(&config, &frames, &store);
        assert_eq!(
            store.snapshot(),
            vec![[1.0, 0.0, 0.0], [0.0, 2.0, 0.0]]
        );
    }

    #[test]
    fn test_sample_once_skips_failed_lookups() {
        let config = config_with_frames(&["ugv", "ghost"]);
        let frames = FrameMap {
            known: vec![("ugv".to_string(), Vector3::new(3.0, 0.0, 0.0))],
        };
        let store = ViewpointStore::new();

        sample_once(&config, &frames, &store);
        assert_eq!(store.snapshot(), vec![[3.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_sample_once_requires_map_frame() {
        let mut config = config_with_frames(&["ugv"]);
        config.cloud.map_frame.clear();
        let frames = FrameMap {
            known: vec![("ugv".to_string(), Vector3::zeros())],
        };
        let store = ViewpointStore::new();

        sample_once(&config, &frames, &store);
        assert!(store.is_empty());
    }
}
