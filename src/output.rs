//! Output ports: the planned path and diagnostic clouds.

use crate::cloud::RecordCloud;
use crate::frames::Pose3;

/// An ordered pose sequence in the input cloud's frame.
#[derive(Debug, Clone)]
pub struct PlannedPath {
    pub frame_id: String,
    /// Seconds since the Unix epoch, stamped at publication.
    pub stamp: f64,
    pub poses: Vec<Pose3>,
}

/// Which plan stage a diagnostic cloud reflects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticStage {
    NormalLabels,
    FinalLabels,
    PathCost,
    Utility,
    FinalCost,
}

/// Consumer of plan-cycle outputs.
///
/// `publish_cloud` defaults to a no-op so hosts without observability
/// needs only implement the path.
pub trait PlanSink: Send {
    fn publish_path(&mut self, path: &PlannedPath);

    fn publish_cloud(&mut self, stage: DiagnosticStage, cloud: &RecordCloud) {
        let _ = (stage, cloud);
    }
}
