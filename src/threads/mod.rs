//! Thread scaffolding around the planner.
//!
//! Two threads of control:
//! - **Plan thread**: drains the cloud queue, one cycle per cloud, in
//!   arrival order.
//! - **Viewpoint sampler**: fixed-rate loop appending the current position
//!   of every configured robot frame to the shared store.
//!
//! The host pushes deserialized clouds through a [`CloudSender`]; when the
//! bounded queue is full the oldest cloud is dropped.

mod plan;
mod sampler;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::cloud::RecordCloud;
use crate::config::PlannerConfig;
use crate::frames::FrameLookup;
use crate::output::PlanSink;
use crate::planner::Planner;

/// Handles for the planner's worker threads.
pub struct PlannerHandles {
    /// Where the host pushes incoming clouds.
    pub clouds: CloudSender,
    pub plan: JoinHandle<()>,
    pub sampler: JoinHandle<()>,
}

/// Producer side of the bounded cloud queue.
///
/// `push` never blocks: when the queue is full, the oldest queued cloud is
/// dropped to make room.
#[derive(Clone)]
pub struct CloudSender {
    tx: Sender<RecordCloud>,
    rx: Receiver<RecordCloud>,
}

impl CloudSender {
    pub fn push(&self, cloud: RecordCloud) {
        let mut cloud = cloud;
        loop {
            match self.tx.try_send(cloud) {
                Ok(()) => return,
                Err(TrySendError::Full(returned)) => {
                    if self.rx.try_recv().is_ok() {
                        tracing::warn!("Cloud queue full, dropping oldest cloud");
                    }
                    cloud = returned;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

/// Create the bounded cloud queue.
pub fn cloud_queue(capacity: usize) -> (CloudSender, Receiver<RecordCloud>) {
    let (tx, rx) = bounded(capacity.max(1));
    (
        CloudSender {
            tx,
            rx: rx.clone(),
        },
        rx,
    )
}

/// Spawn the plan and sampler threads around a queue of `queue_size`
/// clouds.
pub fn spawn_threads<S>(
    config: PlannerConfig,
    frames: Arc<dyn FrameLookup>,
    sink: S,
    shutdown: Arc<AtomicBool>,
) -> PlannerHandles
where
    S: PlanSink + 'static,
{
    let mut config = config;
    config.normalize();

    let (clouds, cloud_rx) = cloud_queue(config.queue_size);
    let planner = Planner::new(config.clone(), Arc::clone(&frames), sink);
    let viewpoints = planner.viewpoints();

    let plan_shutdown = Arc::clone(&shutdown);
    let plan = thread::Builder::new()
        .name("plan".into())
        .spawn(move || plan::run(planner, cloud_rx, plan_shutdown))
        .expect("Failed to spawn plan thread");

    let sampler = thread::Builder::new()
        .name("viewpoint-sampler".into())
        .spawn(move || sampler::run(config, frames, viewpoints, shutdown))
        .expect("Failed to spawn viewpoint sampler thread");

    PlannerHandles {
        clouds,
        plan,
        sampler,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cloud(stamp: f64) -> RecordCloud {
        RecordCloud::from_points("map", stamp, &[[0.0; 3]], &[[0.0, 0.0, 1.0]])
    }

    #[test]
    fn test_cloud_queue_preserves_order() {
        let (tx, rx) = cloud_queue(3);
        tx.push(cloud(1.0));
        tx.push(cloud(2.0));

        assert_eq!(rx.recv().unwrap().stamp, 1.0);
        assert_eq!(rx.recv().unwrap().stamp, 2.0);
    }

    #[test]
    fn test_cloud_queue_drops_oldest_when_full() {
        let (tx, rx) = cloud_queue(2);
        tx.push(cloud(1.0));
        tx.push(cloud(2.0));
        tx.push(cloud(3.0));

        assert_eq!(rx.recv().unwrap().stamp, 2.0);
        assert_eq!(rx.recv().unwrap().stamp, 3.0);
        assert!(rx.try_recv().is_err());
    }
}
