//! Plan thread: one completed cycle per input cloud, in arrival order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::cloud::RecordCloud;
use crate::output::PlanSink;
use crate::planner::Planner;

pub(crate) fn run<S: PlanSink>(
    mut planner: Planner<S>,
    cloud_rx: Receiver<RecordCloud>,
    shutdown: Arc<AtomicBool>,
) {
    tracing::info!("Plan thread started");

    loop {
        if shutdown.load(Ordering::Acquire) {
            break;
        }
        match cloud_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(cloud) => {
                tracing::info!("Cloud received ({} points)", cloud.len());
                if let Err(e) = planner.handle_cloud(&cloud) {
                    tracing::error!("Plan cycle failed: {}", e);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    tracing::info!("Plan thread shutting down");
}
