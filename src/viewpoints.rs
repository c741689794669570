//! Shared store of historical robot positions.
//!
//! The sampler thread appends while plan cycles snapshot; the mutex is held
//! only for the push or the copy.

use parking_lot::Mutex;

/// Append-only buffer of 3D viewpoints, shared across threads.
#[derive(Debug, Default)]
pub struct ViewpointStore {
    points: Mutex<Vec<[f32; 3]>>,
}

impl ViewpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preallocate for two hours of samples per tracked frame.
    pub fn with_capacity_hint(update_freq: f32, frame_count: usize) -> Self {
        let hint = (7200.0 * update_freq.max(0.0)).ceil() as usize * frame_count.max(1);
        Self {
            points: Mutex::new(Vec::with_capacity(hint)),
        }
    }

    pub fn append(&self, point: [f32; 3]) {
        self.points.lock().push(point);
    }

    /// Copy of the buffer, safe to read while appends continue.
    pub fn snapshot(&self) -> Vec<[f32; 3]> {
        self.points.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.points.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
