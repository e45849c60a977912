//! Shared render progress and cancellation.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct ProgressState {
    /// `f64` bits of the completed fraction.
    fraction: AtomicU64,
    cancelled: AtomicBool,
}

/// Progress cell shared between a render thread and its observers.
///
/// Cloning is cheap and every clone refers to the same cell. The renderer is
/// the only writer of the fraction; anyone may request cancellation.
#[derive(Debug, Clone, Default)]
pub struct RenderProgress {
    inner: Arc<ProgressState>,
}

impl RenderProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        f64::from_bits(self.inner.fraction.load(Ordering::Relaxed))
    }

    pub fn set(&self, fraction: f64) {
        let value = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.inner.fraction.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Ask the render holding this cell to stop at the next group boundary.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Clear both the fraction and the cancellation flag.
    pub fn reset(&self) {
        self.set(0.0);
        self.inner.cancelled.store(false, Ordering::Release);
    }
}
