use crate::error::{XRayError, XrResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between a caller and a worker.
///
/// Cancelling never interrupts a step in progress. Workers call `check()`
/// between steps and bail out with `XRayError::Cancelled`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    pub fn check(&self) -> XrResult<()> {
        if self.is_cancelled() {
            Err(XRayError::Cancelled)
        } else {
            Ok(())
        }
    }
}
