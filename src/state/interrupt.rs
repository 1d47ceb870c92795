//! Cross-thread interrupt signal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Requests that a connection abandon its current work.
///
/// The handle can be cloned and triggered from any thread. It never touches
/// the connection state directly: the next message processed by the
/// connection is routed through the RESET path instead. Engine calls already
/// in flight run to completion.
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle {
    pending: Arc<AtomicBool>,
}

impl InterruptHandle {
    /// Create a handle with no pending interrupt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request an interrupt.
    pub fn interrupt(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Returns true if an interrupt is pending.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    pub(crate) fn clear(&self) {
        self.pending.store(false, Ordering::Release);
    }
}
