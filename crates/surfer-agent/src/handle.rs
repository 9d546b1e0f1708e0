//! A cloneable handle for poking a session from other tasks.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio_util::sync::CancellationToken;

/// A cloneable handle for cancelling a session's current call.
///
/// All fields are `Arc`-wrapped, so cloning is cheap.
#[derive(Clone)]
pub struct SessionHandle {
    cancel: Arc<Mutex<CancellationToken>>,
    is_running: Arc<AtomicBool>,
}

impl SessionHandle {
    pub(crate) fn new() -> Self {
        Self {
            cancel: Arc::new(Mutex::new(CancellationToken::new())),
            is_running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancel the in-flight call, if any. A no-op when idle.
    pub fn cancel(&self) {
        self.cancel.lock().cancel();
    }

    /// Whether a call is currently running
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
    }

    /// Install a fresh token and mark the session running until the guard drops.
    pub(crate) fn begin_run(&self) -> RunGuard {
        let token = CancellationToken::new();
        *self.cancel.lock() = token.clone();
        self.is_running.store(true, Ordering::Release);
        RunGuard {
            token,
            is_running: Arc::clone(&self.is_running),
        }
    }
}

/// Marks a session running for as long as it lives
pub(crate) struct RunGuard {
    pub(crate) token: CancellationToken,
    is_running: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.is_running.store(false, Ordering::Release);
    }
}
