use tokio::sync::{Mutex, MutexGuard};

/// Process-wide gate admitting one append at a time.
///
/// `acquire` suspends until the gate is free and never times out; a caller
/// whose request was abandoned upstream still waits its turn. The returned
/// permit releases the gate when dropped, so release happens on every exit
/// path of the work performed while held. Admission order under contention
/// follows the runtime, not a fairness queue.
pub struct WriteGate {
    inner: Mutex<()>,
}

/// Proof of holding the gate; dropping it frees the gate.
pub struct WritePermit<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl WriteGate {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(()),
        }
    }

    pub async fn acquire(&self) -> WritePermit<'_> {
        WritePermit {
            _guard: self.inner.lock().await,
        }
    }

    /// True when no caller currently holds the gate.
    pub fn is_free(&self) -> bool {
        self.inner.try_lock().is_ok()
    }
}

impl Default for WriteGate {
    fn default() -> Self {
        Self::new()
    }
}
