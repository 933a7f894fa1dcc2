use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use super::FrameCallback;

/// Thread-safe nudge asking the host to run its `WakeQueue` on a later
/// event-loop turn. Called from worker threads.
pub type WakeSignal = Arc<dyn Fn() + Send + Sync>;

/// Host-thread callbacks waiting on background work.
///
/// A worker finishes, fires the `WakeSignal`, and the host runs the queue from
/// its event loop, so results reach the page between events and never inside
/// one. Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct WakeQueue {
    pending: Rc<RefCell<Vec<FrameCallback>>>,
}

impl WakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_wake(&self, callback: FrameCallback) {
        self.pending.borrow_mut().push(callback);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Fires every callback registered before this call.
    ///
    /// Callbacks registered while running wait for the next wake. Returns the
    /// number fired.
    pub fn run(&self) -> usize {
        let batch = std::mem::take(&mut *self.pending.borrow_mut());
        let fired = batch.len();
        for callback in batch {
            callback();
        }
        fired
    }
}
