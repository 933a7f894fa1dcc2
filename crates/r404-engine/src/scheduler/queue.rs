use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{FrameCallback, FrameRequestId, FrameScheduler};

#[derive(Default)]
struct QueueInner {
    next_id: Cell<u64>,
    pending: RefCell<Vec<(FrameRequestId, FrameCallback)>>,
    frames_run: Cell<u64>,
}

/// Single-threaded frame queue.
///
/// The native runtime calls `run_frame` once per `RedrawRequested`; tests call
/// it directly to step a loop deterministically. Cloning yields another handle
/// to the same queue.
#[derive(Clone, Default)]
pub struct FrameQueue {
    inner: Rc<QueueInner>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if at least one callback waits for the next refresh.
    pub fn has_pending(&self) -> bool {
        !self.inner.pending.borrow().is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Number of refreshes processed so far.
    pub fn frames_run(&self) -> u64 {
        self.inner.frames_run.get()
    }

    /// Runs one refresh.
    ///
    /// Only callbacks pending when the call starts are fired, in request order.
    /// Callbacks requested while running wait for the next refresh, and a
    /// callback cancelled by an earlier one in the same batch does not fire.
    /// Returns the number of callbacks fired.
    pub fn run_frame(&self) -> usize {
        let batch: Vec<FrameRequestId> = self
            .inner
            .pending
            .borrow()
            .iter()
            .map(|(id, _)| *id)
            .collect();

        let mut fired = 0;
        for id in batch {
            // Release the borrow before invoking: callbacks re-arm through `request_frame`.
            let callback = {
                let mut pending = self.inner.pending.borrow_mut();
                pending
                    .iter()
                    .position(|(pid, _)| *pid == id)
                    .map(|idx| pending.remove(idx).1)
            };

            if let Some(callback) = callback {
                callback();
                fired += 1;
            }
        }

        self.inner.frames_run.set(self.inner.frames_run.get() + 1);
        fired
    }

    /// Runs `n` consecutive refreshes.
    pub fn run_frames(&self, n: usize) -> usize {
        (0..n).map(|_| self.run_frame()).sum()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId {
        let id = FrameRequestId(self.inner.next_id.get());
        self.inner.next_id.set(id.0.wrapping_add(1));
        self.inner.pending.borrow_mut().push((id, callback));
        id
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        self.inner.pending.borrow_mut().retain(|(pid, _)| *pid != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> Rc<Cell<u32>> { Rc::new(Cell::new(0)) }

    #[test]
    fn fires_pending_callbacks_once() {
        let q = FrameQueue::new();
        let hits = counter();
        let h = hits.clone();
        q.request_frame(Box::new(move || h.set(h.get() + 1)));

        assert_eq!(q.run_frame(), 1);
        assert_eq!(q.run_frame(), 0);
        assert_eq!(hits.get(), 1);
        assert_eq!(q.frames_run(), 2);
    }

    #[test]
    fn rearmed_callback_waits_for_next_refresh() {
        let q = FrameQueue::new();
        let hits = counter();

        fn arm(q: FrameQueue, hits: Rc<Cell<u32>>) {
            let q2 = q.clone();
            q.request_frame(Box::new(move || {
                hits.set(hits.get() + 1);
                arm(q2, hits);
            }));
        }
        arm(q.clone(), hits.clone());

        assert_eq!(q.run_frame(), 1);
        assert_eq!(hits.get(), 1);
        assert!(q.has_pending());
        q.run_frames(3);
        assert_eq!(hits.get(), 4);
    }

    #[test]
    fn cancelled_callback_does_not_fire() {
        let q = FrameQueue::new();
        let hits = counter();
        let h = hits.clone();
        let id = q.request_frame(Box::new(move || h.set(h.get() + 1)));
        q.cancel_frame(id);

        assert!(!q.has_pending());
        assert_eq!(q.run_frame(), 0);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn cancel_from_earlier_callback_in_same_batch() {
        let q = FrameQueue::new();
        let hits = counter();
        let victim = Rc::new(Cell::new(None));

        let (q2, v2) = (q.clone(), victim.clone());
        q.request_frame(Box::new(move || {
            if let Some(id) = v2.get() {
                q2.cancel_frame(id);
            }
        }));
        let h = hits.clone();
        victim.set(Some(q.request_frame(Box::new(move || h.set(h.get() + 1)))));

        assert_eq!(q.run_frame(), 1);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn cancel_unknown_id_is_ignored() {
        let q = FrameQueue::new();
        q.request_frame(Box::new(|| {}));
        q.cancel_frame(FrameRequestId(999));
        assert_eq!(q.pending_len(), 1);
    }
}
