//! Per-frame scheduling.
//!
//! Models the host's "call me on the next display refresh" primitive
//! (`requestAnimationFrame` in a browser, a redraw request under winit).
//! Callbacks are one-shot: a loop that wants to keep running re-arms itself
//! from inside its own callback.
//!
//! `WakeQueue` is the same idea for background work: callbacks fire on the
//! event-loop turn after a worker thread signals completion.

mod queue;
mod wake;

pub use queue::FrameQueue;
pub use wake::{WakeQueue, WakeSignal};

/// Callback fired once on the next refresh.
pub type FrameCallback = Box<dyn FnOnce()>;

/// Handle returned by `FrameScheduler::request_frame`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FrameRequestId(pub u64);

/// Host-side refresh scheduling primitive.
///
/// Single-threaded: implementations use interior mutability and are shared
/// through `Rc`.
pub trait FrameScheduler {
    /// Queues `callback` for the next refresh.
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId;

    /// Drops a pending callback. Unknown or already fired ids are ignored.
    fn cancel_frame(&self, id: FrameRequestId);
}
