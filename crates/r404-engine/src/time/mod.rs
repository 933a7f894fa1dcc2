//! Time subsystem.
//!
//! Provides monotonic timestamps and frame timing without coupling to the runtime.
//! Intended usage:
//! - one `Clock` per host (the native runtime uses `MonotonicClock`)
//! - one `FrameClock` per render loop, advanced once per frame tick

mod clock;
mod frame_clock;

pub use clock::{Clock, ManualClock, MonotonicClock, Timestamp};
pub use frame_clock::FrameClock;
