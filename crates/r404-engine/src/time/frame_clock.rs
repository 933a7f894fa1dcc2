use std::time::Duration;

use super::Timestamp;

/// Per-loop frame clock.
///
/// One `FrameClock` belongs to one render loop. The previous timestamp is
/// supplied by the caller on every tick, so the clock only carries the frame
/// counter and the optional upper bound.
///
/// By default delta time is the raw elapsed time: no frame skipping and no
/// smoothing.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    frames: u64,
    dt_max: Option<Duration>,
}

impl FrameClock {
    /// Creates a clock that reports unclamped deltas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock whose deltas never exceed `dt_max`, when given.
    ///
    /// A bound keeps a simulation stable after a long stall (debugger pause,
    /// minimized window).
    pub fn with_max(dt_max: Option<Duration>) -> Self {
        Self { frames: 0, dt_max }
    }

    /// Number of ticks produced so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advances the clock from `previous` to `now`; returns the delta in
    /// seconds. Never negative.
    pub fn tick(&mut self, previous: Timestamp, now: Timestamp) -> f32 {
        let mut dt = now.saturating_since(previous);
        if let Some(max) = self.dt_max {
            dt = dt.min(max);
        }

        self.frames = self.frames.wrapping_add(1);
        dt.as_secs_f32()
    }
}
