//! Hosting surface of the interactive module.
//!
//! The surface is a fixed-size region the module draws into directly; the host
//! only needs its bounds (for click hit-testing) and pointer capture.

mod window;

pub use window::{release_pointer_lock, WindowSurface};

use anyhow::Result;

use crate::coords::{Rect, Vec2};

/// Static description of the interactive surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSpec {
    /// Element id the module looks up to find its drawing target.
    pub element_id: String,
    /// Width in logical pixels.
    pub width: u32,
    /// Height in logical pixels.
    pub height: u32,
}

impl SurfaceSpec {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

impl Default for SurfaceSpec {
    fn default() -> Self {
        Self {
            element_id: "canvas".to_string(),
            width: 600,
            height: 400,
        }
    }
}

/// Host-side view of the surface.
pub trait HostingSurface {
    /// Surface rectangle in the page's logical coordinates.
    fn bounds(&self) -> Rect;

    /// Requests exclusive pointer capture for this surface.
    ///
    /// The platform releases the lock on its own (escape gesture, focus loss,
    /// navigation); callers never release it explicitly.
    fn request_pointer_lock(&self) -> Result<()>;
}
