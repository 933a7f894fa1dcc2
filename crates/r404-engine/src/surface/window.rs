use std::sync::Arc;

use anyhow::{Context, Result};
use winit::window::{CursorGrabMode, Window};

use crate::coords::Rect;

use super::HostingSurface;

/// Surface backed by a winit window region.
pub struct WindowSurface {
    window: Arc<Window>,
    bounds: Rect,
}

impl WindowSurface {
    pub fn new(window: Arc<Window>, bounds: Rect) -> Self {
        Self { window, bounds }
    }
}

impl HostingSurface for WindowSurface {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn request_pointer_lock(&self) -> Result<()> {
        // `Locked` is unsupported on some platforms (X11, Windows); `Confined` is the
        // closest fallback there.
        self.window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined))
            .context("pointer lock refused by the platform")?;
        self.window.set_cursor_visible(false);
        Ok(())
    }
}

/// Platform-side release of the pointer lock (escape gesture, focus loss).
pub fn release_pointer_lock(window: &Window) {
    if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
        log::debug!("pointer unlock failed: {e:?}");
    }
    window.set_cursor_visible(true);
}
