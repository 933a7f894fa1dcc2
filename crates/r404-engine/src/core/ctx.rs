use std::rc::Rc;
use std::sync::Arc;

use winit::window::Window;

use crate::coords::Rect;
use crate::input::SharedInput;
use crate::scheduler::{FrameQueue, FrameScheduler, WakeQueue, WakeSignal};
use crate::surface::{SurfaceSpec, WindowSurface};
use crate::time::{Clock, MonotonicClock};

/// Host services handed to the page when it is built.
pub struct HostCtx {
    pub window: Arc<Window>,
    pub input: SharedInput,
    pub frames: FrameQueue,
    pub clock: Rc<MonotonicClock>,
    /// Callbacks run after `wake` fires.
    pub wakes: WakeQueue,
    /// Fire from any thread to run `wakes` on the next event-loop turn.
    pub wake: WakeSignal,
}

impl HostCtx {
    /// Logical window rectangle at the origin.
    pub fn viewport(&self) -> Rect {
        let phys = self.window.inner_size();
        let logi: winit::dpi::LogicalSize<f64> = phys.to_logical(self.window.scale_factor());
        Rect::new(0.0, 0.0, logi.width as f32, logi.height as f32)
    }

    /// Hosting surface of `spec`'s size, centered in the window.
    pub fn surface(&self, spec: &SurfaceSpec) -> WindowSurface {
        let bounds = Rect::centered_in(self.viewport(), spec.size());
        WindowSurface::new(self.window.clone(), bounds)
    }

    pub fn scheduler(&self) -> Rc<dyn FrameScheduler> {
        Rc::new(self.frames.clone())
    }

    pub fn clock(&self) -> Rc<dyn Clock> {
        self.clock.clone()
    }
}
