//! Render-loop controller.
//!
//! Bridges page events (mount, click, unmount) to the lifecycle of one
//! interactive module instance and drives its per-frame loop.
//!
//! Lifecycle:
//! - `on_mount` starts the one-time module load
//! - `on_activate` (click on the surface) creates the single live instance and
//!   arms the first frame
//! - every frame tick runs `update(dt)` then `render()` and re-arms itself
//! - `on_unmount` cancels the loop and frees the instance

mod render_loop;

pub use render_loop::{Activation, ControllerConfig, Phase, RenderLoopController};
