//! Core host-facing contracts.
//!
//! This module defines the stable interface between the runtime (platform loop)
//! and the page it displays. The page never sees winit events; it receives
//! mount / click / unmount notifications and a `HostCtx` at construction.

mod ctx;
mod view;

pub use ctx::HostCtx;
pub use view::View;
