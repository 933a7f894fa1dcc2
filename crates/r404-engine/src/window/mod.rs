//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window and maps window events onto the page
//! lifecycle.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
