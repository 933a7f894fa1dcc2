//! r404 engine crate.
//!
//! Owns the lifecycle of the interactive module shown on the 404 page: loading,
//! single-instance activation, the per-frame update/render loop and teardown,
//! plus the native platform pieces (window, input, GPU) used to host it.

pub mod controller;
pub mod core;
pub mod device;
pub mod input;
pub mod module;
pub mod scheduler;
pub mod surface;
pub mod time;
pub mod window;

pub mod coords;
pub mod logging;
pub mod paint;
