//! GPU device + surface management.
//!
//! Setup happens in two steps: `GpuSetup::new` binds a surface to the window
//! on the window's thread, then `GpuSetup::connect` acquires the adapter and
//! device, which may block and can run on any thread.
//!
//! The interactive module owns its `Gpu`; the host never touches pixel data.

mod gpu;
mod init;

pub use gpu::{Gpu, GpuSetup, Present};
pub use init::GpuInit;
