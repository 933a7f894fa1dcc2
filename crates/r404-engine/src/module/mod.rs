//! Capability interface of the interactive module.
//!
//! The render loop only depends on these traits. A concrete module can be a
//! native renderer, a WebAssembly binding or a recording fake in tests.
//!
//! Contract:
//! - `ModuleLoader::load` resolves the module runtime asynchronously
//! - `GameModule::instantiate` builds a ready instance (`new` + `init`)
//! - `GameInstance::update` / `render` run once per frame, in that order
//! - `GameInstance::free` releases resources the host cannot reclaim on its own

mod guard;
mod loader;

pub use guard::InstanceGuard;
pub use loader::{BackgroundLoader, LoadCallback, ModuleLoader, SyncLoader};

use anyhow::Result;

/// A loaded module runtime able to produce instances.
pub trait GameModule: 'static {
    type Instance: GameInstance;

    /// Constructs and initializes a new instance.
    fn instantiate(&mut self) -> Result<Self::Instance>;
}

/// One running copy of the module.
pub trait GameInstance: 'static {
    /// Advances the instance by `dt` seconds.
    fn update(&mut self, dt: f32) -> Result<()>;

    /// Draws the current state into the hosting surface.
    fn render(&mut self) -> Result<()>;

    /// Releases the instance's resources. Called exactly once, by `InstanceGuard`.
    fn free(&mut self);
}
