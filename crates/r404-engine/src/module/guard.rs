use std::ops::{Deref, DerefMut};

use super::GameInstance;

/// Scoped owner of a live instance.
///
/// The instance's memory lives outside the host's automatic reclamation, so
/// dropping the handle alone would leak it. The guard calls `free` exactly once:
/// through `release`, or on drop for every other exit path (early return,
/// error, unwinding).
pub struct InstanceGuard<I: GameInstance> {
    instance: I,
    freed: bool,
}

impl<I: GameInstance> InstanceGuard<I> {
    pub fn new(instance: I) -> Self {
        Self {
            instance,
            freed: false,
        }
    }

    /// Explicit teardown.
    pub fn release(mut self) {
        self.free_once();
    }

    fn free_once(&mut self) {
        if !self.freed {
            self.freed = true;
            self.instance.free();
        }
    }
}

impl<I: GameInstance> Deref for InstanceGuard<I> {
    type Target = I;

    fn deref(&self) -> &I {
        &self.instance
    }
}

impl<I: GameInstance> DerefMut for InstanceGuard<I> {
    fn deref_mut(&mut self) -> &mut I {
        &mut self.instance
    }
}

impl<I: GameInstance> Drop for InstanceGuard<I> {
    fn drop(&mut self) {
        if !self.freed {
            log::debug!("instance guard dropped without release; freeing");
        }
        self.free_once();
    }
}
