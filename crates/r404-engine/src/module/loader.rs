use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::{anyhow, Context, Result};

use crate::scheduler::{WakeQueue, WakeSignal};

use super::GameModule;

/// Completion callback handed to a loader. Must be invoked exactly once.
pub type LoadCallback<M> = Box<dyn FnOnce(Result<M>)>;

/// Asynchronous initializer of the module runtime.
///
/// The loader may call `done` before returning (already available runtime) or
/// later from the host's event loop. Callers guarantee `load` is called at most
/// once per page lifetime.
pub trait ModuleLoader {
    type Module: GameModule;

    fn load(&mut self, done: LoadCallback<Self::Module>);
}

/// Loader that resolves synchronously from a closure.
///
/// Only for runtimes that are available immediately; initialization that can
/// block belongs in a `BackgroundLoader`.
pub struct SyncLoader<F> {
    init: Option<F>,
}

impl<F> SyncLoader<F> {
    pub fn new(init: F) -> Self {
        Self { init: Some(init) }
    }
}

impl<M, F> ModuleLoader for SyncLoader<F>
where
    M: GameModule,
    F: FnOnce() -> Result<M>,
{
    type Module = M;

    fn load(&mut self, done: LoadCallback<M>) {
        match self.init.take() {
            Some(init) => done(init()),
            None => done(Err(anyhow::anyhow!("module loader already consumed"))),
        }
    }
}

/// Loader that runs blocking initialization on a worker thread.
///
/// `work` runs off the host thread. When it finishes, the worker fires the
/// host's wake signal and `finish` builds the module on the host thread during
/// that wake. `load` itself never resolves, so clicks that reach the page
/// while `work` runs still find the load pending.
pub struct BackgroundLoader<W, F> {
    work:   Option<W>,
    finish: Option<F>,
    wakes:  WakeQueue,
    wake:   WakeSignal,
}

impl<W, F> BackgroundLoader<W, F> {
    pub fn new(work: W, finish: F, wakes: WakeQueue, wake: WakeSignal) -> Self {
        Self {
            work: Some(work),
            finish: Some(finish),
            wakes,
            wake,
        }
    }
}

impl<T, M, W, F> ModuleLoader for BackgroundLoader<W, F>
where
    T: Send + 'static,
    M: GameModule,
    W: FnOnce() -> Result<T> + Send + 'static,
    F: FnOnce(T) -> Result<M> + 'static,
{
    type Module = M;

    fn load(&mut self, done: LoadCallback<M>) {
        let (Some(work), Some(finish)) = (self.work.take(), self.finish.take()) else {
            done(Err(anyhow!("module loader already consumed")));
            return;
        };

        let (tx, rx) = mpsc::channel();
        let wake = self.wake.clone();
        let spawned = thread::Builder::new()
            .name("r404-module-load".to_string())
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(work))
                    .unwrap_or_else(|_| Err(anyhow!("module load panicked")));
                // The receiver is gone when the page was torn down meanwhile.
                let _ = tx.send(result);
                wake();
            });

        if let Err(e) = spawned {
            done(Err(e).context("failed to spawn module load thread"));
            return;
        }

        await_result(self.wakes.clone(), rx, finish, done);
    }
}

fn await_result<T, M, F>(wakes: WakeQueue, rx: Receiver<Result<T>>, finish: F, done: LoadCallback<M>)
where
    T: 'static,
    M: GameModule,
    F: FnOnce(T) -> Result<M> + 'static,
{
    let queue = wakes.clone();
    wakes.on_wake(Box::new(move || match rx.try_recv() {
        Ok(result) => done(result.and_then(finish)),
        // Woken for someone else's work.
        Err(TryRecvError::Empty) => await_result(queue, rx, finish, done),
        Err(TryRecvError::Disconnected) => done(Err(anyhow!("module load thread exited without a result"))),
    }));
}
