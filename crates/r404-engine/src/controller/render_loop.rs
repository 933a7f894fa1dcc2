use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;

use crate::coords::Vec2;
use crate::input::PointerButtonEvent;
use crate::module::{GameInstance, GameModule, InstanceGuard, ModuleLoader};
use crate::scheduler::{FrameRequestId, FrameScheduler};
use crate::surface::HostingSurface;
use crate::time::{Clock, FrameClock, Timestamp};

/// Controller configuration.
#[derive(Debug, Clone, Default)]
pub struct ControllerConfig {
    /// Upper bound for the per-frame delta handed to `update`.
    ///
    /// `None` passes the raw elapsed time through.
    pub dt_max: Option<Duration>,
}

/// Observable controller phase.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    /// Hosting view not displayed.
    Unmounted,
    /// Mounted, module runtime not resolved yet.
    Loading,
    /// Module loaded, waiting for a click.
    Ready,
    /// One instance live, frame loop armed.
    Running,
    /// Load or instance failure; clicks do nothing for the rest of the page lifetime.
    Inert,
}

/// Outcome of a click on the hosting surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Activation {
    /// A new instance was created and the loop started.
    Started,
    /// An instance is already live; nothing happened.
    AlreadyRunning,
    /// Module not loaded yet; the click is dropped, not queued.
    NotReady,
    /// Surface disabled after a failure.
    Inert,
    /// Not a primary click inside the surface, or the view is not mounted.
    Ignored,
}

enum LoadState<M> {
    NotStarted,
    Pending,
    Loaded(M),
    Failed,
}

struct LiveInstance<M: GameModule> {
    guard: InstanceGuard<M::Instance>,
    started_at: Timestamp,
    frames: FrameClock,
    /// Set on teardown; checked first by every scheduled tick of this instance.
    cancelled: Rc<Cell<bool>>,
    pending: Option<FrameRequestId>,
}

struct LoopState<M: GameModule> {
    mounted: bool,
    load: LoadState<M>,
    live: Option<LiveInstance<M>>,
    inert: bool,
    last_error: Option<String>,
    instances_created: u64,
}

struct Shared<M: GameModule> {
    scheduler: Rc<dyn FrameScheduler>,
    clock: Rc<dyn Clock>,
    config: ControllerConfig,
    state: RefCell<LoopState<M>>,
}

/// Owns the lifecycle of at most one live instance of a module.
///
/// Single-threaded. Frame callbacks only hold a weak reference to the
/// controller state plus the instance's cancellation flag, so a callback that
/// fires after teardown never reaches the instance.
pub struct RenderLoopController<L: ModuleLoader> {
    loader: L,
    surface: Box<dyn HostingSurface>,
    shared: Rc<Shared<L::Module>>,
}

impl<L: ModuleLoader> RenderLoopController<L> {
    pub fn new(
        loader: L,
        surface: impl HostingSurface + 'static,
        scheduler: Rc<dyn FrameScheduler>,
        clock: Rc<dyn Clock>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            loader,
            surface: Box::new(surface),
            shared: Rc::new(Shared {
                scheduler,
                clock,
                config,
                state: RefCell::new(LoopState {
                    mounted: false,
                    load: LoadState::NotStarted,
                    live: None,
                    inert: false,
                    last_error: None,
                    instances_created: 0,
                }),
            }),
        }
    }

    /// Hosting view became visible.
    ///
    /// Starts loading the module runtime the first time only; later mounts reuse
    /// whatever the first load produced, including a failure.
    pub fn on_mount(&mut self) {
        let start_load = {
            let mut st = self.shared.state.borrow_mut();
            if st.mounted {
                return;
            }
            st.mounted = true;

            if matches!(st.load, LoadState::NotStarted) {
                st.load = LoadState::Pending;
                true
            } else {
                false
            }
        };

        if !start_load {
            log::debug!("remounted; module load already started");
            return;
        }

        log::debug!("loading interactive module");

        // No borrow is held here: the loader may resolve before returning.
        let weak = Rc::downgrade(&self.shared);
        self.loader.load(Box::new(move |result| match weak.upgrade() {
            Some(shared) => shared.resolve_load(result),
            None => log::debug!("module load resolved after the controller was dropped"),
        }));
    }

    /// Click on the hosting surface.
    pub fn on_activate(&mut self, event: PointerButtonEvent) -> Activation {
        if !event.is_primary_press() || !self.surface.bounds().contains(Vec2::new(event.x, event.y)) {
            return Activation::Ignored;
        }

        {
            let st = self.shared.state.borrow();
            if !st.mounted {
                return Activation::Ignored;
            }
            if st.live.is_some() {
                log::debug!("click ignored: instance already running");
                return Activation::AlreadyRunning;
            }
            if st.inert {
                return Activation::Inert;
            }
            if !matches!(st.load, LoadState::Loaded(_)) {
                log::debug!("click ignored: module not loaded yet");
                return Activation::NotReady;
            }
        }

        let cancelled = Rc::new(Cell::new(false));
        let started_at = {
            let mut st = self.shared.state.borrow_mut();
            let created = match &mut st.load {
                LoadState::Loaded(module) => module.instantiate(),
                _ => return Activation::NotReady,
            };

            let instance = match created {
                Ok(instance) => instance,
                Err(e) => {
                    log::warn!("interactive module failed to start: {e:#}");
                    st.inert = true;
                    st.last_error = Some(format!("{e:#}"));
                    return Activation::Inert;
                }
            };

            let started_at = self.shared.clock.now();
            st.live = Some(LiveInstance {
                guard: InstanceGuard::new(instance),
                started_at,
                frames: FrameClock::with_max(self.shared.config.dt_max),
                cancelled: cancelled.clone(),
                pending: None,
            });
            st.instances_created += 1;
            started_at
        };

        // Only a started instance captures the pointer; a failed start leaves the cursor alone.
        if let Err(e) = self.surface.request_pointer_lock() {
            log::debug!("pointer lock request failed: {e:#}");
        }

        log::info!("interactive module started");
        Shared::schedule(&self.shared, started_at, cancelled);
        Activation::Started
    }

    /// Hosting view removed from display.
    ///
    /// Stops frame scheduling and frees the live instance, if any.
    pub fn on_unmount(&mut self) {
        let live = {
            let mut st = self.shared.state.borrow_mut();
            if !st.mounted {
                return;
            }
            st.mounted = false;
            st.live.take()
        };

        let Some(live) = live else {
            return;
        };

        live.cancelled.set(true);
        if let Some(id) = live.pending {
            self.shared.scheduler.cancel_frame(id);
        }

        let ran_for = self.shared.clock.now().saturating_since(live.started_at);
        let frames = live.frames.frames();
        live.guard.release();

        log::info!(
            "interactive module freed after {:.1}s ({frames} frames)",
            ran_for.as_secs_f32()
        );
    }

    pub fn phase(&self) -> Phase {
        let st = self.shared.state.borrow();
        if !st.mounted {
            Phase::Unmounted
        } else if st.live.is_some() {
            Phase::Running
        } else if st.inert {
            Phase::Inert
        } else if matches!(st.load, LoadState::Loaded(_)) {
            Phase::Ready
        } else {
            Phase::Loading
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.state.borrow().live.is_some()
    }

    /// Instances constructed over the controller's lifetime.
    pub fn instances_created(&self) -> u64 {
        self.shared.state.borrow().instances_created
    }

    /// Start timestamp of the live instance.
    pub fn started_at(&self) -> Option<Timestamp> {
        self.shared.state.borrow().live.as_ref().map(|l| l.started_at)
    }

    /// Most recent load / start / frame failure, for diagnostics.
    pub fn last_error(&self) -> Option<String> {
        self.shared.state.borrow().last_error.clone()
    }

    /// The surface clicks are tested against.
    pub fn surface(&self) -> &dyn HostingSurface {
        self.surface.as_ref()
    }
}

impl<L: ModuleLoader> Drop for RenderLoopController<L> {
    fn drop(&mut self) {
        self.on_unmount();
    }
}

impl<M: GameModule> Shared<M> {
    fn resolve_load(&self, result: Result<M>) {
        let mut st = self.state.borrow_mut();
        match result {
            Ok(module) => {
                log::info!("interactive module loaded");
                st.load = LoadState::Loaded(module);
            }
            Err(e) => {
                // Not retried; the page keeps working without the easter egg.
                log::warn!("interactive module failed to load: {e:#}");
                st.load = LoadState::Failed;
                st.inert = true;
                st.last_error = Some(format!("{e:#}"));
            }
        }
    }

    /// Arms the next tick of the instance owning `cancelled`.
    fn schedule(shared: &Rc<Self>, previous: Timestamp, cancelled: Rc<Cell<bool>>) {
        let weak = Rc::downgrade(shared);
        let flag = cancelled.clone();

        let id = shared.scheduler.request_frame(Box::new(move || {
            if flag.get() {
                return;
            }
            if let Some(shared) = weak.upgrade() {
                Shared::frame_tick(&shared, previous, &flag);
            }
        }));

        if let Some(live) = shared.state.borrow_mut().live.as_mut() {
            live.pending = Some(id);
        }
    }

    fn frame_tick(shared: &Rc<Self>, previous: Timestamp, cancelled: &Rc<Cell<bool>>) {
        if cancelled.get() {
            return;
        }

        let now = shared.clock.now();
        let outcome = {
            let mut st = shared.state.borrow_mut();
            let Some(live) = st.live.as_mut() else {
                log::error!("frame tick reached a controller without a live instance");
                return;
            };

            live.pending = None;
            let dt = live.frames.tick(previous, now);
            live.guard.update(dt).and_then(|()| live.guard.render())
        };

        match outcome {
            Ok(()) => Shared::schedule(shared, now, cancelled.clone()),
            Err(e) => shared.fault(e),
        }
    }

    fn fault(&self, e: anyhow::Error) {
        log::error!("interactive module faulted, disabling surface: {e:#}");

        let live = {
            let mut st = self.state.borrow_mut();
            st.inert = true;
            st.last_error = Some(format!("{e:#}"));
            st.live.take()
        };

        if let Some(live) = live {
            live.cancelled.set(true);
            live.guard.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::Duration;

    use anyhow::{anyhow, Result};

    use super::*;
    use crate::coords::Rect;
    use crate::input::{MouseButton, MouseButtonState};
    use crate::module::{GameInstance, LoadCallback};
    use crate::scheduler::FrameQueue;
    use crate::time::ManualClock;

    // ── fakes ─────────────────────────────────────────────────────────────

    #[derive(Debug, Default)]
    struct Calls {
        constructed: u32,
        updates: Vec<f32>,
        renders: u32,
        freed: u32,
        /// Interleaving of update ("u") and render ("r") calls.
        order: Vec<&'static str>,
    }

    type Log = Rc<RefCell<Calls>>;

    struct FakeModule {
        log: Log,
        fail_instantiate: bool,
        fail_update_at: Option<usize>,
    }

    impl GameModule for FakeModule {
        type Instance = FakeInstance;

        fn instantiate(&mut self) -> Result<FakeInstance> {
            if self.fail_instantiate {
                return Err(anyhow!("no webgl2 context"));
            }
            self.log.borrow_mut().constructed += 1;
            Ok(FakeInstance {
                log: self.log.clone(),
                fail_update_at: self.fail_update_at,
            })
        }
    }

    struct FakeInstance {
        log: Log,
        fail_update_at: Option<usize>,
    }

    impl GameInstance for FakeInstance {
        fn update(&mut self, dt: f32) -> Result<()> {
            let mut log = self.log.borrow_mut();
            if self.fail_update_at == Some(log.updates.len()) {
                return Err(anyhow!("camera exploded"));
            }
            log.updates.push(dt);
            log.order.push("u");
            Ok(())
        }

        fn render(&mut self) -> Result<()> {
            let mut log = self.log.borrow_mut();
            log.renders += 1;
            log.order.push("r");
            Ok(())
        }

        fn free(&mut self) {
            self.log.borrow_mut().freed += 1;
        }
    }

    /// Loader whose completion is fired by the test.
    struct DeferredLoader {
        pending: Rc<RefCell<Option<LoadCallback<FakeModule>>>>,
        loads: Rc<Cell<u32>>,
    }

    impl ModuleLoader for DeferredLoader {
        type Module = FakeModule;

        fn load(&mut self, done: LoadCallback<FakeModule>) {
            self.loads.set(self.loads.get() + 1);
            *self.pending.borrow_mut() = Some(done);
        }
    }

    struct FakeSurface {
        locks: Rc<Cell<u32>>,
        refuse_lock: bool,
    }

    impl HostingSurface for FakeSurface {
        fn bounds(&self) -> Rect {
            Rect::new(0.0, 0.0, 600.0, 400.0)
        }

        fn request_pointer_lock(&self) -> Result<()> {
            self.locks.set(self.locks.get() + 1);
            if self.refuse_lock {
                Err(anyhow!("pointer lock denied"))
            } else {
                Ok(())
            }
        }
    }

    struct Harness {
        ctl: RenderLoopController<DeferredLoader>,
        frames: FrameQueue,
        clock: Rc<ManualClock>,
        log: Log,
        pending_load: Rc<RefCell<Option<LoadCallback<FakeModule>>>>,
        loads: Rc<Cell<u32>>,
        locks: Rc<Cell<u32>>,
        module: RefCell<Option<FakeModule>>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with(FakeModuleOpts::default(), false, ControllerConfig::default())
        }

        fn with(opts: FakeModuleOpts, refuse_lock: bool, config: ControllerConfig) -> Self {
            let log: Log = Rc::default();
            let pending_load = Rc::new(RefCell::new(None));
            let loads = Rc::new(Cell::new(0));
            let locks = Rc::new(Cell::new(0));
            let frames = FrameQueue::new();
            let clock = Rc::new(ManualClock::new());

            let ctl = RenderLoopController::new(
                DeferredLoader {
                    pending: pending_load.clone(),
                    loads: loads.clone(),
                },
                FakeSurface {
                    locks: locks.clone(),
                    refuse_lock,
                },
                Rc::new(frames.clone()),
                clock.clone(),
                config,
            );

            let module = FakeModule {
                log: log.clone(),
                fail_instantiate: opts.fail_instantiate,
                fail_update_at: opts.fail_update_at,
            };

            Self {
                ctl,
                frames,
                clock,
                log,
                pending_load,
                loads,
                locks,
                module: RefCell::new(Some(module)),
            }
        }

        fn resolve_ok(&self) {
            let done = self.pending_load.borrow_mut().take().unwrap();
            done(Ok(self.module.borrow_mut().take().unwrap()));
        }

        fn resolve_err(&self) {
            let done = self.pending_load.borrow_mut().take().unwrap();
            done(Err(anyhow!("wasm fetch failed")));
        }

        fn mounted_and_loaded() -> Self {
            let mut h = Self::new();
            h.ctl.on_mount();
            h.resolve_ok();
            h
        }

        fn click(&mut self) -> Activation {
            self.ctl.on_activate(PointerButtonEvent::click(300.0, 200.0))
        }

        /// One display refresh, `ms` after the previous one.
        fn refresh(&self, ms: u64) -> usize {
            self.clock.advance(Duration::from_millis(ms));
            self.frames.run_frame()
        }
    }

    #[derive(Default)]
    struct FakeModuleOpts {
        fail_instantiate: bool,
        fail_update_at: Option<usize>,
    }

    // ── mount / load ──────────────────────────────────────────────────────

    #[test]
    fn mount_starts_load_without_creating_instance() {
        let mut h = Harness::new();
        assert_eq!(h.ctl.phase(), Phase::Unmounted);

        h.ctl.on_mount();
        assert_eq!(h.loads.get(), 1);
        assert_eq!(h.ctl.phase(), Phase::Loading);
        assert_eq!(h.log.borrow().constructed, 0);

        h.resolve_ok();
        assert_eq!(h.ctl.phase(), Phase::Ready);
        assert_eq!(h.log.borrow().constructed, 0);
    }

    #[test]
    fn repeated_mounts_do_not_reload() {
        let mut h = Harness::new();
        h.ctl.on_mount();
        h.ctl.on_mount();
        h.resolve_ok();
        h.ctl.on_unmount();
        h.ctl.on_mount();

        assert_eq!(h.loads.get(), 1);
        assert_eq!(h.ctl.phase(), Phase::Ready);
    }

    #[test]
    fn synchronous_loader_resolves_during_mount() {
        let log: Log = Rc::default();
        let module = FakeModule { log: log.clone(), fail_instantiate: false, fail_update_at: None };
        let frames = FrameQueue::new();
        let mut ctl = RenderLoopController::new(
            crate::module::SyncLoader::new(move || -> Result<FakeModule> { Ok(module) }),
            FakeSurface { locks: Rc::default(), refuse_lock: false },
            Rc::new(frames.clone()),
            Rc::new(ManualClock::new()),
            ControllerConfig::default(),
        );

        ctl.on_mount();
        assert_eq!(ctl.phase(), Phase::Ready);
        assert_eq!(ctl.on_activate(PointerButtonEvent::click(1.0, 1.0)), Activation::Started);
        frames.run_frame();
        assert_eq!(log.borrow().renders, 1);
    }

    #[test]
    fn load_failure_leaves_surface_inert() {
        let mut h = Harness::new();
        h.ctl.on_mount();
        h.resolve_err();

        assert_eq!(h.ctl.phase(), Phase::Inert);
        assert!(h.ctl.last_error().unwrap().contains("wasm fetch failed"));
        assert_eq!(h.click(), Activation::Inert);
        assert_eq!(h.log.borrow().constructed, 0);
        assert_eq!(h.locks.get(), 0);
        assert!(!h.frames.has_pending());
    }

    #[test]
    fn load_failure_is_not_retried_on_remount() {
        let mut h = Harness::new();
        h.ctl.on_mount();
        h.resolve_err();
        h.ctl.on_unmount();
        h.ctl.on_mount();

        assert_eq!(h.loads.get(), 1);
        assert_eq!(h.ctl.phase(), Phase::Inert);
    }

    // ── activation ────────────────────────────────────────────────────────

    #[test]
    fn click_before_load_resolves_is_dropped() {
        let mut h = Harness::new();
        h.ctl.on_mount();

        assert_eq!(h.click(), Activation::NotReady);
        assert_eq!(h.log.borrow().constructed, 0);
        assert_eq!(h.locks.get(), 0);

        // Not queued: resolving the load does not start anything by itself.
        h.resolve_ok();
        assert_eq!(h.log.borrow().constructed, 0);
        assert!(!h.frames.has_pending());

        assert_eq!(h.click(), Activation::Started);
        assert_eq!(h.log.borrow().constructed, 1);
    }

    #[test]
    fn click_before_mount_is_ignored() {
        let mut h = Harness::new();
        assert_eq!(h.click(), Activation::Ignored);
        assert_eq!(h.loads.get(), 0);
    }

    #[test]
    fn clicks_during_a_background_load_are_not_replayed() {
        use std::sync::{mpsc, Arc, Mutex};

        use crate::module::BackgroundLoader;
        use crate::scheduler::{WakeQueue, WakeSignal};

        let log: Log = Rc::default();
        let locks = Rc::new(Cell::new(0));
        let wakes = WakeQueue::new();
        let (woke_tx, woke) = mpsc::channel::<()>();
        let woke_tx = Mutex::new(woke_tx);
        let wake: WakeSignal = Arc::new(move || {
            let _ = woke_tx.lock().map(|tx| tx.send(()));
        });
        let (gate, gate_rx) = mpsc::channel::<()>();

        let module_log = log.clone();
        let frames = FrameQueue::new();
        let mut ctl = RenderLoopController::new(
            BackgroundLoader::new(
                move || -> Result<()> {
                    gate_rx.recv()?;
                    Ok(())
                },
                move |()| -> Result<FakeModule> {
                    Ok(FakeModule { log: module_log, fail_instantiate: false, fail_update_at: None })
                },
                wakes.clone(),
                wake,
            ),
            FakeSurface { locks: locks.clone(), refuse_lock: false },
            Rc::new(frames.clone()),
            Rc::new(ManualClock::new()),
            ControllerConfig::default(),
        );

        ctl.on_mount();
        assert_eq!(ctl.phase(), Phase::Loading);
        let click = PointerButtonEvent::click(300.0, 200.0);
        assert_eq!(ctl.on_activate(click), Activation::NotReady);
        assert_eq!(ctl.on_activate(click), Activation::NotReady);

        gate.send(()).unwrap();
        woke.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(ctl.phase(), Phase::Loading);
        wakes.run();

        assert_eq!(ctl.phase(), Phase::Ready);
        assert_eq!(ctl.instances_created(), 0);
        assert_eq!(locks.get(), 0);
        assert!(!frames.has_pending());

        assert_eq!(ctl.on_activate(click), Activation::Started);
        assert_eq!(log.borrow().constructed, 1);
    }

    #[test]
    fn activation_locks_pointer_and_arms_first_frame() {
        let mut h = Harness::mounted_and_loaded();
        h.clock.set(Duration::from_millis(1234));

        assert_eq!(h.click(), Activation::Started);
        assert_eq!(h.locks.get(), 1);
        assert_eq!(h.ctl.phase(), Phase::Running);
        assert_eq!(h.ctl.started_at(), Some(Timestamp::from_duration(Duration::from_millis(1234))));
        assert_eq!(h.frames.pending_len(), 1);
    }

    #[test]
    fn clicks_while_live_construct_exactly_one_instance() {
        for extra_clicks in [1usize, 2, 5, 25] {
            let mut h = Harness::mounted_and_loaded();
            assert_eq!(h.click(), Activation::Started);

            for i in 0..extra_clicks {
                assert_eq!(h.click(), Activation::AlreadyRunning);
                if i % 2 == 0 {
                    h.refresh(16);
                }
            }

            assert_eq!(h.log.borrow().constructed, 1);
            assert_eq!(h.ctl.instances_created(), 1);
            assert_eq!(h.locks.get(), 1);
            assert_eq!(h.frames.pending_len(), 1);
        }
    }

    #[test]
    fn clicks_outside_surface_or_other_buttons_are_ignored() {
        let mut h = Harness::mounted_and_loaded();

        assert_eq!(h.ctl.on_activate(PointerButtonEvent::click(600.0, 10.0)), Activation::Ignored);
        assert_eq!(h.ctl.on_activate(PointerButtonEvent::click(-1.0, 10.0)), Activation::Ignored);

        let right = PointerButtonEvent {
            button: MouseButton::Right,
            state: MouseButtonState::Pressed,
            x: 10.0,
            y: 10.0,
        };
        assert_eq!(h.ctl.on_activate(right), Activation::Ignored);

        let release = PointerButtonEvent { state: MouseButtonState::Released, ..PointerButtonEvent::click(10.0, 10.0) };
        assert_eq!(h.ctl.on_activate(release), Activation::Ignored);

        assert_eq!(h.log.borrow().constructed, 0);
    }

    #[test]
    fn refused_pointer_lock_does_not_block_activation() {
        let mut h = Harness::with(FakeModuleOpts::default(), true, ControllerConfig::default());
        h.ctl.on_mount();
        h.resolve_ok();

        assert_eq!(h.click(), Activation::Started);
        assert_eq!(h.locks.get(), 1);
        assert!(h.ctl.is_running());
    }

    #[test]
    fn instantiate_failure_leaves_surface_inert() {
        let opts = FakeModuleOpts { fail_instantiate: true, ..Default::default() };
        let mut h = Harness::with(opts, false, ControllerConfig::default());
        h.ctl.on_mount();
        h.resolve_ok();

        assert_eq!(h.click(), Activation::Inert);
        assert_eq!(h.ctl.phase(), Phase::Inert);
        assert!(!h.frames.has_pending());
        assert_eq!(h.click(), Activation::Inert);
    }

    #[test]
    fn failed_start_does_not_capture_the_pointer() {
        let opts = FakeModuleOpts { fail_instantiate: true, ..Default::default() };
        let mut h = Harness::with(opts, false, ControllerConfig::default());
        h.ctl.on_mount();
        h.resolve_ok();

        assert_eq!(h.click(), Activation::Inert);
        assert_eq!(h.locks.get(), 0);
    }

    // ── frame loop ────────────────────────────────────────────────────────

    #[test]
    fn each_tick_updates_then_renders_and_rearms() {
        let mut h = Harness::mounted_and_loaded();
        h.click();

        for _ in 0..3 {
            assert_eq!(h.refresh(16), 1);
            assert_eq!(h.frames.pending_len(), 1);
        }

        let log = h.log.borrow();
        assert_eq!(log.order, ["u", "r", "u", "r", "u", "r"]);
        assert_eq!(log.renders, 3);
        for dt in &log.updates {
            assert!((dt - 0.016).abs() < 1e-6);
        }
    }

    #[test]
    fn first_delta_is_measured_from_activation() {
        let mut h = Harness::mounted_and_loaded();
        h.clock.set(Duration::from_millis(500));
        h.click();

        h.refresh(40);
        h.refresh(10);

        let updates = h.log.borrow().updates.clone();
        assert!((updates[0] - 0.040).abs() < 1e-6);
        assert!((updates[1] - 0.010).abs() < 1e-6);
    }

    #[test]
    fn delta_is_never_negative_after_backward_clock_jump() {
        let mut h = Harness::mounted_and_loaded();
        h.clock.set(Duration::from_secs(10));
        h.click();
        h.refresh(16);

        h.clock.rewind(Duration::from_secs(5));
        h.frames.run_frame();
        h.refresh(16);

        let updates = h.log.borrow().updates.clone();
        assert_eq!(updates.len(), 3);
        assert!(updates.iter().all(|dt| *dt >= 0.0));
        assert_eq!(updates[1], 0.0);
    }

    #[test]
    fn slow_frame_is_not_skipped() {
        let mut h = Harness::mounted_and_loaded();
        h.click();

        h.refresh(16);
        h.refresh(2_000);
        h.refresh(16);

        let updates = h.log.borrow().updates.clone();
        assert_eq!(updates.len(), 3);
        assert!((updates[1] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn dt_max_clamps_long_stalls_when_configured() {
        let config = ControllerConfig { dt_max: Some(Duration::from_millis(100)) };
        let mut h = Harness::with(FakeModuleOpts::default(), false, config);
        h.ctl.on_mount();
        h.resolve_ok();
        h.click();

        h.refresh(2_000);
        assert!((h.log.borrow().updates[0] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn frame_error_frees_instance_and_stops_loop() {
        let opts = FakeModuleOpts { fail_update_at: Some(2), ..Default::default() };
        let mut h = Harness::with(opts, false, ControllerConfig::default());
        h.ctl.on_mount();
        h.resolve_ok();
        h.click();

        h.refresh(16);
        h.refresh(16);
        h.refresh(16);

        assert_eq!(h.log.borrow().freed, 1);
        assert_eq!(h.log.borrow().renders, 2);
        assert!(!h.frames.has_pending());
        assert_eq!(h.ctl.phase(), Phase::Inert);
        assert!(h.ctl.last_error().unwrap().contains("camera exploded"));

        h.ctl.on_unmount();
        assert_eq!(h.log.borrow().freed, 1);
    }

    // ── teardown ──────────────────────────────────────────────────────────

    #[test]
    fn unmount_frees_live_instance_once() {
        let mut h = Harness::mounted_and_loaded();
        h.click();
        h.refresh(16);

        h.ctl.on_unmount();
        assert_eq!(h.log.borrow().freed, 1);
        assert_eq!(h.ctl.phase(), Phase::Unmounted);

        h.ctl.on_unmount();
        drop(h.ctl);
        assert_eq!(h.log.borrow().freed, 1);
    }

    #[test]
    fn no_update_or_render_after_unmount() {
        let mut h = Harness::mounted_and_loaded();
        h.click();
        h.refresh(16);
        let (updates, renders) = {
            let log = h.log.borrow();
            (log.updates.len(), log.renders)
        };

        h.ctl.on_unmount();
        assert_eq!(h.frames.run_frames(10), 0);
        h.refresh(16);

        let log = h.log.borrow();
        assert_eq!(log.updates.len(), updates);
        assert_eq!(log.renders, renders);
    }

    #[test]
    fn stray_callbacks_in_flight_at_teardown_are_suppressed() {
        let mut h = Harness::mounted_and_loaded();
        h.click();

        // Unrelated callbacks queued alongside the tick keep firing; only the
        // loop's own tick is suppressed.
        let frames = h.frames.clone();
        let stray = Rc::new(Cell::new(0u32));
        for _ in 0..3 {
            let s = stray.clone();
            frames.request_frame(Box::new(move || s.set(s.get() + 1)));
        }

        h.ctl.on_unmount();
        h.refresh(16);
        h.refresh(16);

        assert_eq!(stray.get(), 3);
        let log = h.log.borrow();
        assert!(log.updates.is_empty());
        assert_eq!(log.renders, 0);
        assert_eq!(log.freed, 1);
    }

    #[test]
    fn tick_checks_cancellation_flag_even_if_scheduler_fires_it() {
        // A scheduler that ignores `cancel_frame` (e.g. a callback already dequeued
        // by the host) must still not reach the instance.
        struct Leaky(FrameQueue);

        impl FrameScheduler for Leaky {
            fn request_frame(&self, cb: crate::scheduler::FrameCallback) -> FrameRequestId {
                self.0.request_frame(cb)
            }
            fn cancel_frame(&self, _id: FrameRequestId) {}
        }

        let log: Log = Rc::default();
        let module = FakeModule { log: log.clone(), fail_instantiate: false, fail_update_at: None };
        let frames = FrameQueue::new();
        let mut ctl = RenderLoopController::new(
            crate::module::SyncLoader::new(move || -> Result<FakeModule> { Ok(module) }),
            FakeSurface { locks: Rc::default(), refuse_lock: false },
            Rc::new(Leaky(frames.clone())),
            Rc::new(ManualClock::new()),
            ControllerConfig::default(),
        );

        ctl.on_mount();
        ctl.on_activate(PointerButtonEvent::click(5.0, 5.0));
        ctl.on_unmount();

        assert_eq!(frames.pending_len(), 1);
        assert_eq!(frames.run_frame(), 1);
        assert!(log.borrow().updates.is_empty());
        assert_eq!(log.borrow().renders, 0);
        assert!(!frames.has_pending());
    }

    #[test]
    fn remount_allows_a_fresh_instance() {
        let mut h = Harness::mounted_and_loaded();
        h.click();
        h.refresh(16);
        h.ctl.on_unmount();

        h.ctl.on_mount();
        assert_eq!(h.ctl.phase(), Phase::Ready);
        assert_eq!(h.click(), Activation::Started);
        h.refresh(16);

        let log = h.log.borrow();
        assert_eq!(log.constructed, 2);
        assert_eq!(log.freed, 1);
        assert_eq!(log.renders, 2);
        assert_eq!(h.frames.pending_len(), 1);
    }

    #[test]
    fn dropping_controller_frees_instance() {
        let mut h = Harness::mounted_and_loaded();
        h.click();
        let log = h.log.clone();
        let frames = h.frames.clone();
        drop(h);

        assert_eq!(log.borrow().freed, 1);
        assert_eq!(frames.run_frames(3), 0);
        assert!(log.borrow().updates.is_empty());
    }

    #[test]
    fn load_resolving_after_drop_is_harmless() {
        let mut h = Harness::new();
        h.ctl.on_mount();
        let pending = h.pending_load.clone();
        let module = h.module.borrow_mut().take().unwrap();
        drop(h);

        let done = pending.borrow_mut().take().unwrap();
        done(Ok(module));
    }
}
