use std::rc::Rc;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::window::{Window, WindowId};

use crate::core::{HostCtx, View};
use crate::input::platform::winit::{translate_device_event, translate_window_event};
use crate::input::{InputEvent, InputState, Key, KeyState, SharedInput};
use crate::scheduler::{FrameQueue, WakeQueue, WakeSignal};
use crate::surface::release_pointer_lock;
use crate::time::MonotonicClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// The hosting surface has fixed pixel dimensions; resizing is off by default.
    pub resizable: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "r404".to_string(),
            initial_size: LogicalSize::new(600.0, 400.0),
            resizable: false,
        }
    }
}

/// User events sent through the event-loop proxy.
#[derive(Debug, Clone, Copy)]
enum HostEvent {
    /// Background work finished; run the wake queue.
    Wake,
}

fn wake_signal(proxy: EventLoopProxy<HostEvent>) -> WakeSignal {
    let proxy = Mutex::new(proxy);
    Arc::new(move || {
        let sent = proxy
            .lock()
            .map(|proxy| proxy.send_event(HostEvent::Wake).is_ok())
            .unwrap_or(false);
        if !sent {
            log::debug!("wake dropped: event loop is gone");
        }
    })
}

/// Entry point for the native host.
///
/// Plays the role a browser plays for the web build: it shows the page
/// (mount), forwards clicks, fires frame callbacks once per redraw and removes
/// the page when the window closes (unmount).
pub struct Runtime;

impl Runtime {
    /// Runs the event loop until the window closes.
    ///
    /// `build` is called once, after the window exists, to construct the page.
    pub fn run<V, F>(config: RuntimeConfig, build: F) -> Result<()>
    where
        V: View,
        F: FnOnce(&HostCtx) -> Result<V>,
    {
        let event_loop = EventLoop::<HostEvent>::with_user_event()
            .build()
            .context("failed to create winit EventLoop")?;
        let mut state = HostState::new(config, build, wake_signal(event_loop.create_proxy()));

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct HostState<V, F> {
    config: RuntimeConfig,
    build: Option<F>,

    window: Option<Arc<Window>>,
    view: Option<V>,

    input: SharedInput,
    frames: FrameQueue,
    clock: Rc<MonotonicClock>,
    wakes: WakeQueue,
    wake: WakeSignal,

    exit_requested: bool,
    fatal: Option<anyhow::Error>,
}

impl<V, F> HostState<V, F>
where
    V: View,
    F: FnOnce(&HostCtx) -> Result<V>,
{
    fn new(config: RuntimeConfig, build: F, wake: WakeSignal) -> Self {
        Self {
            config,
            build: Some(build),
            window: None,
            view: None,
            input: InputState::shared(),
            frames: FrameQueue::new(),
            clock: Rc::new(MonotonicClock::new()),
            wakes: WakeQueue::new(),
            wake,
            exit_requested: false,
            fatal: None,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn mount(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(self.config.resizable);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let build = self.build.take().context("page was already built")?;
        let ctx = HostCtx {
            window: window.clone(),
            input: self.input.clone(),
            frames: self.frames.clone(),
            clock: self.clock.clone(),
            wakes: self.wakes.clone(),
            wake: self.wake.clone(),
        };
        let mut view = build(&ctx).context("failed to build page")?;

        log::debug!("mounting page");
        view.on_mount();

        self.view = Some(view);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn unmount(&mut self) {
        if let Some(mut view) = self.view.take() {
            log::debug!("unmounting page");
            view.on_unmount();
        }
        if let Some(window) = &self.window {
            release_pointer_lock(window);
        }
    }

    fn handle_input(&mut self, window: &Window, ev: InputEvent) {
        self.input.borrow_mut().apply_event(&ev);

        match ev {
            InputEvent::PointerButton(pb) => {
                if let Some(view) = self.view.as_mut() {
                    view.on_pointer(pb);
                }
            }
            // Platform-owned pointer lock release: escape gesture or focus loss.
            InputEvent::Key {
                key: Key::Escape,
                state: KeyState::Pressed,
            }
            | InputEvent::Focused(false) => release_pointer_lock(window),
            _ => {}
        }
    }
}

impl<V, F> ApplicationHandler<HostEvent> for HostState<V, F>
where
    V: View,
    F: FnOnce(&HostCtx) -> Result<V>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.exit_requested {
            return;
        }

        if let Err(e) = self.mount(event_loop) {
            log::error!("failed to show page: {e:#}");
            self.fatal = Some(e);
            self.request_exit(event_loop);
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: HostEvent) {
        match event {
            HostEvent::Wake => {
                let fired = self.wakes.run();
                log::trace!("wake: {fired} callback(s)");
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Redraw only while a frame callback is armed; an idle page costs nothing.
        if self.frames.has_pending() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        let translated = {
            let input = self.input.borrow();
            translate_window_event(&window, &input, &event)
        };
        if let Some(ev) = translated {
            self.handle_input(&window, ev);
        }

        match event {
            WindowEvent::CloseRequested => {
                self.unmount();
                self.request_exit(event_loop);
            }
            WindowEvent::RedrawRequested => {
                let fired = self.frames.run_frame();
                log::trace!("refresh {}: {fired} callback(s)", self.frames.frames_run());
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(ev) = translate_device_event(&event) {
            self.input.borrow_mut().apply_event(&ev);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.unmount();
    }
}
