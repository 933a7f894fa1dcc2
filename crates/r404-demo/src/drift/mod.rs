//! "drift": a small free-flying camera that paints the window with the color
//! of wherever it looks.

pub mod camera;

use std::rc::Rc;

use anyhow::{bail, Context, Result};

use r404_engine::core::HostCtx;
use r404_engine::device::{Gpu, GpuInit, GpuSetup, Present};
use r404_engine::input::SharedInput;
use r404_engine::module::{BackgroundLoader, GameInstance, GameModule, ModuleLoader};
use r404_engine::paint::Color;

use camera::Camera;

/// Loader that binds a GPU surface to the hosting window and connects to the
/// device on a worker thread.
pub fn loader(host: &HostCtx) -> Result<impl ModuleLoader<Module = DriftModule> + use<>> {
    let setup = GpuSetup::new(host.window.clone()).context("failed to create drift surface")?;
    let input = host.input.clone();

    Ok(BackgroundLoader::new(
        move || {
            pollster::block_on(setup.connect(GpuInit::default()))
                .context("failed to initialize GPU for drift")
        },
        move |gpu: Gpu| {
            log::info!("drift loaded ({:?})", gpu.surface_format());
            Ok(DriftModule { gpu: Rc::new(gpu), input })
        },
        host.wakes.clone(),
        host.wake.clone(),
    ))
}

/// Loaded runtime: the GPU context plus access to the shared input state.
pub struct DriftModule {
    gpu: Rc<Gpu>,
    input: SharedInput,
}

impl GameModule for DriftModule {
    type Instance = DriftGame;

    fn instantiate(&mut self) -> Result<DriftGame> {
        // Motion from before the click must not turn the new camera.
        self.input.borrow_mut().take_mouse_delta();

        Ok(DriftGame {
            gpu: Some(self.gpu.clone()),
            input: self.input.clone(),
            camera: Camera::new(),
        })
    }
}

pub struct DriftGame {
    gpu: Option<Rc<Gpu>>,
    input: SharedInput,
    camera: Camera,
}

impl GameInstance for DriftGame {
    fn update(&mut self, dt: f32) -> Result<()> {
        let mut input = self.input.borrow_mut();
        let mouse = input.take_mouse_delta();
        self.camera.update(dt, |key| input.key_down(key), mouse);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let Some(gpu) = self.gpu.as_ref() else {
            bail!("drift instance rendered after free");
        };

        let [r, g, b] = self.camera.shade();
        if gpu.clear(Color::from_straight(r, g, b, 1.0))? == Present::Skipped {
            log::debug!("drift: frame skipped");
        }
        Ok(())
    }

    fn free(&mut self) {
        log::debug!("drift instance freed at {:?}", self.camera.pos);
        self.gpu = None;
    }
}
