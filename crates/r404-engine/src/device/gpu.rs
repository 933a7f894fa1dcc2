use std::sync::Arc;

use anyhow::{bail, Context, Result};
use wgpu::{CompositeAlphaMode, SurfaceError, TextureFormat};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::paint::Color;

use super::GpuInit;

/// Outcome of presenting one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Present {
    Shown,
    /// No frame was available; the surface was reconfigured when needed.
    Skipped,
}

/// First half of GPU setup: the surface bound to a window.
///
/// Must be created on the thread that owns the window. `connect` may then run
/// anywhere, since adapter and device requests can block for a long time.
pub struct GpuSetup {
    instance: wgpu::Instance,
    surface:  wgpu::Surface<'static>,
    size:     PhysicalSize<u32>,
}

impl GpuSetup {
    pub fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        Ok(Self { instance, surface, size })
    }

    /// Acquires an adapter and device and configures the surface.
    ///
    /// Asynchronous under wgpu; native callers drive it with `pollster::block_on`.
    pub async fn connect(self, init: GpuInit) -> Result<Gpu> {
        let Self { instance, surface, size } = self;
        let GpuInit {
            prefer_srgb,
            present_mode,
            alpha_mode,
            low_power,
            desired_maximum_frame_latency,
        } = init;

        let power_preference = if low_power {
            wgpu::PowerPreference::LowPower
        } else {
            wgpu::PowerPreference::HighPerformance
        };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("r404 device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = pick_format(&caps.formats, prefer_srgb).context("no supported surface formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode: pick_alpha(&caps.alpha_modes, alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);

        log::debug!(
            "gpu ready: {} ({:?}), {}x{} {:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            size.width,
            size.height,
            format
        );

        Ok(Gpu { surface, device, queue, config })
    }
}

/// wgpu device, queue and configured surface of one hosting window.
///
/// The surface holds its own `Arc<Window>`, so no borrowed lifetime ties the
/// context to the window.
pub struct Gpu {
    surface: wgpu::Surface<'static>,
    device:  wgpu::Device,
    queue:   wgpu::Queue,
    config:  wgpu::SurfaceConfiguration,
}

impl Gpu {
    pub fn surface_format(&self) -> TextureFormat {
        self.config.format
    }

    /// Clears the whole surface to `color` and presents it.
    ///
    /// Fails only when the GPU is out of memory; every other acquisition
    /// failure skips the frame.
    pub fn clear(&self, color: Color) -> Result<Present> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                return match skip_reason(err) {
                    Some(Reconfigure::Yes) => {
                        self.surface.configure(&self.device, &self.config);
                        Ok(Present::Skipped)
                    }
                    Some(Reconfigure::No) => Ok(Present::Skipped),
                    None => bail!("GPU out of memory while acquiring a frame"),
                };
            }
        };

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("r404 frame encoder"),
            });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("r404 clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view:           &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load:  wgpu::LoadOp::Clear(color.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes:         None,
            occlusion_query_set:      None,
            multiview_mask:           None,
        });

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(Present::Shown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reconfigure {
    Yes,
    No,
}

/// `None` when the error is fatal.
fn skip_reason(err: SurfaceError) -> Option<Reconfigure> {
    match err {
        SurfaceError::Lost | SurfaceError::Outdated => Some(Reconfigure::Yes),
        SurfaceError::Timeout | SurfaceError::Other => Some(Reconfigure::No),
        SurfaceError::OutOfMemory => None,
    }
}

fn pick_format(formats: &[TextureFormat], prefer_srgb: bool) -> Option<TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| f.is_srgb() == prefer_srgb)
        .or_else(|| formats.first().copied())
}

fn pick_alpha(modes: &[CompositeAlphaMode], requested: Option<CompositeAlphaMode>) -> CompositeAlphaMode {
    requested
        .filter(|mode| modes.contains(mode))
        .or_else(|| modes.first().copied())
        .unwrap_or(CompositeAlphaMode::Auto)
}
