use std::sync::Arc;

use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event_loop::EventLoopWindowTarget;
use winit::window::{Fullscreen, Window, WindowBuilder};

use super::WindowBackend;
use crate::config::{LiveConfig, WindowMode};
use crate::error::{window_error, ShellError, ShellResult};

/// Surface, device and queue for presenting into the window
struct GpuSurface {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
}

impl GpuSurface {
    async fn new(window: Arc<Window>) -> ShellResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| window_error(format!("surface creation failed: {}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| window_error("no compatible GPU adapter"))?;
        log::info!("[winit_backend] Using adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Shell Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await
            .map_err(|e| window_error(format!("device request failed: {}", e)))?;

        let size = window.inner_size();
        let mut config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or_else(|| window_error("surface is not supported by the adapter"))?;
        config.present_mode = wgpu::PresentMode::AutoVsync;
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }
}

/// Native window presenting through wgpu.
///
/// Frames are a clear pass whose colour drifts with the frame count, enough to
/// see the loop is alive.
pub struct WinitWindow {
    window: Arc<Window>,
    gpu: Option<GpuSurface>,
    frames: u64,
}

/// A live size of zero is kept in the configuration, but the native window
/// needs at least one pixel on each axis
fn clamp_size(width: u32, height: u32) -> (u32, u32) {
    (width.max(1), height.max(1))
}

impl WinitWindow {
    /// Create the window with the configuration currently live
    pub fn new(target: &EventLoopWindowTarget<()>, live: &LiveConfig) -> ShellResult<Self> {
        log::info!("[winit_backend] Creating window...");
        let (width, height) = clamp_size(live.width, live.height);
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(live.display_name.as_str())
                .with_inner_size(LogicalSize::new(width, height))
                .build(target)
                .map_err(|e| {
                    log::error!("[winit_backend] Window creation failed: {}", e);
                    window_error(e)
                })?,
        );

        let gpu = pollster::block_on(GpuSurface::new(window.clone()))?;
        log::info!("[winit_backend] Window created successfully");

        let mut created = Self {
            window,
            gpu: Some(gpu),
            frames: 0,
        };
        created.set_window_mode(live.window_mode);
        Ok(created)
    }

    /// Shared handle for the event loop (id, redraw requests)
    pub fn handle(&self) -> Arc<Window> {
        self.window.clone()
    }

    fn clear_color(&self) -> wgpu::Color {
        let t = self.frames as f64 * 0.01;
        wgpu::Color {
            r: 0.10 + 0.05 * t.sin(),
            g: 0.12 + 0.05 * (t * 0.7).sin(),
            b: 0.18 + 0.05 * (t * 0.3).sin(),
            a: 1.0,
        }
    }
}

impl WindowBackend for WinitWindow {
    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn set_size(&mut self, width: u32, height: u32) {
        let (width, height) = clamp_size(width, height);
        if let Some(applied) = self.window.request_inner_size(LogicalSize::new(width, height)) {
            if let Some(gpu) = self.gpu.as_mut() {
                gpu.resize(applied);
            }
        }
    }

    fn set_window_mode(&mut self, mode: WindowMode) {
        match mode {
            WindowMode::Fullscreen => self.window.set_fullscreen(Some(Fullscreen::Borderless(None))),
            WindowMode::Windowed => self.window.set_fullscreen(None),
            WindowMode::Unknown => {}
        }
    }

    fn render_frame(&mut self) -> ShellResult<()> {
        let color = self.clear_color();
        let size = self.window.inner_size();
        let Some(gpu) = self.gpu.as_mut() else {
            return Ok(());
        };

        if size.width != gpu.config.width || size.height != gpu.config.height {
            gpu.resize(size);
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("[winit_backend] Surface lost, reconfiguring");
                gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(ShellError::Render {
                    message: "out of memory acquiring surface texture".to_string(),
                });
            }
            Err(e) => {
                log::warn!("[winit_backend] Skipping frame: {}", e);
                return Ok(());
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        self.frames += 1;
        Ok(())
    }

    fn destroy(&mut self) {
        if self.gpu.take().is_some() {
            self.window.set_visible(false);
            log::info!("[winit_backend] Released surface after {} frames", self.frames);
        }
    }
}
