mod audio;
mod keymap;
mod ui;

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use folio_common::WorldConfig;
use folio_render::{FrameView, MemoryCanvas, Renderer};
use folio_render_wgpu::{WgpuFrame, WgpuRenderer};
use folio_session::{AnchorHandle, Overlay, Session};
use glam::Mat4;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::audio::KiraSink;
use crate::ui::{OverlayUi, TouchPad};

#[derive(Parser)]
#[command(name = "folio-desktop", about = "Walk through the portfolio world")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// World configuration (YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Looping ambience track (OGG or WAV)
    #[arg(long)]
    ambience: Option<PathBuf>,
}

/// Window, device and UI renderer, created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Folio")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("folio_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, format, config.width, config.height);
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );
        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn paint_ui(&mut self, view: &wgpu::TextureView, output: egui::FullOutput, ctx: &EguiContext) {
        self.egui_winit
            .handle_platform_output(&self.window, output.platform_output);
        let paint_jobs = ctx.tessellate(output.shapes, output.pixels_per_point);
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: output.pixels_per_point,
        };
        for (id, delta) in &output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer.render(&mut pass, &paint_jobs, &screen);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

struct App {
    world_config: WorldConfig,
    ambience: Option<PathBuf>,
    overlay: Rc<RefCell<Overlay>>,
    session: Option<Session>,
    anchors: Option<AnchorHandle>,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    touch: TouchPad,
    show_inspector: bool,
}

impl App {
    fn new(world_config: WorldConfig, ambience: Option<PathBuf>) -> Self {
        let overlay = Rc::new(RefCell::new(Overlay::new(world_config.overlay.bubble_capacity)));
        Self {
            world_config,
            ambience,
            overlay,
            session: None,
            anchors: None,
            gpu: None,
            egui_ctx: EguiContext::default(),
            touch: TouchPad::default(),
            show_inspector: false,
        }
    }

    fn mount(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        let mut session = Session::mount(
            self.world_config.clone(),
            self.overlay.clone(),
            Box::new(MemoryCanvas::new()),
            Box::new(KiraSink::new(self.ambience.as_deref())),
            Instant::now(),
        )?;
        session.resize(size.width, size.height);
        self.anchors = session.anchor_handle();
        self.session = Some(session);
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(session) = &mut self.session {
            session.unmount();
        }
        self.anchors = None;
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let frame: Option<FrameView> = match self.session.as_mut().map(|s| s.frame(Instant::now())) {
            Some(Ok(frame)) => Some(frame),
            Some(Err(e)) => {
                tracing::error!("frame failed: {e}");
                self.shutdown(event_loop);
                return;
            }
            None => None,
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut view_proj = Mat4::IDENTITY;
        if let Some(frame) = &frame {
            let drawn = WgpuFrame {
                renderer: &gpu.renderer,
                device: &gpu.device,
                queue: &gpu.queue,
                target: &view,
            }
            .render(frame);
            tracing::trace!(drawn, "frame drawn");
            view_proj = gpu.renderer.view_projection(frame);
        }

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let size_px = [gpu.config.width, gpu.config.height];
        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| {
            if self.show_inspector {
                if let Some(session) = &self.session {
                    ui::draw_inspector(ctx, session);
                }
            }
            let mut overlay = self.overlay.borrow_mut();
            OverlayUi {
                overlay: &mut overlay,
                session: self.session.as_mut(),
                anchors: self.anchors.as_ref(),
                frame: frame.as_ref(),
                view_proj,
                size_px,
            }
            .draw(ctx, &mut self.touch);
        });
        gpu.paint_ui(&view, full_output, &ctx);

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        let gpu = match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => gpu,
            Err(e) => {
                tracing::error!("failed to initialize graphics: {e:#}");
                event_loop.exit();
                return;
            }
        };
        let size = gpu.window.inner_size();
        self.gpu = Some(gpu);
        if let Err(e) = self.mount(size) {
            tracing::error!("failed to mount world: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                }
                if let Some(session) = &mut self.session {
                    session.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                let pressed = state == ElementState::Pressed;
                if key == KeyCode::F1 && pressed && !repeat {
                    self.show_inspector = !self.show_inspector;
                }
                if let (Some(session), Some(code)) = (&self.session, keymap::dom_code(key)) {
                    let disposition = session.sampler().key_event(code, pressed);
                    tracing::trace!(code, pressed, ?disposition, "key");
                }
            }
            WindowEvent::Focused(false) => {
                // Keys released while unfocused never arrive.
                if let Some(session) = &self.session {
                    session.sampler().release_all();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let world_config = match &cli.config {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };
    tracing::info!(layout = ?world_config.hub.layout, "folio-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(world_config, cli.ambience);
    event_loop.run_app(&mut app)?;
    Ok(())
}
