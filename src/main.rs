use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window, WindowId},
};

use flycam::config::{AppConfig, LookSource};
use flycam::controller::{FrameClock, FrameLoopContext, InputEvent};
use flycam::model::{material, scene};
use flycam::utils::Mesh;
use flycam::view::{GpuContext, Renderer, CLEAR_COLOR};
use flycam::{logging, ui};

const DEFAULT_CONFIG_FILE: &str = "flycam.toml";
/// Pixels of touchpad scroll that count as one wheel notch.
const PIXELS_PER_LINE: f32 = 40.0;

#[derive(Parser, Debug, Clone)]
#[command(name = "flycam")]
#[command(about = "Fly a first-person camera through the tutorial cube scene", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults to ./flycam.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Start with the cursor released
    #[arg(long = "no-capture")]
    no_capture: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long = "dump-config")]
    dump_config: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading configuration");
            AppConfig::load(path).with_context(|| format!("reading config {}", path.display()))?
        }
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            tracing::info!(path = DEFAULT_CONFIG_FILE, "loading configuration");
            AppConfig::load(Path::new(DEFAULT_CONFIG_FILE))
                .with_context(|| format!("reading config {DEFAULT_CONFIG_FILE}"))?
        }
        None => {
            tracing::info!("no config file, using defaults");
            AppConfig::default()
        }
    };

    if let Some(width) = cli.width {
        config.window.width = width;
    }
    if let Some(height) = cli.height {
        config.window.height = height;
    }
    if cli.no_capture {
        config.controls.start_captured = false;
    }
    Ok(config)
}

/// GPU-side state, created once the event loop hands us a window.
struct Graphics {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: Renderer,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Graphics {
    fn new(window: Arc<Window>, frame: &FrameLoopContext, config: &AppConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let gpu = pollster::block_on(GpuContext::new(window.clone(), size.width, size.height))
            .context("initialising GPU")?;

        let renderer = Renderer::new(
            &gpu,
            &Mesh::new(scene::cube_vertices()),
            frame.materials(),
            &config.assets,
            frame.scene.objects.len(),
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(&gpu.device, gpu.format, egui_wgpu::RendererOptions::default());

        Ok(Self {
            window,
            gpu,
            renderer,
            egui_ctx,
            egui_state,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if self.gpu.resize(size.width, size.height) {
            self.renderer.resize(&self.gpu.device, size.width, size.height);
        }
    }

    fn set_capture(&self, captured: bool, look_source: LookSource) {
        let grab = if !captured {
            self.window.set_cursor_grab(CursorGrabMode::None)
        } else {
            let (first, second) = match look_source {
                LookSource::Raw => (CursorGrabMode::Locked, CursorGrabMode::Confined),
                LookSource::Cursor => (CursorGrabMode::Confined, CursorGrabMode::Locked),
            };
            self.window
                .set_cursor_grab(first)
                .or_else(|_| self.window.set_cursor_grab(second))
        };
        if let Err(err) = grab {
            tracing::warn!(%err, captured, "cursor grab mode not supported");
        }
        self.window.set_cursor_visible(!captured);
    }

    fn render(&mut self, frame: &FrameLoopContext, material_index: usize) -> Result<(), wgpu::SurfaceError> {
        let output = self.gpu.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| ui::draw_hud(ctx, frame));
        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);
        let pixels_per_point = self.window.scale_factor() as f32;
        let primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
            pixels_per_point,
        };

        let device = self.gpu.device.as_ref();
        let queue = self.gpu.queue.as_ref();
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let egui_commands = self.egui_renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &primitives,
            &screen_descriptor,
        );

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.renderer.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer.draw(&mut pass, material_index);
        }

        {
            let egui_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &primitives, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        queue.submit(egui_commands.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();
        Ok(())
    }
}

struct App {
    config: AppConfig,
    frame: FrameLoopContext,
    clock: FrameClock,
    graphics: Option<Graphics>,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let materials = material::catalogue(config.assets.emission_map.is_some());
        let frame = FrameLoopContext::new(&config, materials);
        let clock = FrameClock::new(config.controls.max_frame_time);
        Self {
            config,
            frame,
            clock,
            graphics: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn set_capture(&mut self, captured: bool) {
        self.frame.input.set_captured(captured);
        if let Some(gfx) = &self.graphics {
            gfx.set_capture(captured, self.config.controls.look_source);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gfx) = self.graphics.as_mut() else {
            return;
        };
        let elapsed = self.clock.tick();
        let output = self.frame.update(elapsed, gfx.gpu.aspect_ratio());
        if output.quit {
            tracing::info!("quit requested");
            event_loop.exit();
            return;
        }
        if let Some(captured) = output.capture_changed {
            gfx.set_capture(captured, self.config.controls.look_source);
        }

        gfx.renderer.write_frame(&gfx.gpu.queue, &output);
        match gfx.render(&self.frame, output.material_index) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = gfx.window.inner_size();
                gfx.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, anyhow::anyhow!("GPU out of memory"));
            }
            Err(err) => tracing::warn!(%err, "frame skipped"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        let attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, anyhow::Error::new(err).context("creating window")),
        };

        match Graphics::new(window, &self.frame, &self.config) {
            Ok(gfx) => {
                gfx.set_capture(self.frame.input.is_captured(), self.config.controls.look_source);
                self.graphics = Some(gfx);
                self.clock.reset();
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(gfx) = self.graphics.as_mut() else {
            return;
        };
        let consumed = gfx.egui_state.on_window_event(&gfx.window, &event).consumed;
        // While captured the HUD is not interactive, so the camera sees everything.
        if consumed && !self.frame.input.is_captured() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => gfx.resize(size),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                let key = format!("{code:?}");
                match state {
                    ElementState::Pressed if !repeat => {
                        self.frame.input.process_event(&InputEvent::KeyDown(key))
                    }
                    ElementState::Released => self.frame.input.process_event(&InputEvent::KeyUp(key)),
                    _ => {}
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.frame.input.process_event(&InputEvent::CursorMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                self.frame.input.process_event(&InputEvent::Scroll { dy });
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } if !self.frame.input.is_captured() => {
                tracing::info!("cursor captured by click");
                self.set_capture(true);
            }
            WindowEvent::Focused(false) => {
                self.frame.input.process_event(&InputEvent::FocusLost);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.frame.input.process_event(&InputEvent::MouseMotion {
                dx: delta.0 as f32,
                dy: delta.1 as f32,
            });
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gfx) = &self.graphics {
            gfx.window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init();

    let config = load_config(&cli)?;
    if cli.dump_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let event_loop = EventLoop::new().context("creating event loop")?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app).context("running event loop")?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
