mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Cli, ViewerConfig};
use egui::Context as EguiContext;
use heightfield_assets::{Heightmap, TextureUnitAllocator, load_heightmap, load_shader_source};
use heightfield_input::{Action, HeightScale, HeldActions};
use heightfield_mesh::GridMesh;
use heightfield_render::TerrainView;
use heightfield_render_wgpu::{HeightmapTexture, TERRAIN_SHADER, TEXTURE_GROUP_BASE, TerrainRenderer};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Key bindings. Keypad and main-row +/- both adjust the height scale.
fn key_action(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::NumpadAdd | KeyCode::Equal => Some(Action::RaiseTerrain),
        KeyCode::NumpadSubtract | KeyCode::Minus => Some(Action::LowerTerrain),
        KeyCode::KeyR => Some(Action::ResetScale),
        KeyCode::F1 => Some(Action::ToggleOverlay),
        KeyCode::Escape => Some(Action::Quit),
        _ => None,
    }
}

fn released_key(event: &WindowEvent) -> Option<KeyCode> {
    match event {
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(key),
                    state: ElementState::Released,
                    ..
                },
            ..
        } => Some(*key),
        _ => None,
    }
}

/// Prefer a non-sRGB format: the fragment stage writes the raw height sample
/// and the clear color is given as stored values.
fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first())
        .copied()
}

/// Application state.
struct AppState {
    config: ViewerConfig,
    heightmap: Heightmap,
    mesh: GridMesh,
    shader_source: String,
    view: TerrainView,
    scale: HeightScale,
    held: HeldActions,
    show_overlay: bool,
    last_frame: Instant,
    /// Exponentially smoothed frame time in seconds.
    frame_time: f32,
}

impl AppState {
    fn new(config: ViewerConfig) -> Result<Self> {
        let heightmap = load_heightmap(&config.heightmap)
            .with_context(|| format!("failed to load heightmap {}", config.heightmap.display()))?;

        let size = config.grid.unwrap_or_else(|| heightmap.size());
        let mesh = GridMesh::from_size(size);

        let shader_source = match &config.shader {
            Some(path) => load_shader_source(path)?,
            None => TERRAIN_SHADER.to_string(),
        };

        let (lo, hi) = heightmap.height_range();
        tracing::info!(
            "grid {size}: {} vertices, {} indices, heights {lo:.3}..{hi:.3}",
            mesh.vertex_count(),
            mesh.index_count()
        );

        Ok(Self {
            view: config.terrain_view(),
            scale: HeightScale::new(config.initial_scale, config.scale_rate),
            heightmap,
            mesh,
            shader_source,
            config,
            held: HeldActions::new(),
            show_overlay: true,
            last_frame: Instant::now(),
            frame_time: 0.0,
        })
    }

    fn update(&mut self, dt: f32) {
        self.scale.update(&self.held, dt);
        self.frame_time = if self.frame_time == 0.0 {
            dt
        } else {
            self.frame_time * 0.9 + dt * 0.1
        };
    }

    /// Returns `true` when the viewer should close.
    fn handle_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        let Some(action) = key_action(key) else {
            return false;
        };
        if !self.held.set(action, pressed) {
            return false;
        }

        match action {
            Action::ResetScale => {
                self.scale.reset();
                tracing::info!("height scale reset to {}", self.scale.value());
            }
            Action::ToggleOverlay => {
                self.show_overlay = !self.show_overlay;
            }
            Action::Quit => return true,
            Action::RaiseTerrain | Action::LowerTerrain => {}
        }
        false
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_overlay {
            return;
        }

        egui::Window::new("Terrain")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!(
                    "Heightmap: {}x{}",
                    self.heightmap.width(),
                    self.heightmap.height()
                ));
                ui.label(format!("Grid: {}x{}", self.mesh.width(), self.mesh.height()));
                ui.label(format!(
                    "Vertices: {}  Indices: {}",
                    self.mesh.vertex_count(),
                    self.mesh.index_count()
                ));
                if self.frame_time > 0.0 {
                    ui.label(format!(
                        "Frame: {:.2} ms ({:.0} fps)",
                        self.frame_time * 1000.0,
                        1.0 / self.frame_time
                    ));
                }
                ui.separator();

                let mut value = self.scale.value();
                if ui
                    .add(egui::Slider::new(&mut value, -100.0..=200.0).text("Height scale"))
                    .changed()
                {
                    self.scale.set(value);
                }
                if ui.button("Reset (R)").clicked() {
                    self.scale.reset();
                }

                ui.separator();
                ui.small("+/-: Height | R: Reset | F1: Overlay | Esc: Quit");
            });
    }
}

/// Window and GPU resources, created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: TerrainRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, state: &mut AppState, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(state.config.title.clone())
            .with_inner_size(PhysicalSize::new(
                state.config.window_width,
                state.config.window_height,
            ));
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
                label: Some("heightfield_device"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = pick_surface_format(&surface_caps.formats)
            .context("surface reports no texture formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        state.view.set_viewport(config.width, config.height);

        let texture_slots = device.limits().max_bind_groups.saturating_sub(TEXTURE_GROUP_BASE);
        let mut units = TextureUnitAllocator::new(texture_slots);
        let heightmap = HeightmapTexture::new(
            &device,
            &queue,
            &state.heightmap,
            &mut units,
            state.config.address_mode,
        )?;

        let renderer = TerrainRenderer::new(
            &device,
            surface_format,
            config.width,
            config.height,
            &state.mesh,
            heightmap,
            &state.shader_source,
        )?;

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

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

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn draw_overlay(
        &mut self,
        view: &wgpu::TextureView,
        egui_ctx: &EguiContext,
        state: &mut AppState,
    ) {
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });

        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
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
            &screen_descriptor,
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
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

struct ViewerApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    init_error: Option<anyhow::Error>,
}

impl ViewerApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
            init_error: None,
        }
    }

    /// Exit status once the event loop returns.
    fn finish(self) -> Result<()> {
        match self.init_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
        self.state.last_frame = now;
        self.state.update(dt);

        let Some(gpu) = &mut self.gpu else {
            return;
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

        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            &self.state.view,
            self.state.scale.value(),
            self.state.config.clear_color(),
        );
        gpu.draw_overlay(&view, &self.egui_ctx, &mut self.state);

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::new(event_loop, &mut self.state, &self.egui_ctx) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
                self.init_error = Some(e.context("failed to initialize GPU"));
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                // Releases still reach the held set so no action sticks.
                if let Some(key) = released_key(&event) {
                    self.state.handle_key(key, false);
                }
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                    self.state
                        .view
                        .set_viewport(gpu.config.width, gpu.config.height);
                }
            }
            WindowEvent::Focused(false) => {
                self.state.held.clear();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if self
                    .state
                    .handle_key(key, key_state == ElementState::Pressed)
                {
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
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
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    tracing::info!("heightfield-viewer starting");

    let config = ViewerConfig::resolve(&cli)?;
    let state = AppState::new(config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(state);
    event_loop.run_app(&mut app)?;

    app.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypad_and_main_row_adjust_scale() {
        assert_eq!(key_action(KeyCode::NumpadAdd), Some(Action::RaiseTerrain));
        assert_eq!(key_action(KeyCode::Equal), Some(Action::RaiseTerrain));
        assert_eq!(key_action(KeyCode::NumpadSubtract), Some(Action::LowerTerrain));
        assert_eq!(key_action(KeyCode::Minus), Some(Action::LowerTerrain));
    }

    #[test]
    fn unbound_keys_ignored() {
        assert_eq!(key_action(KeyCode::KeyW), None);
    }

    fn state_with_ramp() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.png");
        let pixels: Vec<u8> = (0..16u8).map(|v| v * 16).collect();
        std::fs::write(&path, encode_gray_png(4, 4, &pixels)).unwrap();
        let config = ViewerConfig {
            heightmap: path,
            ..ViewerConfig::default()
        };
        let state = AppState::new(config).unwrap();
        (dir, state)
    }

    fn encode_gray_png(width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
        use image::ImageEncoder;
        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(pixels, width, height, image::ExtendedColorType::L8)
            .unwrap();
        out
    }

    #[test]
    fn mesh_follows_image_size() {
        let (_dir, state) = state_with_ramp();
        assert_eq!(state.mesh.width(), 4);
        assert_eq!(state.mesh.vertex_count(), 4 * 4 * 4);
        assert_eq!(state.shader_source, TERRAIN_SHADER);
    }

    #[test]
    fn holding_raise_grows_scale() {
        let (_dir, mut state) = state_with_ramp();
        assert!(!state.handle_key(KeyCode::NumpadAdd, true));
        state.update(0.5);
        assert_eq!(state.scale.value(), 40.0);

        state.handle_key(KeyCode::NumpadAdd, false);
        state.update(0.5);
        assert_eq!(state.scale.value(), 40.0);

        state.handle_key(KeyCode::KeyR, true);
        assert_eq!(state.scale.value(), 10.0);
    }

    #[test]
    fn surface_format_avoids_srgb() {
        use wgpu::TextureFormat::{Bgra8Unorm, Bgra8UnormSrgb};
        assert_eq!(pick_surface_format(&[Bgra8UnormSrgb, Bgra8Unorm]), Some(Bgra8Unorm));
        assert_eq!(pick_surface_format(&[Bgra8UnormSrgb]), Some(Bgra8UnormSrgb));
        assert_eq!(pick_surface_format(&[]), None);
    }

    #[test]
    fn release_clears_held_raise() {
        let (_dir, mut state) = state_with_ramp();
        state.handle_key(KeyCode::NumpadAdd, true);
        state.handle_key(KeyCode::NumpadAdd, false);
        assert!(!state.held.is_held(Action::RaiseTerrain));
        state.update(1.0);
        assert_eq!(state.scale.value(), 10.0);
    }

    #[test]
    fn failed_gpu_init_fails_the_run() {
        let (_dir, state) = state_with_ramp();
        assert!(ViewerApp::new(state).finish().is_ok());

        let (_dir, state) = state_with_ramp();
        let mut app = ViewerApp::new(state);
        app.init_error = Some(anyhow::anyhow!("no adapter").context("failed to initialize GPU"));
        let err = app.finish().unwrap_err();
        assert!(format!("{err:#}").contains("no adapter"));
    }

    #[test]
    fn escape_requests_quit() {
        let (_dir, mut state) = state_with_ramp();
        assert!(state.handle_key(KeyCode::Escape, true));
    }

    #[test]
    fn f1_toggles_overlay() {
        let (_dir, mut state) = state_with_ramp();
        state.handle_key(KeyCode::F1, true);
        assert!(!state.show_overlay);
        state.handle_key(KeyCode::F1, false);
        state.handle_key(KeyCode::F1, true);
        assert!(state.show_overlay);
    }

    #[test]
    fn missing_heightmap_fails_with_path() {
        let config = ViewerConfig {
            heightmap: "does/not/exist.png".into(),
            ..ViewerConfig::default()
        };
        let err = AppState::new(config).err().unwrap();
        assert!(format!("{err:#}").contains("exist.png"));
    }
}
