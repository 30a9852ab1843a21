use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};
use std::sync::Arc;
use std::time::Instant;

// Import from the library crate
use starlance::{logging, ui};
use starlance::controller::{FrameLoopContext, InputState};
use starlance::view::{render, GpuContext, RenderState};

struct App {
    // Core GPU resources
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    window: Arc<Window>,

    // Rendering state
    depth_view: wgpu::TextureView,
    cam_buf: wgpu::Buffer,
    cam_bg: wgpu::BindGroup,
    render_state: RenderState,

    // egui
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,

    // Game state
    frame_ctx: FrameLoopContext,
    input_state: InputState,

    // Frame timing
    start_time: Instant,
    last_frame_time: Instant,
}

impl App {
    async fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        // Initialize wgpu
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone()).unwrap();
        let gpu = GpuContext::new_native(&instance, surface, size.width, size.height).await;

        let device = gpu.device.clone();
        let queue = gpu.queue.clone();
        let config = gpu.config.clone();

        let (_, depth_view) = render::create_depth_texture(&device, size.width, size.height);

        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0xC0FFEE);
        let frame_ctx = FrameLoopContext::new(seed, size.width, size.height);

        let camera_resources = render::create_camera_resources(&device);
        let entity_resources = render::create_entity_resources(&device);
        let render_state = RenderState::new(
            &device,
            config.format,
            config.alpha_mode,
            size.width,
            size.height,
            &camera_resources.bind_group_layout,
            entity_resources,
            &frame_ctx.scene,
            seed ^ 0x9E37_79B9,
        );

        // Initialize egui
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        Self {
            surface: gpu.surface,
            device,
            queue,
            config,
            window,
            depth_view,
            cam_buf: camera_resources.camera_buffer,
            cam_bg: camera_resources.camera_bind_group,
            render_state,
            egui_state,
            egui_ctx,
            frame_ctx,
            input_state: InputState::new(),
            start_time: Instant::now(),
            last_frame_time: Instant::now(),
        }
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        // First let egui process the event
        let egui_captured = self.egui_state.on_window_event(self.window.as_ref(), event).consumed;
        if egui_captured {
            return true;
        }

        match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, physical_key, .. }, .. } => {
                if let PhysicalKey::Code(code) = physical_key {
                    if let Some(name) = key_name(*code) {
                        match state {
                            ElementState::Pressed => self.input_state.key_down(name),
                            ElementState::Released => self.input_state.key_up(name),
                        }
                    }
                }
                true
            }
            WindowEvent::Focused(false) => {
                self.input_state.clear_keys();
                true
            }
            _ => false,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            let (_, depth_view) = render::create_depth_texture(&self.device, new_size.width, new_size.height);
            self.depth_view = depth_view;

            self.frame_ctx.camera.set_aspect(new_size.width, new_size.height);
            self.render_state.width = new_size.width;
            self.render_state.height = new_size.height;
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame_time).as_secs_f32().clamp(0.0, 0.1);
        self.last_frame_time = now;
        let now_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;

        self.frame_ctx.advance(&self.input_state, now_ms, dt);

        // Camera uniform
        let cam_data = render::CameraUniform {
            view_proj: self.frame_ctx.camera.view_proj().to_cols_array_2d(),
        };
        self.queue.write_buffer(&self.cam_buf, 0, bytemuck::bytes_of(&cam_data));

        // Build the HUD
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let score = self.frame_ctx.scene.score;
        let fps = self.frame_ctx.fps;
        let mut full_output = self.egui_ctx.run(raw_input, |ctx| {
            ui::draw_hud(ctx, score, fps);
        });
        self.egui_state
            .handle_platform_output(&self.window, std::mem::take(&mut full_output.platform_output));

        let dpr = self.window.scale_factor() as f32;
        let primitives = self.egui_ctx.tessellate(std::mem::take(&mut full_output.shapes), dpr);
        self.render_state.egui_primitives = Some(primitives);
        self.render_state.egui_full_output = Some(full_output);
        self.render_state.egui_dpr = dpr;

        self.render_state.draw_frame(
            &self.device,
            &self.queue,
            &self.surface,
            &self.frame_ctx.scene,
            &self.depth_view,
            &self.cam_bg,
        );
    }
}

fn key_name(code: KeyCode) -> Option<&'static str> {
    match code {
        KeyCode::KeyW => Some("w"),
        KeyCode::KeyS => Some("s"),
        KeyCode::KeyA => Some("a"),
        KeyCode::KeyD => Some("d"),
        KeyCode::KeyQ => Some("q"),
        KeyCode::KeyE => Some("e"),
        KeyCode::KeyB => Some("b"),
        KeyCode::KeyF => Some("f"),
        KeyCode::Space => Some(" "),
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Some("shift"),
        _ => None,
    }
}

fn main() {
    logging::init();

    let event_loop = EventLoop::new().unwrap();
    let window_attributes = Window::default_attributes()
        .with_title("Starlance")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = event_loop.create_window(window_attributes).unwrap();
    let window = Arc::new(window);

    let mut app = pollster::block_on(App::new(window.clone()));

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            app.redraw();
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    }).unwrap();
}
