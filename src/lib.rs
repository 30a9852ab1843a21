// Re-export all public modules so they can be used from main.rs
pub mod audio;
pub mod logging;
pub mod ui;
pub mod utils;

// MVC Architecture
pub mod controller;
pub mod model;
pub mod view;

// Common imports
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, Event, HtmlCanvasElement, KeyboardEvent, Window};
#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use controller::{FrameLoopContext, InputState};
#[cfg(target_arch = "wasm32")]
use view::{render, GpuContext, RenderState};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    logging::init();
    let (window, document, canvas) = init_canvas()?;
    setup_app(&window, &document, &canvas).await
}

/// Main application setup for WASM
#[cfg(target_arch = "wasm32")]
async fn setup_app(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
) -> Result<(), JsValue> {
    let width = canvas.width();
    let height = canvas.height();

    // Initialize GPU
    let gpu = GpuContext::new(canvas, width, height)
        .await
        .map_err(|e| js_error(format!("GPU init failed: {e:?}")))?;

    let now_ms = performance_now(window);

    // Game state: clock-seeded world, shared input for the DOM listeners
    let mut frame_ctx = FrameLoopContext::new(now_ms as u32, width, height);
    let input_state = Rc::new(RefCell::new(InputState::new()));

    // Camera + per-entity uniforms, pipelines, meshes
    let camera_resources = render::create_camera_resources(gpu.device.as_ref());
    let entity_resources = render::create_entity_resources(gpu.device.as_ref());

    let mut render_state = RenderState::new(
        gpu.device.as_ref(),
        gpu.format,
        gpu.config.alpha_mode,
        width,
        height,
        &camera_resources.bind_group_layout,
        entity_resources,
        &frame_ctx.scene,
        now_ms as u32 ^ 0x9E37_79B9,
    );
    let cam_buf = camera_resources.camera_buffer;
    let cam_bg = camera_resources.camera_bind_group;

    // Depth buffer, recreated on resize
    let (_, depth_view) = render::create_depth_texture(gpu.device.as_ref(), width, height);
    let depth_view_cell: Rc<RefCell<wgpu::TextureView>> = Rc::new(RefCell::new(depth_view));

    setup_input_listeners(document, window, input_state.clone())?;

    let egui_ctx = egui::Context::default();
    let last_time = Rc::new(RefCell::new(now_ms));

    // Continuous redraw using requestAnimationFrame
    let f = RcCellCallback::new(window.clone(), {
        let window = window.clone();
        let input_state = input_state.clone();
        let depth_view_cell = depth_view_cell.clone();

        move || {
            let now = performance_now(&window);
            let dt = (((now - *last_time.borrow()) / 1000.0) as f32).clamp(0.0, 0.1);
            *last_time.borrow_mut() = now;

            handle_resize(
                &window,
                gpu.device.as_ref(),
                &gpu.surface,
                &mut render_state,
                &mut frame_ctx.camera,
                &depth_view_cell,
            );

            frame_ctx.advance(&input_state.borrow(), now, dt);

            // Camera uniform
            let cam_data = render::CameraUniform {
                view_proj: frame_ctx.camera.view_proj().to_cols_array_2d(),
            };
            gpu.queue
                .as_ref()
                .write_buffer(&cam_buf, 0, bytemuck::bytes_of(&cam_data));

            // Build the HUD
            let dpr = window.device_pixel_ratio() as f32;
            let mut raw_input = egui::RawInput::default();
            raw_input.time = Some(now / 1000.0);
            raw_input.screen_rect = Some(egui::Rect::from_min_size(
                egui::Pos2::new(0.0, 0.0),
                egui::vec2(
                    render_state.width as f32 / dpr,
                    render_state.height as f32 / dpr,
                ),
            ));
            egui_ctx.set_pixels_per_point(dpr);
            let mut full_output = egui_ctx.run(raw_input, |ctx| {
                ui::draw_hud(ctx, frame_ctx.scene.score, frame_ctx.fps);
            });
            let primitives = egui_ctx.tessellate(std::mem::take(&mut full_output.shapes), dpr);
            render_state.egui_primitives = Some(primitives);
            render_state.egui_full_output = Some(full_output);
            render_state.egui_dpr = dpr;

            let dv = depth_view_cell.borrow();
            render_state.draw_frame(
                gpu.device.as_ref(),
                gpu.queue.as_ref(),
                &gpu.surface,
                &frame_ctx.scene,
                &dv,
                &cam_bg,
            );
        }
    });
    f.start();

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn performance_now(window: &Window) -> f64 {
    window.performance().map(|p| p.now()).unwrap_or(0.0)
}

/// Track the DOM window size and reconfigure the surface, depth buffer and
/// camera aspect when it changes.
#[cfg(target_arch = "wasm32")]
fn handle_resize(
    window: &Window,
    device: &wgpu::Device,
    surface: &wgpu::Surface,
    render_state: &mut RenderState,
    camera: &mut model::Camera,
    depth_view_cell: &Rc<RefCell<wgpu::TextureView>>,
) {
    if let (Ok(w), Ok(h)) = (window.inner_width(), window.inner_height()) {
        let nw = w.as_f64().unwrap_or(800.0) as u32;
        let nh = h.as_f64().unwrap_or(600.0) as u32;
        if (nw != render_state.width || nh != render_state.height) && nw > 0 && nh > 0 {
            camera.set_aspect(nw, nh);
            render_state.width = nw;
            render_state.height = nh;

            let config = wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format: render_state.format,
                width: nw,
                height: nh,
                present_mode: wgpu::PresentMode::Fifo,
                alpha_mode: render_state.alpha_mode,
                view_formats: vec![],
                desired_maximum_frame_latency: 2,
            };
            surface.configure(device, &config);

            let (_, depth_view) = render::create_depth_texture(device, nw, nh);
            *depth_view_cell.borrow_mut() = depth_view;
        }
    }
}

/// Keyboard listeners feed the shared held-key state; focus loss clears it
/// so no control sticks while the tab is hidden.
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    document: &Document,
    window: &Window,
    input_state: Rc<RefCell<InputState>>,
) -> Result<(), JsValue> {
    // Keyboard down
    {
        let input_state = input_state.clone();
        let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            let key = e.key();

            // Keep held game keys from scrolling the page
            if matches!(
                key.as_str(),
                "w" | "a" | "s" | "d" | "W" | "A" | "S" | "D" | "q" | "e" | "Q" | "E"
                    | "b" | "f" | "B" | "F" | " " | "Shift"
            ) {
                e.prevent_default();
            }

            input_state.borrow_mut().key_down(&key);
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
    }

    // Keyboard up
    {
        let input_state = input_state.clone();
        let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            input_state.borrow_mut().key_up(&e.key());
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
        keyup.forget();
    }

    // Focus loss - clear all keys
    {
        let input_state = input_state.clone();
        let blur = Closure::wrap(Box::new(move |_e: Event| {
            input_state.borrow_mut().clear_keys();
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
        blur.forget();
    }

    // Visibility change - clear all keys
    {
        let input_state = input_state.clone();
        let visibility = Closure::wrap(Box::new(move |_e: Event| {
            input_state.borrow_mut().clear_keys();
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
        visibility.forget();
    }

    Ok(())
}

/// Full-window canvas attached to the document body.
#[cfg(target_arch = "wasm32")]
fn init_canvas() -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
    let window = web_sys::window().ok_or(js_error("no global `window`"))?;
    let document = window.document().ok_or(js_error("no document on window"))?;
    let body = document.body().ok_or(js_error("no body on document"))?;
    let canvas_el = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error("failed to create canvas"))?;

    let width = window.inner_width()?.as_f64().unwrap_or(800.0) as u32;
    let height = window.inner_height()?.as_f64().unwrap_or(600.0) as u32;
    canvas_el.set_width(width.max(1));
    canvas_el.set_height(height.max(1));
    body.append_child(&canvas_el)?;
    Ok((window, document, canvas_el))
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}

#[cfg(target_arch = "wasm32")]
struct RcCellCallback {
    inner: Rc<RefCell<Box<dyn FnMut()>>>,
    window: Window,
}

#[cfg(target_arch = "wasm32")]
impl RcCellCallback {
    fn new(window: Window, f: impl FnMut() + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(f))),
            window,
        }
    }

    fn start(self) {
        let inner = self.inner.clone();
        let window = self.window.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            inner.borrow_mut().as_mut()();

            // Recursively schedule next frame
            let cb_ref = callback_clone.borrow();
            window
                .request_animation_frame(cb_ref.as_ref().unwrap().as_ref().unchecked_ref())
                .expect("RAF failed");
        }) as Box<dyn FnMut()>));

        self.window
            .request_animation_frame(
                callback.borrow().as_ref().unwrap().as_ref().unchecked_ref(),
            )
            .expect("RAF start failed");

        // Leak the closure to keep it alive
        std::mem::forget(callback);
    }
}
