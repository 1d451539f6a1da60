// Re-export all public modules so they can be used from main.rs
pub mod errors;
pub mod logging;

// MVC Architecture
pub mod controller;
pub mod model;
pub mod view;

/// Embedded demo mesh, rendered when no model is supplied.
pub const DEMO_MESH: &str = include_str!("../assets/cube.obj");

// Common imports for the web entry point
#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, Window};

#[cfg(target_arch = "wasm32")]
use controller::{FrameLoopContext, InputProcessor, RotationState};
#[cfg(target_arch = "wasm32")]
use view::render::{self, MaterialUniform, TransformsUniform, FRAGMENT_SHADER, VERTEX_SHADER};
#[cfg(target_arch = "wasm32")]
use view::GpuContext;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    logging::init();
    let (window, document, canvas) = init_canvas(800, 600)?;
    setup_app(&window, &document, &canvas).await
}

/// Main application setup for WASM: parse the mesh, bring up the GPU,
/// upload buffers once, build the pipeline, then hand off to the
/// requestAnimationFrame loop.
#[cfg(target_arch = "wasm32")]
async fn setup_app(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
) -> Result<(), JsValue> {
    let mesh = model::parse_obj(DEMO_MESH).map_err(|e| js_error(e.to_string()))?;
    tracing::info!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "mesh loaded"
    );

    let gpu = GpuContext::new(canvas, 800, 600)
        .await
        .map_err(|e| js_error(format!("GPU init failed: {e}")))?;

    let width = gpu.config.width;
    let height = gpu.config.height;

    // Uniforms: transforms at binding 0, material at binding 1. The
    // material never changes, so it is written exactly once here.
    let uniforms = render::create_uniform_resources(gpu.device.as_ref());
    gpu.queue.as_ref().write_buffer(
        &uniforms.material_buffer,
        0,
        bytemuck::bytes_of(&MaterialUniform::default()),
    );
    gpu.queue.as_ref().write_buffer(
        &uniforms.transforms_buffer,
        0,
        bytemuck::bytes_of(&TransformsUniform::at(0.0, width as f32 / height as f32)),
    );

    let depth_format = wgpu::TextureFormat::Depth32Float;
    let (_depth_tex, depth_view) = render::create_depth_texture(gpu.device.as_ref(), width, height);
    let depth_view_cell = Rc::new(RefCell::new(depth_view));

    let pipeline = render::build_pipeline(
        gpu.device.as_ref(),
        gpu.format,
        &uniforms.bind_group_layout,
        depth_format,
        VERTEX_SHADER,
        FRAGMENT_SHADER,
    )
    .await
    .map_err(|e| js_error(e.to_string()))?;

    // One-shot static buffer upload
    let mesh_buffers = render::upload_mesh(gpu.device.as_ref(), &mesh);

    let rotation = Rc::new(RefCell::new(RotationState::new()));
    setup_input_listeners(document, rotation.clone())?;

    let mut render_state = render::RenderState {
        format: gpu.format,
        alpha_mode: gpu.config.alpha_mode,
        width,
        height,
        pipeline,
        mesh: mesh_buffers,
    };

    let mut frame_ctx = FrameLoopContext {
        rotation,
        transforms_buffer: uniforms.transforms_buffer,
        depth_view_cell,
    };
    let bind_group = uniforms.bind_group;

    // Continuous redraw using requestAnimationFrame
    let f = RafCallback::new(window.clone(), {
        let window_for_loop = window.clone();

        move || {
            frame_ctx.update(
                gpu.device.as_ref(),
                gpu.queue.as_ref(),
                &window_for_loop,
                &gpu.surface,
                &mut render_state,
            );

            let dv = frame_ctx.depth_view_cell.borrow();
            if let Err(e) = render_state.draw_frame(
                gpu.device.as_ref(),
                gpu.queue.as_ref(),
                &gpu.surface,
                &dv,
                &bind_group,
            ) {
                tracing::error!("frame submission failed: {e:?}");
            }
        }
    });
    f.start();

    Ok(())
}

/// Keydown listener translating arrow keys into rotation events.
#[cfg(target_arch = "wasm32")]
fn setup_input_listeners(
    document: &Document,
    rotation: Rc<RefCell<RotationState>>,
) -> Result<(), JsValue> {
    let processor = InputProcessor::default();

    let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
        if let Some(event) = processor.event_for_key(&e.key()) {
            rotation.borrow_mut().apply(event);
            e.prevent_default();
        }
    }) as Box<dyn FnMut(KeyboardEvent)>);
    document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
    keydown.forget();

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn init_canvas(width: u32, height: u32) -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
    let window = web_sys::window().ok_or(js_error("no global `window`"))?;
    let document = window.document().ok_or(js_error("no document on window"))?;
    let body = document.body().ok_or(js_error("no body on document"))?;
    let canvas_el = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error("failed to create canvas"))?;
    canvas_el.set_width(width);
    canvas_el.set_height(height);
    body.append_child(&canvas_el)?;
    Ok((window, document, canvas_el))
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}

/// Self-rescheduling requestAnimationFrame callback. The closure runs once
/// per presentation interval; the host never has more than one frame in
/// flight.
#[cfg(target_arch = "wasm32")]
struct RafCallback {
    inner: Rc<RefCell<Box<dyn FnMut()>>>,
    window: Window,
}

#[cfg(target_arch = "wasm32")]
impl RafCallback {
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

            // Recursively schedule the next frame
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
