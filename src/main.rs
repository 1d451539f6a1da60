use std::sync::Arc;

use anyhow::Context;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

// Import from the library crate
use objview::{controller, logging, model, view};

use controller::{RotationEvent, RotationState};
use model::Mesh;
use view::gpu_init::GpuContext;
use view::render::{
    self, MaterialUniform, RenderState, TransformsUniform, FRAGMENT_SHADER, VERTEX_SHADER,
};

struct App {
    // Core GPU resources
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    size: winit::dpi::PhysicalSize<u32>,
    window: Arc<Window>,

    // Rendering state
    render_state: RenderState,
    bind_group: wgpu::BindGroup,
    transforms_buffer: wgpu::Buffer,
    _depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,

    // Rotation context: written by key presses, read each frame
    rotation: RotationState,
}

impl App {
    async fn new(window: Arc<Window>, mesh: &Mesh) -> Result<Self, objview::errors::ObjViewError> {
        let size = window.inner_size();

        let gpu = GpuContext::new_native(window.clone(), size.width, size.height).await?;
        let device = gpu.device.clone();
        let queue = gpu.queue.clone();

        let depth_format = wgpu::TextureFormat::Depth32Float;
        let (depth_texture, depth_view) =
            render::create_depth_texture(&device, size.width, size.height);

        let uniforms = render::create_uniform_resources(&device);
        queue.write_buffer(
            &uniforms.material_buffer,
            0,
            bytemuck::bytes_of(&MaterialUniform::default()),
        );
        queue.write_buffer(
            &uniforms.transforms_buffer,
            0,
            bytemuck::bytes_of(&TransformsUniform::at(
                0.0,
                size.width as f32 / size.height as f32,
            )),
        );

        let pipeline = render::build_pipeline(
            &device,
            gpu.format,
            &uniforms.bind_group_layout,
            depth_format,
            VERTEX_SHADER,
            FRAGMENT_SHADER,
        )
        .await?;

        // One-shot static buffer upload
        let mesh_buffers = render::upload_mesh(&device, mesh);

        let render_state = RenderState {
            format: gpu.format,
            alpha_mode: gpu.config.alpha_mode,
            width: size.width,
            height: size.height,
            pipeline,
            mesh: mesh_buffers,
        };

        Ok(Self {
            surface: gpu.surface,
            device,
            queue,
            size,
            window,
            render_state,
            bind_group: uniforms.bind_group,
            transforms_buffer: uniforms.transforms_buffer,
            _depth_texture: depth_texture,
            depth_view,
            rotation: RotationState::new(),
        })
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => {
                // OS key repeat drives repeated adjustment, no suppression
                let rotation_event = match code {
                    KeyCode::ArrowLeft | KeyCode::KeyA => Some(RotationEvent::RotateLeft),
                    KeyCode::ArrowRight | KeyCode::KeyD => Some(RotationEvent::RotateRight),
                    _ => None,
                };
                match rotation_event {
                    Some(ev) => {
                        self.rotation.apply(ev);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.render_state.width = new_size.width;
            self.render_state.height = new_size.height;
            self.render_state.reconfigure(&self.device, &self.surface);

            let (depth_texture, depth_view) =
                render::create_depth_texture(&self.device, new_size.width, new_size.height);
            self._depth_texture = depth_texture;
            self.depth_view = depth_view;
        }
    }

    fn update(&mut self) {
        let transforms = TransformsUniform::at(self.rotation.angle, self.render_state.aspect());
        self.queue
            .write_buffer(&self.transforms_buffer, 0, bytemuck::bytes_of(&transforms));
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.render_state.draw_frame(
            &self.device,
            &self.queue,
            &self.surface,
            &self.depth_view,
            &self.bind_group,
        )
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let mesh_text = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read mesh file '{path}'"))?,
        None => objview::DEMO_MESH.to_string(),
    };
    let mesh = model::parse_obj(&mesh_text)?;
    tracing::info!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "mesh loaded"
    );

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("objview")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = event_loop.create_window(window_attributes)?;
    let window = Arc::new(window);

    let mut app = pollster::block_on(App::new(window.clone(), &mesh))?;

    event_loop.run(move |event, elwt| match event {
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
                        app.update();

                        match app.render() {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost) => app.resize(app.size),
                            Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                            Err(e) => tracing::error!("frame submission failed: {e:?}"),
                        }
                    }
                    _ => {}
                }
            }
        }
        Event::AboutToWait => {
            app.window.request_redraw();
        }
        _ => {}
    })?;

    Ok(())
}
