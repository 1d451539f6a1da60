use std::cell::RefCell;
use std::rc::Rc;

use web_sys::Window;
use wgpu::{Device, Queue, Surface, TextureView};

use crate::controller::input::RotationState;
use crate::view::render::{self, RenderState, TransformsUniform};

/// Per-frame update state for the web render loop. Owns the rotation
/// context (single writer: the key handler; single reader: this update).
pub struct FrameLoopContext {
    pub rotation: Rc<RefCell<RotationState>>,
    pub transforms_buffer: wgpu::Buffer,
    pub depth_view_cell: Rc<RefCell<TextureView>>,
}

impl FrameLoopContext {
    /// Recompute the matrices for the current rotation angle and push them
    /// to the GPU. Runs once per animation frame, before draw submission.
    pub fn update(
        &mut self,
        device: &Device,
        queue: &Queue,
        window: &Window,
        surface: &Surface,
        render_state: &mut RenderState,
    ) {
        self.handle_resize(window, device, surface, render_state);

        let angle = self.rotation.borrow().angle;
        let transforms = TransformsUniform::at(angle, render_state.aspect());
        queue.write_buffer(&self.transforms_buffer, 0, bytemuck::bytes_of(&transforms));
    }

    fn handle_resize(
        &self,
        window: &Window,
        device: &Device,
        surface: &Surface,
        render_state: &mut RenderState,
    ) {
        if let (Ok(w), Ok(h)) = (window.inner_width(), window.inner_height()) {
            let nw = w.as_f64().unwrap_or(800.0) as u32;
            let nh = h.as_f64().unwrap_or(600.0) as u32;
            if (nw != render_state.width || nh != render_state.height) && nw > 0 && nh > 0 {
                render_state.width = nw;
                render_state.height = nh;
                render_state.reconfigure(device, surface);

                let (_, depth_view) = render::create_depth_texture(device, nw, nh);
                *self.depth_view_cell.borrow_mut() = depth_view;
            }
        }
    }
}
