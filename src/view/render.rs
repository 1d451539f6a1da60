use crate::errors::{ObjViewError, ShaderStage};
use crate::model::transform::{self, DEPTH_REMAP};
use crate::model::Mesh;
use glam::Vec3;
use wgpu::util::DeviceExt;
use wgpu::*;

/// The two shading stage sources. Compiled and validated separately in
/// [`build_pipeline`].
pub const VERTEX_SHADER: &str = include_str!("../shaders/mesh_vert.wgsl");
pub const FRAGMENT_SHADER: &str = include_str!("../shaders/mesh_frag.wgsl");

/// Per-frame matrices, bound at group 0 binding 0 (vertex stage).
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformsUniform {
    pub model_view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl TransformsUniform {
    /// Matrices for the given rotation angle and viewport aspect ratio.
    /// The projection carries the clip-depth remap so the shader gets
    /// wgpu-convention depth.
    pub fn at(angle: f32, aspect: f32) -> Self {
        let model_view = transform::model_view(angle, transform::SCALE, transform::TRANSLATION_Z);
        let projection = DEPTH_REMAP
            * transform::perspective(
                transform::FOV_Y,
                aspect,
                transform::Z_NEAR,
                transform::Z_FAR,
            );
        Self {
            model_view: model_view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
        }
    }
}

/// Base color and light direction, bound at group 0 binding 1 (fragment
/// stage). Written once at setup.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub light_dir: [f32; 3],
    pub _pad: f32,
}

impl Default for MaterialUniform {
    fn default() -> Self {
        let light = Vec3::new(0.5, 0.7, 1.0).normalize();
        Self {
            base_color: [0.85, 0.60, 0.30, 1.0],
            light_dir: [light.x, light.y, light.z],
            _pad: 0.0,
        }
    }
}

pub struct UniformResources {
    pub transforms_buffer: wgpu::Buffer,
    pub material_buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

pub fn create_uniform_resources(device: &wgpu::Device) -> UniformResources {
    let transforms_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("transforms_buffer"),
        size: std::mem::size_of::<TransformsUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let material_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("material_buffer"),
        size: std::mem::size_of::<MaterialUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("uniform_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("uniform_bind_group"),
        layout: &bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: transforms_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: material_buffer.as_entire_binding(),
            },
        ],
    });

    UniformResources {
        transforms_buffer,
        material_buffer,
        bind_group_layout,
        bind_group,
    }
}

/// Device-resident copy of a parsed mesh: one static buffer per numeric
/// array, uploaded exactly once.
pub struct MeshBuffers {
    pub position_buffer: wgpu::Buffer,
    pub normal_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

pub fn upload_mesh(device: &wgpu::Device, mesh: &Mesh) -> MeshBuffers {
    let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("mesh_position_buffer"),
        contents: bytemuck::cast_slice(&mesh.positions),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let normal_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("mesh_normal_buffer"),
        contents: bytemuck::cast_slice(&mesh.normals),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("mesh_index_buffer"),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    MeshBuffers {
        position_buffer,
        normal_buffer,
        index_buffer,
        index_count: mesh.indices.len() as u32,
    }
}

pub fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

/// Compile one shader stage and surface its validation log instead of
/// carrying a broken module forward.
async fn compile_stage(
    device: &wgpu::Device,
    stage: ShaderStage,
    source: &str,
    label: &str,
) -> Result<wgpu::ShaderModule, ObjViewError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    if let Some(err) = device.pop_error_scope().await {
        return Err(ObjViewError::ShaderCompile {
            stage,
            log: err.to_string(),
        });
    }
    Ok(module)
}

/// Compile both stages and link them into the mesh pipeline.
///
/// Attribute layout: location 0 position, location 1 normal, each its own
/// tightly packed `Float32x3` buffer slot. Link failures surface through a
/// validation error scope around pipeline creation.
pub async fn build_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    bind_group_layout: &wgpu::BindGroupLayout,
    depth_format: wgpu::TextureFormat,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<wgpu::RenderPipeline, ObjViewError> {
    let vertex_module =
        compile_stage(device, ShaderStage::Vertex, vertex_source, "mesh_vertex").await?;
    let fragment_module =
        compile_stage(device, ShaderStage::Fragment, fragment_source, "mesh_fragment").await?;

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("mesh_pipeline_layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("mesh_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &vertex_module,
            entry_point: Some("vs_main"),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: (3 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    }],
                },
                wgpu::VertexBufferLayout {
                    array_stride: (3 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 1,
                        format: wgpu::VertexFormat::Float32x3,
                    }],
                },
            ],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment_module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // OBJ exports mix windings; culling would drop half of some models
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: depth_format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    });
    if let Some(err) = device.pop_error_scope().await {
        return Err(ObjViewError::ShaderLink {
            log: err.to_string(),
        });
    }

    Ok(pipeline)
}

///////////////////////////////////////////////////////////////////////////////

/// Consolidated render state shared by the native and web frame loops.
pub struct RenderState {
    pub format: TextureFormat,
    pub alpha_mode: CompositeAlphaMode,
    pub width: u32,
    pub height: u32,

    pub pipeline: RenderPipeline,
    pub mesh: MeshBuffers,
}

impl RenderState {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn reconfigure(&self, device: &Device, surface: &Surface) {
        surface.configure(
            device,
            &SurfaceConfiguration {
                usage: TextureUsages::RENDER_ATTACHMENT,
                format: self.format,
                width: self.width,
                height: self.height,
                present_mode: PresentMode::Fifo,
                alpha_mode: self.alpha_mode,
                view_formats: vec![],
                desired_maximum_frame_latency: 2,
            },
        );
    }

    /// Submit one frame: clear, draw the full index range, present.
    pub fn draw_frame(
        &mut self,
        device: &Device,
        queue: &Queue,
        surface: &Surface,
        depth_view: &TextureView,
        bind_group: &BindGroup,
    ) -> Result<(), SurfaceError> {
        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost) => {
                self.reconfigure(device, surface);
                surface.get_current_texture()?
            }
            Err(e) => return Err(e),
        };

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("mesh_render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color {
                            r: 0.05,
                            g: 0.06,
                            b: 0.08,
                            a: 1.0,
                        }),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, bind_group, &[]);
            rp.set_vertex_buffer(0, self.mesh.position_buffer.slice(..));
            rp.set_vertex_buffer(1, self.mesh.normal_buffer.slice(..));
            rp.set_index_buffer(self.mesh.index_buffer.slice(..), IndexFormat::Uint16);
            rp.draw_indexed(0..self.mesh.index_count, 0, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::transform;

    #[test]
    fn test_transforms_uniform_size() {
        // Two mat4s, tightly packed
        assert_eq!(std::mem::size_of::<TransformsUniform>(), 128);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);
    }

    #[test]
    fn test_transforms_at_zero_angle() {
        let u = TransformsUniform::at(0.0, 1.0);
        // Column-major: scale on the diagonal, Z translation in column 3
        assert!((u.model_view[0][0] - transform::SCALE).abs() < 1e-6);
        assert!((u.model_view[3][2] - transform::TRANSLATION_Z).abs() < 1e-6);
        // Projection column 2 w entry stays -1 through the depth remap
        assert!((u.projection[2][3] - -1.0).abs() < 1e-6);
    }

    #[test]
    fn test_material_light_dir_normalized() {
        let m = MaterialUniform::default();
        let len = (m.light_dir[0].powi(2) + m.light_dir[1].powi(2) + m.light_dir[2].powi(2)).sqrt();
        assert!((len - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_stage_sources_present() {
        assert!(VERTEX_SHADER.contains("vs_main"));
        assert!(FRAGMENT_SHADER.contains("fs_main"));
    }
}
