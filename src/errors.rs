use thiserror::Error;

/// Which pipeline stage a shader validation failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// All setup-phase failures. Every variant is fatal to startup: without a
/// mesh there is nothing to render, without a pipeline nothing to render
/// with. There is no retry path anywhere.
#[derive(Error, Debug)]
pub enum ObjViewError {
    /// A vertex, normal or face record could not be parsed.
    #[error("malformed mesh at line {line}: {message}")]
    MalformedMesh { line: usize, message: String },

    /// Index buffers are 16-bit; meshes at or above 65 536 vertices cannot
    /// be addressed and are rejected instead of silently wrapping.
    #[error("mesh has {vertices} vertices, exceeding the 16-bit index limit")]
    MeshTooLarge { vertices: usize },

    /// A shader stage failed validation.
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    /// The pipeline could not be created from the compiled stages.
    #[error("shader program failed to link: {log}")]
    ShaderLink { log: String },

    /// No compatible GPU adapter.
    #[error("failed to request GPU adapter: {0}")]
    AdapterRequest(String),

    /// Adapter found but device creation failed.
    #[error("failed to create GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// Surface creation failed for the window/canvas.
    #[error("failed to create rendering surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
}
