// MODEL: mesh data and transform math
pub mod mesh;
pub mod transform;

pub use mesh::{parse_obj, Mesh};
