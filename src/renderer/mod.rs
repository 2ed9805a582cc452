pub mod buffers;
mod context;
pub mod depth;
pub mod pipeline_builder;
pub mod primitives;
mod renderer;
pub mod sorting;
pub mod stages;
pub mod texture;
pub mod uniforms;
pub mod vertex;

pub use buffers::Mesh;
pub use depth::Depth;
pub use renderer::Renderer;
pub use sorting::sort_back_to_front;
pub use stages::FrameStage;
pub use texture::Texture;
pub use uniforms::{SceneUniform, ViewUniform};
pub use vertex::{ColorVertex, PositionVertex, TextureVertex};
