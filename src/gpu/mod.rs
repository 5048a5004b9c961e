//! GPU plumbing: device bring-up, textures, buffers, and pass pipelines.

pub mod buffers;
pub mod context;
pub mod pipeline;
pub mod texture;

pub use buffers::SpriteBuffers;
pub use context::GpuContext;
pub use pipeline::PassPipelines;
pub use texture::Texture;
