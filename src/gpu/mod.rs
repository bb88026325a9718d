//! wgpu backend.
//!
//! Device and surface setup, shader composition, texture and mesh uploads,
//! and the [`SceneRenderer`] that draws a [`Scene`](crate::scene::Scene).

/// Procedural and imported mesh buffers.
pub mod mesh;
/// Shared wgpu boilerplate for bind group layouts and pipelines.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// The scene renderer implementing the frame backend.
pub mod scene_renderer;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Texture uploads and the depth target.
pub mod texture;

pub use render_context::{RenderContext, RenderContextError};
pub use scene_renderer::SceneRenderer;
