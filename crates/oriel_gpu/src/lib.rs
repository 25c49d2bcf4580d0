//! Oriel GPU Renderer
//!
//! OpenGL rendering core for the Oriel toolkit:
//!
//! - Context & render-target lifecycle (activation stack, lazy context
//!   creation, scoped RAII activation)
//! - Offscreen window pooling for contexts without a visible surface
//! - Native event pumping and dispatch to attached surfaces
//! - Gradient shader data caching with bounded insertion-order eviction
//! - GLSL shader source generation

pub mod gradient;
pub mod offscreen;
pub mod renderer;
pub mod shader;

pub use gradient::{
    GradientDataCache, GradientShaderData, GRADIENT_DATA_CACHE_QUEUE_SIZE, GRADIENT_FILTER_SIZE,
};
pub use offscreen::{OffscreenId, OffscreenWindowPool};
pub use renderer::{ActiveTargetGuard, FrameRateLimiter, Renderer, RendererConfig, RendererError};
pub use shader::{
    GradientShader, Shader, ShaderError, ShaderLanguage, ShaderProgram, ShaderStage,
    StandardFragmentShader, StandardShaderProgram, StandardVertexShader,
};
