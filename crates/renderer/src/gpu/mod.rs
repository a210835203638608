//! GPU side of the renderer.
//!
//! - `context` owns the wgpu instance, surface and device and rebuilds the
//!   swapchain when the window resizes.
//! - `pipeline` compiles the GLSL sources into the caustics and blit
//!   pipelines that share one quad vertex buffer.
//! - `target` is the viewport-sized texture the caustics pass draws into.
//! - `uniforms` mirrors the shader's uniform block.
//! - `state` ties them together behind the `GpuState` API used by `window`.

mod context;
mod pipeline;
mod state;
mod target;
mod uniforms;

pub(crate) use state::GpuState;
#[cfg(test)]
pub(crate) use uniforms::CausticsUniforms;
