use bytemuck::{Pod, Zeroable};
use caustics::FrameParameters;

/// Host mirror of the `FrameUniforms` std140 block in the caustics shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct CausticsUniforms {
    pub resolution: [f32; 2],
    pub pointer: [f32; 2],
    pub time: f32,
    pub dark: f32,
    pub _padding: [f32; 2],
}

impl CausticsUniforms {
    pub fn from_frame(params: &FrameParameters) -> Self {
        Self {
            resolution: params.resolution.to_array(),
            pointer: params.pointer.to_array(),
            time: params.elapsed_seconds,
            dark: params.theme_flag,
            _padding: [0.0; 2],
        }
    }
}
