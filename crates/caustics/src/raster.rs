use glam::{Vec2, Vec3};
use image::{Rgb, RgbImage};

use crate::compose::shade;
use crate::frame::FrameParameters;

/// Shades every pixel of a `params.resolution` sized frame on the CPU.
///
/// Rows are written top to bottom while fragment coordinates keep their
/// bottom-left origin, matching what the GPU path presents.
pub fn render_frame(params: &FrameParameters) -> RgbImage {
    let width = params.resolution.x.max(1.0) as u32;
    let height = params.resolution.y.max(1.0) as u32;
    RgbImage::from_fn(width, height, |x, row| {
        let frag = Vec2::new(x as f32 + 0.5, (height - row) as f32 - 0.5);
        to_rgb8(shade(frag, params))
    })
}

/// Quantises a colour the way a unorm framebuffer write does.
pub fn to_rgb8(color: Vec3) -> Rgb<u8> {
    let quantise = |channel: f32| (channel.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb([quantise(color.x), quantise(color.y), quantise(color.z)])
}
