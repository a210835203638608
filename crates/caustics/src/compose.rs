//! Caustic compositor: refraction layers, contrast, palettes and vignette.
//!
//! Mirrors the fragment shader in `renderer`; the GPU path is authoritative
//! for what ends up on screen, this one drives still exports and tests.

use glam::{DVec2, Vec2, Vec3};

use crate::field::{WaterSurface, FIELD_SCALE};
use crate::frame::FrameParameters;

/// Virtual distance between the water surface and the lit floor.
pub const FLOOR_DEPTH: f64 = 2.0;

/// Exponent of the global contrast curve.
pub const CONTRAST_EXPONENT: f64 = 1.8;

/// Gain applied after the contrast curve. The product is not clamped.
pub const CONTRAST_GAIN: f64 = 1.6;

/// One refraction layer sampled at `refracted * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    pub scale: f64,
    pub offset: f64,
    pub time_rate: f64,
    /// Higher exponents give sharper, sparser highlights.
    pub sharpness: f64,
}

pub const LAYERS: [Layer; 3] = [
    Layer {
        scale: 1.0,
        offset: 0.0,
        time_rate: 1.0,
        sharpness: 8.0,
    },
    Layer {
        scale: 1.3,
        offset: 2.5,
        time_rate: 0.8,
        sharpness: 8.0,
    },
    Layer {
        scale: 0.7,
        offset: 5.0,
        time_rate: 1.2,
        sharpness: 6.0,
    },
];

/// Base and highlight colour of one theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub base: Vec3,
    pub highlight: Vec3,
}

impl Palette {
    /// Linear blend from base to highlight; `intensity` above 1 extrapolates.
    pub fn at(&self, intensity: f32) -> Vec3 {
        self.base.lerp(self.highlight, intensity)
    }
}

/// Warm golden tint.
pub const LIGHT_PALETTE: Palette = Palette {
    base: Vec3::new(0.93, 0.88, 0.78),
    highlight: Vec3::new(1.0, 0.96, 0.85),
};

/// Cool blue tint.
pub const DARK_PALETTE: Palette = Palette {
    base: Vec3::new(0.08, 0.09, 0.12),
    highlight: Vec3::new(0.25, 0.45, 0.65),
};

const VIGNETTE_SPREAD: f32 = 1.2;
const VIGNETTE_EDGE: f32 = 0.7;
const VIGNETTE_FLOOR: f32 = 0.7;

/// Maps a fragment coordinate (pixels, origin bottom-left) into field units.
pub fn field_position(frag_coord: Vec2, resolution: Vec2) -> Vec2 {
    let resolution = resolution.max(Vec2::ONE);
    let uv = frag_coord / resolution;
    let aspect = resolution.x / resolution.y;
    let mut p = uv * FIELD_SCALE;
    p.x *= aspect;
    p
}

/// Scalar caustic intensity at field position `p`.
///
/// Unbounded above: the average of the layers is raised to
/// [`CONTRAST_EXPONENT`] and scaled by [`CONTRAST_GAIN`] without a clamp.
pub fn caustic_intensity(surface: &WaterSurface, p: Vec2, time: f32) -> f32 {
    let p = p.as_dvec2();
    let t = f64::from(time);

    let normal = surface.normal_at(p, t);
    let refracted = p + DVec2::new(normal.x, normal.y) * FLOOR_DEPTH * 0.5;

    let sum: f64 = LAYERS
        .iter()
        .map(|layer| {
            let sample = refracted * layer.scale + DVec2::splat(layer.offset);
            let n = surface.normal_at(sample, t * layer.time_rate);
            n.z.max(0.0).powf(layer.sharpness)
        })
        .sum();
    let average = sum / LAYERS.len() as f64;

    (average.powf(CONTRAST_EXPONENT) * CONTRAST_GAIN) as f32
}

/// Blends both palettes at `intensity`, then mixes them by `theme_flag`.
pub fn tint(intensity: f32, theme_flag: f32) -> Vec3 {
    let light = LIGHT_PALETTE.at(intensity);
    let dark = DARK_PALETTE.at(intensity);
    light.lerp(dark, theme_flag)
}

/// Vignette multiplier in `[0.7, 1.0]` for normalised screen position `uv`.
pub fn vignette(uv: Vec2) -> f32 {
    let falloff = 1.0 - ((uv - Vec2::splat(0.5)) * VIGNETTE_SPREAD).length();
    let vig = smoothstep(0.0, VIGNETTE_EDGE, falloff);
    VIGNETTE_FLOOR + (1.0 - VIGNETTE_FLOOR) * vig
}

/// Colour of the fragment at `frag_coord` (pixels, origin bottom-left).
pub fn shade(frag_coord: Vec2, params: &FrameParameters) -> Vec3 {
    let resolution = params.resolution.max(Vec2::ONE);
    let uv = frag_coord / resolution;
    let p = field_position(frag_coord, resolution);

    let surface = WaterSurface::new(params.pointer);
    let intensity = caustic_intensity(&surface, p, params.elapsed_seconds);

    tint(intensity, params.theme_flag) * vignette(uv)
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
