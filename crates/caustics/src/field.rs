//! Water surface heightfield and its normals.
//!
//! Positions live in "field units": the viewport height spans
//! [`FIELD_SCALE`] units and the pointer is scaled into the same space.
//! Evaluation widens to `f64` internally so every finite `f32` input maps to
//! a finite height; the band amplitudes bound the output to roughly ±2.5.

use glam::{DVec2, DVec3, Vec2, Vec3};

use crate::noise::value_noise;

/// Field units spanned by the viewport height.
pub const FIELD_SCALE: f32 = 8.0;

/// Offset used for the central-difference normal.
pub const NORMAL_EPSILON: f64 = 0.05;

/// A periodic wave band `sin/cos(x) [* sin/cos(y)] * amplitude`.
#[derive(Debug, Clone, Copy)]
struct Band {
    /// Coefficients of `(x, y, t)` in the first factor's phase.
    first: (f64, f64, f64),
    first_cos: bool,
    /// Optional second factor, always a cosine.
    second: Option<(f64, f64, f64)>,
    amplitude: f64,
}

impl Band {
    fn eval(&self, p: DVec2, t: f64) -> f64 {
        let (fx, fy, ft) = self.first;
        let phase = p.x * fx + p.y * fy + t * ft;
        let mut value = if self.first_cos {
            phase.cos()
        } else {
            phase.sin()
        };
        if let Some((sx, sy, st)) = self.second {
            value *= (p.x * sx + p.y * sy + t * st).cos();
        }
        value * self.amplitude
    }
}

const BANDS: [Band; 4] = [
    // Large slow swell.
    Band {
        first: (1.8, 0.0, 0.6),
        first_cos: false,
        second: Some((0.0, 1.4, 0.5)),
        amplitude: 0.5,
    },
    // Diagonal ripples.
    Band {
        first: (3.5, 2.0, -0.9),
        first_cos: false,
        second: None,
        amplitude: 0.25,
    },
    Band {
        first: (-1.5, 4.1, 0.7),
        first_cos: true,
        second: None,
        amplitude: 0.25,
    },
    // Fine chop.
    Band {
        first: (7.0, 0.0, 1.2),
        first_cos: false,
        second: Some((0.0, 6.0, -1.0)),
        amplitude: 0.12,
    },
];

const NOISE_SCALE: f64 = 3.0;
const NOISE_DRIFT: f64 = 0.3;
const NOISE_AMPLITUDE: f64 = 0.3;

const RIPPLE_FREQUENCY: f64 = 4.0;
const RIPPLE_SPEED: f64 = 3.0;
const RIPPLE_DECAY: f64 = 0.5;
const RIPPLE_AMPLITUDE: f64 = 0.6;

/// Heightfield parameterised by the (smoothed) pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterSurface {
    ripple_origin: DVec2,
}

impl WaterSurface {
    /// `pointer` is in normalised viewport coordinates.
    pub fn new(pointer: Vec2) -> Self {
        Self {
            ripple_origin: pointer.as_dvec2() * f64::from(FIELD_SCALE),
        }
    }

    /// Surface height at `position` (field units) and `time` (seconds).
    pub fn height(&self, position: Vec2, time: f32) -> f32 {
        self.height_at(position.as_dvec2(), f64::from(time)) as f32
    }

    /// Unit surface normal at `position` and `time`.
    pub fn normal(&self, position: Vec2, time: f32) -> Vec3 {
        self.normal_at(position.as_dvec2(), f64::from(time)).as_vec3()
    }

    pub(crate) fn height_at(&self, p: DVec2, t: f64) -> f64 {
        let mut h: f64 = BANDS.iter().map(|band| band.eval(p, t)).sum();
        h += value_noise(p * NOISE_SCALE + DVec2::splat(t * NOISE_DRIFT)) * NOISE_AMPLITUDE;

        let offset = p - self.ripple_origin;
        // hypot keeps the distance finite where `x² + y²` would overflow.
        let d = offset.x.hypot(offset.y);
        h += (d * RIPPLE_FREQUENCY - t * RIPPLE_SPEED).sin()
            * (-d * RIPPLE_DECAY).exp()
            * RIPPLE_AMPLITUDE;
        h
    }

    pub(crate) fn normal_at(&self, p: DVec2, t: f64) -> DVec3 {
        let dx = DVec2::new(NORMAL_EPSILON, 0.0);
        let dy = DVec2::new(0.0, NORMAL_EPSILON);
        let left = self.height_at(p - dx, t);
        let right = self.height_at(p + dx, t);
        let down = self.height_at(p - dy, t);
        let up = self.height_at(p + dy, t);
        // z is a non-zero constant, so the vector never collapses to zero.
        DVec3::new(left - right, down - up, NORMAL_EPSILON * 4.0).normalize()
    }
}

impl Default for WaterSurface {
    fn default() -> Self {
        Self::new(Vec2::splat(0.5))
    }
}
