//! CPU reference of the caustics effect.
//!
//! The same math runs on the GPU as GLSL inside the `renderer` crate; this
//! crate owns the frame model and input handling shared by both paths:
//!
//! ```text
//!   InputTracker ──▶ SmoothedPointer ──▶ FrameParameters ──▶ shade()
//!                                                 │
//!   WaterSurface::normal ◀── WaterSurface::height ┘
//! ```
//!
//! - [`field`] evaluates the heightfield and its central-difference normals.
//! - [`compose`] refracts, layers and tints the caustic intensity.
//! - [`input`] normalises pointer/touch events and sizes the viewport.
//! - [`raster`] shades whole frames for still exports.

pub mod compose;
pub mod field;
pub mod frame;
pub mod input;
pub mod noise;
pub mod raster;

pub use compose::{caustic_intensity, shade, tint, vignette};
pub use field::WaterSurface;
pub use frame::{FixedTheme, FrameParameters, ParseThemeError, Theme, ThemeSource};
pub use input::{
    InputTracker, PointerState, SmoothedPointer, ViewportPolicy, ViewportState,
    DEFAULT_SMOOTHING,
};
pub use raster::render_frame;
