//! Pointer, touch and viewport tracking.
//!
//! Event handlers write into an [`InputTracker`]; the render loop reads a
//! snapshot once per frame. Everything here runs on the event-loop thread.

use glam::Vec2;

/// Default per-frame smoothing factor (~97% of the previous value kept).
pub const DEFAULT_SMOOTHING: f32 = 0.03;

/// Device pixel ratios above this are treated as this value.
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0;

/// Render resolution relative to the capped physical size.
pub const RENDER_DOWNSCALE: f64 = 0.5;

/// Raw pointer in normalised viewport coordinates, `y = 0` at the bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl PointerState {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Normalises a window-space position (origin top-left). Returns `None`
    /// while the window has no area.
    pub fn from_window(x: f64, y: f64, width: f64, height: f64) -> Option<Self> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        Some(Self {
            x: (x / width) as f32,
            y: (1.0 - y / height) as f32,
        })
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl Default for PointerState {
    fn default() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

/// Exponential low-pass of [`PointerState`], advanced once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedPointer {
    current: Vec2,
}

impl SmoothedPointer {
    pub fn new(start: PointerState) -> Self {
        Self {
            current: start.as_vec2(),
        }
    }

    /// Moves `factor` of the remaining distance towards `target`.
    pub fn step(&mut self, target: PointerState, factor: f32) -> Vec2 {
        let factor = factor.clamp(0.0, 1.0);
        self.current += (target.as_vec2() - self.current) * factor;
        self.current
    }

    pub fn position(&self) -> Vec2 {
        self.current
    }
}

impl Default for SmoothedPointer {
    fn default() -> Self {
        Self::new(PointerState::default())
    }
}

/// How logical window sizes turn into render-target pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportPolicy {
    pub max_device_pixel_ratio: f64,
    pub downscale: f64,
}

impl ViewportPolicy {
    /// `floor(logical * min(dpr, cap) * downscale)` per axis.
    pub fn pixel_size(&self, logical_width: f64, logical_height: f64, dpr: f64) -> ViewportState {
        let ratio = dpr.min(self.max_device_pixel_ratio) * self.downscale;
        ViewportState {
            width: (logical_width * ratio).floor().max(0.0) as u32,
            height: (logical_height * ratio).floor().max(0.0) as u32,
        }
    }
}

impl Default for ViewportPolicy {
    fn default() -> Self {
        Self {
            max_device_pixel_ratio: MAX_DEVICE_PIXEL_RATIO,
            downscale: RENDER_DOWNSCALE,
        }
    }
}

/// Pixel dimensions of the render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportState {
    pub width: u32,
    pub height: u32,
}

impl ViewportState {
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Size usable as a texture extent (never zero).
    pub fn extent(self) -> (u32, u32) {
        (self.width.max(1), self.height.max(1))
    }
}

/// Shared input state written by event handlers and read by the render loop.
#[derive(Debug, Clone)]
pub struct InputTracker {
    policy: ViewportPolicy,
    pointer: PointerState,
    primary_touch: Option<u64>,
    viewport: Option<ViewportState>,
}

impl InputTracker {
    pub fn new(policy: ViewportPolicy) -> Self {
        Self {
            policy,
            pointer: PointerState::default(),
            primary_touch: None,
            viewport: None,
        }
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn viewport(&self) -> Option<ViewportState> {
        self.viewport
    }

    /// Cursor moved to `(x, y)` inside a `width` × `height` window.
    pub fn pointer_moved(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if let Some(pointer) = PointerState::from_window(x, y, width, height) {
            self.pointer = pointer;
        }
    }

    pub fn touch_started(&mut self, id: u64) {
        self.primary_touch.get_or_insert(id);
    }

    /// Only the primary touch steers the pointer.
    pub fn touch_moved(&mut self, id: u64, x: f64, y: f64, width: f64, height: f64) {
        if *self.primary_touch.get_or_insert(id) != id {
            return;
        }
        self.pointer_moved(x, y, width, height);
    }

    pub fn touch_ended(&mut self, id: u64) {
        if self.primary_touch == Some(id) {
            self.primary_touch = None;
        }
    }

    /// Recomputes the viewport; returns the new state only when it changed.
    pub fn resized(
        &mut self,
        logical_width: f64,
        logical_height: f64,
        dpr: f64,
    ) -> Option<ViewportState> {
        let next = self.policy.pixel_size(logical_width, logical_height, dpr);
        if self.viewport == Some(next) {
            return None;
        }
        self.viewport = Some(next);
        Some(next)
    }
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new(ViewportPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_starts_centred() {
        let tracker = InputTracker::default();
        assert_eq!(tracker.pointer(), PointerState::new(0.5, 0.5));
    }

    #[test]
    fn pointer_is_normalised_and_flipped() {
        let mut tracker = InputTracker::default();
        tracker.pointer_moved(200.0, 150.0, 800.0, 600.0);
        assert_eq!(tracker.pointer(), PointerState::new(0.25, 0.75));
        tracker.pointer_moved(800.0, 600.0, 800.0, 600.0);
        assert_eq!(tracker.pointer(), PointerState::new(1.0, 0.0));
    }

    #[test]
    fn zero_sized_window_keeps_last_pointer() {
        let mut tracker = InputTracker::default();
        tracker.pointer_moved(10.0, 10.0, 0.0, 600.0);
        assert_eq!(tracker.pointer(), PointerState::default());
    }

    #[test]
    fn only_primary_touch_moves_pointer() {
        let mut tracker = InputTracker::default();
        tracker.touch_started(1);
        tracker.touch_started(2);
        tracker.touch_moved(2, 0.0, 0.0, 100.0, 100.0);
        assert_eq!(tracker.pointer(), PointerState::default());
        tracker.touch_moved(1, 25.0, 75.0, 100.0, 100.0);
        assert_eq!(tracker.pointer(), PointerState::new(0.25, 0.25));

        tracker.touch_ended(1);
        tracker.touch_moved(2, 50.0, 0.0, 100.0, 100.0);
        assert_eq!(tracker.pointer(), PointerState::new(0.5, 1.0));
    }

    #[test]
    fn smoothed_pointer_approaches_fixed_target_without_overshoot() {
        let target = PointerState::new(0.9, 0.1);
        let mut smoothed = SmoothedPointer::default();
        let mut previous = (target.as_vec2() - smoothed.position()).length();
        for frame in 0..300 {
            let position = smoothed.step(target, DEFAULT_SMOOTHING);
            let distance = (target.as_vec2() - position).length();
            assert!(distance < previous, "frame {frame}: {distance} >= {previous}");
            assert!(distance >= 0.0);
            assert!(position.x <= target.x && position.y >= target.y);
            previous = distance;
        }
    }

    #[test]
    fn smoothing_step_is_bounded_by_factor() {
        let mut smoothed = SmoothedPointer::default();
        let position = smoothed.step(PointerState::new(1.5, 0.5), 0.03);
        assert!((position.x - (0.5 + 0.03)).abs() < 1e-6);
        assert_eq!(position.y, 0.5);
    }

    #[test]
    fn viewport_caps_device_pixel_ratio() {
        let policy = ViewportPolicy::default();
        assert_eq!(
            policy.pixel_size(1000.0, 800.0, 3.0),
            ViewportState {
                width: 1000,
                height: 800
            }
        );
        assert_eq!(
            policy.pixel_size(1001.0, 601.0, 1.0),
            ViewportState {
                width: 500,
                height: 300
            }
        );
    }

    #[test]
    fn viewport_reports_only_changes() {
        let mut tracker = InputTracker::default();
        assert!(tracker.resized(1280.0, 720.0, 1.0).is_some());
        assert!(tracker.resized(1280.0, 720.0, 1.0).is_none());
        // Same pixels from a different logical size/ratio combination.
        assert!(tracker.resized(640.0, 360.0, 2.0).is_none());
        assert_eq!(
            tracker.resized(1920.0, 1080.0, 1.0),
            Some(ViewportState {
                width: 960,
                height: 540
            })
        );
    }

    #[test]
    fn extent_is_never_zero() {
        let state = ViewportState {
            width: 0,
            height: 3,
        };
        assert_eq!(state.extent(), (1, 3));
    }
}
