use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use caustics::{FrameParameters, PointerState, SmoothedPointer, Theme, ViewportState};

/// Abstraction over where time values originate from.
pub trait TimeSource: Send {
    /// Resets the source to its initial state.
    fn reset(&mut self);
    /// Seconds to feed the shader for the next frame.
    fn sample(&mut self) -> f32;
}

/// Time source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn reset(&mut self) {
        self.origin = Instant::now();
    }

    fn sample(&mut self) -> f32 {
        self.origin.elapsed().as_secs_f32()
    }
}

/// Time source that always reports a fixed timestamp, for still frames.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    time: f32,
}

impl FixedTimeSource {
    pub fn new(time: f32) -> Self {
        Self { time }
    }
}

impl TimeSource for FixedTimeSource {
    fn reset(&mut self) {}

    fn sample(&mut self) -> f32 {
        self.time
    }
}

pub type BoxedTimeSource = Box<dyn TimeSource + Send>;

/// Shared stop flag for the render loop.
///
/// Clones observe the same flag; once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Optional frame-rate cap layered on top of vsync-paced redraws.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Option<Duration>,
    last_frame: Option<Instant>,
}

// Redraw slightly early rather than miss the refresh the cap lands on.
const SCHEDULER_SLACK: Duration = Duration::from_micros(250);

impl FrameScheduler {
    /// Caps below one frame per second are raised to one.
    pub fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .and_then(|fps| Duration::try_from_secs_f32(1.0 / fps.max(1.0)).ok());
        Self {
            interval,
            last_frame: None,
        }
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match (self.interval, self.last_frame) {
            (Some(interval), Some(last)) => {
                now.saturating_duration_since(last) + SCHEDULER_SLACK >= interval
            }
            _ => true,
        }
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }

    /// When the next frame becomes due; `None` means "on the next refresh".
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.interval, self.last_frame) {
            (Some(interval), Some(last)) => Some(last + interval),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.last_frame = None;
    }
}

/// Lifecycle of the render loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopState {
    /// No frame produced yet.
    Uninitialized,
    /// Producing one frame per refresh until cancelled.
    Running { frames: u64 },
}

/// Per-frame state machine: time, pointer smoothing and parameter assembly.
pub struct RenderLoop {
    state: LoopState,
    time_source: BoxedTimeSource,
    smoothed: SmoothedPointer,
    smoothing: f32,
}

impl RenderLoop {
    pub fn new(time_source: BoxedTimeSource, smoothing: f32) -> Self {
        Self {
            state: LoopState::Uninitialized,
            time_source,
            smoothed: SmoothedPointer::default(),
            smoothing,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Advances one cycle and returns the parameters for this frame.
    ///
    /// The first call starts the clock, so elapsed time is measured from the
    /// first frame rather than from construction.
    pub fn next_frame(
        &mut self,
        pointer: PointerState,
        viewport: ViewportState,
        theme: Theme,
    ) -> FrameParameters {
        let frames = match self.state {
            LoopState::Uninitialized => {
                self.time_source.reset();
                0
            }
            LoopState::Running { frames } => frames,
        };
        let seconds = self.time_source.sample();
        let position = self.smoothed.step(pointer, self.smoothing);
        self.state = LoopState::Running {
            frames: frames.saturating_add(1),
        };

        let (width, height) = viewport.extent();
        FrameParameters::new(
            seconds,
            glam::Vec2::new(width as f32, height as f32),
            position,
            theme,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> ViewportState {
        ViewportState {
            width: 640,
            height: 360,
        }
    }

    #[test]
    fn render_loop_starts_uninitialized_then_runs() {
        let mut render_loop = RenderLoop::new(Box::new(FixedTimeSource::new(1.5)), 0.03);
        assert_eq!(render_loop.state(), LoopState::Uninitialized);

        let params = render_loop.next_frame(PointerState::default(), viewport(), Theme::Dark);
        assert_eq!(render_loop.state(), LoopState::Running { frames: 1 });
        assert_eq!(params.elapsed_seconds, 1.5);
        assert_eq!(params.resolution, glam::Vec2::new(640.0, 360.0));
        assert_eq!(params.theme_flag, 1.0);

        render_loop.next_frame(PointerState::default(), viewport(), Theme::Dark);
        assert_eq!(render_loop.state(), LoopState::Running { frames: 2 });
    }

    #[test]
    fn render_loop_smooths_pointer_each_frame() {
        let mut render_loop = RenderLoop::new(Box::new(FixedTimeSource::new(0.0)), 0.5);
        let target = PointerState::new(1.0, 0.0);
        let first = render_loop.next_frame(target, viewport(), Theme::Light);
        assert_eq!(first.pointer, glam::Vec2::new(0.75, 0.25));
        let second = render_loop.next_frame(target, viewport(), Theme::Light);
        assert_eq!(second.pointer, glam::Vec2::new(0.875, 0.125));
    }

    #[test]
    fn render_loop_reads_theme_every_frame() {
        let mut render_loop = RenderLoop::new(Box::new(FixedTimeSource::new(0.0)), 0.03);
        let light = render_loop.next_frame(PointerState::default(), viewport(), Theme::Light);
        let dark = render_loop.next_frame(PointerState::default(), viewport(), Theme::Dark);
        assert_eq!(light.theme_flag, 0.0);
        assert_eq!(dark.theme_flag, 1.0);
    }

    #[test]
    fn render_loop_clamps_empty_viewport() {
        let mut render_loop = RenderLoop::new(Box::new(FixedTimeSource::new(0.0)), 0.03);
        let empty = ViewportState {
            width: 0,
            height: 0,
        };
        let params = render_loop.next_frame(PointerState::default(), empty, Theme::Light);
        assert_eq!(params.resolution, glam::Vec2::ONE);
    }

    #[test]
    fn system_time_source_is_monotonic() {
        let mut source = SystemTimeSource::new();
        let first = source.sample();
        let second = source.sample();
        assert!(second >= first);
    }

    #[test]
    fn cancellation_is_shared_between_clones() {
        let token = CancellationToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn uncapped_scheduler_is_always_ready() {
        let mut scheduler = FrameScheduler::new(None);
        let now = Instant::now();
        assert!(scheduler.ready_for_frame(now));
        scheduler.mark_rendered(now);
        assert!(scheduler.ready_for_frame(now));
        assert_eq!(scheduler.next_deadline(), None);
        assert_eq!(FrameScheduler::new(Some(0.0)).next_deadline(), None);
    }

    #[test]
    fn capped_scheduler_waits_for_interval() {
        let mut scheduler = FrameScheduler::new(Some(10.0));
        let start = Instant::now();
        assert!(scheduler.ready_for_frame(start));
        scheduler.mark_rendered(start);

        assert!(!scheduler.ready_for_frame(start + Duration::from_millis(50)));
        assert!(scheduler.ready_for_frame(start + Duration::from_millis(100)));
        assert_eq!(
            scheduler.next_deadline(),
            Some(start + Duration::from_secs_f32(0.1))
        );

        scheduler.reset();
        assert!(scheduler.ready_for_frame(start));
    }

    #[test]
    fn tiny_fps_cap_is_raised_to_one_per_second() {
        for fps in [1e-20, 1e-6, 0.5, f32::MIN_POSITIVE] {
            let mut scheduler = FrameScheduler::new(Some(fps));
            let start = Instant::now();
            scheduler.mark_rendered(start);
            assert_eq!(scheduler.next_deadline(), Some(start + Duration::from_secs(1)));
            assert!(scheduler.ready_for_frame(start + Duration::from_secs(1)));
        }
    }

    #[test]
    fn fixed_time_source_reports_same_time_after_reset() {
        let mut source = FixedTimeSource::new(4.25);
        assert_eq!(source.sample(), 4.25);
        source.reset();
        assert_eq!(source.sample(), 4.25);
    }
}
