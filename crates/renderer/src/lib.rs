//! GPU renderer for the caustics background.
//!
//! ```text
//!   causticwall CLI
//!          │ RendererConfig + ThemeSource
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ RenderLoop::next_frame()
//!                         ▲                                        │
//!          InputTracker ──┘                                        └─▶ CausticsUniforms ─▶ GPU
//! ```
//!
//! The caustics pass draws into a viewport-sized target that is blitted to
//! the swapchain. Missing GPU support or a shader that fails to compile ends
//! the session with [`RenderOutcome::Disabled`] rather than an error.

mod compile;
mod gpu;
pub mod runtime;
mod types;
mod window;

use caustics::ThemeSource;

pub use runtime::{
    BoxedTimeSource, CancellationToken, FixedTimeSource, FrameScheduler, LoopState, RenderLoop,
    SystemTimeSource, TimeSource,
};
pub use types::{RenderOutcome, RendererConfig, RendererError};

/// High-level entry point that owns the configuration and theme source.
pub struct Renderer {
    config: RendererConfig,
    theme: Box<dyn ThemeSource>,
}

impl Renderer {
    pub fn new(config: RendererConfig, theme: Box<dyn ThemeSource>) -> Self {
        Self { config, theme }
    }

    /// Runs until the window closes or Escape is pressed.
    pub fn run(self) -> Result<RenderOutcome, RendererError> {
        self.run_until(CancellationToken::new())
    }

    /// Runs until the window closes, Escape is pressed, or `token` is cancelled.
    pub fn run_until(self, token: CancellationToken) -> Result<RenderOutcome, RendererError> {
        tracing::info!(
            width = self.config.window_size.0,
            height = self.config.window_size.1,
            fps = ?self.config.target_fps,
            "starting caustics renderer"
        );
        window::run_window(self.config, self.theme, token)
    }
}
