use caustics::{Theme, ViewportPolicy, DEFAULT_SMOOTHING};
use thiserror::Error;

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors the resolved CLI flags and config file: the size
/// of the window, the frame-rate cap, and how the pointer and viewport are
/// derived from window events.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Initial window size in logical pixels.
    pub window_size: (u32, u32),
    /// Prefix for the window title; the active theme label is appended.
    pub title: String,
    /// Optional FPS cap; None = render on every display refresh.
    pub target_fps: Option<f32>,
    /// Converts logical window size and scale factor into the render size.
    pub viewport: ViewportPolicy,
    /// Per-frame pointer smoothing factor.
    pub smoothing: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            window_size: (1280, 720),
            title: String::from("causticwall"),
            target_fps: None,
            viewport: ViewportPolicy::default(),
            smoothing: DEFAULT_SMOOTHING,
        }
    }
}

impl RendererConfig {
    pub(crate) fn window_title(&self, theme: Theme) -> String {
        format!("{} ({})", self.title, theme.label())
    }
}

/// How a renderer session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The loop ran until the window closed or the token was cancelled.
    Completed,
    /// The effect switched itself off; the host keeps running without it.
    Disabled { reason: String },
}

#[derive(Debug, Error)]
pub enum RendererError {
    /// No usable adapter, surface or device on this machine.
    #[error("graphics environment unsupported: {0}")]
    Unsupported(String),
    #[error("{stage} shader failed to compile: {message}")]
    ShaderCompile {
        stage: &'static str,
        message: String,
    },
    /// Shaders compiled but the pipeline built from them was rejected.
    #[error("{label} failed to link: {message}")]
    PipelineLink {
        label: &'static str,
        message: String,
    },
    #[error("window event loop failed: {0}")]
    EventLoop(String),
}

impl RendererError {
    /// Errors that switch the effect off instead of failing the host.
    pub fn disables_effect(&self) -> bool {
        matches!(
            self,
            RendererError::Unsupported(_)
                | RendererError::ShaderCompile { .. }
                | RendererError::PipelineLink { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_carries_exactly_one_theme_label() {
        let config = RendererConfig::default();
        let dark = config.window_title(Theme::Dark);
        assert!(dark.contains(Theme::Dark.label()));
        assert!(!dark.contains(Theme::Light.label()));
        let light = config.window_title(Theme::Light);
        assert!(light.contains(Theme::Light.label()));
        assert!(!light.contains(Theme::Dark.label()));
    }

    #[test]
    fn only_environment_and_shader_failures_disable() {
        assert!(RendererError::Unsupported("no adapter".into()).disables_effect());
        assert!(RendererError::ShaderCompile {
            stage: "fragment",
            message: "bad".into()
        }
        .disables_effect());
        assert!(RendererError::PipelineLink {
            label: "caustics pipeline",
            message: "location mismatch".into()
        }
        .disables_effect());
        assert!(!RendererError::EventLoop("closed".into()).disables_effect());
    }
}
