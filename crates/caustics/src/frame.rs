use std::fmt;
use std::str::FromStr;

use glam::Vec2;

/// Colour scheme the effect is tinted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Uniform value pushed to the shader: `0.0` light, `1.0` dark.
    pub fn flag(self) -> f32 {
        match self {
            Theme::Light => 0.0,
            Theme::Dark => 1.0,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Value stored under the persisted `theme` key.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Human-facing label; exactly one is shown at a time.
    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseThemeError(String);

impl fmt::Display for ParseThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown theme '{}' (expected 'light' or 'dark')", self.0)
    }
}

impl std::error::Error for ParseThemeError {}

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(ParseThemeError(value.to_string())),
        }
    }
}

/// Where the render loop reads the current theme from each frame.
pub trait ThemeSource {
    fn theme(&self) -> Theme;
    /// Flips the theme (the toggle control) and returns the new one.
    fn toggle(&mut self) -> Theme;
    /// The desktop colour scheme changed.
    fn system_theme_changed(&mut self, system: Theme);
}

/// Theme that only changes when toggled; nothing is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedTheme(pub Theme);

impl ThemeSource for FixedTheme {
    fn theme(&self) -> Theme {
        self.0
    }

    fn toggle(&mut self) -> Theme {
        self.0 = self.0.toggled();
        self.0
    }

    fn system_theme_changed(&mut self, _system: Theme) {}
}

/// Everything one invocation of the compositor needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParameters {
    /// Seconds since the render loop started.
    pub elapsed_seconds: f32,
    /// Render target size in pixels.
    pub resolution: Vec2,
    /// Low-pass filtered pointer in normalised viewport coordinates.
    pub pointer: Vec2,
    /// `0.0` light, `1.0` dark; intermediate values blend the palettes.
    pub theme_flag: f32,
}

impl FrameParameters {
    pub fn new(elapsed_seconds: f32, resolution: Vec2, pointer: Vec2, theme: Theme) -> Self {
        Self {
            elapsed_seconds,
            resolution,
            pointer,
            theme_flag: theme.flag(),
        }
    }
}
