use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use caustics::input::{MAX_DEVICE_PIXEL_RATIO, RENDER_DOWNSCALE};
use caustics::{Theme, ViewportPolicy, DEFAULT_SMOOTHING};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

pub mod theme;

pub use theme::{
    FilePreferenceStore, MemoryPreferenceStore, PreferenceError, PreferenceStore,
    ThemeController, THEME_KEY,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderSection,
    pub input: InputSection,
    pub theme: ThemeSection,
    pub export: ExportSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderSection {
    /// Fraction of the capped physical resolution the effect renders at.
    pub downscale: f64,
    pub max_device_pixel_ratio: f64,
    /// Optional cap on top of vsync; `None` or `0` renders every refresh.
    pub fps: Option<f32>,
    /// Initial window size.
    pub window: SurfaceSize,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            downscale: RENDER_DOWNSCALE,
            max_device_pixel_ratio: MAX_DEVICE_PIXEL_RATIO,
            fps: None,
            window: SurfaceSize::new(1280, 720),
        }
    }
}

impl RenderSection {
    pub fn viewport_policy(&self) -> ViewportPolicy {
        ViewportPolicy {
            max_device_pixel_ratio: self.max_device_pixel_ratio,
            downscale: self.downscale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InputSection {
    /// Share of the remaining pointer distance covered each frame.
    pub smoothing: f32,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            smoothing: DEFAULT_SMOOTHING,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeDefault {
    /// Follow the desktop colour scheme.
    #[default]
    System,
    Light,
    Dark,
}

impl ThemeDefault {
    /// Theme used when nothing is persisted.
    pub fn resolve(self, system: Theme) -> Theme {
        match self {
            ThemeDefault::System => system,
            ThemeDefault::Light => Theme::Light,
            ThemeDefault::Dark => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ThemeSection {
    pub default: ThemeDefault,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportSection {
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub time: Duration,
    pub size: SurfaceSize,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            time: Duration::ZERO,
            size: SurfaceSize::new(960, 540),
        }
    }
}

/// Largest accepted width or height for windows and exported stills.
pub const MAX_SURFACE_DIMENSION: u32 = 16_384;

/// Accepts `0` (uncapped) or a cap of at least one frame per second.
pub fn check_fps(fps: f32) -> Result<f32, String> {
    if fps == 0.0 || (fps.is_finite() && fps >= 1.0) {
        Ok(fps)
    } else {
        Err(format!("fps must be 0 (uncapped) or >= 1; got {fps}"))
    }
}

/// `WIDTHxHEIGHT` pair, both non-zero and at most [`MAX_SURFACE_DIMENSION`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for SurfaceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for SurfaceSize {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (width, height) = value
            .trim()
            .split_once(['x', 'X', '×'])
            .ok_or_else(|| "expected WxH format, e.g. 1920x1080".to_string())?;
        let width: u32 = width
            .trim()
            .parse()
            .map_err(|_| "invalid width in size specification".to_string())?;
        let height: u32 = height
            .trim()
            .parse()
            .map_err(|_| "invalid height in size specification".to_string())?;
        if width == 0 || height == 0 {
            return Err("surface dimensions must be greater than zero".into());
        }
        if width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION {
            return Err(format!(
                "surface dimensions must not exceed {MAX_SURFACE_DIMENSION}"
            ));
        }
        Ok(Self { width, height })
    }
}

impl<'de> Deserialize<'de> for SurfaceSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

impl Serialize for SurfaceSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&humantime::format_duration(*value))
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: Config = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no configuration file; using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Frame cap with non-positive values treated as uncapped.
    pub fn target_fps(&self) -> Option<f32> {
        self.render.fps.filter(|fps| *fps > 0.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let downscale = self.render.downscale;
        if !(downscale > 0.0 && downscale <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "render.downscale must be in (0, 1]; got {downscale}"
            )));
        }

        let ratio = self.render.max_device_pixel_ratio;
        if !(ratio.is_finite() && ratio >= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "render.max_device_pixel_ratio must be >= 1; got {ratio}"
            )));
        }

        if let Some(fps) = self.render.fps {
            check_fps(fps).map_err(|reason| ConfigError::Invalid(format!("render.{reason}")))?;
        }

        let smoothing = self.input.smoothing;
        if !(smoothing > 0.0 && smoothing <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "input.smoothing must be in (0, 1]; got {smoothing}"
            )));
        }

        Ok(())
    }
}
