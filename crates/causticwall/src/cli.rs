use std::path::PathBuf;

use caustics::{PointerState, Theme};
use clap::{Args, Parser, Subcommand};
use settings::SurfaceSize;

#[derive(Parser, Debug)]
#[command(
    name = "causticwall",
    author,
    version,
    about = "Animated caustics-light background"
)]
pub struct Cli {
    /// Configuration file (defaults to `config.toml` in the config directory).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Initial window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<SurfaceSize>,

    /// Optional FPS cap (0 = every display refresh).
    #[arg(long, value_name = "FPS", value_parser = parse_fps)]
    pub fps: Option<f32>,

    /// Pointer smoothing factor in (0, 1].
    #[arg(long, value_name = "FACTOR", value_parser = parse_smoothing)]
    pub smoothing: Option<f32>,

    /// Theme for this session only; the stored preference is left alone.
    #[arg(long, value_name = "light|dark", value_parser = parse_theme)]
    pub theme: Option<Theme>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a single frame on the CPU and save it as PNG.
    Export(ExportArgs),
    /// Inspect or change the persisted theme preference.
    Theme(ThemeCommand),
    /// Print the directories and files causticwall uses.
    Paths,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Destination PNG file.
    #[arg(long, short, value_name = "PATH")]
    pub output: PathBuf,

    /// Animation time to render, in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub time: Option<f32>,

    /// Image size (e.g. `960x540`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<SurfaceSize>,

    /// Theme to render; defaults to the resolved preference.
    #[arg(long, value_name = "light|dark", value_parser = parse_theme)]
    pub theme: Option<Theme>,

    /// Pointer position in normalised coordinates, origin bottom-left.
    #[arg(long, value_name = "X,Y", value_parser = parse_pointer)]
    pub pointer: Option<PointerState>,
}

#[derive(Args, Debug)]
pub struct ThemeCommand {
    #[command(subcommand)]
    pub action: ThemeAction,
}

#[derive(Subcommand, Debug)]
pub enum ThemeAction {
    /// Print the theme that would be used and its shader flag.
    Get {
        /// Desktop colour scheme to assume when nothing is stored.
        #[arg(long, value_name = "light|dark", value_parser = parse_theme)]
        system: Option<Theme>,
    },
    /// Persist a theme.
    Set {
        #[arg(value_name = "light|dark", value_parser = parse_theme)]
        theme: Theme,
    },
    /// Flip the resolved theme and persist the result.
    Toggle,
    /// Remove the stored preference.
    Clear,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<SurfaceSize, String> {
    value.parse()
}

pub fn parse_theme(value: &str) -> Result<Theme, String> {
    value.parse().map_err(|err| format!("{err}"))
}

pub fn parse_fps(value: &str) -> Result<f32, String> {
    let fps: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid frame rate `{value}`"))?;
    settings::check_fps(fps)
}

pub fn parse_smoothing(value: &str) -> Result<f32, String> {
    let factor: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid smoothing factor `{value}`"))?;
    if !(factor > 0.0 && factor <= 1.0) {
        return Err("smoothing factor must be in (0, 1]".into());
    }
    Ok(factor)
}

pub fn parse_pointer(value: &str) -> Result<PointerState, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| "expected X,Y (e.g. 0.5,0.5)".to_string())?;
    let parse_axis = |raw: &str| -> Result<f32, String> {
        let axis: f32 = raw
            .trim()
            .parse()
            .map_err(|_| format!("invalid pointer coordinate `{raw}`"))?;
        if !(0.0..=1.0).contains(&axis) {
            return Err("pointer coordinates must be within [0, 1]".into());
        }
        Ok(axis)
    };
    Ok(PointerState::new(parse_axis(x)?, parse_axis(y)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_pointer_pairs() {
        assert_eq!(parse_pointer("0.25, 0.75"), Ok(PointerState::new(0.25, 0.75)));
        assert!(parse_pointer("0.5").is_err());
        assert!(parse_pointer("1.5,0.5").is_err());
        assert!(parse_pointer("a,b").is_err());
    }

    #[test]
    fn smoothing_must_be_a_fraction() {
        assert_eq!(parse_smoothing("0.1"), Ok(0.1));
        assert!(parse_smoothing("0").is_err());
        assert!(parse_smoothing("1.5").is_err());
        assert!(parse_smoothing("NaN").is_err());
    }

    #[test]
    fn fps_cap_rejects_sub_hertz_rates() {
        assert_eq!(parse_fps("0"), Ok(0.0));
        assert_eq!(parse_fps("30"), Ok(30.0));
        assert!(parse_fps("1e-20").is_err());
        assert!(parse_fps("0.25").is_err());
        assert!(parse_fps("-5").is_err());
        assert!(parse_fps("fast").is_err());
        assert!(Cli::try_parse_from(["causticwall", "--fps", "1e-20"]).is_err());
    }

    #[test]
    fn export_size_is_bounded() {
        assert!(parse_size("100000x100000").is_err());
        assert!(Cli::try_parse_from([
            "causticwall",
            "export",
            "-o",
            "frame.png",
            "--size",
            "100000x100000",
        ])
        .is_err());
    }

    #[test]
    fn theme_subcommands_parse() {
        let cli = Cli::try_parse_from(["causticwall", "theme", "set", "dark"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Theme(ThemeCommand {
                action: ThemeAction::Set { theme: Theme::Dark }
            }))
        ));

        let cli =
            Cli::try_parse_from(["causticwall", "theme", "get", "--system", "light"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Theme(ThemeCommand {
                action: ThemeAction::Get {
                    system: Some(Theme::Light)
                }
            }))
        ));

        assert!(Cli::try_parse_from(["causticwall", "theme", "set", "sepia"]).is_err());
    }

    #[test]
    fn run_flags_parse_without_subcommand() {
        let cli = Cli::try_parse_from([
            "causticwall",
            "--size",
            "800x600",
            "--fps",
            "30",
            "--theme",
            "dark",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.size, Some(SurfaceSize::new(800, 600)));
        assert_eq!(cli.run.fps, Some(30.0));
        assert_eq!(cli.run.theme, Some(Theme::Dark));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["causticwall", "paths", "--config", "/tmp/c.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }
}
