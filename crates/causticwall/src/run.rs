use std::path::Path;

use anyhow::{Context, Result};
use caustics::{render_frame, Theme, ThemeSource, ViewportState};
use renderer::{FixedTimeSource, RenderLoop, RenderOutcome, Renderer, RendererConfig};
use settings::{Config, FilePreferenceStore, ThemeController};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{ExportArgs, RunArgs, ThemeAction};
use crate::paths::AppPaths;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(config_file: &Path) -> Result<Config> {
    Config::load_or_default(config_file)
        .with_context(|| format!("failed to load configuration from {}", config_file.display()))
}

fn theme_controller(paths: &AppPaths, config: &Config, system: Theme) -> ThemeController {
    let store = FilePreferenceStore::open_or_memory(&paths.preferences_file());
    ThemeController::new(store, config.theme.default, system)
}

/// Opens the window and renders until it is closed.
pub fn run(paths: &AppPaths, config_file: &Path, args: RunArgs) -> Result<()> {
    let config = load_config(config_file)?;

    let window = args.size.unwrap_or(config.render.window);
    let target_fps = args
        .fps
        .or(config.render.fps)
        .filter(|fps| *fps > 0.0);
    let smoothing = args.smoothing.unwrap_or(config.input.smoothing);

    // The window reports the real desktop scheme once it exists.
    let controller =
        theme_controller(paths, &config, Theme::default()).with_session_override(args.theme);

    let renderer_config = RendererConfig {
        window_size: (window.width, window.height),
        target_fps,
        viewport: config.render.viewport_policy(),
        smoothing,
        ..RendererConfig::default()
    };

    match Renderer::new(renderer_config, Box::new(controller)).run()? {
        RenderOutcome::Completed => {}
        RenderOutcome::Disabled { reason } => info!(%reason, "caustics effect disabled"),
    }
    Ok(())
}

/// Shades one frame on the CPU and writes it as PNG.
pub fn export(paths: &AppPaths, config_file: &Path, args: ExportArgs) -> Result<()> {
    let config = load_config(config_file)?;

    let size = args.size.unwrap_or(config.export.size);
    let time = args
        .time
        .unwrap_or_else(|| config.export.time.as_secs_f32());
    let theme = match args.theme {
        Some(theme) => theme,
        None => theme_controller(paths, &config, Theme::default()).current(),
    };
    let pointer = args.pointer.unwrap_or_default();

    // Full smoothing lands the pointer on its target in a single frame.
    let mut still = RenderLoop::new(Box::new(FixedTimeSource::new(time)), 1.0);
    let viewport = ViewportState {
        width: size.width,
        height: size.height,
    };
    let params = still.next_frame(pointer, viewport, theme);
    let image = render_frame(&params);
    image
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!(
        path = %args.output.display(),
        %size,
        time,
        %theme,
        "exported still frame"
    );
    Ok(())
}

pub fn theme(paths: &AppPaths, config_file: &Path, action: ThemeAction) -> Result<()> {
    let config = load_config(config_file)?;

    match action {
        ThemeAction::Get { system } => {
            let controller = theme_controller(paths, &config, system.unwrap_or_default());
            print_theme(controller.current());
        }
        ThemeAction::Set { theme } => {
            let mut controller = theme_controller(paths, &config, Theme::default());
            controller
                .set(theme)
                .context("failed to store theme preference")?;
            print_theme(controller.current());
        }
        ThemeAction::Toggle => {
            let mut controller = theme_controller(paths, &config, Theme::default());
            print_theme(controller.toggle());
        }
        ThemeAction::Clear => {
            let mut controller = theme_controller(paths, &config, Theme::default());
            controller
                .clear()
                .context("failed to clear theme preference")?;
            println!("theme preference cleared");
        }
    }
    Ok(())
}

fn print_theme(theme: Theme) {
    println!("{theme} (flag {:.1})", theme.flag());
}

pub fn print_paths(paths: &AppPaths, config_file: &Path) {
    println!("Configuration:");
    println!("  config dir:   {}", paths.config_dir().display());
    println!("  config file:  {}", config_file.display());
    println!("  preferences:  {}", paths.preferences_file().display());
}
