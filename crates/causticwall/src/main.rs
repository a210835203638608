mod cli;
mod paths;
mod run;

use anyhow::Result;
use cli::Command;
use paths::AppPaths;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    let paths = AppPaths::discover()?;
    let config_file = cli
        .config
        .clone()
        .unwrap_or_else(|| paths.config_file());

    match cli.command {
        Some(Command::Export(args)) => run::export(&paths, &config_file, args),
        Some(Command::Theme(theme)) => run::theme(&paths, &config_file, theme.action),
        Some(Command::Paths) => {
            run::print_paths(&paths, &config_file);
            Ok(())
        }
        None => run::run(&paths, &config_file, cli.run),
    }
}
