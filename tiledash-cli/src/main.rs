// tiledash-cli/src/main.rs
use std::path::PathBuf;

use tiledash_core::{App, ConfigLoader, PanelRegistry, logging};

const USAGE: &str = "Usage: tiledash [--config=PATH] [--no-watch]

Options:
  --config=PATH  Config file (default: <config dir>/tiledash/config.toml)
  --no-watch     Do not reload when the config file changes
  --version      Print the version and exit
  -h, --help     Print this help and exit";

#[derive(Debug)]
struct Args {
    config: Option<PathBuf>,
    watch: bool,
}

enum Command {
    Run(Args),
    Help,
    Version,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command, String> {
    let mut parsed = Args {
        config: None,
        watch: true,
    };

    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--version" => return Ok(Command::Version),
            "--no-watch" => parsed.watch = false,
            _ => match arg.strip_prefix("--config=") {
                Some(path) if !path.is_empty() => parsed.config = Some(PathBuf::from(path)),
                _ => return Err(format!("Unknown argument '{}'\n\n{}", arg, USAGE)),
            },
        }
    }

    Ok(Command::Run(parsed))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = match parse_args(std::env::args().skip(1))? {
        Command::Run(args) => args,
        Command::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        Command::Version => {
            println!("tiledash {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
    };

    let config_path = match args.config {
        Some(path) => path,
        None => ConfigLoader::default_path()?,
    };

    // Seeds a sample config on first start
    let loader = ConfigLoader::new(&config_path)?;
    let config = loader.load()?;

    // The log file lives next to the config file
    let app_dir = loader
        .path()
        .parent()
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|dir| dir.join("tiledash")))
        .ok_or("Config directory not found")?;
    let _log_guard = logging::init(&app_dir, &config.app.log)?;

    let mut registry = PanelRegistry::new();
    tiledash_panels::register_all(&mut registry);
    tracing::debug!(types = ?registry.types(), "panel types registered");

    let mut app = App::new(app_dir, loader, registry);
    if let Err(e) = app.run(args.watch) {
        tracing::error!("tiledash stopped: {e}");
        return Err(e.into());
    }

    tracing::info!("tiledash exited");
    Ok(())
}
