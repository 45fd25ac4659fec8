use clap::Parser;

use reelprompt::cli::{self, Args, Command};
use reelprompt::config::{Config, Settings};

/// Load .env file and set up logging.
///
/// Existing environment variables are not overridden by `.env`.
fn load_env() {
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

fn load_settings(args: &Args) -> Result<Settings, String> {
    // An explicit --config must exist; the default path may be absent.
    let config = match args.config {
        Some(ref path) => Config::load_explicit(path).map_err(|e| e.to_string())?,
        None => match Config::load(None) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Warning: Failed to load config file: {}", e);
                eprintln!("Using default settings.\n");
                Config::default()
            }
        },
    };
    Ok(Settings::resolve(&config, &args.overrides()))
}

fn run(args: Args) -> Result<(), String> {
    let settings = load_settings(&args)?;

    let command = match args.command {
        Some(Command::Config { action }) => return cli::handle_config_action(action, &settings),
        other => other.unwrap_or(Command::Interactive),
    };

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to create async runtime: {}", e))?;

    rt.block_on(async {
        match command {
            Command::Interactive => cli::run_interactive(&settings).await,
            Command::Generate { prompt, download } => {
                cli::run_generate(&settings, &prompt, download).await
            }
            Command::Health => cli::run_health(&settings).await,
            Command::Info => cli::run_info(&settings).await,
            Command::Config { .. } => Ok(()),
        }
    })
}

fn main() {
    load_env();

    let args = Args::parse();
    log::debug!("Parsed arguments: {:?}", args);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
