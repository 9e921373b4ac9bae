mod command;
mod repl;

use clap::Parser;
use lembretes_core::config::ConfigError;
use lembretes_core::{ClientConfig, ClientContext};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "lembretes", version, about = "Terminal client for the Lembretes reminders service")]
struct Args {
    /// Base URL of the API
    #[arg(long, env = "LEMBRETES_API_URL")]
    api_url: Option<String>,

    /// Directory for the request/response wire log
    #[arg(long, env = "LEMBRETES_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Environment first, then flags on top.
fn load_config<F>(args: &Args, lookup: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ClientConfig::from_lookup(lookup)?;
    if let Some(url) = &args.api_url {
        config.api_url = url.clone();
    }
    if let Some(dir) = &args.log_dir {
        config.log_dir = Some(dir.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = match load_config(&args, |name| std::env::var(name).ok()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    log::info!("Using API at {}", config.api_url);
    let ctx = match ClientContext::builder().config(config).build() {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = repl::run(ctx).await {
        eprintln!("Failed to read input: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
