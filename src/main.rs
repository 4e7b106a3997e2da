//! SkipRamp - ad skip and playback-rate ramp for browser video players.
//!
//! Main entry point: loads settings, installs tracing and supervises the
//! browser's player tabs until Ctrl-C.

mod cli;
mod supervisor;

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skipramp_config::{Config, ConfigLoader, ConfigValidator, ValidationResult};
use tokio_util::sync::CancellationToken;

use crate::cli::{Cli, Commands};
use crate::supervisor::Supervisor;

/// Get the .skipramp directory path.
fn skipramp_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".skipramp"))
        .unwrap_or_else(|| PathBuf::from(".skipramp"))
}

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.skipramp/logs/ with daily rotation.
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = skipramp_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("skipramp")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Flushes buffered lines on exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Load the config file and apply command-line overrides.
///
/// An explicit `--config` must exist; the default location is optional.
fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load(path)?,
        None => ConfigLoader::load_or_default(&ConfigLoader::default_path())?,
    };
    apply_overrides(&mut config, cli.endpoint.as_deref(), cli.grace);
    Ok(config)
}

fn apply_overrides(config: &mut Config, endpoint: Option<&str>, grace: Option<f64>) {
    if let Some(endpoint) = endpoint {
        config.browser.endpoint = endpoint.to_string();
    }
    if let Some(grace) = grace {
        config.settings.ad_grace_delay_seconds = grace;
    }
}

/// Log validation findings. Returns whether the configuration is usable.
fn report_validation(result: &ValidationResult) -> bool {
    for warning in &result.warnings {
        warn!("Config warning at {}: {}", warning.path, warning.message);
    }
    for err in &result.errors {
        error!("Config error at {}: {}", err.path, err.message);
    }
    result.is_valid()
}

fn print_settings(config: &Config) {
    let settings = &config.settings;
    println!("Endpoint:        {}", config.browser.endpoint);
    println!("Scan interval:   {} ms", config.browser.scan_interval_ms);
    println!("Allowed sites:   {}", settings.allowed_sites.join(", "));
    println!("Target speed:    {}x", settings.target_speed);
    println!("Ad grace delay:  {} s", settings.ad_grace_delay_seconds);
    println!("Skip method:     {}", settings.skip_method.as_str());
    println!("Cursor cue:      {}", settings.cursor_cue);
    println!("Keys:            {}", config.keys.all().join(" "));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let valid = report_validation(&ConfigValidator::validate(&config));

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Check => {
            print_settings(&config);
            if !valid {
                return Err("configuration has errors".into());
            }
            println!("Configuration OK");
        }
        Commands::Run => {
            if !valid {
                return Err("configuration has errors".into());
            }

            let shutdown = CancellationToken::new();
            let ctrl_c = shutdown.clone();
            tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for Ctrl-C: {}", e);
                }
                info!("Shutting down");
                ctrl_c.cancel();
            });

            info!(endpoint = %config.browser.endpoint, "SkipRamp starting");
            Supervisor::new(config).run(shutdown).await;
        }
    }

    Ok(())
}
