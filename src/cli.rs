//! CLI definitions for SkipRamp.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// SkipRamp CLI.
#[derive(Parser)]
#[command(name = "skipramp")]
#[command(about = "Skips video ads and fast-forwards the ones that cannot be skipped")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.skipramp/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Browser debugging endpoint, overrides `browser.endpoint`
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Seconds to wait after an ad starts before speeding it up
    #[arg(long, global = true)]
    pub grace: Option<f64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Commands {
    /// Attach to the browser and drive every player tab (default)
    Run,

    /// Validate the configuration and print the effective settings
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["skipramp"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
        assert!(cli.endpoint.is_none());
    }

    #[test]
    fn test_overrides_parse() {
        let cli = Cli::try_parse_from([
            "skipramp",
            "--endpoint",
            "http://127.0.0.1:9333",
            "--grace",
            "0.5",
            "check",
        ])
        .unwrap();
        assert_eq!(cli.command, Some(Commands::Check));
        assert_eq!(cli.endpoint.as_deref(), Some("http://127.0.0.1:9333"));
        assert_eq!(cli.grace, Some(0.5));
    }

    #[test]
    fn test_rejects_non_numeric_grace() {
        assert!(Cli::try_parse_from(["skipramp", "--grace", "soon"]).is_err());
    }
}
