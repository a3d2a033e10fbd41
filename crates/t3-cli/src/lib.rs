//! Argument parsing and command execution for the `t3` binary.
//!
//! Commands return the rendered output instead of printing it so they can be
//! tested without spawning a process.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;

use t3_lib::format::{board_text, bus_text};
use t3_lib::{build_client, fetch_board, fetch_bus_arrivals, Settings, TrainProvider};

#[derive(Parser, Debug)]
#[command(author, version, about = "Terse live bus and rail times")]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON, the same shape the Lambdas return.
    #[default]
    Json,
    /// Short human-readable lines.
    Text,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the next K2 buses at a stop.
    Bus {
        /// Stop key, e.g. parklands or surbiton.
        #[arg(long, default_value = "parklands")]
        stop: String,
    },
    /// Show the next departures between two stations.
    Trains {
        /// Origin CRS code.
        #[arg(long = "from", default_value = "sur")]
        from: String,
        /// Destination CRS code.
        #[arg(long = "to", default_value = "wat")]
        to: String,
        /// Upstream to query. Defaults to TRAINS_PROVIDER, then huxley.
        #[arg(long)]
        provider: Option<TrainProvider>,
    },
}

fn render<T, F>(format: OutputFormat, value: &T, text: F) -> Result<String>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).context("failed to serialise output"),
        OutputFormat::Text => Ok(text(value)),
    }
}

/// Run `cli` against upstreams described by `settings`.
pub async fn execute(cli: Cli, settings: &Settings) -> Result<String> {
    let client = build_client()?;

    match cli.command {
        Command::Bus { stop } => {
            let arrivals = fetch_bus_arrivals(&client, &settings.tfl, stop.trim()).await?;
            render(cli.format, &arrivals, bus_text)
        }
        Command::Trains { from, to, provider } => {
            let provider = match provider {
                Some(provider) => provider,
                None => TrainProvider::from_env()?,
            };
            debug!(%provider, from = %from, to = %to, "fetching departure board");
            let board = fetch_board(&client, settings, provider, from.trim(), to.trim()).await?;
            render(cli.format, &board, board_text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_lambdas() {
        let cli = Cli::try_parse_from(["t3", "trains"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Command::Trains { from, to, provider } => {
                assert_eq!(from, "sur");
                assert_eq!(to, "wat");
                assert_eq!(provider, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn format_is_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from(["t3", "bus", "--stop", "surbiton", "--format", "text"])
            .unwrap();
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(matches!(cli.command, Command::Bus { ref stop } if stop == "surbiton"));
    }

    #[test]
    fn provider_parses_case_insensitively() {
        let cli = Cli::try_parse_from(["t3", "trains", "--provider", "RTT"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Trains {
                provider: Some(TrainProvider::Rtt),
                ..
            }
        ));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = Cli::try_parse_from(["t3", "trains", "--provider", "teletext"]).unwrap_err();
        assert!(err.to_string().contains("unknown train provider"));
    }

    #[tokio::test]
    async fn missing_darwin_key_surfaces_the_library_error() {
        let cli = Cli::try_parse_from(["t3", "trains", "--provider", "darwin"]).unwrap();
        let err = execute(cli, &Settings::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Darwin API key not configured");
    }
}
