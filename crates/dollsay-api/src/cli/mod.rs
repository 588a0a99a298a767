//! CLI command definitions for the `dollsay` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod provider;
pub mod session;

use clap::{Parser, Subcommand};

/// Companion chat backend with a guest message quota.
#[derive(Parser)]
#[command(name = "dollsay", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter implied by `-v` / `--quiet`. `RUST_LOG` takes precedence.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "info",
            1 => "info,dollsay=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server.
    Serve {
        /// Port to listen on (overrides server.port).
        #[arg(long)]
        port: Option<u16>,

        /// Host to bind to (overrides server.host).
        #[arg(long)]
        host: Option<String>,

        /// Keep quota records in memory instead of SQLite.
        #[arg(long)]
        memory: bool,
    },

    /// Inspect guest session quota records.
    Session {
        #[command(subcommand)]
        action: session::SessionCommand,
    },

    /// Check the configured LLM provider.
    Provider {
        #[command(subcommand)]
        action: provider::ProviderCommand,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from(["dollsay", "serve", "--port", "9000", "--memory"]).unwrap();
        match cli.command {
            Commands::Serve { port, host, memory } => {
                assert_eq!(port, Some(9000));
                assert!(host.is_none());
                assert!(memory);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_session_show() {
        let cli = Cli::try_parse_from(["dollsay", "--json", "session", "show", "guest-1"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Session {
                action: session::SessionCommand::Show { session_id },
            } => assert_eq!(session_id, "guest-1"),
            _ => panic!("expected session show"),
        }
    }

    #[test]
    fn test_log_filter_from_verbosity() {
        let cli = Cli::try_parse_from(["dollsay", "-vv", "provider", "test"]).unwrap();
        assert_eq!(cli.log_filter(), "trace");
        let cli = Cli::try_parse_from(["dollsay", "--quiet", "provider", "test"]).unwrap();
        assert_eq!(cli.log_filter(), "error");
    }
}
