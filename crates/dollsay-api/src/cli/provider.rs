//! Provider CLI commands: test.
//!
//! Sends a minimal completion to the configured endpoint to verify the
//! API key and base URL.

use anyhow::Result;
use clap::Subcommand;
use console::style;

use dollsay_infra::llm::test_provider_connection;
use dollsay_types::config::AppConfig;

use crate::state::build_provider;

/// Provider subcommands.
#[derive(Subcommand)]
pub enum ProviderCommand {
    /// Send a probe completion to the configured provider.
    Test,
}

/// Probe the configured provider and report the result.
pub async fn test_provider(config: &AppConfig, json: bool) -> Result<()> {
    let provider = build_provider(config)?;
    let name = provider.name().to_string();
    let model = config.provider.model.clone();

    if !json {
        print!(
            "  Testing connection to {} ({})... ",
            style(&name).cyan(),
            model
        );
        let _ = std::io::Write::flush(&mut std::io::stdout());
    }

    match test_provider_connection(&provider).await {
        Ok(()) => {
            if json {
                let out = serde_json::json!({
                    "provider": name,
                    "model": model,
                    "connected": true,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", style("connected").green().bold());
            }
            Ok(())
        }
        Err(e) => {
            if json {
                let err = serde_json::json!({
                    "error": "connection_test_failed",
                    "message": e.to_string(),
                    "provider": name,
                });
                println!("{}", serde_json::to_string_pretty(&err)?);
            } else {
                println!("{}", style("FAILED").red().bold());
                eprintln!(
                    "  {} Connection test failed: {}",
                    style("!").red().bold(),
                    e
                );
                eprintln!(
                    "  {} Check {} and provider.base_url in config.toml.",
                    style("Tip:").dim(),
                    style(dollsay_infra::config::API_KEY_ENV).cyan()
                );
            }
            Err(e.into())
        }
    }
}
