//! Session CLI commands: show.
//!
//! Reads a guest session's quota record from the SQLite store.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use dollsay_core::repository::session::SessionStore;
use dollsay_types::config::AppConfig;
use dollsay_types::session::GuestSession;

/// Session subcommands.
#[derive(Subcommand)]
pub enum SessionCommand {
    /// Show the quota record for a session id.
    Show {
        /// Session id as sent by the client.
        session_id: String,
    },
}

/// Print a guest session's message count and remaining quota.
///
/// # Examples
///
/// ```bash
/// dollsay session show guest-1a2b
/// dollsay session show guest-1a2b --json
/// ```
pub async fn show_session<S: SessionStore>(
    store: &S,
    config: &AppConfig,
    session_id: &str,
    json: bool,
) -> Result<()> {
    let limit = config.guest.max_messages;
    let session = store.get(session_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session_json(session.as_ref(), session_id, limit))?);
        return Ok(());
    }

    let Some(session) = session else {
        println!();
        println!(
            "  {} No guest session '{}' recorded yet ({} messages available).",
            style("i").blue().bold(),
            style(session_id).cyan(),
            limit
        );
        println!();
        return Ok(());
    };

    let remaining = session.remaining(limit);
    let remaining_color = if remaining == 0 { Color::Red } else { Color::Green };

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Messages").fg(Color::White),
        Cell::new("Remaining").fg(Color::White),
        Cell::new("Created").fg(Color::White),
        Cell::new("Last message").fg(Color::White),
    ]);
    table.add_row(vec![
        Cell::new(format!("{}/{}", session.messages_count, limit)).fg(Color::Cyan),
        Cell::new(remaining.to_string()).fg(remaining_color),
        Cell::new(session.created_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
        Cell::new(session.updated_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
    ]);

    println!();
    println!("  Guest session '{}'", style(&session.session_id).cyan().bold());
    println!();
    println!("{table}");
    println!();
    Ok(())
}

fn session_json(session: Option<&GuestSession>, session_id: &str, limit: u32) -> serde_json::Value {
    match session {
        Some(s) => serde_json::json!({
            "sessionId": s.session_id,
            "messagesCount": s.messages_count,
            "remainingMessages": s.remaining(limit),
            "createdAt": s.created_at,
            "updatedAt": s.updated_at,
        }),
        None => serde_json::json!({
            "sessionId": session_id,
            "messagesCount": 0,
            "remainingMessages": limit,
            "createdAt": null,
            "updatedAt": null,
        }),
    }
}
