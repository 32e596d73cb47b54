//! History and rewrite commands.
//!
//! `history` prints the semicolon-delimited text format, which `rewrite`
//! accepts back unchanged.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use std::io::Read;
use std::path::PathBuf;

use punchclock_core::engine::HistoryEntry;
use punchclock_core::text::{format_history, parse_rewrite_input};

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct HistoryArgs {
    /// Clock id
    pub id: String,
}

#[derive(Args)]
pub struct RewriteArgs {
    /// Clock id
    pub id: String,

    /// Read events from a file instead of stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

pub async fn history(args: HistoryArgs, client: &ApiClient, format: OutputFormat) -> Result<()> {
    let entries: Vec<HistoryEntry> = client.call("history", json!({ "id": args.id })).await?;

    match format {
        OutputFormat::Table => print!("{}", format_history(&entries)),
        _ => output::print_item(&entries, format)?,
    }
    Ok(())
}

pub async fn rewrite(args: RewriteArgs, client: &ApiClient, format: OutputFormat) -> Result<()> {
    let input = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let events = parse_rewrite_input(&input)?;
    let count = events.len();

    client
        .call::<serde_json::Value>("rewrite", json!({ "id": args.id, "events": events }))
        .await?;

    match format {
        OutputFormat::Table => {
            output::print_success(&format!("Rewrote {} with {} events", args.id, count))
        }
        _ => output::print_item(&json!({ "id": args.id, "events": count }), format)?,
    }
    Ok(())
}
