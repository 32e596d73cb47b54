//! Clock commands: start, stop, finish, list and current.

use anyhow::Result;
use clap::Args;
use colored::*;
use serde::Serialize;
use serde_json::json;
use tabled::Tabled;

use punchclock_core::engine::ClockSummary;
use punchclock_core::events::ClockStatus;
use punchclock_core::text::format_hms;

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct ClockArgs {
    /// Clock id
    pub id: String,
}

#[derive(Debug, Serialize, Tabled)]
struct ClockRow {
    #[tabled(rename = "Clock")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Elapsed")]
    elapsed: String,
    #[tabled(skip)]
    elapsed_seconds: i64,
}

impl From<ClockSummary> for ClockRow {
    fn from(summary: ClockSummary) -> Self {
        Self {
            id: summary.id,
            status: summary.status.as_str().to_string(),
            elapsed: format_hms(summary.elapsed_seconds),
            elapsed_seconds: summary.elapsed_seconds,
        }
    }
}

pub async fn start(args: ClockArgs, client: &ApiClient, format: OutputFormat) -> Result<()> {
    client.call::<serde_json::Value>("start", json!({ "id": args.id })).await?;
    acknowledge(&args.id, "started", format)
}

pub async fn stop(args: ClockArgs, client: &ApiClient, format: OutputFormat) -> Result<()> {
    client.call::<serde_json::Value>("stop", json!({ "id": args.id })).await?;
    acknowledge(&args.id, "stopped", format)
}

pub async fn finish(args: ClockArgs, client: &ApiClient, format: OutputFormat) -> Result<()> {
    let elapsed: i64 = client.call("finish", json!({ "id": args.id })).await?;

    match format {
        OutputFormat::Table => println!("{}", format_hms(elapsed)),
        _ => output::print_item(&json!({ "id": args.id, "elapsed_seconds": elapsed }), format)?,
    }
    Ok(())
}

pub async fn list(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let clocks: Vec<ClockSummary> = client.call("list", json!({})).await?;
    let rows: Vec<ClockRow> = clocks.into_iter().map(ClockRow::from).collect();
    output::print_list(&rows, format)
}

pub async fn current(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let current: Option<String> = client.call("current", json!({})).await?;

    match format {
        OutputFormat::Table => match current {
            Some(id) => println!("{} {}", id.bold(), ClockStatus::ClockedIn.as_str().green()),
            None => println!("{}", "No clock running.".dimmed()),
        },
        _ => output::print_item(&json!({ "current": current }), format)?,
    }
    Ok(())
}

fn acknowledge(id: &str, action: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => output::print_success(&format!("Clock {} {}", id, action)),
        _ => output::print_item(&json!({ "id": id, "action": action }), format)?,
    }
    Ok(())
}
