//! Punchclock CLI - Command-line interface for the Punchclock work-clock server.
//!
//! Provides clock, history, health, and configuration commands.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{clock, config, health, history};
use output::OutputFormat;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8734";

/// Punchclock - event-sourced work clocks
#[derive(Parser)]
#[command(
    name = "punchclock",
    version,
    about = "Punchclock - event-sourced work clocks",
    long_about = "Start, stop and finish work clocks, and inspect or rewrite their history.",
    propagate_version = true
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true)]
    output: Option<OutputFormat>,

    /// API server URL
    #[arg(long, global = true, env = "PUNCHCLOCK_API_URL")]
    api_url: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clock in
    Start(clock::ClockArgs),

    /// Clock out
    Stop(clock::ClockArgs),

    /// Reset a stopped clock and print its total
    Finish(clock::ClockArgs),

    /// List all clocks
    List,

    /// Show the running clock
    Current,

    /// Print a clock's history
    History(history::HistoryArgs),

    /// Replace a clock's history with `<timestamp>; <event>` lines
    Rewrite(history::RewriteArgs),

    /// Check server health
    Health(health::HealthArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let api_url = cli
        .api_url
        .clone()
        .or_else(config::load_api_url)
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let client = client::ApiClient::new(&api_url)?;
    let format = cli
        .output
        .or_else(config::load_output_format)
        .unwrap_or_default();

    let result = match cli.command {
        Commands::Start(args) => clock::start(args, &client, format).await,
        Commands::Stop(args) => clock::stop(args, &client, format).await,
        Commands::Finish(args) => clock::finish(args, &client, format).await,
        Commands::List => clock::list(&client, format).await,
        Commands::Current => clock::current(&client, format).await,
        Commands::History(args) => history::history(args, &client, format).await,
        Commands::Rewrite(args) => history::rewrite(args, &client, format).await,
        Commands::Health(args) => health::execute(args, &client, format).await,
        Commands::Config(cmd) => config::execute(cmd, format).await,
    };

    if let Err(e) = result {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
