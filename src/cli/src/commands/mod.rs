//! CLI subcommands.

pub mod clock;
pub mod config;
pub mod health;
pub mod history;
