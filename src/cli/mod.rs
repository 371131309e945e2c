//! Command-line interface wiring for the `playcards` binary.
//!
//! This module owns the clap definitions and delegates execution to one
//! submodule per command.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod common;
pub mod generate;
pub mod layout;
pub mod utils;

/// Parsed CLI entrypoint for the `playcards` binary.
#[derive(Parser, Debug)]
#[command(
    name = "playcards",
    version,
    about = "Print duplex QR/caption card sheets from a CSV track list"
)]
pub struct Cli {
    /// Log progress (repeat for more detail; RUST_LOG overrides).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Top-level command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Commands made available to end users.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the card sheet as PDF or PNG proof pages.
    Generate(generate::GenerateArgs),
    /// Show the grid and page breakdown without rendering.
    Layout(layout::LayoutArgs),
}

/// Execute the requested command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate(args) => generate::handle(args),
        Command::Layout(args) => layout::handle(args),
    }
}
