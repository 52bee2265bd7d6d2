//! Command-line interface for bestiary.
//!
//! This module provides the CLI structure and command definitions for the
//! `bestiary` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{
    CheckCommand, ConfigCommand, ConvertCommand, IndexCommand, OutputFormat, ScanCommand,
    SearchCommand, ShowCommand, ShowFormat, SourceDirs, StatusCommand,
};

/// bestiary - Read, check and index creature stat blocks
///
/// Parses HTML and Markdown stat blocks, checks their ability arithmetic,
/// builds a JSON/CSV index and keeps a searchable catalogue.
#[derive(Debug, Parser)]
#[command(name = "bestiary")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the JSON index from the stat-block directories
    Scan(ScanCommand),

    /// Convert a JSON index to CSV
    Convert(ConvertCommand),

    /// Check stat blocks for arithmetic inconsistencies
    Check(CheckCommand),

    /// Render one stat block
    Show(ShowCommand),

    /// Scan the stat-block directories into the catalogue
    Index(IndexCommand),

    /// Search the catalogue
    Search(SearchCommand),

    /// Show catalogue statistics
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
