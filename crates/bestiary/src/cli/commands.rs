//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::config::ScanConfig;
use crate::error::Result;
use crate::storage::MonsterQuery;

/// Directory overrides shared by `scan` and `index`.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceDirs {
    /// Directory of HTML stat blocks
    #[arg(long, value_name = "DIR")]
    pub html_dir: Option<PathBuf>,

    /// Directory of Markdown stat blocks
    #[arg(long = "md-dir", value_name = "DIR")]
    pub markdown_dir: Option<PathBuf>,
}

impl SourceDirs {
    /// Apply the overrides on top of the configured directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged settings fail [`ScanConfig::validate`].
    pub fn apply(&self, mut scan: ScanConfig) -> Result<ScanConfig> {
        if let Some(dir) = &self.html_dir {
            scan.html_dir.clone_from(dir);
        }
        if let Some(dir) = &self.markdown_dir {
            scan.markdown_dir.clone_from(dir);
        }
        scan.validate()?;
        Ok(scan)
    }
}

/// Scan command arguments.
#[derive(Debug, Args)]
pub struct ScanCommand {
    /// Directory overrides
    #[command(flatten)]
    pub dirs: SourceDirs,

    /// Where to write the JSON index
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Convert command arguments.
#[derive(Debug, Args)]
pub struct ConvertCommand {
    /// JSON index to convert
    pub input: PathBuf,

    /// CSV file to write (defaults to the input with a .csv extension)
    pub output: Option<PathBuf>,
}

/// Check command arguments.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Stat-block files to check
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Exit with an error if any stat block is inconsistent
    #[arg(long)]
    pub strict: bool,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Stat-block file to render
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: ShowFormat,
}

/// Index command arguments.
#[derive(Debug, Args)]
pub struct IndexCommand {
    /// Directory overrides
    #[command(flatten)]
    pub dirs: SourceDirs,

    /// Empty the catalogue before indexing
    #[arg(long)]
    pub rebuild: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Search command arguments.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Substring of the creature name
    pub query: Option<String>,

    /// Filter by creature type
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub creature_type: Option<String>,

    /// Lowest challenge rating (e.g. 1/4, 5)
    #[arg(long, value_name = "CR", value_parser = parse_cr_arg)]
    pub min_cr: Option<f64>,

    /// Highest challenge rating
    #[arg(long, value_name = "CR", value_parser = parse_cr_arg)]
    pub max_cr: Option<f64>,

    /// Only creatures with legendary actions
    #[arg(long)]
    pub legendary: bool,

    /// Maximum number of results
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl SearchCommand {
    /// The catalogue query these arguments describe.
    #[must_use]
    pub fn to_query(&self) -> MonsterQuery {
        MonsterQuery {
            text: self.query.clone(),
            creature_type: self.creature_type.clone(),
            min_cr: self.min_cr,
            max_cr: self.max_cr,
            legendary_only: self.legendary,
            limit: Some(self.limit),
        }
    }
}

fn parse_cr_arg(value: &str) -> std::result::Result<f64, String> {
    crate::statblock::parse_cr_value(value)
        .ok_or_else(|| format!("'{value}' is not a challenge rating"))
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ShowFormat {
    /// Rendered stat block
    #[default]
    Plain,
    /// JSON output
    Json,
}

/// Output format for `search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
        assert_eq!(ShowFormat::default(), ShowFormat::Plain);
    }

    #[test]
    fn test_source_dirs_apply() {
        let dirs = SourceDirs {
            html_dir: Some(PathBuf::from("srd/html")),
            markdown_dir: None,
        };
        let scan = dirs.apply(ScanConfig::default()).unwrap();
        assert_eq!(scan.html_dir, PathBuf::from("srd/html"));
        assert_eq!(scan.markdown_dir, ScanConfig::default().markdown_dir);
    }

    #[test]
    fn test_source_dirs_apply_rejects_same_directory() {
        let dirs = SourceDirs {
            html_dir: Some(PathBuf::from("stat_blocks")),
            markdown_dir: Some(PathBuf::from("stat_blocks")),
        };
        let err = dirs.apply(ScanConfig::default()).unwrap_err();
        assert!(err.to_string().contains("must differ"));

        let only_md = SourceDirs {
            html_dir: None,
            markdown_dir: Some(ScanConfig::default().html_dir),
        };
        assert!(only_md.apply(ScanConfig::default()).is_err());
    }

    #[test]
    fn test_search_to_query() {
        let cmd = SearchCommand {
            query: Some("dragon".to_string()),
            creature_type: None,
            min_cr: Some(0.5),
            max_cr: None,
            legendary: true,
            limit: 5,
            format: OutputFormat::Table,
        };
        let query = cmd.to_query();
        assert_eq!(query.text.as_deref(), Some("dragon"));
        assert_eq!(query.min_cr, Some(0.5));
        assert!(query.legendary_only);
        assert_eq!(query.limit, Some(5));
    }

    #[test]
    fn test_parse_cr_arg() {
        assert_eq!(parse_cr_arg("1/4"), Ok(0.25));
        assert_eq!(parse_cr_arg("12"), Ok(12.0));
        assert!(parse_cr_arg("lots").is_err());
    }
}
