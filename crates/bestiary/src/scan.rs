//! Building the JSON index from stat-block directories.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::parse::{HtmlParser, MarkdownParser, StatBlockParser};
use crate::record::MonsterRecord;

/// Outcome of a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Indexed records, HTML first, each group in path order.
    pub records: Vec<MonsterRecord>,
    /// Markdown files skipped because an HTML twin exists.
    pub twins_skipped: usize,
    /// Files that could not be indexed, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Walks the configured directories and summarises every stat block.
#[derive(Debug)]
pub struct Scanner {
    config: ScanConfig,
    html: HtmlParser,
    markdown: MarkdownParser,
}

impl Scanner {
    /// Create a scanner for the given directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTML parser cannot be built.
    pub fn new(config: ScanConfig) -> Result<Self> {
        Ok(Self {
            config,
            html: HtmlParser::new()?,
            markdown: MarkdownParser::new(),
        })
    }

    /// Scan HTML stat blocks, then Markdown ones without an HTML twin.
    ///
    /// Files that fail to read, parse, or carry no challenge rating are
    /// logged and listed in [`ScanSummary::skipped`].
    ///
    /// # Errors
    ///
    /// Returns an error if a directory exists but cannot be walked.
    pub fn scan(&self) -> Result<ScanSummary> {
        let mut summary = ScanSummary::default();

        for path in find_files(&self.config.html_dir, &self.html)? {
            self.index_file(&path, &self.html, &mut summary)?;
        }

        for path in find_files(&self.config.markdown_dir, &self.markdown)? {
            if self.html_twin(&path).is_some_and(|twin| twin.exists()) {
                debug!(path = %path.display(), "skipping markdown with html twin");
                summary.twins_skipped += 1;
                continue;
            }
            self.index_file(&path, &self.markdown, &mut summary)?;
        }

        info!(
            records = summary.records.len(),
            skipped = summary.skipped.len(),
            twins = summary.twins_skipped,
            "scan complete"
        );
        Ok(summary)
    }

    /// The HTML file at the same relative path as a Markdown file.
    fn html_twin(&self, markdown_path: &Path) -> Option<PathBuf> {
        let relative = markdown_path.strip_prefix(&self.config.markdown_dir).ok()?;
        Some(self.config.html_dir.join(relative).with_extension("html"))
    }

    fn index_file(
        &self,
        path: &Path,
        parser: &dyn StatBlockParser,
        summary: &mut ScanSummary,
    ) -> Result<()> {
        match self.record_for(path, parser) {
            Ok(record) => {
                summary.records.push(record);
                Ok(())
            }
            Err(err) if err.is_skippable() => {
                warn!("{}: {err}, skipped", path.display());
                summary.skipped.push((path.to_path_buf(), err.to_string()));
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn record_for(&self, path: &Path, parser: &dyn StatBlockParser) -> Result<MonsterRecord> {
        let text = fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = parser.parse(&text, path)?;
        MonsterRecord::from_document(&doc, path, &self.config)
    }
}

/// Files under `dir` the parser handles, recursively, in sorted order.
///
/// A missing directory yields no files. Symbolic links are not followed.
fn find_files(dir: &Path, parser: &dyn StatBlockParser) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "{} directory not found", parser.name());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if entry.file_type().is_file() && parser.handles(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Write records as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file
/// cannot be written.
pub fn write_json(records: &[MonsterRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;
    Ok(())
}
