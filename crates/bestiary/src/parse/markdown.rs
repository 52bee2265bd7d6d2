//! Markdown stat blocks.
//!
//! Fields are bold labels at the start of a line (`**Armor Class** 15`),
//! the second line carries the italic size/type/alignment, ability scores sit
//! in pipe tables and entries are bold names ending in a period.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{abilities_from_rows, Document, StatBlockParser};
use crate::error::{Error, Result};
use crate::statblock::{Action, ActionSection};
use crate::text::{clean, normalise_label};

static FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*(.+?)\*\*[:,]?\s*(.+)$").expect("valid regex"));

static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_*](.+?)[_*]").expect("valid regex"));

/// `***Name.*** text`, `**Name.** text` or `_**Name.**_ text`.
static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[_*]?\*\*[_*]?([^*_]+?\.)[_*]?\*\*[_*]?\s*(.*)$").expect("valid regex")
});

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s*(.+?)\s*#*$").expect("valid regex"));

static SEPARATOR_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:?-+:?$").expect("valid regex"));

/// Parser for Markdown stat blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownParser;

impl MarkdownParser {
    /// Create a Markdown parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl StatBlockParser for MarkdownParser {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["md", "markdown"]
    }

    fn parse(&self, text: &str, path: &Path) -> Result<Document> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let Some(first) = lines.first() else {
            return Err(Error::parse(path, "empty document"));
        };

        let mut doc = Document {
            name: clean(first.trim_start_matches('#')),
            ..Document::default()
        };
        if doc.name.is_empty() {
            doc.name = super::stem_name(path);
        }

        for line in &lines {
            if let Some(caps) = FIELD.captures(line) {
                doc.insert_field(normalise_label(&caps[1]), clean(&caps[2]));
            }
        }

        doc.type_line = lines
            .get(1)
            .filter(|line| !line.starts_with("**"))
            .and_then(|line| ITALIC.captures(line))
            .map(|caps| clean(&caps[1]));

        doc.abilities = abilities_from_rows(&table_rows(&lines));
        doc.actions = entries(&lines[1..]);
        doc.has_legendary_actions = lines
            .iter()
            .any(|line| line.to_lowercase().contains("legendary actions"));

        debug!(
            path = %path.display(),
            fields = doc.fields.len(),
            abilities = doc.abilities.len(),
            actions = doc.actions.len(),
            "parsed markdown stat block"
        );
        Ok(doc)
    }
}

/// Cells of every pipe-table row, separator rows dropped.
fn table_rows(lines: &[&str]) -> Vec<Vec<String>> {
    lines
        .iter()
        .filter(|line| line.starts_with('|'))
        .map(|line| {
            line.trim_matches('|')
                .split('|')
                .map(clean)
                .collect::<Vec<_>>()
        })
        .filter(|cells| {
            !cells
                .iter()
                .all(|cell| cell.is_empty() || SEPARATOR_CELL.is_match(cell))
        })
        .collect()
}

/// Named entries, each under the most recent section heading.
///
/// Entries before any heading are traits; entries under a heading that names
/// no known section are dropped.
fn entries(lines: &[&str]) -> Vec<Action> {
    let mut section = Some(ActionSection::Traits);
    let mut actions = Vec::new();

    for line in lines {
        if let Some(caps) = HEADING.captures(line) {
            section = ActionSection::from_heading(&caps[1]);
            continue;
        }
        let Some(current) = section else { continue };
        if let Some(caps) = ENTRY.captures(line) {
            actions.push(Action::new(current, &caps[1], &caps[2].replace('*', "")));
        }
    }

    actions
}
