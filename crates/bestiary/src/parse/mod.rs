//! Stat-block document parsers.
//!
//! Both HTML and Markdown stat blocks are read into a format-independent
//! [`Document`]: a label→value field map plus the pieces that are not simple
//! fields (the size/type/alignment line, the ability table and the action
//! entries). [`StatBlock`](crate::statblock::StatBlock) and
//! [`MonsterRecord`](crate::record::MonsterRecord) are built from it.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use bestiary::parse::{MarkdownParser, StatBlockParser};
//!
//! let doc = MarkdownParser::new()
//!     .parse("# Bat\n*Tiny Beast, Unaligned*\n**CR** 0\n", Path::new("bat.md"))
//!     .unwrap();
//! assert_eq!(doc.name, "Bat");
//! assert_eq!(doc.field(&["cr"]), Some("0"));
//! ```

mod html;
mod markdown;
mod table;

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::path::Path;

use tracing::trace;

use crate::error::{Error, Result};
use crate::statblock::{Ability, AbilityLine, Action};

pub use html::HtmlParser;
pub use markdown::MarkdownParser;
pub use table::abilities_from_rows;

/// A stat-block document after markup has been stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Creature name.
    pub name: String,
    /// Normalised label → cleaned value. Later entries override earlier ones.
    pub fields: HashMap<String, String>,
    /// The size/type/alignment line, e.g. `Small Fey (Goblinoid), Chaotic Neutral`.
    pub type_line: Option<String>,
    /// Creature type when the markup carries it separately from the line.
    pub creature_type: Option<String>,
    /// Ability table rows.
    pub abilities: BTreeMap<Ability, AbilityLine>,
    /// Traits and actions in document order.
    pub actions: Vec<Action>,
    /// Whether the document mentions legendary actions.
    pub has_legendary_actions: bool,
}

impl Document {
    /// The first non-empty field among `labels`.
    #[must_use]
    pub fn field(&self, labels: &[&str]) -> Option<&str> {
        labels.iter().find_map(|label| {
            self.fields
                .get(*label)
                .map(String::as_str)
                .filter(|value| !value.is_empty())
        })
    }

    fn insert_field(&mut self, label: String, value: String) {
        trace!(label = %label, value = %value, "field");
        self.fields.insert(label, value);
    }
}

/// A reader for one stat-block markup format.
pub trait StatBlockParser: Debug {
    /// Format name for logging.
    fn name(&self) -> &'static str;

    /// File extensions this parser handles, lowercase without the dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Parse document text. `path` supplies the fallback name and error context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the text is not a stat block.
    fn parse(&self, text: &str, path: &Path) -> Result<Document>;

    /// Check whether this parser handles the file at `path`.
    fn handles(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions()
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
    }
}

/// Pick the parser for a file by its extension.
///
/// # Errors
///
/// Returns [`Error::UnsupportedDocument`] for unknown extensions.
pub fn parser_for(path: &Path) -> Result<Box<dyn StatBlockParser>> {
    let html = HtmlParser::new()?;
    if html.handles(path) {
        return Ok(Box::new(html));
    }
    let markdown = MarkdownParser::new();
    if markdown.handles(path) {
        return Ok(Box::new(markdown));
    }
    Err(Error::UnsupportedDocument {
        path: path.to_path_buf(),
    })
}

/// Read and parse a stat-block file with the parser its extension selects.
///
/// # Errors
///
/// Returns an error if the file cannot be read, has an unknown extension,
/// or cannot be parsed.
pub fn read_document(path: &Path) -> Result<Document> {
    let parser = parser_for(path)?;
    let text = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parser.parse(&text, path)
}

/// The file stem as a fallback creature name.
fn stem_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
