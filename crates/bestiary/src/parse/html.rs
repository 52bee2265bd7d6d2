//! HTML stat blocks.
//!
//! Fields come from two-cell table rows and from `<li><strong>Label</strong>
//! value</li>` bullets. The size/type/alignment sits in the first paragraph
//! with emphasis, and entries are paragraphs that open with a bold name.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{abilities_from_rows, Document, StatBlockParser};
use crate::error::{Error, Result};
use crate::statblock::{Action, ActionSection};
use crate::text::{clean, normalise_label, type_from_line};

static LEGENDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\blegendary actions\b").expect("valid regex"));

/// Parser for HTML stat blocks.
#[derive(Debug)]
pub struct HtmlParser {
    title: Selector,
    row: Selector,
    header_cell: Selector,
    data_cell: Selector,
    any_cell: Selector,
    bullet: Selector,
    strong: Selector,
    paragraph: Selector,
    emphasis: Selector,
    table: Selector,
    flow: Selector,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::internal(format!("invalid selector '{css}': {e:?}")))
}

fn element_text(element: ElementRef<'_>) -> String {
    clean(&element.text().collect::<String>())
}

impl HtmlParser {
    /// Create an HTML parser.
    ///
    /// # Errors
    ///
    /// Returns an internal error if a built-in selector fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            title: selector("h1, h2")?,
            row: selector("tr")?,
            header_cell: selector("th")?,
            data_cell: selector("td")?,
            any_cell: selector("th, td")?,
            bullet: selector("li")?,
            strong: selector("strong")?,
            paragraph: selector("p")?,
            emphasis: selector("em")?,
            table: selector("table")?,
            flow: selector("h1, h2, h3, h4, h5, h6, p")?,
        })
    }

    fn fields(&self, html: &Html, doc: &mut Document) {
        for row in html.select(&self.row) {
            let label = row
                .select(&self.header_cell)
                .next()
                .or_else(|| row.select(&self.data_cell).next());
            let Some(label) = label else { continue };
            let value = label
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|sibling| sibling.value().name() == "td");
            if let Some(value) = value {
                doc.insert_field(normalise_label(&element_text(label)), element_text(value));
            }
        }

        for bullet in html.select(&self.bullet) {
            let Some(strong) = bullet.select(&self.strong).next() else {
                continue;
            };
            let label: String = strong.text().collect();
            let full: String = bullet.text().collect();
            doc.insert_field(normalise_label(&label), clean(&full.replace(&label, "")));
        }
    }

    /// First paragraph with emphasis: two or more `<em>` carry the type in
    /// the second; a single `<em>` is the whole size/type/alignment line.
    fn type_line(&self, html: &Html, doc: &mut Document) {
        for paragraph in html.select(&self.paragraph) {
            let emphasis: Vec<ElementRef<'_>> = paragraph.select(&self.emphasis).collect();
            match emphasis.as_slice() {
                [] => {}
                [only] => {
                    let line = element_text(*only);
                    if !type_from_line(&line).is_empty() {
                        doc.type_line = Some(line);
                        return;
                    }
                }
                [_, second, ..] => {
                    doc.creature_type = Some(element_text(*second));
                    doc.type_line = Some(element_text(paragraph));
                    return;
                }
            }
        }
    }

    fn abilities(&self, html: &Html, doc: &mut Document) {
        for table in html.select(&self.table) {
            let rows: Vec<Vec<String>> = table
                .select(&self.row)
                .map(|row| row.select(&self.any_cell).map(element_text).collect())
                .collect();
            doc.abilities.extend(abilities_from_rows(&rows));
        }
    }

    /// Paragraphs opening with a bold or italic name ending in a period,
    /// grouped by the nearest preceding section heading. The heading that
    /// names the creature opens no section.
    fn entries(&self, html: &Html, title: Option<ElementRef<'_>>, doc: &mut Document) {
        let mut section = Some(ActionSection::Traits);

        for element in html.select(&self.flow) {
            if element.value().name() != "p" {
                if Some(element) != title {
                    section = ActionSection::from_heading(&element_text(element));
                }
                continue;
            }
            let Some(current) = section else { continue };

            let Some(lead) = element.children().find_map(ElementRef::wrap) else {
                continue;
            };
            if !matches!(lead.value().name(), "strong" | "b" | "em" | "i") {
                continue;
            }
            let name = element_text(lead);
            let text = element_text(element);
            if !name.ends_with('.') || !text.starts_with(&name) {
                continue;
            }
            let description = &text[name.len()..];
            doc.actions.push(Action::new(current, &name, description));
        }
    }
}

impl StatBlockParser for HtmlParser {
    fn name(&self) -> &'static str {
        "html"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["html", "htm"]
    }

    fn parse(&self, text: &str, path: &Path) -> Result<Document> {
        let html = Html::parse_document(text);
        let title = html.select(&self.title).next();

        let mut doc = Document {
            name: title
                .map(element_text)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| super::stem_name(path)),
            ..Document::default()
        };

        self.fields(&html, &mut doc);
        self.type_line(&html, &mut doc);
        self.abilities(&html, &mut doc);
        self.entries(&html, title, &mut doc);
        doc.has_legendary_actions = html
            .root_element()
            .text()
            .any(|node| LEGENDARY.is_match(node));

        debug!(
            path = %path.display(),
            fields = doc.fields.len(),
            abilities = doc.abilities.len(),
            actions = doc.actions.len(),
            "parsed html stat block"
        );
        Ok(doc)
    }
}
