//! Text normalisation shared by the document parsers.
//!
//! Stat blocks come from hand-edited HTML and Markdown, so labels and values
//! carry stray whitespace, trailing colons and typographic minus signs.

use std::sync::LazyLock;

use regex::Regex;

/// Size words that can lead a size/type/alignment line.
pub const SIZE_WORDS: &[&str] = &["tiny", "small", "medium", "large", "huge", "gargantuan"];

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static TRAILING_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[:–—-]\s*$").expect("valid regex"));

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

static CHALLENGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:/\d+|\.\d+)?").expect("valid regex"));

static SIGNED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+\-−–]?\s*\d+").expect("valid regex"));

/// Collapse runs of whitespace into single spaces and trim.
#[must_use]
pub fn clean(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Normalise a field label: cleaned, lowercased, one trailing `:`/dash removed.
///
/// `"Armor Class:"` and `"armor  class —"` both become `"armor class"`.
#[must_use]
pub fn normalise_label(label: &str) -> String {
    let lowered = clean(label).to_lowercase();
    TRAILING_PUNCT.replace(&lowered, "").trim_end().to_string()
}

/// The first run of digits in `text`, or an empty string.
#[must_use]
pub fn number_only(text: &str) -> String {
    DIGITS
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Extract the challenge rating from a CR field such as `"1/4 (XP 50; PB +2)"`.
#[must_use]
pub fn challenge_rating(text: &str) -> Option<String> {
    CHALLENGE.find(text).map(|m| m.as_str().to_string())
}

/// Parse a signed bonus such as `+4`, `-1`, `−2` or `–2`.
///
/// Returns the first signed number found in `text`.
#[must_use]
pub fn parse_signed(text: &str) -> Option<i32> {
    let found = SIGNED.find(text)?.as_str();
    let negative = found.starts_with(['-', '−', '–']);
    let digits: String = found.chars().filter(char::is_ascii_digit).collect();
    let value: i32 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Format a bonus the way stat blocks print it: `+3`, `+0`, `-1`.
#[must_use]
pub fn format_signed(value: i32) -> String {
    format!("{value:+}")
}

/// Extract the creature type from a size/type/alignment line.
///
/// `"Small Fey (Goblinoid), Chaotic Neutral"` becomes `"Fey (Goblinoid)"`:
/// the alignment after the first comma and any size word are dropped.
#[must_use]
pub fn type_from_line(line: &str) -> String {
    let base = line.split(',').next().unwrap_or_default();
    let tokens: Vec<&str> = base
        .split_whitespace()
        .filter(|token| !SIZE_WORDS.contains(&token.to_lowercase().as_str()))
        .collect();
    clean(&tokens.join(" "))
}

/// Drop a parenthesised subtype: `"Dragon (Chromatic)"` becomes `"Dragon"`.
#[must_use]
pub fn without_subtype(creature_type: &str) -> String {
    creature_type
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Drop a page reference: `"Monster Manual page 12"` becomes `"Monster Manual"`.
#[must_use]
pub fn source_without_page(source: &str) -> String {
    match source.split_once(" page") {
        Some((book, _)) => book.to_string(),
        None => source.to_string(),
    }
}
