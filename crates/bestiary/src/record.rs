//! Index records.
//!
//! A [`MonsterRecord`] is the one-line summary of a stat block that goes
//! into the JSON index, the CSV export and the catalogue.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::parse::Document;
use crate::statblock::parse_cr_value;
use crate::text;

/// Summary of one stat block.
///
/// Serializes with the index's column names: `type` and
/// `hasLegendaryActions` (`"Yes"`/`"No"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterRecord {
    /// Creature name.
    pub name: String,
    /// Challenge rating as printed, e.g. `1/4`.
    pub cr: String,
    /// Armor class digits, empty when unknown.
    pub ac: String,
    /// Hit point digits, empty when unknown.
    pub hp: String,
    /// Languages text.
    pub languages: String,
    /// Creature type without subtype.
    #[serde(rename = "type")]
    pub creature_type: String,
    /// Skills with `;` separators.
    pub skills: String,
    /// Source book.
    pub source: String,
    /// Whether the stat block has legendary actions.
    #[serde(rename = "hasLegendaryActions", with = "yes_no")]
    pub has_legendary_actions: bool,
    /// File name the record was read from.
    pub file: String,
}

impl MonsterRecord {
    /// Summarise a parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingChallengeRating`] when the document has no
    /// challenge rating; such documents are not indexed.
    pub fn from_document(doc: &Document, path: &Path, scan: &ScanConfig) -> Result<Self> {
        let cr = doc
            .field(&["cr", "challenge rating", "challenge"])
            .and_then(text::challenge_rating)
            .ok_or_else(|| Error::MissingChallengeRating {
                path: path.to_path_buf(),
            })?;

        let creature_type = doc
            .creature_type
            .clone()
            .or_else(|| doc.field(&["type"]).map(str::to_string))
            .or_else(|| doc.type_line.as_deref().map(text::type_from_line))
            .unwrap_or_default();

        let is_srd = !scan.srd_suffix.is_empty()
            && path
                .file_stem()
                .is_some_and(|stem| stem.to_string_lossy().ends_with(&scan.srd_suffix));
        let source = if is_srd {
            scan.srd_source.clone()
        } else {
            text::source_without_page(doc.field(&["source"]).unwrap_or_default())
        };

        Ok(Self {
            name: doc.name.clone(),
            cr,
            ac: text::number_only(doc.field(&["armor class"]).unwrap_or_default()),
            hp: text::number_only(doc.field(&["hit points"]).unwrap_or_default()),
            languages: doc.field(&["languages"]).unwrap_or_default().to_string(),
            creature_type: text::without_subtype(&creature_type),
            skills: doc.field(&["skills"]).unwrap_or_default().replace(',', ";"),
            source,
            has_legendary_actions: doc.has_legendary_actions,
            file: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        })
    }

    /// Numeric challenge rating for range queries.
    #[must_use]
    pub fn cr_value(&self) -> Option<f64> {
        parse_cr_value(&self.cr)
    }

    /// BLAKE3 hash of the record's JSON form, for deduplication.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized.
    pub fn content_hash(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(blake3::hash(&json).to_hex().to_string())
    }
}

mod yes_no {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "Yes" } else { "No" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let text = String::deserialize(deserializer)?;
        match text.as_str() {
            "Yes" | "yes" | "true" => Ok(true),
            "No" | "no" | "false" => Ok(false),
            other => Err(de::Error::custom(format!(
                "expected \"Yes\" or \"No\", found {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{HtmlParser, MarkdownParser, StatBlockParser};

    fn markdown(text: &str, path: &str) -> Result<MonsterRecord> {
        let path = Path::new(path);
        let doc = MarkdownParser::new().parse(text, path)?;
        MonsterRecord::from_document(&doc, path, &ScanConfig::default())
    }

    const GOBLIN: &str = "\
# Goblin Warrior
*Small Fey (Goblinoid), Chaotic Neutral*
**Armor Class** 15
**Hit Points** 10 (3d6)
**Skills** Perception +2, Stealth +6
**Languages** Common, Goblin
**CR** 1/4 (XP 50; PB +2)
**Source** Player's Handbook page 12
";

    #[test]
    fn test_record_from_markdown() {
        let record = markdown(GOBLIN, "monsters_md/goblin_warrior.md").unwrap();
        assert_eq!(
            record,
            MonsterRecord {
                name: "Goblin Warrior".to_string(),
                cr: "1/4".to_string(),
                ac: "15".to_string(),
                hp: "10".to_string(),
                languages: "Common, Goblin".to_string(),
                creature_type: "Fey".to_string(),
                skills: "Perception +2; Stealth +6".to_string(),
                source: "Player's Handbook".to_string(),
                has_legendary_actions: false,
                file: "goblin_warrior.md".to_string(),
            }
        );
    }

    #[test]
    fn test_srd_suffix_overrides_source() {
        let record = markdown(GOBLIN, "monsters_md/goblin_warrior_mm_2024.md").unwrap();
        assert_eq!(record.source, "WotC SRD 5.2");
    }

    #[test]
    fn test_empty_srd_suffix_disables_override() {
        let path = Path::new("goblin_mm_2024.md");
        let doc = MarkdownParser::new().parse(GOBLIN, path).unwrap();
        let scan = ScanConfig {
            srd_suffix: String::new(),
            ..ScanConfig::default()
        };
        let record = MonsterRecord::from_document(&doc, path, &scan).unwrap();
        assert_eq!(record.source, "Player's Handbook");
    }

    #[test]
    fn test_missing_cr_is_error() {
        let err = markdown("# Commoner\n**Armor Class** 10\n", "commoner.md").unwrap_err();
        assert!(matches!(err, Error::MissingChallengeRating { .. }));
        assert!(err.is_skippable());
    }

    #[test]
    fn test_explicit_type_field_wins() {
        let text = "# Mimic\n*Medium Monstrosity (Shapechanger), Neutral*\n**Type** Monstrosity (Shapechanger)\n**CR** 2\n";
        let record = markdown(text, "mimic.md").unwrap();
        assert_eq!(record.creature_type, "Monstrosity");
    }

    #[test]
    fn test_record_from_html_with_legendary_actions() {
        let html = "<h1>Lich</h1><p><em>Medium Undead (Wizard), Neutral Evil</em></p>\
            <table><tr><th>Armor Class</th><td>17 (natural armor)</td></tr>\
            <tr><th>Hit Points</th><td>315 (42d8 + 126)</td></tr>\
            <tr><th>Challenge Rating</th><td>21 (33,000 XP)</td></tr></table>\
            <h2>Legendary Actions</h2>";
        let path = Path::new("lich.html");
        let doc = HtmlParser::new().unwrap().parse(html, path).unwrap();
        let record = MonsterRecord::from_document(&doc, path, &ScanConfig::default()).unwrap();

        assert_eq!(record.cr, "21");
        assert_eq!(record.ac, "17");
        assert_eq!(record.hp, "315");
        assert_eq!(record.creature_type, "Undead");
        assert!(record.has_legendary_actions);
    }

    #[test]
    fn test_json_column_names() {
        let record = markdown(GOBLIN, "goblin.md").unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "Fey");
        assert_eq!(json["hasLegendaryActions"], "No");
        assert!(json.get("creature_type").is_none());

        let parsed: MonsterRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_yes_no_rejects_other_values() {
        let json = r#"{"name":"x","cr":"1","ac":"","hp":"","languages":"","type":"","skills":"","source":"","hasLegendaryActions":"Maybe","file":"x.md"}"#;
        assert!(serde_json::from_str::<MonsterRecord>(json).is_err());
    }

    #[test]
    fn test_cr_value_and_hash() {
        let record = markdown(GOBLIN, "goblin.md").unwrap();
        assert_eq!(record.cr_value(), Some(0.25));

        let hash = record.content_hash().unwrap();
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, record.content_hash().unwrap());

        let mut other = record.clone();
        other.file = "goblin_copy.md".to_string();
        assert_ne!(hash, other.content_hash().unwrap());
    }
}
