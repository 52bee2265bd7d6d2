//! The creature stat block.
//!
//! A [`StatBlock`] is the read-only record of one creature: defensive stats,
//! ability scores with their modifiers and saves, skills, senses, languages,
//! challenge rating and named actions. It is built from a parsed
//! [`Document`](crate::parse::Document) and never mutated afterwards.

mod ability;
pub mod check;
mod render;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::parse::Document;
use crate::text::{self, clean, parse_signed};

pub use ability::{ability_modifier, proficiency_bonus_for_cr, Ability, AbilityLine, SaveBonus};
pub use check::{check, CheckReport, Finding};

static PASSIVE_PERCEPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)passive\s+perception\s*(\d+)").expect("valid regex"));

static STATED_PB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bPB\s*([+\-−–]?\s*\d+)").expect("valid regex"));

/// Creature size category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Size {
    /// Tiny.
    Tiny,
    /// Small.
    Small,
    /// Medium.
    Medium,
    /// Large.
    Large,
    /// Huge.
    Huge,
    /// Gargantuan.
    Gargantuan,
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tiny => "Tiny",
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
            Self::Huge => "Huge",
            Self::Gargantuan => "Gargantuan",
        };
        f.write_str(name)
    }
}

impl FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tiny" => Ok(Self::Tiny),
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            "huge" => Ok(Self::Huge),
            "gargantuan" => Ok(Self::Gargantuan),
            _ => Err(format!("unknown size: {s}")),
        }
    }
}

/// A challenge rating as printed: `0`, `1/8`, `1/4`, `1/2`, `1` .. `30`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengeRating(String);

impl ChallengeRating {
    /// Wrap a printed challenge rating.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The rating as printed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric value; `1/4` is `0.25`.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        parse_cr_value(&self.0)
    }

    /// The proficiency bonus the rating implies.
    #[must_use]
    pub fn proficiency_bonus(&self) -> Option<i32> {
        self.value().map(proficiency_bonus_for_cr)
    }
}

impl fmt::Display for ChallengeRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a printed challenge rating into a number.
#[must_use]
pub fn parse_cr_value(text: &str) -> Option<f64> {
    let text = text.trim();
    match text.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator: f64 = numerator.trim().parse().ok()?;
            let denominator: f64 = denominator.trim().parse().ok()?;
            (denominator != 0.0).then(|| numerator / denominator)
        }
        None => text.parse().ok(),
    }
}

/// Initiative as printed in newer stat blocks: `+2 (12)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiative {
    /// The initiative bonus.
    pub bonus: i32,
    /// The passive initiative score in parentheses, if printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
}

impl Initiative {
    fn parse(text: &str) -> Option<Self> {
        let (bonus_text, score_text) = match text.split_once('(') {
            Some((bonus, score)) => (bonus, Some(score)),
            None => (text, None),
        };
        let bonus = parse_signed(bonus_text)?;
        let score = score_text.and_then(|s| text::number_only(s).parse().ok());
        Some(Self { bonus, score })
    }
}

/// A skill proficiency such as `Stealth +6`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Skill name.
    pub name: String,
    /// Total bonus.
    pub bonus: i32,
}

/// Parse a skills line: `Perception +4, Stealth +6`.
///
/// Entries are separated by commas or semicolons; entries without a bonus
/// are dropped.
#[must_use]
pub fn parse_skills(text: &str) -> Vec<Skill> {
    text.split([',', ';'])
        .filter_map(|entry| {
            let entry = entry.trim();
            let split =
                entry.find(|c: char| matches!(c, '+' | '-' | '−' | '–') || c.is_ascii_digit())?;
            let name = clean(&entry[..split]);
            let bonus = parse_signed(&entry[split..])?;
            (!name.is_empty()).then_some(Skill { name, bonus })
        })
        .collect()
}

/// Parse a saving throws line: `Dex +4, Wis +2`.
#[must_use]
pub fn parse_saving_throws(text: &str) -> Vec<(Ability, i32)> {
    text.split([',', ';'])
        .filter_map(|entry| {
            let mut parts = entry.split_whitespace();
            let ability = parts.next()?.parse::<Ability>().ok()?;
            let bonus = parse_signed(&parts.collect::<Vec<_>>().join(" "))?;
            Some((ability, bonus))
        })
        .collect()
}

/// The section of a stat block an action is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSection {
    /// Passive traits listed before the actions.
    Traits,
    /// Actions.
    Actions,
    /// Bonus actions.
    BonusActions,
    /// Reactions.
    Reactions,
    /// Legendary actions.
    LegendaryActions,
}

impl ActionSection {
    /// Recognise a section heading such as `Legendary Actions`.
    #[must_use]
    pub fn from_heading(heading: &str) -> Option<Self> {
        let heading = text::normalise_label(heading.trim_start_matches('#'));
        match heading.as_str() {
            "traits" => Some(Self::Traits),
            "actions" => Some(Self::Actions),
            "bonus actions" => Some(Self::BonusActions),
            "reactions" => Some(Self::Reactions),
            "legendary actions" => Some(Self::LegendaryActions),
            _ => None,
        }
    }

    /// Heading text.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Traits => "Traits",
            Self::Actions => "Actions",
            Self::BonusActions => "Bonus Actions",
            Self::Reactions => "Reactions",
            Self::LegendaryActions => "Legendary Actions",
        }
    }
}

/// A named entry with its rules text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Section the entry is listed under.
    pub section: ActionSection,
    /// Entry name without the trailing period.
    pub name: String,
    /// Rules text.
    pub description: String,
}

impl Action {
    /// Create an action, trimming the name's trailing period.
    #[must_use]
    pub fn new(section: ActionSection, name: &str, description: &str) -> Self {
        Self {
            section,
            name: clean(name).trim_end_matches('.').trim_end().to_string(),
            description: clean(description),
        }
    }
}

/// A creature's game statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    /// Creature name.
    pub name: String,
    /// Size category.
    pub size: Option<Size>,
    /// Creature type without subtype, e.g. `Fey`.
    #[serde(rename = "type")]
    pub creature_type: String,
    /// Alignment text.
    pub alignment: String,
    /// Armor class.
    pub armor_class: Option<u32>,
    /// Hit points.
    pub hit_points: Option<u32>,
    /// Hit dice formula, e.g. `3d6`.
    pub hit_dice: Option<String>,
    /// Speed text.
    pub speed: String,
    /// Initiative, when printed.
    pub initiative: Option<Initiative>,
    /// Ability table.
    pub abilities: BTreeMap<Ability, AbilityLine>,
    /// Skill proficiencies.
    pub skills: Vec<Skill>,
    /// Senses text.
    pub senses: String,
    /// Passive Perception, if given in the senses.
    pub passive_perception: Option<i32>,
    /// Languages text.
    pub languages: String,
    /// Challenge rating.
    pub challenge: Option<ChallengeRating>,
    /// Proficiency bonus, when printed explicitly.
    pub stated_proficiency_bonus: Option<i32>,
    /// Traits, actions, reactions and legendary actions in document order.
    pub actions: Vec<Action>,
}

impl StatBlock {
    /// Build a stat block from a parsed document.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        let type_line = doc.type_line.as_deref().unwrap_or_default();

        let size = type_line
            .split_whitespace()
            .find_map(|token| token.trim_matches(',').parse::<Size>().ok());

        let creature_type = doc
            .creature_type
            .clone()
            .or_else(|| doc.field(&["type"]).map(str::to_string))
            .unwrap_or_else(|| text::type_from_line(type_line));

        let alignment = type_line
            .split_once(',')
            .map(|(_, alignment)| clean(alignment))
            .unwrap_or_default();

        let hit_points_text = doc.field(&["hit points", "hp"]).unwrap_or_default();
        let hit_dice = hit_points_text
            .split_once('(')
            .map(|(_, dice)| dice.trim_end_matches(')').trim().to_string())
            .filter(|dice| !dice.is_empty());

        let mut abilities = doc.abilities.clone();
        if let Some(saves) = doc.field(&["saving throws", "saves"]) {
            for (ability, bonus) in parse_saving_throws(saves) {
                if let Some(line) = abilities.get_mut(&ability) {
                    line.save = Some(SaveBonus::Listed(bonus));
                }
            }
        }

        let senses = doc.field(&["senses"]).unwrap_or_default().to_string();
        let passive_perception = PASSIVE_PERCEPTION
            .captures(&senses)
            .and_then(|caps| caps[1].parse().ok());

        let challenge_text = doc
            .field(&["cr", "challenge rating", "challenge"])
            .unwrap_or_default();
        let challenge = text::challenge_rating(challenge_text).map(ChallengeRating::new);
        let stated_proficiency_bonus = doc
            .field(&["proficiency bonus"])
            .and_then(parse_signed)
            .or_else(|| {
                STATED_PB
                    .captures(challenge_text)
                    .and_then(|caps| parse_signed(&caps[1]))
            });

        Self {
            name: doc.name.clone(),
            size,
            creature_type: text::without_subtype(&creature_type),
            alignment,
            armor_class: text::number_only(doc.field(&["armor class", "ac"]).unwrap_or_default())
                .parse()
                .ok(),
            hit_points: text::number_only(hit_points_text).parse().ok(),
            hit_dice,
            speed: doc.field(&["speed"]).unwrap_or_default().to_string(),
            initiative: doc.field(&["initiative"]).and_then(Initiative::parse),
            abilities,
            skills: parse_skills(doc.field(&["skills"]).unwrap_or_default()),
            senses,
            passive_perception,
            languages: doc.field(&["languages"]).unwrap_or_default().to_string(),
            challenge,
            stated_proficiency_bonus,
            actions: doc.actions.clone(),
        }
    }

    /// The proficiency bonus: printed, or derived from the challenge rating.
    #[must_use]
    pub fn proficiency_bonus(&self) -> Option<i32> {
        self.stated_proficiency_bonus.or_else(|| {
            self.challenge
                .as_ref()
                .and_then(ChallengeRating::proficiency_bonus)
        })
    }

    /// The modifier for an ability, printed or computed from the score.
    #[must_use]
    pub fn modifier(&self, ability: Ability) -> Option<i32> {
        self.abilities.get(&ability).map(AbilityLine::modifier)
    }

    /// The bonus for a named skill, if listed.
    #[must_use]
    pub fn skill_bonus(&self, name: &str) -> Option<i32> {
        self.skills
            .iter()
            .find(|skill| skill.name.eq_ignore_ascii_case(name))
            .map(|skill| skill.bonus)
    }

    /// Entries listed under one section.
    pub fn actions_in(&self, section: ActionSection) -> impl Iterator<Item = &Action> {
        self.actions
            .iter()
            .filter(move |action| action.section == section)
    }
}
