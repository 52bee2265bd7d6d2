//! Ability scores and the arithmetic derived from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the six abilities, in stat-block order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Ability {
    /// Strength.
    Str,
    /// Dexterity.
    Dex,
    /// Constitution.
    Con,
    /// Intelligence.
    Int,
    /// Wisdom.
    Wis,
    /// Charisma.
    Cha,
}

impl Ability {
    /// All abilities in stat-block order.
    pub const ALL: [Ability; 6] = [
        Ability::Str,
        Ability::Dex,
        Ability::Con,
        Ability::Int,
        Ability::Wis,
        Ability::Cha,
    ];

    /// The three-letter abbreviation, e.g. `STR`.
    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Str => "STR",
            Self::Dex => "DEX",
            Self::Con => "CON",
            Self::Int => "INT",
            Self::Wis => "WIS",
            Self::Cha => "CHA",
        }
    }

    /// The full name, e.g. `Strength`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Str => "Strength",
            Self::Dex => "Dexterity",
            Self::Con => "Constitution",
            Self::Int => "Intelligence",
            Self::Wis => "Wisdom",
            Self::Cha => "Charisma",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for Ability {
    type Err = String;

    /// Accepts abbreviations and full names in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_end_matches('.');
        Self::ALL
            .into_iter()
            .find(|ability| {
                wanted.eq_ignore_ascii_case(ability.abbreviation())
                    || wanted.eq_ignore_ascii_case(ability.name())
            })
            .ok_or_else(|| format!("unknown ability: {s}"))
    }
}

/// Where a saving throw bonus was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", content = "bonus", rename_all = "snake_case")]
pub enum SaveBonus {
    /// The save column of an ability table; proficient or not.
    Column(i32),
    /// A "Saving Throws" line, which only lists proficient saves.
    Listed(i32),
}

impl SaveBonus {
    /// The numeric bonus.
    #[must_use]
    pub fn bonus(self) -> i32 {
        match self {
            Self::Column(bonus) | Self::Listed(bonus) => bonus,
        }
    }
}

/// One row of the ability table as printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityLine {
    /// The ability score.
    pub score: i32,
    /// The modifier printed next to the score, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier: Option<i32>,
    /// The saving throw bonus, if printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save: Option<SaveBonus>,
}

impl AbilityLine {
    /// A line with only a score.
    #[must_use]
    pub fn score(score: i32) -> Self {
        Self {
            score,
            modifier: None,
            save: None,
        }
    }

    /// The modifier the score implies.
    #[must_use]
    pub fn expected_modifier(&self) -> i32 {
        ability_modifier(self.score)
    }

    /// The printed modifier, falling back to the one the score implies.
    #[must_use]
    pub fn modifier(&self) -> i32 {
        self.modifier.unwrap_or_else(|| self.expected_modifier())
    }

    /// The saving throw bonus, falling back to the modifier.
    #[must_use]
    pub fn save_bonus(&self) -> i32 {
        self.save.map_or_else(|| self.modifier(), SaveBonus::bonus)
    }
}

/// The modifier for an ability score: `floor((score - 10) / 2)`.
#[must_use]
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// The proficiency bonus for a challenge rating.
///
/// Fractional ratings below 1 use the CR 0-4 bracket.
#[must_use]
pub fn proficiency_bonus_for_cr(cr: f64) -> i32 {
    if cr <= 4.0 {
        return 2;
    }
    // 5-8 → 3, 9-12 → 4, ... 29-30 → 9
    let whole = cr.ceil();
    let bracket = ((whole - 1.0) / 4.0).floor();
    // CRs top out at 30, well inside i32.
    #[allow(clippy::cast_possible_truncation)]
    let bracket = bracket as i32;
    2 + bracket
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ability_modifier_floor_division() {
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(12), 1);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(7), -2);
        assert_eq!(ability_modifier(1), -5);
        assert_eq!(ability_modifier(30), 10);
    }

    #[test]
    fn test_proficiency_bonus_for_cr() {
        assert_eq!(proficiency_bonus_for_cr(0.0), 2);
        assert_eq!(proficiency_bonus_for_cr(0.25), 2);
        assert_eq!(proficiency_bonus_for_cr(4.0), 2);
        assert_eq!(proficiency_bonus_for_cr(5.0), 3);
        assert_eq!(proficiency_bonus_for_cr(8.0), 3);
        assert_eq!(proficiency_bonus_for_cr(9.0), 4);
        assert_eq!(proficiency_bonus_for_cr(13.0), 5);
        assert_eq!(proficiency_bonus_for_cr(17.0), 6);
        assert_eq!(proficiency_bonus_for_cr(21.0), 7);
        assert_eq!(proficiency_bonus_for_cr(24.0), 7);
        assert_eq!(proficiency_bonus_for_cr(25.0), 8);
        assert_eq!(proficiency_bonus_for_cr(30.0), 9);
    }

    #[test]
    fn test_ability_from_str() {
        assert_eq!("STR".parse::<Ability>(), Ok(Ability::Str));
        assert_eq!("dex".parse::<Ability>(), Ok(Ability::Dex));
        assert_eq!("Wisdom".parse::<Ability>(), Ok(Ability::Wis));
        assert_eq!(" Cha. ".parse::<Ability>(), Ok(Ability::Cha));
        assert!("Luck".parse::<Ability>().is_err());
    }

    #[test]
    fn test_ability_display() {
        assert_eq!(Ability::Con.to_string(), "CON");
        assert_eq!(Ability::Int.name(), "Intelligence");
    }

    #[test]
    fn test_ability_line_fallbacks() {
        let line = AbilityLine::score(15);
        assert_eq!(line.modifier(), 2);
        assert_eq!(line.save_bonus(), 2);

        let line = AbilityLine {
            score: 15,
            modifier: Some(3),
            save: Some(SaveBonus::Listed(5)),
        };
        assert_eq!(line.expected_modifier(), 2);
        assert_eq!(line.modifier(), 3);
        assert_eq!(line.save_bonus(), 5);
    }

    #[test]
    fn test_save_bonus_serializes_with_origin() {
        let json = serde_json::to_string(&SaveBonus::Listed(4)).unwrap();
        assert_eq!(json, r#"{"from":"listed","bonus":4}"#);
    }
}
