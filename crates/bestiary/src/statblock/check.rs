//! Arithmetic consistency of a stat block.
//!
//! A stat block is hand-authored, so its derived numbers can drift from the
//! values they derive from. The rules:
//!
//! - modifier = `floor((score - 10) / 2)`;
//! - a save from the ability table equals the modifier, or the modifier plus
//!   the proficiency bonus;
//! - a save from a "Saving Throws" line equals the modifier plus the
//!   proficiency bonus;
//! - passive Perception = 10 + Perception bonus (or WIS modifier);
//! - the initiative score = 10 + initiative bonus.

use std::fmt;

use serde::Serialize;

use super::{Ability, SaveBonus, StatBlock};
use crate::config::CheckConfig;
use crate::text::format_signed;

/// One inconsistency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// Printed modifier differs from the score's modifier.
    ModifierMismatch {
        /// Ability concerned.
        ability: Ability,
        /// Printed score.
        score: i32,
        /// Printed modifier.
        stated: i32,
        /// Modifier the score implies.
        expected: i32,
    },
    /// Save bonus is neither the modifier nor the modifier plus PB.
    SaveMismatch {
        /// Ability concerned.
        ability: Ability,
        /// Printed save bonus.
        stated: i32,
        /// Modifier used for the comparison.
        modifier: i32,
        /// Proficiency bonus used for the comparison, if known.
        proficiency_bonus: Option<i32>,
    },
    /// Passive Perception differs from 10 + Perception.
    PassivePerceptionMismatch {
        /// Printed passive Perception.
        stated: i32,
        /// Expected passive Perception.
        expected: i32,
    },
    /// Initiative score differs from 10 + initiative bonus.
    InitiativeMismatch {
        /// Printed initiative bonus.
        bonus: i32,
        /// Printed initiative score.
        score: i32,
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModifierMismatch {
                ability,
                score,
                stated,
                expected,
            } => write!(
                f,
                "{ability} {score} has modifier {} but should be {}",
                format_signed(*stated),
                format_signed(*expected)
            ),
            Self::SaveMismatch {
                ability,
                stated,
                modifier,
                proficiency_bonus: Some(pb),
            } => write!(
                f,
                "{ability} save {} is neither {} nor {} (PB {})",
                format_signed(*stated),
                format_signed(*modifier),
                format_signed(modifier + pb),
                format_signed(*pb)
            ),
            Self::SaveMismatch {
                ability,
                stated,
                modifier,
                proficiency_bonus: None,
            } => write!(
                f,
                "{ability} save {} differs from modifier {} and no proficiency bonus is known",
                format_signed(*stated),
                format_signed(*modifier)
            ),
            Self::PassivePerceptionMismatch { stated, expected } => {
                write!(f, "passive Perception {stated} should be {expected}")
            }
            Self::InitiativeMismatch { bonus, score } => write!(
                f,
                "initiative {} ({score}) should have score {}",
                format_signed(*bonus),
                10 + bonus
            ),
        }
    }
}

/// Findings for one stat block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Creature name.
    pub name: String,
    /// Inconsistencies found, in stat-block order.
    pub findings: Vec<Finding>,
}

impl CheckReport {
    /// True when nothing was found.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Check a stat block's derived numbers.
#[must_use]
pub fn check(block: &StatBlock, config: &CheckConfig) -> CheckReport {
    let mut findings = Vec::new();
    let proficiency_bonus = block.proficiency_bonus();

    for (ability, line) in &block.abilities {
        let expected = line.expected_modifier();
        if let Some(stated) = line.modifier {
            if stated != expected {
                findings.push(Finding::ModifierMismatch {
                    ability: *ability,
                    score: line.score,
                    stated,
                    expected,
                });
            }
        }

        // Saves build on the printed modifier so one typo is reported once.
        let modifier = line.modifier();
        let save_ok = match (line.save, proficiency_bonus) {
            (None, _) | (Some(SaveBonus::Listed(_)), None) => true,
            (Some(SaveBonus::Column(save)), None) => save == modifier,
            (Some(SaveBonus::Column(save)), Some(pb)) => save == modifier || save == modifier + pb,
            (Some(SaveBonus::Listed(save)), Some(pb)) => save == modifier + pb,
        };
        if !save_ok {
            if let Some(save) = line.save {
                findings.push(Finding::SaveMismatch {
                    ability: *ability,
                    stated: save.bonus(),
                    modifier,
                    proficiency_bonus,
                });
            }
        }
    }

    if config.passive_perception {
        if let Some(stated) = block.passive_perception {
            let perception = block
                .skill_bonus("Perception")
                .or_else(|| block.modifier(Ability::Wis));
            if let Some(perception) = perception {
                let expected = 10 + perception;
                if stated != expected {
                    findings.push(Finding::PassivePerceptionMismatch { stated, expected });
                }
            }
        }
    }

    if config.initiative {
        if let Some(initiative) = block.initiative {
            if let Some(score) = initiative.score {
                if score != 10 + initiative.bonus {
                    findings.push(Finding::InitiativeMismatch {
                        bonus: initiative.bonus,
                        score,
                    });
                }
            }
        }
    }

    CheckReport {
        name: block.name.clone(),
        findings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statblock::{AbilityLine, ChallengeRating, Initiative, Skill};
    use std::collections::BTreeMap;

    fn block(abilities: &[(Ability, AbilityLine)], cr: &str) -> StatBlock {
        StatBlock {
            name: "Test".to_string(),
            size: None,
            creature_type: String::new(),
            alignment: String::new(),
            armor_class: None,
            hit_points: None,
            hit_dice: None,
            speed: String::new(),
            initiative: None,
            abilities: abilities.iter().copied().collect::<BTreeMap<_, _>>(),
            skills: Vec::new(),
            senses: String::new(),
            passive_perception: None,
            languages: String::new(),
            challenge: Some(ChallengeRating::new(cr)),
            stated_proficiency_bonus: None,
            actions: Vec::new(),
        }
    }

    fn line(score: i32, modifier: i32, save: Option<SaveBonus>) -> AbilityLine {
        AbilityLine {
            score,
            modifier: Some(modifier),
            save,
        }
    }

    #[test]
    fn test_consistent_block() {
        let block = block(
            &[
                (Ability::Str, line(8, -1, Some(SaveBonus::Column(-1)))),
                (Ability::Dex, line(15, 2, Some(SaveBonus::Column(4)))),
                (Ability::Wis, line(9, -1, Some(SaveBonus::Listed(1)))),
            ],
            "1/4",
        );
        let report = check(&block, &CheckConfig::default());
        assert!(report.is_consistent(), "{:?}", report.findings);
    }

    #[test]
    fn test_modifier_mismatch() {
        let block = block(&[(Ability::Con, line(9, 0, None))], "1");
        let report = check(&block, &CheckConfig::default());
        assert_eq!(
            report.findings,
            vec![Finding::ModifierMismatch {
                ability: Ability::Con,
                score: 9,
                stated: 0,
                expected: -1
            }]
        );
        assert_eq!(
            report.findings[0].to_string(),
            "CON 9 has modifier +0 but should be -1"
        );
    }

    #[test]
    fn test_column_save_mismatch() {
        let block = block(&[(Ability::Dex, line(14, 2, Some(SaveBonus::Column(3))))], "5");
        let report = check(&block, &CheckConfig::default());
        assert_eq!(
            report.findings,
            vec![Finding::SaveMismatch {
                ability: Ability::Dex,
                stated: 3,
                modifier: 2,
                proficiency_bonus: Some(3)
            }]
        );
    }

    #[test]
    fn test_listed_save_must_be_proficient() {
        let block = block(&[(Ability::Wis, line(12, 1, Some(SaveBonus::Listed(1))))], "2");
        let report = check(&block, &CheckConfig::default());
        assert_eq!(report.findings.len(), 1);
        assert!(matches!(report.findings[0], Finding::SaveMismatch { .. }));
    }

    #[test]
    fn test_unknown_pb_skips_listed_saves() {
        let mut block = block(&[(Ability::Wis, line(12, 1, Some(SaveBonus::Listed(9))))], "?");
        block.challenge = None;
        assert!(check(&block, &CheckConfig::default()).is_consistent());

        block.abilities.insert(Ability::Cha, line(10, 0, Some(SaveBonus::Column(2))));
        let report = check(&block, &CheckConfig::default());
        assert_eq!(report.findings.len(), 1);
        assert!(report.findings[0]
            .to_string()
            .contains("no proficiency bonus is known"));
    }

    #[test]
    fn test_stated_pb_overrides_cr() {
        let mut block = block(&[(Ability::Str, line(10, 0, Some(SaveBonus::Listed(4))))], "1");
        assert!(!check(&block, &CheckConfig::default()).is_consistent());
        block.stated_proficiency_bonus = Some(4);
        assert!(check(&block, &CheckConfig::default()).is_consistent());
    }

    #[test]
    fn test_passive_perception() {
        let mut block = block(&[(Ability::Wis, line(14, 2, None))], "1");
        block.passive_perception = Some(12);
        assert!(check(&block, &CheckConfig::default()).is_consistent());

        block.skills.push(Skill {
            name: "Perception".to_string(),
            bonus: 4,
        });
        let report = check(&block, &CheckConfig::default());
        assert_eq!(
            report.findings,
            vec![Finding::PassivePerceptionMismatch {
                stated: 12,
                expected: 14
            }]
        );

        let config = CheckConfig {
            passive_perception: false,
            ..CheckConfig::default()
        };
        assert!(check(&block, &config).is_consistent());
    }

    #[test]
    fn test_initiative() {
        let mut block = block(&[], "1");
        block.initiative = Some(Initiative {
            bonus: 2,
            score: Some(13),
        });
        let report = check(&block, &CheckConfig::default());
        assert_eq!(
            report.findings,
            vec![Finding::InitiativeMismatch { bonus: 2, score: 13 }]
        );

        block.initiative = Some(Initiative {
            bonus: -1,
            score: Some(9),
        });
        assert!(check(&block, &CheckConfig::default()).is_consistent());
    }

    #[test]
    fn test_report_serializes_kind() {
        let report = CheckReport {
            name: "Test".to_string(),
            findings: vec![Finding::InitiativeMismatch { bonus: 1, score: 10 }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["findings"][0]["kind"], "initiative_mismatch");
    }
}
