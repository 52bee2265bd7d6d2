//! Plain-text rendering of a stat block.

use std::fmt;

use super::{Ability, ActionSection, SaveBonus, StatBlock};
use crate::text::format_signed;

const MISSING: &str = "—";

fn or_missing<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

fn text_or_missing(value: &str) -> &str {
    if value.is_empty() {
        MISSING
    } else {
        value
    }
}

impl fmt::Display for StatBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;

        let mut kind = Vec::new();
        if let Some(size) = self.size {
            kind.push(size.to_string());
        }
        if !self.creature_type.is_empty() {
            kind.push(self.creature_type.clone());
        }
        let mut line = kind.join(" ");
        if !self.alignment.is_empty() {
            line = format!("{line}, {}", self.alignment);
        }
        if !line.is_empty() {
            writeln!(f, "{line}")?;
        }
        writeln!(f)?;

        let hit_points = match (&self.hit_points, &self.hit_dice) {
            (Some(hp), Some(dice)) => format!("{hp} ({dice})"),
            (hp, _) => or_missing(hp.as_ref()),
        };
        write!(
            f,
            "AC {}  HP {}  Speed {}",
            or_missing(self.armor_class),
            hit_points,
            text_or_missing(&self.speed)
        )?;
        if let Some(initiative) = self.initiative {
            write!(f, "  Initiative {}", format_signed(initiative.bonus))?;
            if let Some(score) = initiative.score {
                write!(f, " ({score})")?;
            }
        }
        writeln!(f)?;

        if !self.abilities.is_empty() {
            writeln!(f)?;
            writeln!(f, "{:<5}{:>6}{:>6}{:>6}", "", "Score", "Mod", "Save")?;
            for ability in Ability::ALL {
                let Some(line) = self.abilities.get(&ability) else {
                    continue;
                };
                let save = match line.save {
                    Some(SaveBonus::Listed(bonus)) => format!("{}*", format_signed(bonus)),
                    Some(SaveBonus::Column(bonus)) => format_signed(bonus),
                    None => format_signed(line.modifier()),
                };
                writeln!(
                    f,
                    "{:<5}{:>6}{:>6}{:>6}",
                    ability.abbreviation(),
                    line.score,
                    format_signed(line.modifier()),
                    save
                )?;
            }
        }
        writeln!(f)?;

        if !self.skills.is_empty() {
            let skills: Vec<String> = self
                .skills
                .iter()
                .map(|skill| format!("{} {}", skill.name, format_signed(skill.bonus)))
                .collect();
            writeln!(f, "Skills {}", skills.join(", "))?;
        }
        writeln!(f, "Senses {}", text_or_missing(&self.senses))?;
        writeln!(f, "Languages {}", text_or_missing(&self.languages))?;
        write!(f, "CR {}", or_missing(self.challenge.as_ref()))?;
        if let Some(pb) = self.proficiency_bonus() {
            write!(f, " (PB {})", format_signed(pb))?;
        }
        writeln!(f)?;

        for section in [
            ActionSection::Traits,
            ActionSection::Actions,
            ActionSection::BonusActions,
            ActionSection::Reactions,
            ActionSection::LegendaryActions,
        ] {
            let mut entries = self.actions_in(section).peekable();
            if entries.peek().is_none() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "{}", section.title())?;
            for entry in entries {
                writeln!(f, "  {}. {}", entry.name, entry.description)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::parse::{MarkdownParser, StatBlockParser};
    use crate::statblock::StatBlock;

    fn render(text: &str) -> String {
        let doc = MarkdownParser::new()
            .parse(text, Path::new("test.md"))
            .unwrap();
        StatBlock::from_document(&doc).to_string()
    }

    #[test]
    fn test_render_full_block() {
        let out = render(
            "# Wolf\n*Medium Beast, Unaligned*\n**Armor Class** 12\n**Hit Points** 11 (2d8 + 2)\n**Speed** 40 ft.\n\
             | STR | DEX | CON | INT | WIS | CHA |\n|---|---|---|---|---|---|\n\
             | 12 (+1) | 15 (+2) | 12 (+1) | 3 (−4) | 12 (+1) | 6 (−2) |\n\
             **Saving Throws** Dex +4\n**Skills** Perception +5, Stealth +4\n\
             **Senses** passive Perception 15\n**Languages** —\n**Challenge** 1/4 (50 XP)\n\
             ## Actions\n**Bite.** *Melee Weapon Attack:* +4 to hit.\n",
        );

        assert!(out.starts_with("Wolf\nMedium Beast, Unaligned\n"));
        assert!(out.contains("AC 12  HP 11 (2d8 + 2)  Speed 40 ft."));
        assert!(out.contains("DEX      15    +2   +4*"));
        assert!(out.contains("INT       3    -4    -4"));
        assert!(out.contains("Skills Perception +5, Stealth +4"));
        assert!(out.contains("CR 1/4 (PB +2)"));
        assert!(out.contains("Actions\n  Bite. Melee Weapon Attack: +4 to hit."));
    }

    #[test]
    fn test_render_missing_values() {
        let out = render("# Blob\n**CR** 0\n");
        assert!(out.contains("AC —  HP —  Speed —"));
        assert!(out.contains("Senses —"));
        assert!(!out.contains("Score"));
    }
}
