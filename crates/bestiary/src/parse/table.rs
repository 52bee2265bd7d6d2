//! Ability tables.
//!
//! Two layouts are in circulation:
//!
//! ```text
//! | STR | DEX | CON | INT | WIS | CHA |        | | Score | Mod | Save |
//! |-----|-----|-----|-----|-----|-----|        | STR | 8 | −1 | −1 |
//! | 8 (−1) | 15 (+2) | 10 (+0) | ... |        | DEX | 15 | +2 | +2 | INT | 10 | +0 | +0 |
//! ```
//!
//! The left one puts the abbreviations in a header row; the right one starts
//! each group of cells with the abbreviation, sometimes two groups per row.

use std::collections::BTreeMap;

use crate::statblock::{Ability, AbilityLine, SaveBonus};
use crate::text::{number_only, parse_signed};

/// Collect ability lines from table rows of cell texts.
///
/// Later rows override earlier ones for the same ability.
#[must_use]
pub fn abilities_from_rows(rows: &[Vec<String>]) -> BTreeMap<Ability, AbilityLine> {
    let mut abilities = BTreeMap::new();
    let mut index = 0;

    while index < rows.len() {
        let row = &rows[index];

        if let Some(header) = header_row(row) {
            if let Some(values) = rows.get(index + 1) {
                for (ability, cell) in header.into_iter().zip(values) {
                    let Some(ability) = ability else { continue };
                    if let Some(line) = line_from_cells(&[cell.as_str()]) {
                        abilities.insert(ability, line);
                    }
                }
            }
            index += 2;
            continue;
        }

        let mut current: Option<(Ability, Vec<&str>)> = None;
        for cell in row.iter().map(|cell| cell.trim()).filter(|cell| !cell.is_empty()) {
            if let Ok(ability) = cell.parse::<Ability>() {
                if let Some((previous, cells)) = current.take() {
                    if let Some(line) = line_from_cells(&cells) {
                        abilities.insert(previous, line);
                    }
                }
                current = Some((ability, Vec::new()));
            } else if let Some((_, cells)) = current.as_mut() {
                cells.push(cell);
            }
        }
        if let Some((ability, cells)) = current {
            if let Some(line) = line_from_cells(&cells) {
                abilities.insert(ability, line);
            }
        }

        index += 1;
    }

    abilities
}

/// A row whose non-empty cells are all ability names, at least two of them.
fn header_row(row: &[String]) -> Option<Vec<Option<Ability>>> {
    let parsed: Vec<Option<Ability>> = row.iter().map(|cell| cell.parse().ok()).collect();
    let non_empty = row.iter().filter(|cell| !cell.trim().is_empty()).count();
    let abilities = parsed.iter().flatten().count();
    (abilities >= 2 && abilities == non_empty).then_some(parsed)
}

/// Score, then modifier, then save.
///
/// The modifier may sit in parentheses after the score (`8 (−1)`); the
/// following cell is then the save.
fn line_from_cells(cells: &[&str]) -> Option<AbilityLine> {
    let (first, rest) = cells.split_first()?;
    let score: i32 = number_only(first.split('(').next().unwrap_or_default())
        .parse()
        .ok()?;
    let mut rest = rest.iter();
    let modifier = match first.split_once('(') {
        Some((_, inner)) => parse_signed(inner),
        None => rest.next().and_then(|cell| parse_signed(cell)),
    };
    let save = rest
        .next()
        .and_then(|cell| parse_signed(cell))
        .map(SaveBonus::Column);
    Some(AbilityLine {
        score,
        modifier,
        save,
    })
}
