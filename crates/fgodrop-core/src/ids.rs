//! Deterministic entity IDs
//!
//! IDs are positional: one base-36 digit per grouping level, derived from
//! consecutive runs of equal group keys in sheet order. The sheet keeps
//! each category and each area contiguous, so runs and groups coincide; if
//! upstream ever interleaves them, a repeated key starts a fresh run and
//! the IDs shift. No digit may exceed 35, which caps every level at 36
//! entries.

use crate::error::{Error, Result};
use std::collections::HashMap;
use tracing::warn;

/// Encode an index as a single base-36 digit (0-9 then a-z)
pub fn base36(n: usize) -> Result<char> {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    DIGITS.get(n).map(|&b| b as char).ok_or(Error::Base36(n))
}

/// Assign a two-digit ID to every (category, name) occurrence: the index of
/// the consecutive category run, then the position within the run.
pub fn item_occurrence_ids(items: &[(String, String)]) -> Result<Vec<String>> {
    let mut ids = Vec::with_capacity(items.len());
    let mut run = 0usize;
    let mut member = 0usize;
    let mut prev: Option<&str> = None;
    for (category, _) in items {
        match prev {
            Some(p) if p == category => member += 1,
            Some(_) => {
                run += 1;
                member = 0;
            }
            None => {}
        }
        prev = Some(category);
        ids.push(format!("{}{}", base36(run)?, base36(member)?));
    }
    Ok(ids)
}

/// Assign a three-digit ID to every (section, area, name) occurrence:
/// section run, area run within the section, position within the area.
/// Inner counters reset whenever an outer key changes.
pub fn quest_occurrence_ids(quests: &[(String, String, String)]) -> Result<Vec<String>> {
    let mut ids = Vec::with_capacity(quests.len());
    let mut section_run = 0usize;
    let mut area_run = 0usize;
    let mut member = 0usize;
    let mut prev: Option<(&str, &str)> = None;
    for (section, area, _) in quests {
        if let Some((prev_section, prev_area)) = prev {
            if prev_section != section {
                section_run += 1;
                area_run = 0;
                member = 0;
            } else if prev_area != area {
                area_run += 1;
                member = 0;
            } else {
                member += 1;
            }
        }
        prev = Some((section, area));
        ids.push(format!(
            "{}{}{}",
            base36(section_run)?,
            base36(area_run)?,
            base36(member)?
        ));
    }
    Ok(ids)
}

/// Collapse per-occurrence IDs into a name-keyed lookup.
///
/// Display names are assumed unique; when the sheet repeats one anyway, the
/// later occurrence wins and every row carrying that name resolves to the
/// later ID. The collapse is logged so a sheet fix can be requested.
pub fn ids_by_name<'a, I>(entries: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut map = HashMap::new();
    for (name, id) in entries {
        if let Some(old) = map.insert(name.to_string(), id.to_string()) {
            if old != id {
                warn!("duplicate name '{}': id {} replaces {}", name, id, old);
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    fn triples(entries: &[(&str, &str, &str)]) -> Vec<(String, String, String)> {
        entries
            .iter()
            .map(|(a, b, c)| (a.to_string(), b.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn test_base36_digits() {
        assert_eq!(base36(0).unwrap(), '0');
        assert_eq!(base36(9).unwrap(), '9');
        assert_eq!(base36(10).unwrap(), 'a');
        assert_eq!(base36(35).unwrap(), 'z');
    }

    #[test]
    fn test_base36_rejects_two_digit_indices() {
        assert!(matches!(base36(36), Err(Error::Base36(36))));
    }

    #[test]
    fn test_item_ids_count_runs_and_members() {
        let items = pairs(&[
            ("銅素材", "証"),
            ("銅素材", "骨"),
            ("銀素材", "種"),
            ("輝石", "剣輝"),
        ]);
        let ids = item_occurrence_ids(&items).unwrap();
        assert_eq!(ids, vec!["00", "01", "10", "20"]);
    }

    #[test]
    fn test_item_ids_reuse_of_key_starts_new_run() {
        // runs are consecutive, not a partition: a category that reappears
        // after a gap gets a fresh run digit
        let items = pairs(&[("A", "x"), ("B", "y"), ("A", "z")]);
        let ids = item_occurrence_ids(&items).unwrap();
        assert_eq!(ids, vec!["00", "10", "20"]);
    }

    #[test]
    fn test_quest_ids_reset_inner_counters() {
        let quests = triples(&[
            ("修練場", "修練場 初級", "q1"),
            ("修練場", "修練場 中級", "q2"),
            ("第1部", "冬木", "q3"),
            ("第1部", "冬木", "q4"),
            ("第1部", "オルレアン", "q5"),
            ("第2部", "アナスタシア", "q6"),
        ]);
        let ids = quest_occurrence_ids(&quests).unwrap();
        assert_eq!(ids, vec!["000", "010", "100", "101", "110", "200"]);
    }

    #[test]
    fn test_quest_ids_same_area_across_sections() {
        // a section change resets the area run even when the area label
        // itself repeats
        let quests = triples(&[("S1", "A", "q1"), ("S2", "A", "q2")]);
        let ids = quest_occurrence_ids(&quests).unwrap();
        assert_eq!(ids, vec!["000", "100"]);
    }

    #[test]
    fn test_ids_by_name_last_occurrence_wins() {
        let map = ids_by_name(vec![("a", "00"), ("b", "01"), ("a", "10")]);
        assert_eq!(map.get("a").map(String::as_str), Some("10"));
        assert_eq!(map.get("b").map(String::as_str), Some("01"));
    }

    #[test]
    fn test_overflowing_run_count_fails() {
        let items: Vec<(String, String)> = (0..37)
            .map(|i| (format!("c{i}"), format!("n{i}")))
            .collect();
        assert!(item_occurrence_ids(&items).is_err());
    }
}
