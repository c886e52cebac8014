//! Grid-to-snapshot transform
//!
//! Takes the raw cell grid of the drop-rate sheet (banner row, two header
//! rows, then one quest per row) and produces the three relational tables
//! of a [`Dataset`].

use crate::error::{Error, Result};
use crate::ids::{ids_by_name, item_occurrence_ids, quest_occurrence_ids};
use crate::model::{Dataset, DropRate, Item, Quest};
use crate::sheet::{build_table, reconcile_header, TableRow};
use bigdecimal::BigDecimal;
use std::str::FromStr;

/// Areas belonging to part 1 of the story
const PART_1_AREAS: [&str; 8] = [
    "冬木",
    "オルレアン",
    "セプテム",
    "オケアノス",
    "ロンドン",
    "北米",
    "キャメロット",
    "バビロニア",
];

/// Areas belonging to part 1.5
const PART_1_5_AREAS: [&str; 4] = ["新宿", "アガルタ", "下総国", "セイレム"];

/// Classify an area into its story section. Unknown areas are part 2, so
/// new story chapters work without a code change.
pub fn section_for_area(area: &str) -> &'static str {
    if area.contains("修練場") {
        "修練場"
    } else if PART_1_AREAS.contains(&area) {
        "第1部"
    } else if PART_1_5_AREAS.contains(&area) {
        "第1.5部"
    } else {
        "第2部"
    }
}

/// Transform a raw cell grid into a [`Dataset`].
///
/// Row 1 is a banner and ignored, rows 2-3 are the header, everything after
/// is quest data. Fewer than three rows is an error.
pub fn parse_values(values: &[Vec<String>]) -> Result<Dataset> {
    if values.len() < 3 {
        return Err(Error::TruncatedSheet { rows: values.len() });
    }
    let header = reconcile_header(&values[1], &values[2]);
    let table = build_table(&header, &values[3..], 4);

    let item_pairs: Vec<(String, String)> = header
        .item_columns()
        .map(|(category, name)| (category.to_string(), name.to_string()))
        .collect();
    let item_occurrences = item_occurrence_ids(&item_pairs)?;
    let item_ids = ids_by_name(
        item_pairs
            .iter()
            .map(|(_, name)| name.as_str())
            .zip(item_occurrences.iter().map(String::as_str)),
    );
    let items: Vec<Item> = item_pairs
        .into_iter()
        .zip(item_occurrences)
        .map(|((category, name), occurrence_id)| Item {
            id: item_ids.get(&name).cloned().unwrap_or(occurrence_id),
            category,
            name,
        })
        .collect();

    let mut quest_keys = Vec::with_capacity(table.len());
    for row in &table {
        let area = row.require("エリア")?.to_string();
        let name = row.require("クエスト名")?.to_string();
        let section = section_for_area(&area).to_string();
        quest_keys.push((section, area, name));
    }
    let quest_occurrences = quest_occurrence_ids(&quest_keys)?;
    let quest_ids = ids_by_name(
        quest_keys
            .iter()
            .map(|(_, _, name)| name.as_str())
            .zip(quest_occurrences.iter().map(String::as_str)),
    );

    let mut quests = Vec::with_capacity(table.len());
    for (((section, area, name), occurrence_id), row) in
        quest_keys.iter().zip(&quest_occurrences).zip(&table)
    {
        let id = quest_ids
            .get(name)
            .cloned()
            .unwrap_or_else(|| occurrence_id.clone());
        let mut quest = Quest {
            id,
            section: section.clone(),
            area: area.clone(),
            name: name.clone(),
            ap: parse_count(row, "AP")?,
            samples: parse_count(row, "サンプル数")?,
            bp: parse_count(row, "基本絆P")?,
            exp: parse_count(row, "EXP")?,
            qp: parse_count(row, "QP")?,
        };
        if quest.id.starts_with('0') {
            quest.ap = Some(training_ground_ap(&quest.id)?);
        }
        quests.push(quest);
    }

    let mut drop_rates = Vec::new();
    for ((_, _, name), row) in quest_keys.iter().zip(&table) {
        let quest_id = quest_ids
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownQuest(name.clone()))?;
        for item in &items {
            let value = match row.get(&item.name) {
                // cells like "#N/A" mark a pending measurement, not a rate
                Some(v) if !v.starts_with('#') => v,
                _ => continue,
            };
            drop_rates.push(DropRate {
                item_id: item.id.clone(),
                quest_id: quest_id.clone(),
                drop_rate: percentage_to_rate(&item.name, value)?,
            });
        }
    }

    Ok(Dataset {
        items,
        quests,
        drop_rates,
    })
}

/// Parse an optional numeric cell, tolerating comma grouping ("1,234")
fn parse_count(row: &TableRow, column: &str) -> Result<Option<i64>> {
    match row.get(column) {
        None => Ok(None),
        Some(value) => value
            .replace(',', "")
            .parse::<i64>()
            .map(Some)
            .map_err(|e| Error::InvalidInt {
                column: column.to_string(),
                value: value.to_string(),
                source: e,
            }),
    }
}

/// AP cost of a training-ground quest, derived from the rank digit at the
/// end of its ID (rank 0 costs 40 AP, each rank below costs 10 less)
fn training_ground_ap(id: &str) -> Result<i64> {
    let rank = id
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .ok_or_else(|| Error::RankDigit(id.to_string()))?;
    Ok((4 - i64::from(rank)) * 10)
}

/// Convert a percentage cell to a probability: the division runs in exact
/// decimal arithmetic, and the f64 is parsed from the exact decimal string
fn percentage_to_rate(item: &str, value: &str) -> Result<f64> {
    let invalid = || Error::InvalidRate {
        item: item.to_string(),
        value: value.to_string(),
    };
    let percent = BigDecimal::from_str(value).map_err(|_| invalid())?;
    (percent / BigDecimal::from(100))
        .to_string()
        .parse()
        .map_err(|_| invalid())
}
