//! Encoding snapshots for storage and export
//!
//! The stored blob formats are gzip-compressed UTF-8: one JSON document for
//! the whole dataset, or one CSV document per entity table. Plain variants
//! back the CLI export command.

use crate::error::{Error, Result};
use crate::model::{Dataset, Quest};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Encode the whole dataset as gzip-compressed JSON
pub fn to_json_gz(data: &Dataset) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(data)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

/// Decode a gzip-compressed JSON dataset
pub fn from_json_gz(bytes: &[u8]) -> Result<Dataset> {
    let mut decoder = GzDecoder::new(bytes);
    let mut json = Vec::new();
    decoder.read_to_end(&mut json)?;
    Ok(serde_json::from_slice(&json)?)
}

/// Encode one entity table as gzip-compressed CSV with a header row.
/// `kind` names the table in errors.
pub fn to_csv_gz<T: Serialize>(kind: &str, rows: &[T]) -> Result<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut writer = csv::Writer::from_writer(encoder);
    for row in rows {
        writer.serialize(row).map_err(|e| Error::Csv {
            context: kind.to_string(),
            source: e,
        })?;
    }
    let encoder = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    Ok(encoder.finish()?)
}

/// Decode one gzip-compressed CSV entity table
pub fn from_csv_gz<T: DeserializeOwned>(kind: &str, bytes: &[u8]) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_reader(GzDecoder::new(bytes));
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row.map_err(|e| Error::Csv {
            context: kind.to_string(),
            source: e,
        })?);
    }
    Ok(rows)
}

/// Flat CSV image of a [`Quest`]. The JSON form omits absent counters, but
/// CSV records must all agree on the column set, so every field is written
/// on every row and an absent counter becomes an empty cell.
#[derive(Serialize, Deserialize)]
struct QuestRow {
    id: String,
    section: String,
    area: String,
    name: String,
    ap: Option<i64>,
    samples: Option<i64>,
    bp: Option<i64>,
    exp: Option<i64>,
    qp: Option<i64>,
}

impl From<&Quest> for QuestRow {
    fn from(quest: &Quest) -> Self {
        QuestRow {
            id: quest.id.clone(),
            section: quest.section.clone(),
            area: quest.area.clone(),
            name: quest.name.clone(),
            ap: quest.ap,
            samples: quest.samples,
            bp: quest.bp,
            exp: quest.exp,
            qp: quest.qp,
        }
    }
}

impl From<QuestRow> for Quest {
    fn from(row: QuestRow) -> Self {
        Quest {
            id: row.id,
            section: row.section,
            area: row.area,
            name: row.name,
            ap: row.ap,
            samples: row.samples,
            bp: row.bp,
            exp: row.exp,
            qp: row.qp,
        }
    }
}

fn quest_rows(quests: &[Quest]) -> Vec<QuestRow> {
    quests.iter().map(QuestRow::from).collect()
}

/// Encode the quest table as gzip-compressed CSV
pub fn quests_to_csv_gz(quests: &[Quest]) -> Result<Vec<u8>> {
    to_csv_gz("quests", &quest_rows(quests))
}

/// Decode a gzip-compressed CSV quest table
pub fn quests_from_csv_gz(bytes: &[u8]) -> Result<Vec<Quest>> {
    let rows: Vec<QuestRow> = from_csv_gz("quests", bytes)?;
    Ok(rows.into_iter().map(Quest::from).collect())
}

/// Render the quest table as plain CSV with a header row
pub fn quests_to_csv(quests: &[Quest]) -> Result<String> {
    to_csv("quests", &quest_rows(quests))
}

/// Render the dataset as indented JSON for human consumption
pub fn to_json_pretty(data: &Dataset) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Render one entity table as plain CSV with a header row
pub fn to_csv<T: Serialize>(kind: &str, rows: &[T]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).map_err(|e| Error::Csv {
            context: kind.to_string(),
            source: e,
        })?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
