//! The merge-and-publish pipeline step
//!
//! A sync run takes a freshly parsed snapshot, merges it into whatever the
//! store already holds, and rewrites the blobs only when the merge changed
//! something. Every run is appended to the store's history log.

use crate::codec;
use crate::error::Result;
use crate::history::History;
use crate::merge::merge;
use crate::model::Dataset;
use crate::store::SnapshotStore;
use tracing::info;

/// The published JSON blob
pub const JSON_BLOB: &str = "all.json.gz";
/// The published CSV blobs, one per entity table
pub const ITEMS_BLOB: &str = "items.csv.gz";
pub const QUESTS_BLOB: &str = "quests.csv.gz";
pub const DROP_RATES_BLOB: &str = "drop_rates.csv.gz";

/// On-disk layout of the published snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobFormat {
    /// One gzip JSON document holding all three tables
    Json,
    /// One gzip CSV document per table
    Csv,
}

/// What a sync run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Items in the merged dataset
    pub items: usize,
    /// Quests in the merged dataset
    pub quests: usize,
    /// Drop rates in the merged dataset
    pub drop_rates: usize,
    /// False when the merged dataset matched the stored one
    pub written: bool,
}

/// Load the previously published dataset, or an empty one on the first run
pub fn load_previous(store: &SnapshotStore, format: BlobFormat) -> Result<Dataset> {
    match format {
        BlobFormat::Json => match store.get(JSON_BLOB)? {
            Some(bytes) => codec::from_json_gz(&bytes),
            None => Ok(Dataset::default()),
        },
        BlobFormat::Csv => {
            let mut data = Dataset::default();
            if let Some(bytes) = store.get(ITEMS_BLOB)? {
                data.items = codec::from_csv_gz("items", &bytes)?;
            }
            if let Some(bytes) = store.get(QUESTS_BLOB)? {
                data.quests = codec::quests_from_csv_gz(&bytes)?;
            }
            if let Some(bytes) = store.get(DROP_RATES_BLOB)? {
                data.drop_rates = codec::from_csv_gz("drop_rates", &bytes)?;
            }
            Ok(data)
        }
    }
}

/// Rewrite the blobs that actually changed. In CSV mode each table is its
/// own blob, so an unchanged table keeps its stored bytes.
fn write_snapshot(
    store: &SnapshotStore,
    format: BlobFormat,
    previous: &Dataset,
    merged: &Dataset,
) -> Result<()> {
    match format {
        BlobFormat::Json => store.put(JSON_BLOB, &codec::to_json_gz(merged)?),
        BlobFormat::Csv => {
            if merged.items != previous.items {
                store.put(ITEMS_BLOB, &codec::to_csv_gz("items", &merged.items)?)?;
            }
            if merged.quests != previous.quests {
                store.put(QUESTS_BLOB, &codec::quests_to_csv_gz(&merged.quests)?)?;
            }
            if merged.drop_rates != previous.drop_rates {
                store.put(
                    DROP_RATES_BLOB,
                    &codec::to_csv_gz("drop_rates", &merged.drop_rates)?,
                )?;
            }
            Ok(())
        }
    }
}

/// Merge `snapshot` into the store and publish the result.
///
/// The blobs are rewritten only when the merge changed the stored dataset;
/// either way the run is recorded in the history log.
pub fn publish(
    store: &SnapshotStore,
    format: BlobFormat,
    snapshot: &Dataset,
) -> Result<SyncOutcome> {
    let previous = load_previous(store, format)?;
    let merged = merge(&previous, snapshot);
    let written = merged != previous;
    if written {
        write_snapshot(store, format, &previous, &merged)?;
        info!(
            items = merged.items.len(),
            quests = merged.quests.len(),
            drop_rates = merged.drop_rates.len(),
            "published updated snapshot"
        );
    } else {
        info!("snapshot unchanged, skipping write");
    }

    let mut history = History::load(store)?;
    history.record(&merged, written);
    history.save(store)?;

    Ok(SyncOutcome {
        items: merged.items.len(),
        quests: merged.quests.len(),
        drop_rates: merged.drop_rates.len(),
        written,
    })
}

/// Compute what [`publish`] would do without touching the store
pub fn preview(
    store: &SnapshotStore,
    format: BlobFormat,
    snapshot: &Dataset,
) -> Result<SyncOutcome> {
    let previous = load_previous(store, format)?;
    let merged = merge(&previous, snapshot);
    Ok(SyncOutcome {
        items: merged.items.len(),
        quests: merged.quests.len(),
        drop_rates: merged.drop_rates.len(),
        written: merged != previous,
    })
}
