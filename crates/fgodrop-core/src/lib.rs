//! fgodrop-core: Core library for turning the FGO drop-rate spreadsheet
//! into relational snapshots
//!
//! This library provides functionality to:
//! - Fetch the community sheet's cell grid (Sheets API or a CSV export)
//! - Reconcile the two-row header and filter layout rows
//! - Extract item, quest and drop-rate tables with deterministic IDs
//! - Merge fresh snapshots into previously published ones
//! - Publish gzip JSON/CSV blobs to a store, writing only on change

pub mod codec;
pub mod error;
pub mod fetch;
pub mod history;
pub mod ids;
pub mod merge;
pub mod model;
pub mod parse;
pub mod sheet;
pub mod store;
pub mod sync;

pub use error::{Error, Result};
pub use fetch::{fetch_values, values_from_csv};
pub use history::{History, HistoryEntry};
pub use merge::merge;
pub use model::{Dataset, DropRate, Item, Quest};
pub use parse::{parse_values, section_for_area};
pub use store::SnapshotStore;
pub use sync::{load_previous, preview, publish, BlobFormat, SyncOutcome};
