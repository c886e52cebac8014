//! Blob storage for published snapshots
//!
//! The pipeline only needs get and put on named blobs. A plain directory
//! provides that; the blob names themselves are chosen by the sync layer.

use crate::error::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory-backed blob store
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Full path of a named blob
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Read a blob. A blob that was never written reads as `None`, which
    /// the pipeline treats as an empty prior dataset.
    pub fn get(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::FileRead {
                path: self.path(name),
                source: e,
            }),
        }
    }

    /// Write a blob, replacing any previous content
    pub fn put(&self, name: &str, bytes: &[u8]) -> Result<()> {
        fs::write(self.path(name), bytes)?;
        Ok(())
    }
}
