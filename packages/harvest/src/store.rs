//! Immutable batch persistence.
//!
//! One JSON file per collected page, numbered monotonically within a
//! session directory. Files are written once and never revisited for
//! writing; the reader is a separate, later pass that returns batches in
//! batch-number order. I/O failures here are fatal and carry the path and
//! operation that failed.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::collect::session::Session;
use crate::error::{StorageError, StorageResult};
use crate::types::Batch;

const BATCH_PREFIX: &str = "batch_";

/// Filesystem store for one session's batches.
pub struct BatchStore {
    session_dir: PathBuf,
}

impl BatchStore {
    /// Create the session directory under `root` and open a store for it.
    pub fn create(root: impl AsRef<Path>, session: &Session) -> StorageResult<Self> {
        let session_dir = root.as_ref().join(&session.id);
        fs::create_dir_all(&session_dir)
            .map_err(|e| StorageError::io("create session dir", &session_dir, e))?;
        info!(dir = %session_dir.display(), "session directory created");
        Ok(Self { session_dir })
    }

    /// Open an existing session directory for reading.
    pub fn open(session_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let session_dir = session_dir.into();
        if !session_dir.is_dir() {
            return Err(StorageError::io(
                "open session dir",
                &session_dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }
        Ok(Self { session_dir })
    }

    /// Directory this store reads and writes.
    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    fn batch_path(&self, number: u32) -> PathBuf {
        self.session_dir.join(format!("{BATCH_PREFIX}{number:04}.json"))
    }

    /// Write one batch. Refuses to overwrite an existing batch number —
    /// batches are immutable once written.
    pub fn write_batch(&self, batch: &Batch) -> StorageResult<PathBuf> {
        let number = batch.metadata.batch_number;
        let path = self.batch_path(number);

        if path.exists() {
            return Err(StorageError::BatchExists {
                number,
                session_dir: self.session_dir.clone(),
            });
        }

        let json = serde_json::to_vec_pretty(batch)
            .map_err(|e| StorageError::Encode { number, source: e })?;
        fs::write(&path, json).map_err(|e| StorageError::io("write batch", &path, e))?;

        debug!(
            path = %path.display(),
            items = batch.items.len(),
            "batch written"
        );
        Ok(path)
    }

    /// Read all batches back, in batch-number order.
    pub fn read_batches(&self) -> StorageResult<Vec<Batch>> {
        let entries = fs::read_dir(&self.session_dir)
            .map_err(|e| StorageError::io("read session dir", &self.session_dir, e))?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| StorageError::io("read session dir", &self.session_dir, e))?;
            let path = entry.path();
            let is_batch = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(BATCH_PREFIX) && n.ends_with(".json"))
                .unwrap_or(false);
            if is_batch {
                paths.push(path);
            }
        }

        // Zero-padded names sort numerically
        paths.sort();

        let mut batches = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = fs::read(&path).map_err(|e| StorageError::io("read batch", &path, e))?;
            let batch: Batch = serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Corrupt { path: path.clone(), source: e })?;
            batches.push(batch);
        }

        Ok(batches)
    }

    /// Directory for downloaded attachment files within the session.
    pub fn files_dir(&self) -> StorageResult<PathBuf> {
        let dir = self.session_dir.join("files");
        fs::create_dir_all(&dir).map_err(|e| StorageError::io("create files dir", &dir, e))?;
        Ok(dir)
    }
}
