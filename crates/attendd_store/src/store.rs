//! JSON collection files and atomic replacement.

use crate::collection::Collection;
use crate::error::{StoreError, StoreResult};
use crate::Record;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Options for opening a [`RecordStore`].
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Serialize read-modify-write cycles per collection.
    ///
    /// Off by default: overlapping requests against the same collection
    /// race and the last writer wins.
    pub serialize_writes: bool,
}

impl StoreOptions {
    /// Enables or disables per-collection write serialization.
    pub fn with_serialize_writes(mut self, enabled: bool) -> Self {
        self.serialize_writes = enabled;
        self
    }
}

/// Held for the duration of a load/mutate/save cycle.
///
/// Empty when write serialization is disabled.
#[must_use = "the collection is unlocked as soon as the guard is dropped"]
pub struct CollectionGuard<'a> {
    _guard: Option<MutexGuard<'a, ()>>,
}

/// Owns the collection files under one data directory.
///
/// The store keeps no records in memory. Every `load` reads the file and
/// every `save` replaces it, so callers round-trip the whole collection on
/// each request.
#[derive(Debug)]
pub struct RecordStore {
    dir: PathBuf,
    locks: Option<[Mutex<()>; 3]>,
    temp_seq: AtomicU64,
}

impl RecordStore {
    /// Opens the store, creating the data directory and seeding every
    /// missing collection file with an empty array.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a seed file cannot be created.
    pub async fn open(dir: impl AsRef<Path>, options: StoreOptions) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io(&dir, e))?;

        let store = Self::new(dir, &options);

        for collection in Collection::ALL {
            let path = store.path(collection);
            let exists = fs::try_exists(&path)
                .await
                .map_err(|e| StoreError::io(&path, e))?;
            if !exists {
                store.save(collection, &[]).await?;
                info!(collection = %collection, path = %path.display(), "seeded empty collection");
            }
        }

        Ok(store)
    }

    /// Attaches to an existing data directory without creating or seeding
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is not an existing directory.
    pub fn attach(dir: impl AsRef<Path>, options: StoreOptions) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(StoreError::io(
                dir,
                io::Error::new(io::ErrorKind::NotFound, "data directory does not exist"),
            ));
        }
        Ok(Self::new(dir, &options))
    }

    fn new(dir: PathBuf, options: &StoreOptions) -> Self {
        Self {
            dir,
            locks: options
                .serialize_writes
                .then(|| [Mutex::new(()), Mutex::new(()), Mutex::new(())]),
            temp_seq: AtomicU64::new(0),
        }
    }

    /// Returns the data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of a collection file.
    pub fn path(&self, collection: Collection) -> PathBuf {
        self.dir.join(collection.file_name())
    }

    /// Returns true if read-modify-write cycles are serialized.
    pub fn serializes_writes(&self) -> bool {
        self.locks.is_some()
    }

    /// Acquires the collection's write lock.
    ///
    /// Resolves immediately with an empty guard when serialization is off.
    pub async fn lock(&self, collection: Collection) -> CollectionGuard<'_> {
        let guard = match &self.locks {
            Some(locks) => Some(locks[collection.index()].lock().await),
            None => None,
        };
        CollectionGuard { _guard: guard }
    }

    /// Loads every record of a collection.
    ///
    /// A missing file, empty content, invalid JSON, or a top-level value
    /// that is not an array all load as an empty collection. The failure is
    /// logged and never returned.
    pub async fn load(&self, collection: Collection) -> Vec<Record> {
        let path = self.path(collection);
        match fs::read(&path).await {
            Ok(data) => parse_collection(collection, &data),
            Err(e) => {
                warn!(
                    collection = %collection,
                    path = %path.display(),
                    error = %e,
                    "failed to read collection, using empty"
                );
                Vec::new()
            }
        }
    }

    /// Replaces a collection with `records`.
    ///
    /// The records are written as pretty-printed JSON to a temporary file in
    /// the data directory, synced to disk, and renamed over the collection
    /// file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, the write, or the rename fails.
    /// The temporary file is removed on failure.
    pub async fn save(&self, collection: Collection, records: &[Record]) -> StoreResult<()> {
        let path = self.path(collection);
        let temp_path = self.temp_path(collection);

        let mut data = serde_json::to_vec_pretty(records)?;
        data.push(b'\n');

        if let Err(e) = write_synced(&temp_path, &data).await {
            discard(&temp_path).await;
            return Err(StoreError::io(temp_path, e));
        }

        if let Err(e) = fs::rename(&temp_path, &path).await {
            discard(&temp_path).await;
            return Err(StoreError::io(path, e));
        }

        debug!(collection = %collection, records = records.len(), "collection saved");
        Ok(())
    }

    /// Unique per write so overlapping saves never share a temp file.
    fn temp_path(&self, collection: Collection) -> PathBuf {
        let seq = self.temp_seq.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(
            ".{}.{}.{}.tmp",
            collection.file_name(),
            std::process::id(),
            seq
        ))
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    Ok(())
}

async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove temp file");
        }
    }
}

fn parse_collection(collection: Collection, data: &[u8]) -> Vec<Record> {
    if data.iter().all(u8::is_ascii_whitespace) {
        warn!(collection = %collection, "collection file is empty, using empty");
        return Vec::new();
    }

    match serde_json::from_slice::<Value>(data) {
        Ok(Value::Array(items)) => {
            let total = items.len();
            let records: Vec<Record> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect();
            if records.len() != total {
                warn!(
                    collection = %collection,
                    dropped = total - records.len(),
                    "ignored non-object entries"
                );
            }
            records
        }
        Ok(_) => {
            warn!(collection = %collection, "collection file is not a JSON array, using empty");
            Vec::new()
        }
        Err(e) => {
            warn!(collection = %collection, error = %e, "collection file is corrupt, using empty");
            Vec::new()
        }
    }
}
