//! # attendd Store
//!
//! Flat-file record store for attendd.
//!
//! Each collection (devices, logs, users) is a single JSON array of objects
//! stored in its own file under the data directory:
//!
//! ```text
//! <data_dir>/
//! ├─ devices.json
//! ├─ logs.json
//! └─ users.json
//! ```
//!
//! Reads are forgiving: a missing, empty or corrupt file loads as an empty
//! collection. Writes are strict: the whole collection is written to a
//! temporary file, synced and renamed over the target, and any failure is
//! returned to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use attendd_store::{Collection, RecordStore, StoreOptions};
//!
//! let store = RecordStore::open("data", StoreOptions::default()).await?;
//! let mut devices = store.load(Collection::Devices).await;
//! devices.push(record);
//! store.save(Collection::Devices, &devices).await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod collection;
mod error;
mod store;

pub use collection::Collection;
pub use error::{StoreError, StoreResult};
pub use store::{CollectionGuard, RecordStore, StoreOptions};

/// A single persisted record: one JSON object.
pub type Record = serde_json::Map<String, serde_json::Value>;
