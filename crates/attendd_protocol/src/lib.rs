//! # attendd Protocol
//!
//! Command protocol spoken by biometric attendance terminals.
//!
//! This crate provides:
//! - [`Command`] keywords and their normalization
//! - Field-alias tables for the loosely typed device payloads
//! - Record builders for devices, attendance logs and users
//! - The temperature-based [`Access`] decision
//! - Reply bodies returned to terminals
//!
//! This is a pure protocol crate with no I/O operations.
//!
//! # Payload shapes
//!
//! Terminal firmware is inconsistent about field names (`SN` vs `sn`,
//! `enrollid` vs `userid`, ...) and about whether a batch is one object or an
//! array. Every field is therefore resolved through an ordered alias list
//! ([`FieldAliases`]) and every batch is normalized with [`entries`] before
//! it is processed.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod access;
mod command;
mod error;
pub mod fields;
mod records;
mod reply;

pub use access::{Access, FEVER_THRESHOLD};
pub use command::{normalize_cmd, Command};
pub use error::EntryError;
pub use fields::{entries, FieldAliases};
pub use records::{merge_shallow, user_identity, DeviceRecord, LogEntry, UserRecord};
pub use reply::{
    cloudtime, CheckLiveReply, ErrorBody, LogReply, QrCodeReply, RegReply, Reply, UserReply,
};

/// A JSON object as stored in a collection.
pub type Record = serde_json::Map<String, serde_json::Value>;
