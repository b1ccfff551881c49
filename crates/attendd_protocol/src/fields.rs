//! Field-alias resolution and batch normalization.
//!
//! Each logical field is described by an ordered list of candidate names.
//! The first candidate holding a present value wins. `null` and blank
//! strings count as absent. A dotted name such as `devinfo.modelname`
//! reaches one level into a nested object.

use crate::Record;
use serde_json::Value;

/// An ordered list of accepted names for one logical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAliases {
    names: &'static [&'static str],
}

impl FieldAliases {
    /// Creates an alias list. The first name is the canonical one.
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    /// Returns the canonical (first) name.
    pub fn canonical(&self) -> &'static str {
        self.names.first().copied().unwrap_or_default()
    }

    /// Returns the first present value.
    pub fn find<'a>(&self, object: &'a Record) -> Option<&'a Value> {
        self.names
            .iter()
            .find_map(|name| lookup(object, name).filter(|v| is_present(v)))
    }

    /// Returns the first value that reads as text, trimmed.
    ///
    /// Numbers are rendered in their JSON form so that `7` and `"7"` resolve
    /// to the same identifier.
    pub fn find_text(&self, object: &Record) -> Option<String> {
        self.names
            .iter()
            .find_map(|name| lookup(object, name).and_then(text))
    }

    /// Returns the entries of the first alias holding at least one object.
    ///
    /// An empty container under one name does not hide a populated one
    /// under a later name.
    pub fn find_entries<'a>(&self, object: &'a Record) -> Vec<&'a Record> {
        self.names
            .iter()
            .filter_map(|name| lookup(object, name))
            .map(entries)
            .find(|batch| !batch.is_empty())
            .unwrap_or_default()
    }

    /// Returns true if any alias holds a present value.
    pub fn is_present_in(&self, object: &Record) -> bool {
        self.find(object).is_some()
    }
}

fn lookup<'a>(object: &'a Record, name: &str) -> Option<&'a Value> {
    match name.split_once('.') {
        Some((outer, inner)) => object.get(outer)?.as_object()?.get(inner),
        None => object.get(name),
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Renders a string or number as a non-empty identifier.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Normalizes a batch container into a sequence of objects.
///
/// A single object becomes a one-element sequence. Array elements that are
/// not objects are skipped. Any other value yields an empty sequence.
pub fn entries(value: &Value) -> Vec<&Record> {
    match value {
        Value::Object(map) => vec![map],
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    }
}

/// Device serial number.
pub const SERIAL: FieldAliases = FieldAliases::new(&["SN", "sn", "serial", "serialNumber", "deviceSn"]);
/// Device model name.
pub const MODEL: FieldAliases =
    FieldAliases::new(&["model", "modelname", "deviceModel", "devinfo.modelname"]);
/// Device capacities block (opaque).
pub const CAPACITIES: FieldAliases = FieldAliases::new(&["devinfo", "capacity", "capacities"]);
/// Device IP address.
pub const IP: FieldAliases = FieldAliases::new(&["ip", "IP", "ipaddr", "devinfo.ip"]);

/// Container carrying attendance log entries.
pub const LOG_CONTAINER: FieldAliases =
    FieldAliases::new(&["logs", "record", "records", "log", "data"]);
/// Container carrying user entries, singular form first.
pub const USER_CONTAINER: FieldAliases = FieldAliases::new(&["user", "users"]);

/// Enroll ID of a user on the terminal.
pub const ENROLL_ID: FieldAliases =
    FieldAliases::new(&["enrollid", "enrollId", "enroll_id", "userid", "pin"]);
/// Backup slot number of a credential.
pub const BACKUP_NUM: FieldAliases = FieldAliases::new(&["backupnum", "backupNum", "backup_num"]);
/// Device-supplied event time.
pub const TIMESTAMP: FieldAliases = FieldAliases::new(&["timestamp", "time", "datetime"]);
/// Verification mode (fingerprint, face, card, ...).
pub const VERIFY_MODE: FieldAliases = FieldAliases::new(&["mode", "verifymode", "verifyMode"]);
/// Body temperature reading.
pub const TEMPERATURE: FieldAliases = FieldAliases::new(&["temp", "temperature"]);
/// Captured image payload.
pub const IMAGE: FieldAliases = FieldAliases::new(&["image", "photo", "pic"]);

/// User display name.
pub const NAME: FieldAliases = FieldAliases::new(&["name", "username"]);
/// User password credential.
pub const PASSWORD: FieldAliases = FieldAliases::new(&["password", "pwd"]);
/// User card number.
pub const CARD_ID: FieldAliases = FieldAliases::new(&["cardid", "card", "cardno"]);
/// Fingerprint template (opaque).
pub const FINGERPRINT: FieldAliases = FieldAliases::new(&["fingerprint", "fp", "template"]);

/// QR code presented at the terminal.
pub const QR_CODE: FieldAliases = FieldAliases::new(&["qrcode", "code", "record"]);
