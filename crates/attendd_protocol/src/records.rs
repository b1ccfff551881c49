//! Record builders for the device, log and user collections.
//!
//! Builders resolve the loosely named payload fields once and produce the
//! canonical object stored on disk. Updates to keyed records are shallow:
//! every key of the update replaces the stored key, every other stored key
//! is kept.

use crate::access::Access;
use crate::error::EntryError;
use crate::fields::{self, text};
use crate::Record;
use serde::Serialize;
use serde_json::Value;

/// Device fields taken from a `reg` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceRecord {
    /// Serial number.
    #[serde(rename = "SN")]
    pub sn: String,
    /// Model name, when supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,
    /// Capacities block, when supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devinfo: Option<Value>,
    /// IP address reported in the payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Address the registration came from. Only used for a new device
    /// whose payload carries no IP.
    #[serde(skip)]
    pub peer_ip: Option<String>,
    /// Time of this registration.
    pub last_seen: String,
    /// The registration payload as received.
    pub raw: Value,
}

impl DeviceRecord {
    /// Builds the record from a registration payload.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::MissingField`] if no serial number is present.
    pub fn from_registration(
        payload: &Record,
        peer_ip: Option<&str>,
        now: &str,
    ) -> Result<Self, EntryError> {
        let sn = fields::SERIAL
            .find_text(payload)
            .ok_or(EntryError::MissingField(fields::SERIAL.canonical()))?;

        Ok(Self {
            sn,
            model: fields::MODEL.find(payload).cloned(),
            devinfo: fields::CAPACITIES.find(payload).cloned(),
            ip: fields::IP.find_text(payload),
            peer_ip: peer_ip.map(str::to_string),
            last_seen: now.to_string(),
            raw: Value::Object(payload.clone()),
        })
    }

    /// Produces a first-time record, filling defaults for absent fields.
    pub fn into_new_record(self, now: &str) -> Record {
        let fallback_ip = self.peer_ip.clone().map(Value::from);
        let mut record = to_record(&self);
        record
            .entry("model")
            .or_insert_with(|| Value::from("unknown"));
        record
            .entry("devinfo")
            .or_insert_with(|| Value::Object(Record::new()));
        record
            .entry("ip")
            .or_insert(fallback_ip.unwrap_or(Value::Null));
        record.insert("registered_at".into(), Value::from(now));
        record
    }

    /// Produces the update merged into an existing record.
    ///
    /// The peer address is not part of the update, so a stored IP survives
    /// a registration that omits one.
    pub fn into_update(self) -> Record {
        to_record(&self)
    }

    /// Produces the update applied by a heartbeat.
    pub fn heartbeat(payload: &Record, now: &str) -> Record {
        let mut update = Record::new();
        update.insert("last_seen".into(), Value::from(now));
        update.insert("last_heartbeat".into(), Value::Object(payload.clone()));
        update
    }
}

/// One accepted attendance event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Enroll ID of the person.
    pub enrollid: String,
    /// Device-supplied event time, stored as given.
    pub timestamp: Value,
    /// Verification mode, `null` when absent.
    pub mode: Value,
    /// Temperature reading, when supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<Value>,
    /// Image payload, stored as given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Value>,
    /// Serial of the terminal that uploaded the entry.
    #[serde(rename = "SN")]
    pub sn: Option<String>,
    /// Server receive time.
    pub received_at: String,
    /// Access decision derived from `temp`.
    pub access: Access,
}

impl LogEntry {
    /// Builds a log entry from one element of a `sendlog` batch.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::MissingField`] if the enroll ID or the
    /// timestamp is absent.
    pub fn from_entry(
        entry: &Record,
        device_sn: Option<&str>,
        now: &str,
    ) -> Result<Self, EntryError> {
        let enrollid = fields::ENROLL_ID
            .find_text(entry)
            .ok_or(EntryError::MissingField(fields::ENROLL_ID.canonical()))?;
        let timestamp = fields::TIMESTAMP
            .find(entry)
            .cloned()
            .ok_or(EntryError::MissingField(fields::TIMESTAMP.canonical()))?;
        let temp = fields::TEMPERATURE.find(entry).cloned();
        let access = Access::from_temperature(temp.as_ref());

        Ok(Self {
            enrollid,
            timestamp,
            mode: fields::VERIFY_MODE
                .find(entry)
                .cloned()
                .unwrap_or(Value::Null),
            temp,
            image: fields::IMAGE.find(entry).cloned(),
            sn: device_sn
                .map(str::to_string)
                .or_else(|| fields::SERIAL.find_text(entry)),
            received_at: now.to_string(),
            access,
        })
    }

    /// Converts the entry into its stored form.
    pub fn into_record(self) -> Record {
        to_record(&self)
    }
}

/// User fields taken from one `senduser` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    /// Enroll ID on the terminal.
    pub enrollid: String,
    /// Backup slot, part of the identity when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backupnum: Option<Value>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    /// Password credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Value>,
    /// Card number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardid: Option<Value>,
    /// Fingerprint template, stored as given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Value>,
    /// Serial of the terminal that uploaded the user.
    #[serde(rename = "SN", skip_serializing_if = "Option::is_none")]
    pub sn: Option<String>,
    /// Time of this upload.
    pub updated_at: String,
    /// The entry as received.
    pub raw: Value,
}

impl UserRecord {
    /// Builds a user record from one element of a `senduser` batch.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::MissingField`] if no enroll ID is present.
    pub fn from_entry(
        entry: &Record,
        device_sn: Option<&str>,
        now: &str,
    ) -> Result<Self, EntryError> {
        let enrollid = fields::ENROLL_ID
            .find_text(entry)
            .ok_or(EntryError::MissingField(fields::ENROLL_ID.canonical()))?;

        Ok(Self {
            enrollid,
            backupnum: fields::BACKUP_NUM.find(entry).cloned(),
            name: fields::NAME.find(entry).cloned(),
            password: fields::PASSWORD.find(entry).cloned(),
            cardid: fields::CARD_ID.find(entry).cloned(),
            fingerprint: fields::FINGERPRINT.find(entry).cloned(),
            sn: device_sn
                .map(str::to_string)
                .or_else(|| fields::SERIAL.find_text(entry)),
            updated_at: now.to_string(),
            raw: Value::Object(entry.clone()),
        })
    }

    /// Returns the identity key: `enrollid` or `enrollid:backupnum`.
    pub fn identity(&self) -> String {
        identity_key(&self.enrollid, self.backupnum.as_ref())
    }

    /// Produces a first-time record.
    pub fn into_new_record(self) -> Record {
        let mut record = to_record(&self);
        record.insert("created_at".into(), Value::from(self.updated_at));
        record
    }

    /// Produces the update merged into an existing record.
    ///
    /// The peer address is not part of the update, so a stored IP survives
    /// a registration that omits one.
    pub fn into_update(self) -> Record {
        to_record(&self)
    }
}

/// Computes the identity key of a stored or incoming user object.
pub fn user_identity(record: &Record) -> Option<String> {
    let enrollid = fields::ENROLL_ID.find_text(record)?;
    Some(identity_key(&enrollid, fields::BACKUP_NUM.find(record)))
}

fn identity_key(enrollid: &str, backupnum: Option<&Value>) -> String {
    match backupnum.and_then(text) {
        Some(slot) => format!("{enrollid}:{slot}"),
        None => enrollid.to_string(),
    }
}

/// Overwrites `existing` with every key of `update`.
pub fn merge_shallow(existing: &mut Record, update: Record) {
    for (key, value) in update {
        existing.insert(key, value);
    }
}

fn to_record<T: Serialize>(value: &T) -> Record {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Record::new(),
    }
}
