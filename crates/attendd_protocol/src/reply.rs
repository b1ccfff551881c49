//! Reply bodies returned to terminals.
//!
//! Every body carries `ret` (the command keyword, or `null` when no command
//! could be determined), `result` and `cloudtime`. The remaining fields
//! differ per command and are kept exactly as terminals expect them.

use crate::access::Access;
use crate::command::Command;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};

/// Returns the server time sent to terminals for clock synchronization.
///
/// ISO-8601 in UTC with millisecond precision, e.g. `2025-01-01T08:00:00.000Z`.
pub fn cloudtime() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A handler outcome: HTTP status plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// HTTP status code.
    pub status: u16,
    /// JSON body.
    pub body: Value,
}

impl Reply {
    /// Creates a reply with an explicit status.
    pub fn new(status: u16, body: impl Serialize) -> Self {
        let body = serde_json::to_value(body).unwrap_or_else(|e| {
            json!({ "ret": null, "result": false, "error": e.to_string() })
        });
        Self { status, body }
    }

    /// 200 with `body`.
    pub fn ok(body: impl Serialize) -> Self {
        Self::new(200, body)
    }

    /// 400 with an error body.
    pub fn bad_request(ret: Option<&str>, error: impl Into<String>) -> Self {
        Self::new(400, ErrorBody::new(ret, error))
    }

    /// 500 with the generic error body. Details stay in server logs.
    pub fn internal_error() -> Self {
        Self::new(500, ErrorBody::new(None, "Internal server error"))
    }
}

/// Body of every failed command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    /// Command keyword, `null` when unknown.
    pub ret: Option<String>,
    /// Always false.
    pub result: bool,
    /// Human-readable reason.
    pub error: String,
    /// Server time.
    pub cloudtime: String,
}

impl ErrorBody {
    /// Creates an error body.
    pub fn new(ret: Option<&str>, error: impl Into<String>) -> Self {
        Self {
            ret: ret.map(str::to_string),
            result: false,
            error: error.into(),
            cloudtime: cloudtime(),
        }
    }
}

/// Reply to `reg`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegReply {
    /// `"reg"`.
    pub ret: &'static str,
    /// Always true.
    pub result: bool,
    /// Server time.
    pub cloudtime: String,
    /// Tells the terminal not to push its whole user list.
    pub nosenduser: bool,
}

impl RegReply {
    /// Creates the success reply.
    pub fn new() -> Self {
        Self {
            ret: Command::Reg.as_str(),
            result: true,
            cloudtime: cloudtime(),
            nosenduser: true,
        }
    }
}

impl Default for RegReply {
    fn default() -> Self {
        Self::new()
    }
}

/// Reply to `sendlog`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogReply {
    /// `"sendlog"`.
    pub ret: &'static str,
    /// Always true.
    pub result: bool,
    /// Accepted entries.
    pub count: usize,
    /// Accepted entries, under the name older firmware reads.
    pub log_count: usize,
    /// Accepted entries with access allowed.
    pub allowed: usize,
    /// Accepted entries with access denied.
    pub denied: usize,
    /// Door decision for the batch: deny if any entry was denied.
    pub access: Access,
    /// Server time.
    pub cloudtime: String,
}

impl LogReply {
    /// Creates the reply from per-decision counts.
    pub fn new(allowed: usize, denied: usize) -> Self {
        let count = allowed + denied;
        Self {
            ret: Command::SendLog.as_str(),
            result: true,
            count,
            log_count: count,
            allowed,
            denied,
            access: if denied > 0 { Access::Deny } else { Access::Allow },
            cloudtime: cloudtime(),
        }
    }
}

/// Reply to `checklive`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckLiveReply {
    /// `"checklive"`.
    pub ret: &'static str,
    /// Always true.
    pub result: bool,
    /// Server time.
    pub cloudtime: String,
}

impl CheckLiveReply {
    /// Creates the reply.
    pub fn new() -> Self {
        Self {
            ret: Command::CheckLive.as_str(),
            result: true,
            cloudtime: cloudtime(),
        }
    }
}

impl Default for CheckLiveReply {
    fn default() -> Self {
        Self::new()
    }
}

/// Reply to `senduser`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserReply {
    /// `"senduser"`.
    pub ret: &'static str,
    /// Always true.
    pub result: bool,
    /// Accepted entries.
    pub count: usize,
    /// Server time.
    pub cloudtime: String,
}

impl UserReply {
    /// Creates the reply.
    pub fn new(count: usize) -> Self {
        Self {
            ret: Command::SendUser.as_str(),
            result: true,
            count,
            cloudtime: cloudtime(),
        }
    }
}

/// Reply to `sendqrcode`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QrCodeReply {
    /// `"sendqrcode"`.
    pub ret: &'static str,
    /// Always true; the verdict is in `access`.
    pub result: bool,
    /// Door decision.
    pub access: Access,
    /// Placeholder enroll ID for a valid code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollid: Option<String>,
    /// Placeholder name for a valid code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Voice prompt played by the terminal.
    pub message: String,
    /// Server time.
    pub cloudtime: String,
}

impl QrCodeReply {
    /// Enroll ID reported for any valid code.
    pub const VISITOR_ENROLL_ID: &'static str = "99999";
    /// Name reported for any valid code.
    pub const VISITOR_NAME: &'static str = "QR Visitor";

    /// Reply for a code on the allow-list.
    pub fn granted() -> Self {
        Self {
            ret: Command::SendQrCode.as_str(),
            result: true,
            access: Access::Allow,
            enrollid: Some(Self::VISITOR_ENROLL_ID.to_string()),
            username: Some(Self::VISITOR_NAME.to_string()),
            message: "Welcome, access granted".to_string(),
            cloudtime: cloudtime(),
        }
    }

    /// Reply for a missing or unknown code.
    pub fn denied() -> Self {
        Self {
            ret: Command::SendQrCode.as_str(),
            result: true,
            access: Access::Deny,
            enrollid: None,
            username: None,
            message: "Invalid QR code, access denied".to_string(),
            cloudtime: cloudtime(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloudtime_is_utc_millis() {
        let t = cloudtime();
        assert!(t.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&t).is_ok());
        assert_eq!(t.split('.').nth(1).map(str::len), Some(4));
    }

    #[test]
    fn error_reply_shape() {
        let reply = Reply::bad_request(Some("bogus"), "Unknown cmd: bogus");
        assert_eq!(reply.status, 400);
        assert_eq!(reply.body["ret"], "bogus");
        assert_eq!(reply.body["result"], false);
        assert_eq!(reply.body["error"], "Unknown cmd: bogus");
        assert!(reply.body["cloudtime"].is_string());
    }

    #[test]
    fn internal_error_hides_details() {
        let reply = Reply::internal_error();
        assert_eq!(reply.status, 500);
        assert_eq!(reply.body["ret"], Value::Null);
        assert_eq!(reply.body["error"], "Internal server error");
    }

    #[test]
    fn reg_reply_shape() {
        let reply = Reply::ok(RegReply::new());
        assert_eq!(reply.body["ret"], "reg");
        assert_eq!(reply.body["result"], true);
        assert_eq!(reply.body["nosenduser"], true);
    }

    #[test]
    fn log_reply_counts() {
        let reply = Reply::ok(LogReply::new(2, 1));
        assert_eq!(reply.body["count"], 3);
        assert_eq!(reply.body["log_count"], 3);
        assert_eq!(reply.body["allowed"], 2);
        assert_eq!(reply.body["denied"], 1);
        assert_eq!(reply.body["access"], 0);
    }

    #[test]
    fn qr_denied_omits_identity() {
        let reply = Reply::ok(QrCodeReply::denied());
        assert_eq!(reply.body["access"], 0);
        assert!(reply.body.get("enrollid").is_none());
        assert!(reply.body["message"].is_string());
    }
}
