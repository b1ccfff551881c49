//! Command keywords.

use std::fmt;

/// A command a terminal can send in the `cmd` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Device registration.
    Reg,
    /// Attendance log upload.
    SendLog,
    /// Heartbeat.
    CheckLive,
    /// User enrollment upload.
    SendUser,
    /// QR-code verification.
    SendQrCode,
}

impl Command {
    /// Every supported command.
    pub const ALL: [Command; 5] = [
        Command::Reg,
        Command::SendLog,
        Command::CheckLive,
        Command::SendUser,
        Command::SendQrCode,
    ];

    /// Returns the wire keyword, which is also the `ret` of every reply.
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Reg => "reg",
            Command::SendLog => "sendlog",
            Command::CheckLive => "checklive",
            Command::SendUser => "senduser",
            Command::SendQrCode => "sendqrcode",
        }
    }

    /// Matches an already normalized keyword exactly.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == keyword)
    }

    /// Normalizes `raw` and matches it.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::from_keyword(&normalize_cmd(raw))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trims and lower-cases a raw `cmd` value.
pub fn normalize_cmd(raw: &str) -> String {
    raw.trim().to_lowercase()
}
