//! Collection identifiers.

use std::fmt;

/// A named JSON collection owned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Registered terminals, keyed by serial number.
    Devices,
    /// Append-only attendance log.
    Logs,
    /// Enrolled users, keyed by enroll ID (and backup number).
    Users,
}

impl Collection {
    /// All collections, in a fixed order.
    pub const ALL: [Collection; 3] = [Collection::Devices, Collection::Logs, Collection::Users];

    /// Returns the collection name.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Devices => "devices",
            Collection::Logs => "logs",
            Collection::Users => "users",
        }
    }

    /// Returns the file name inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Devices => "devices.json",
            Collection::Logs => "logs.json",
            Collection::Users => "users.json",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Collection::Devices => 0,
            Collection::Logs => 1,
            Collection::Users => 2,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
