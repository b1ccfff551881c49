//! Temperature-driven access decision.

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Readings at or above this value deny entry.
pub const FEVER_THRESHOLD: f64 = 38.0;

/// Whether a terminal should open the door.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Entry permitted (`1` on the wire).
    Allow,
    /// Entry blocked (`0` on the wire).
    Deny,
}

impl Access {
    /// Decides access from an optional temperature reading.
    ///
    /// Only a numeric reading at or above [`FEVER_THRESHOLD`] denies. A
    /// string counts as numeric when it parses as a finite number. Missing
    /// and non-numeric readings allow.
    pub fn from_temperature(reading: Option<&Value>) -> Self {
        match reading.and_then(numeric) {
            Some(t) if t >= FEVER_THRESHOLD => Access::Deny,
            _ => Access::Allow,
        }
    }

    /// Returns the wire flag.
    pub fn flag(self) -> u8 {
        match self {
            Access::Allow => 1,
            Access::Deny => 0,
        }
    }

    /// Returns true if entry is permitted.
    pub fn is_allowed(self) -> bool {
        self == Access::Allow
    }
}

impl Serialize for Access {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.flag())
    }
}

fn numeric(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}
