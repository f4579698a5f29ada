//! Immutable event-code lookup table.
//!
//! Maps a 2-character SIA event code to its human descriptions and the
//! meaning of the event address (zone, user, area). The table is built once
//! at startup and only the dispatch boundary consults it; the codec hands
//! over raw codes untouched.
//!
//! The built-in table covers the common contact-ID-era SIA codes. Operators
//! with panel-specific codes can replace it with a JSON file of the same
//! shape via [`EventCodeTable::from_path`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{DispatchError, DispatchResult};

/// Descriptions attached to one event code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCodeInfo {
    /// The 2-character code itself.
    pub code: String,

    /// Short human label, e.g. "Burglary Alarm".
    pub short_description: String,

    /// Longer operator-facing description.
    pub long_description: String,

    /// What the event address identifies for this code (zone, user, area).
    pub address_type: String,
}

/// Built-in code list: (code, short, long, address type).
const BUILTIN_CODES: &[(&str, &str, &str, &str)] = &[
    ("BA", "Burglary Alarm", "Burglary zone has been violated while armed", "zone"),
    ("BB", "Burglary Bypass", "Burglary zone has been bypassed", "zone"),
    ("BC", "Burglary Cancel", "Alarm has been cancelled by an authorized user", "user"),
    ("BR", "Burglary Restore", "Burglary zone has been restored to normal", "zone"),
    ("CA", "Automatic Closing", "System armed automatically", "area"),
    ("CF", "Forced Closing", "System armed with zones in fault", "user"),
    ("CL", "Closing Report", "System armed by a user", "user"),
    ("FA", "Fire Alarm", "Fire zone has been violated", "zone"),
    ("FR", "Fire Restore", "Fire zone has been restored to normal", "zone"),
    ("GA", "Gas Alarm", "Gas detection zone has been violated", "zone"),
    ("HA", "Holdup Alarm", "Holdup or duress condition reported", "user"),
    ("KA", "Heat Alarm", "High temperature zone has been violated", "zone"),
    ("MA", "Medical Alarm", "Medical assistance requested", "zone"),
    ("OA", "Automatic Opening", "System disarmed automatically", "area"),
    ("OP", "Opening Report", "System disarmed by a user", "user"),
    ("PA", "Panic Alarm", "Panic condition reported", "zone"),
    ("RP", "Automatic Test", "Periodic automatic test report", "area"),
    ("RX", "Manual Test", "Test report initiated manually", "user"),
    ("TA", "Tamper Alarm", "Panel or device enclosure opened", "zone"),
    ("TR", "Tamper Restore", "Tamper condition has been restored", "zone"),
    ("WA", "Water Alarm", "Water detection zone has been violated", "zone"),
    ("YR", "Battery Restore", "System battery has been restored", "area"),
    ("YT", "Battery Trouble", "System battery is missing or low", "area"),
];

/// Immutable mapping from event code to its descriptions.
#[derive(Debug, Clone)]
pub struct EventCodeTable {
    codes: HashMap<String, EventCodeInfo>,
}

impl EventCodeTable {
    /// Build the built-in table.
    #[must_use]
    pub fn builtin() -> Self {
        let codes = BUILTIN_CODES
            .iter()
            .map(|&(code, short, long, address)| {
                (
                    code.to_string(),
                    EventCodeInfo {
                        code: code.to_string(),
                        short_description: short.to_string(),
                        long_description: long.to_string(),
                        address_type: address.to_string(),
                    },
                )
            })
            .collect();
        EventCodeTable { codes }
    }

    /// Load a table from a JSON file: an array of [`EventCodeInfo`] objects.
    ///
    /// # Errors
    /// Returns `DispatchError::CodeTable` when the file cannot be read or
    /// does not parse.
    pub fn from_path(path: impl AsRef<Path>) -> DispatchResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DispatchError::CodeTable(format!("cannot read {}: {e}", path.display()))
        })?;
        let entries: Vec<EventCodeInfo> = serde_json::from_str(&raw).map_err(|e| {
            DispatchError::CodeTable(format!("cannot parse {}: {e}", path.display()))
        })?;
        let codes = entries
            .into_iter()
            .map(|info| (info.code.clone(), info))
            .collect();
        Ok(EventCodeTable { codes })
    }

    /// Look up a code; `None` for codes the table does not know.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<&EventCodeInfo> {
        self.codes.get(code)
    }

    /// Number of codes in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns `true` if the table holds no codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
