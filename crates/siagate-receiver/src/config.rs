//! Receiver configuration file.
//!
//! JSON, every section optional:
//!
//! ```json
//! {
//!   "server": {
//!     "port": 10025,
//!     "diff": { "negative": -20, "positive": 40 }
//!   },
//!   "dispatcher": [
//!     { "type": "console", "format": "raw" },
//!     { "type": "database", "path": "events.db" }
//!   ]
//! }
//! ```
//!
//! Missing sections fall back to defaults; window bounds with the wrong
//! sign are corrected silently, never rejected.

use serde::Deserialize;
use std::path::Path;

use siagate_core::{Error, Result, ValidationWindow, constants};
use siagate_dispatch::SinkConfig;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,

    /// Sinks to deliver each event to. Empty means replies only.
    #[serde(default)]
    pub dispatcher: Vec<SinkConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "ServerSection::default_port")]
    pub port: u16,

    /// Accept window for the panel clock difference, in seconds.
    #[serde(default, rename = "diff")]
    pub window: ValidationWindow,
}

impl ServerSection {
    fn default_port() -> u16 {
        constants::DEFAULT_PORT
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: constants::DEFAULT_PORT,
            window: ValidationWindow::default(),
        }
    }
}

impl Config {
    /// Load a config file.
    ///
    /// # Errors
    /// Fails when the file cannot be read or is not valid JSON; a missing
    /// section is not an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))
    }
}
