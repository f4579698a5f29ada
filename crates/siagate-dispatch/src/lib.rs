//! Event dispatch layer for the SIA receiver.
//!
//! Once the protocol path has decoded a message, validated its timestamp
//! and written the ACK or NAK back to the panel, the resulting
//! [`EventRecord`](siagate_protocol::EventRecord) is handed to this crate
//! for delivery. Delivery is strictly after the reply: nothing here can
//! change what the panel received.
//!
//! # Components
//!
//! - [`EventCodeTable`] - immutable lookup from the 2-character event code
//!   to its operator-facing descriptions
//! - [`Sink`] / [`EventSink`] - the closed set of delivery targets
//!   (console in raw or human format, SQLite database)
//! - [`Dispatcher`] - fans each record out to every configured sink,
//!   capturing per-sink failures so one sink cannot affect another
//! - [`Database`] - SQLite pool with automatic migrations, backing the
//!   database sink
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use siagate_dispatch::{Dispatcher, EventCodeTable, SinkConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let codes = Arc::new(EventCodeTable::builtin());
//! let configs: Vec<SinkConfig> = serde_json::from_str(
//!     r#"[{"type": "console", "format": "human"},
//!         {"type": "database", "path": "events.db"}]"#,
//! )?;
//!
//! let dispatcher = Dispatcher::from_configs(&configs, codes).await?;
//! # Ok(())
//! # }
//! ```

pub mod codes;
pub mod db;
pub mod dispatcher;
pub mod error;
pub mod sink;

pub use codes::{EventCodeInfo, EventCodeTable};
pub use db::{Database, DatabaseConfig};
pub use dispatcher::{Dispatcher, Sink};
pub use error::{DispatchError, DispatchResult};
pub use sink::{ConsoleSink, DatabaseSink, EventSink, OutputFormat, SinkConfig};
