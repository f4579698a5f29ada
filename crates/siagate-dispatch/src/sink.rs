#![allow(async_fn_in_trait)]

//! Delivery sinks for decoded events.
//!
//! A sink receives every [`EventRecord`] after the wire reply has already
//! been sent; nothing a sink does can change what the panel saw. Sinks are
//! a small closed set, so the dispatcher holds them as enum variants
//! instead of trait objects (the trait uses native async methods and is not
//! dyn-compatible).

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use siagate_protocol::EventRecord;

use crate::codes::EventCodeTable;
use crate::db::{Database, DatabaseConfig};
use crate::error::DispatchResult;

/// How the console sink renders a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per line, the full record.
    #[default]
    Raw,

    /// One human-readable line per event, enriched from the code table.
    Human,
}

/// Sink configuration as it appears in the config file's `dispatcher` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkConfig {
    Console {
        #[serde(default)]
        format: OutputFormat,
    },
    Database {
        path: String,
    },
}

/// Contract every sink variant implements.
///
/// Uses native async trait methods (Edition 2024 feature); the dispatcher
/// dispatches over a closed enum, not trait objects.
pub trait EventSink: Send + Sync {
    /// Deliver one record. Errors are captured by the dispatcher, logged,
    /// and never reach the protocol path.
    async fn deliver(&self, record: &EventRecord) -> DispatchResult<()>;
}

/// Writes each record to standard output.
pub struct ConsoleSink {
    format: OutputFormat,
    codes: Arc<EventCodeTable>,
}

impl ConsoleSink {
    pub fn new(format: OutputFormat, codes: Arc<EventCodeTable>) -> Self {
        Self { format, codes }
    }

    fn human_line(&self, record: &EventRecord) -> String {
        let msg = &record.message;
        let code = msg.event_code.as_deref().unwrap_or("--");
        let info = self.codes.lookup(code);
        let description = info.map_or("Unknown event", |i| i.short_description.as_str());
        let address = match (info, msg.event_address.as_deref()) {
            (Some(i), Some(addr)) => format!(" [{} {addr}]", i.address_type),
            (None, Some(addr)) => format!(" [{addr}]"),
            _ => String::new(),
        };
        format!(
            "{} account {} {} {code} {description}{address} -> {}",
            record.timestamps.receipt.format(),
            record.account_number(),
            msg.message_type,
            record.verdict,
        )
    }
}

impl EventSink for ConsoleSink {
    async fn deliver(&self, record: &EventRecord) -> DispatchResult<()> {
        match self.format {
            OutputFormat::Raw => println!("{}", serde_json::to_string(record)?),
            OutputFormat::Human => println!("{}", self.human_line(record)),
        }
        Ok(())
    }
}

/// Inserts each record into the `sia_events` table.
pub struct DatabaseSink {
    db: Database,
    codes: Arc<EventCodeTable>,
}

impl DatabaseSink {
    pub fn new(db: Database, codes: Arc<EventCodeTable>) -> Self {
        Self { db, codes }
    }

    /// Open (and migrate) the database at `path` and build the sink.
    pub async fn open(path: &str, codes: Arc<EventCodeTable>) -> DispatchResult<Self> {
        let db = Database::new(DatabaseConfig::new(path)).await?;
        Ok(Self::new(db, codes))
    }

    /// The wrapped pool handle, for tests and maintenance queries.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl EventSink for DatabaseSink {
    async fn deliver(&self, record: &EventRecord) -> DispatchResult<()> {
        let msg = &record.message;
        let info = msg.event_code.as_deref().and_then(|c| self.codes.lookup(c));

        sqlx::query(
            r#"
            INSERT INTO sia_events (
                account, message_type, sequence, receiver, prefix,
                code, short_description, long_description, address_type,
                address, accepted, panel_time, received_time, raw
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.account_number())
        .bind(&msg.message_type)
        .bind(&msg.sequence)
        .bind(&msg.receiver)
        .bind(&msg.prefix)
        .bind(&msg.event_code)
        .bind(info.map(|i| i.short_description.as_str()))
        .bind(info.map(|i| i.long_description.as_str()))
        .bind(info.map(|i| i.address_type.as_str()))
        .bind(&msg.event_address)
        .bind(record.verdict.is_accept())
        .bind(*record.timestamps.panel.inner())
        .bind(*record.timestamps.receipt.inner())
        .bind(&record.raw)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siagate_core::{SiaTimestamp, Verdict};
    use siagate_protocol::{MessageParser, MessageTimestamps};

    fn sample_record(payload: &str, verdict: Verdict) -> EventRecord {
        let message = MessageParser::parse(payload);
        let receipt = SiaTimestamp::now();
        let timestamps = MessageTimestamps::resolve(message.timestamp_raw.as_deref(), receipt);
        EventRecord {
            message,
            timestamps,
            verdict,
            raw: payload.to_string(),
        }
    }

    fn codes() -> Arc<EventCodeTable> {
        Arc::new(EventCodeTable::builtin())
    }

    #[tokio::test]
    async fn test_database_sink_inserts_row() {
        let db = Database::in_memory().await.unwrap();
        let sink = DatabaseSink::new(db, codes());
        let record = sample_record(
            "\"SIA-DCS\"0123R0L0#1234[#1234|Nri1/BA05]_12:46:06,05-10-2025",
            Verdict::Accept,
        );

        sink.deliver(&record).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sia_events")
            .fetch_one(sink.database().pool())
            .await
            .unwrap();
        assert_eq!(count, 1);

        let (account, code, short, accepted): (String, Option<String>, Option<String>, bool) =
            sqlx::query_as(
                "SELECT account, code, short_description, accepted FROM sia_events",
            )
            .fetch_one(sink.database().pool())
            .await
            .unwrap();
        assert_eq!(account, "1234");
        assert_eq!(code.as_deref(), Some("BA"));
        assert_eq!(short.as_deref(), Some("Burglary Alarm"));
        assert!(accepted);
    }

    #[tokio::test]
    async fn test_database_sink_stores_rejected_without_code() {
        let db = Database::in_memory().await.unwrap();
        let sink = DatabaseSink::new(db, codes());
        let record = sample_record("\"NULL\"0000L0#77[]", Verdict::Reject);

        sink.deliver(&record).await.unwrap();

        let (code, accepted): (Option<String>, bool) =
            sqlx::query_as("SELECT code, accepted FROM sia_events")
                .fetch_one(sink.database().pool())
                .await
                .unwrap();
        assert_eq!(code, None);
        assert!(!accepted);
    }

    #[tokio::test]
    async fn test_console_sink_raw_delivers() {
        let sink = ConsoleSink::new(OutputFormat::Raw, codes());
        let record = sample_record("\"SIA-DCS\"0001L0#1[BA05]", Verdict::Accept);
        sink.deliver(&record).await.unwrap();
    }

    #[test]
    fn test_human_line_enriched_from_table() {
        let sink = ConsoleSink::new(OutputFormat::Human, codes());
        let record = sample_record(
            "\"SIA-DCS\"0123R0L0#1234[#1234|Nri1/BA05]_12:46:06,05-10-2025",
            Verdict::Accept,
        );

        let line = sink.human_line(&record);
        assert!(line.contains("account 1234"));
        assert!(line.contains("BA Burglary Alarm"));
        assert!(line.contains("[zone 05]"));
        assert!(line.contains("ACK"));
    }

    #[test]
    fn test_human_line_unknown_code() {
        let sink = ConsoleSink::new(OutputFormat::Human, codes());
        let record = sample_record("\"SIA-DCS\"0001L0#1[ZZ99]", Verdict::Accept);

        let line = sink.human_line(&record);
        assert!(line.contains("ZZ Unknown event"));
    }

    #[test]
    fn test_sink_config_parses_tagged_json() {
        let configs: Vec<SinkConfig> = serde_json::from_str(
            r#"[{"type": "console", "format": "human"},
                {"type": "database", "path": "events.db"}]"#,
        )
        .unwrap();

        assert!(matches!(
            configs[0],
            SinkConfig::Console { format: OutputFormat::Human }
        ));
        assert!(matches!(&configs[1], SinkConfig::Database { path } if path == "events.db"));
    }

    #[test]
    fn test_sink_config_console_defaults_to_raw() {
        let config: SinkConfig = serde_json::from_str(r#"{"type": "console"}"#).unwrap();
        assert!(matches!(
            config,
            SinkConfig::Console { format: OutputFormat::Raw }
        ));
    }
}
