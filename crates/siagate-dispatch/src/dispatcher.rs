//! Fan-out of decoded events to every configured sink.

use std::sync::Arc;
use tracing::{debug, error};

use siagate_protocol::EventRecord;

use crate::codes::EventCodeTable;
use crate::error::DispatchResult;
use crate::sink::{ConsoleSink, DatabaseSink, EventSink, SinkConfig};

/// Closed set of sink variants.
///
/// The [`EventSink`] trait has native async methods and cannot be boxed as
/// a trait object; the sink set is small and fixed, so an enum does the
/// dispatch instead.
pub enum Sink {
    Console(ConsoleSink),
    Database(DatabaseSink),
}

impl Sink {
    /// Build a sink from its config entry.
    pub async fn from_config(
        config: &SinkConfig,
        codes: Arc<EventCodeTable>,
    ) -> DispatchResult<Self> {
        match config {
            SinkConfig::Console { format } => Ok(Sink::Console(ConsoleSink::new(*format, codes))),
            SinkConfig::Database { path } => {
                Ok(Sink::Database(DatabaseSink::open(path, codes).await?))
            }
        }
    }

    async fn deliver(&self, record: &EventRecord) -> DispatchResult<()> {
        match self {
            Sink::Console(sink) => sink.deliver(record).await,
            Sink::Database(sink) => sink.deliver(record).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Sink::Console(_) => "console",
            Sink::Database(_) => "database",
        }
    }

    /// Release the sink's resources. Console sinks hold none.
    async fn close(&self) {
        if let Sink::Database(sink) = self {
            sink.database().close().await;
        }
    }
}

/// Delivers each record to every sink, in order.
///
/// Delivery runs after the wire reply has been sent; a failing or slow sink
/// can never change what the panel received. Per-sink failures are logged
/// and swallowed so one sink cannot starve another.
pub struct Dispatcher {
    sinks: Vec<Sink>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(sinks: Vec<Sink>) -> Self {
        Self { sinks }
    }

    /// Build all sinks from the `dispatcher` config list.
    pub async fn from_configs(
        configs: &[SinkConfig],
        codes: Arc<EventCodeTable>,
    ) -> DispatchResult<Self> {
        let mut sinks = Vec::with_capacity(configs.len());
        for config in configs {
            sinks.push(Sink::from_config(config, Arc::clone(&codes)).await?);
        }
        Ok(Self::new(sinks))
    }

    /// Number of configured sinks.
    #[must_use]
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Close every sink, waiting for database pools to drain.
    ///
    /// Called once on shutdown, after the receiver loop has stopped.
    pub async fn shutdown(&self) {
        for sink in &self.sinks {
            sink.close().await;
        }
    }

    /// Deliver one record to every sink.
    pub async fn dispatch(&self, record: &EventRecord) {
        for sink in &self.sinks {
            if let Err(e) = sink.deliver(record).await {
                error!(
                    sink = sink.name(),
                    account = %record.account_number(),
                    error = %e,
                    "sink delivery failed"
                );
            } else {
                debug!(
                    sink = sink.name(),
                    account = %record.account_number(),
                    code = ?record.message.event_code,
                    "event delivered"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::sink::OutputFormat;
    use siagate_core::{SiaTimestamp, Verdict};
    use siagate_protocol::{MessageParser, MessageTimestamps};

    fn sample_record() -> EventRecord {
        let payload = "\"SIA-DCS\"0123R0L0#1234[#1234|Nri1/BA05]_12:46:06,05-10-2025";
        let message = MessageParser::parse(payload);
        let receipt = SiaTimestamp::now();
        let timestamps = MessageTimestamps::resolve(message.timestamp_raw.as_deref(), receipt);
        EventRecord {
            message,
            timestamps,
            verdict: Verdict::Accept,
            raw: payload.to_string(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_fans_out_to_all_sinks() {
        let codes = Arc::new(EventCodeTable::builtin());
        let db = Database::in_memory().await.unwrap();
        let pool = db.pool().clone();
        let dispatcher = Dispatcher::new(vec![
            Sink::Console(ConsoleSink::new(OutputFormat::Raw, Arc::clone(&codes))),
            Sink::Database(DatabaseSink::new(db, codes)),
        ]);

        dispatcher.dispatch(&sample_record()).await;
        dispatcher.dispatch(&sample_record()).await;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sia_events")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_stop_later_sinks() {
        let codes = Arc::new(EventCodeTable::builtin());
        let db = Database::in_memory().await.unwrap();
        let broken_pool = db.pool().clone();
        let broken = DatabaseSink::new(db, Arc::clone(&codes));
        // Drop the events table so the first sink fails on every insert.
        sqlx::query("DROP TABLE sia_events")
            .execute(&broken_pool)
            .await
            .unwrap();

        let working_db = Database::in_memory().await.unwrap();
        let working_pool = working_db.pool().clone();
        let dispatcher = Dispatcher::new(vec![
            Sink::Database(broken),
            Sink::Database(DatabaseSink::new(working_db, codes)),
        ]);

        dispatcher.dispatch(&sample_record()).await;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sia_events")
            .fetch_one(&working_pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_shutdown_closes_database_pool() {
        let codes = Arc::new(EventCodeTable::builtin());
        let db = Database::in_memory().await.unwrap();
        let pool = db.pool().clone();
        let dispatcher = Dispatcher::new(vec![
            Sink::Console(ConsoleSink::new(OutputFormat::Raw, Arc::clone(&codes))),
            Sink::Database(DatabaseSink::new(db, codes)),
        ]);

        dispatcher.dispatch(&sample_record()).await;
        dispatcher.shutdown().await;

        assert!(pool.is_closed());
    }

    #[tokio::test]
    async fn test_from_configs_builds_console() {
        let codes = Arc::new(EventCodeTable::builtin());
        let configs = vec![SinkConfig::Console {
            format: OutputFormat::Human,
        }];

        let dispatcher = Dispatcher::from_configs(&configs, codes).await.unwrap();
        assert_eq!(dispatcher.sink_count(), 1);
    }
}
