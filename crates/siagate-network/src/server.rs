//! TCP receiver loop for alarm panel connections.
//!
//! Each panel connection gets its own tokio task running a
//! `Framed<TcpStream, SiaCodec>` loop:
//!
//! ```text
//! Panel 01 ┐
//!          │
//! Panel 02 ├──> SiaReceiver ──> validate ──> ACK/NAK ──> spawn dispatch
//!          │         │
//! Panel NN ┘         └──> SiaCodec (automatic framing)
//! ```
//!
//! The reply is written before dispatch starts, and dispatch runs in its
//! own task: a slow or failing sink can never delay or change what the
//! panel receives. Closing the connection discards any dispatch still in
//! flight for it.

use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use siagate_core::{SiaTimestamp, ValidationWindow, constants};
use siagate_dispatch::Dispatcher;
use siagate_protocol::{
    DEFAULT_MAX_FRAME_SIZE, EventRecord, MessageTimestamps, ResponseMessage, SiaCodec,
    validate_timestamps,
};

/// Configuration for the TCP receiver.
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    /// Address to bind the listener to.
    pub bind_addr: SocketAddr,

    /// Accept window for the panel/receiver clock difference.
    pub window: ValidationWindow,

    /// Largest unterminated frame tolerated before the connection is
    /// dropped.
    pub max_frame_size: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], constants::DEFAULT_PORT)),
            window: ValidationWindow::default(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

/// Errors that can occur while running the receiver.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to address
    #[error("Failed to bind to {0}")]
    BindFailed(SocketAddr),

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Framing error on a panel connection
    #[error("Protocol error: {0}")]
    Protocol(#[from] siagate_core::Error),
}

/// TCP receiver accepting alarm panel connections.
pub struct SiaReceiver {
    listener: TcpListener,
    config: ReceiverConfig,
}

impl SiaReceiver {
    /// Bind the listener to the configured address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is already in use or binding is
    /// denied.
    pub async fn bind(config: ReceiverConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|_| ServerError::BindFailed(config.bind_addr))?;

        info!("SIA receiver listening on {}", config.bind_addr);

        Ok(Self { listener, config })
    }

    /// The address the listener is actually bound to.
    ///
    /// Useful for tests that bind to port 0 (OS-assigned random port).
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(Into::into)
    }

    /// Accept connections forever, one task per panel.
    pub async fn run(self, dispatcher: Arc<Dispatcher>) -> Result<(), ServerError> {
        loop {
            let (stream, addr) = self.listener.accept().await?;
            debug!("Accepted panel connection from {}", addr);

            if let Err(e) = stream.set_nodelay(true) {
                warn!("Failed to set TCP_NODELAY for {}: {}", addr, e);
            }

            let window = self.config.window;
            let codec = SiaCodec::with_max_frame_size(self.config.max_frame_size);
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, addr, codec, window, dispatcher).await {
                    warn!(peer = %addr, error = %e, "panel connection closed with error");
                }
            });
        }
    }
}

/// Serve one panel connection until it closes.
///
/// Every decoded block gets a reply before its dispatch is spawned; the
/// order on the wire matches the order of inbound blocks.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    codec: SiaCodec,
    window: ValidationWindow,
    dispatcher: Arc<Dispatcher>,
) -> Result<(), ServerError> {
    let mut framed = Framed::new(stream, codec);

    while let Some(next) = framed.next().await {
        let event = next?;

        let receipt = SiaTimestamp::now();
        let timestamps = MessageTimestamps::resolve(event.message.timestamp_raw.as_deref(), receipt);
        let verdict = validate_timestamps(&timestamps, &window);

        debug!(
            peer = %addr,
            account = %event.message.account,
            code = ?event.message.event_code,
            diff_seconds = timestamps.diff_seconds,
            verdict = %verdict,
            "message received"
        );

        let reply = ResponseMessage::for_event(&event.message, verdict, receipt);
        framed.send(reply).await?;

        let record = EventRecord {
            message: event.message,
            timestamps,
            verdict,
            raw: event.payload,
        };
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            dispatcher.dispatch(&record).await;
        });
    }

    debug!("Panel {} disconnected", addr);
    Ok(())
}
