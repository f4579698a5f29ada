//! Network layer for the SIA receiver.
//!
//! Provides the TCP accept loop and the per-connection message cycle:
//! decode, validate, reply, then hand off to the dispatcher.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use siagate_dispatch::Dispatcher;
//! use siagate_network::{ReceiverConfig, SiaReceiver};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ReceiverConfig {
//!     bind_addr: "0.0.0.0:10025".parse()?,
//!     ..Default::default()
//! };
//!
//! let receiver = SiaReceiver::bind(config).await?;
//! receiver.run(Arc::new(Dispatcher::new(vec![]))).await?;
//! # Ok(())
//! # }
//! ```

mod server;

pub use server::{ReceiverConfig, ServerError, SiaReceiver};
