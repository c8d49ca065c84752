//! # A2A Protocol Client
//!
//! Client side of the Agent-to-Agent protocol, independent of how calls
//! travel. A [`ClientTransport`] carries the calls; a [`Client`] is the
//! facade applications use.
//!
//! ## Example
//!
//! ```rust,no_run
//! use a2a_client::{A2AResult, Client, ClientConfig, ClientTransport};
//! use a2a_types::{Message, TransportProtocol};
//! use std::sync::Arc;
//!
//! # async fn example(transport: Arc<dyn ClientTransport>) -> A2AResult<()> {
//! let client = Client::new(
//!     transport,
//!     ClientConfig::new(vec![TransportProtocol::WorkflowNexus]),
//! );
//!
//! let message = Message::user_text("Hello!")
//!     .with_metadata_entry("service", "test-service")
//!     .with_metadata_entry("operation", "translate");
//!
//! let result = client.send_message(message).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod transport;

pub use client::{Client, ClientConfig};
pub use error::{A2AError, A2AResult};
pub use transport::{ClientTransport, EventStream};
