//! # nexus-a2a
//!
//! An A2A client transport that delivers messages as Nexus operations started
//! from inside durable workflows.
//!
//! A message names its target in metadata (`service` and `operation`). The
//! transport starts that operation on its configured endpoint through an
//! [`OperationDispatcher`]. If the operation finishes during the start call,
//! the caller gets an agent [`Message`](a2a_types::Message) back. If it is
//! still running, the caller gets a [`Task`](a2a_types::Task) whose id is the
//! operation token.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use a2a_client::{Client, ClientConfig};
//! use a2a_types::{Message, TransportProtocol};
//! use nexus_a2a::{InMemorySubstrate, TransportConfig, WorkflowNexusTransport};
//!
//! # async fn run() -> a2a_client::A2AResult<()> {
//! let substrate = Arc::new(InMemorySubstrate::new());
//! let transport = WorkflowNexusTransport::new(
//!     TransportConfig::new("a2a-nexus-endpoint"),
//!     Arc::new(substrate.dispatcher()),
//! )?;
//! let client = Client::new(
//!     Arc::new(transport),
//!     ClientConfig::new(vec![TransportProtocol::WorkflowNexus]),
//! );
//!
//! let reply = client
//!     .send_message(
//!         Message::user_data(serde_json::json!({"name": "World"}))
//!             .with_metadata_entry("service", "test-service")
//!             .with_metadata_entry("operation", "greet"),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod logging;
pub mod routing;
pub mod substrate;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{ContextIdPolicy, TransportConfig, PLACEHOLDER_CONTEXT_ID};
pub use dispatcher::{
    HandleDispatcher, OperationDispatcher, OperationHandle, OperationOutcome, OperationStarter,
    Payload,
};
pub use errors::{ConfigError, DispatchError, DispatchResult, LoggingError};
pub use routing::{PayloadMode, RoutingDescriptor, OPERATION_KEY, SERVICE_KEY};
pub use substrate::{
    HandlerResult, InMemorySubstrate, ServiceDefinition, DEFAULT_RUN_RETENTION,
};
pub use transport::{
    WorkflowNexusTransport, TASK_ENDPOINT_KEY, TASK_OPERATION_KEY, TASK_SERVICE_KEY,
    TRANSPORT_NAME,
};
