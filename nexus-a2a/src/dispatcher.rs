//! Operation dispatch: starting a named operation on a Nexus endpoint.
//!
//! A dispatcher either hands back the operation's result right away or, when
//! the substrate runs the operation asynchronously, the token that identifies
//! the running operation. [`HandleDispatcher`] derives this decision from any
//! substrate that returns an [`OperationHandle`].

use std::sync::Arc;

use a2a_types::Message;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::errors::DispatchResult;

/// Value crossing the dispatcher boundary, as operation input or result.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A raw structured value.
    Data(Value),
    /// A whole A2A message.
    Message(Box<Message>),
}

impl Payload {
    pub fn data(value: impl Into<Value>) -> Self {
        Self::Data(value.into())
    }

    pub fn message(message: Message) -> Self {
        Self::Message(Box::new(message))
    }

    pub fn as_data(&self) -> Option<&Value> {
        match self {
            Self::Data(value) => Some(value),
            Self::Message(_) => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Self::Message(message) => Some(message),
            Self::Data(_) => None,
        }
    }

    /// The reply an agent sends for this result.
    ///
    /// Message results are returned unchanged; a data result becomes a new
    /// agent message with a single data part.
    pub fn into_reply(self) -> Message {
        match self {
            Self::Message(message) => *message,
            Self::Data(value) => Message::agent_data(value),
        }
    }
}

/// What the substrate reported after starting an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    /// The operation finished during the start call.
    Immediate(Payload),
    /// The operation is still running under this token.
    Pending(String),
}

/// Starts remotely addressable operations.
#[async_trait::async_trait]
pub trait OperationDispatcher: Send + Sync {
    /// Start `service`/`operation` on `endpoint` with `input`.
    ///
    /// Fails with [`DispatchError::Routing`](crate::DispatchError::Routing)
    /// when the target cannot be resolved and with
    /// [`DispatchError::Invocation`](crate::DispatchError::Invocation) when the
    /// substrate rejects the start. Never retries.
    async fn start(
        &self,
        endpoint: &str,
        service: &str,
        operation: &str,
        input: Payload,
    ) -> DispatchResult<OperationOutcome>;
}

#[async_trait::async_trait]
impl<T: OperationDispatcher + ?Sized> OperationDispatcher for Arc<T> {
    async fn start(
        &self,
        endpoint: &str,
        service: &str,
        operation: &str,
        input: Payload,
    ) -> DispatchResult<OperationOutcome> {
        (**self).start(endpoint, service, operation, input).await
    }
}

/// Handle to a started operation: an optional token plus the eventual result.
pub struct OperationHandle {
    token: Option<String>,
    result: BoxFuture<'static, DispatchResult<Payload>>,
}

impl OperationHandle {
    /// A handle for an operation that already has its result.
    pub fn completed(result: DispatchResult<Payload>) -> Self {
        Self {
            token: None,
            result: Box::pin(futures::future::ready(result)),
        }
    }

    /// A handle for an operation still running under `token`.
    pub fn running(
        token: impl Into<String>,
        result: BoxFuture<'static, DispatchResult<Payload>>,
    ) -> Self {
        Self {
            token: Some(token.into()),
            result,
        }
    }

    /// A handle whose result must be awaited but that carries no token.
    pub fn untracked(result: BoxFuture<'static, DispatchResult<Payload>>) -> Self {
        Self {
            token: None,
            result,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn into_parts(
        self,
    ) -> (
        Option<String>,
        BoxFuture<'static, DispatchResult<Payload>>,
    ) {
        (self.token, self.result)
    }

    pub async fn wait(self) -> DispatchResult<Payload> {
        self.result.await
    }
}

impl std::fmt::Debug for OperationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationHandle")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// The substrate side of dispatch: start an operation, get a handle back.
#[async_trait::async_trait]
pub trait OperationStarter: Send + Sync {
    async fn start_operation(
        &self,
        endpoint: &str,
        service: &str,
        operation: &str,
        input: Payload,
    ) -> DispatchResult<OperationHandle>;
}

#[async_trait::async_trait]
impl<T: OperationStarter + ?Sized> OperationStarter for Arc<T> {
    async fn start_operation(
        &self,
        endpoint: &str,
        service: &str,
        operation: &str,
        input: Payload,
    ) -> DispatchResult<OperationHandle> {
        (**self)
            .start_operation(endpoint, service, operation, input)
            .await
    }
}

/// [`OperationDispatcher`] over any [`OperationStarter`].
///
/// A non-empty token means the operation is pending and its result is not
/// awaited. Without a token, or with an empty one, the dispatcher awaits the
/// result before returning.
#[derive(Debug, Clone)]
pub struct HandleDispatcher<S> {
    starter: S,
}

impl<S: OperationStarter> HandleDispatcher<S> {
    pub fn new(starter: S) -> Self {
        Self { starter }
    }
}

#[async_trait::async_trait]
impl<S: OperationStarter> OperationDispatcher for HandleDispatcher<S> {
    async fn start(
        &self,
        endpoint: &str,
        service: &str,
        operation: &str,
        input: Payload,
    ) -> DispatchResult<OperationOutcome> {
        let handle = self
            .starter
            .start_operation(endpoint, service, operation, input)
            .await?;

        let (token, result) = handle.into_parts();
        match token.filter(|token| !token.is_empty()) {
            Some(token) => {
                tracing::debug!(endpoint, service, operation, %token, "operation pending");
                Ok(OperationOutcome::Pending(token))
            }
            None => {
                let payload = result.await?;
                tracing::debug!(endpoint, service, operation, "operation completed inline");
                Ok(OperationOutcome::Immediate(payload))
            }
        }
    }
}
