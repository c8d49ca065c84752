//! A2A client transport that sends messages as Nexus operations.

use std::sync::Arc;

use a2a_client::{A2AError, A2AResult, ClientTransport, EventStream};
use a2a_types::{
    AgentCard, GetTaskPushNotificationConfigParams, Message, MessageSendParams, Metadata,
    SendMessageResult, Task, TaskIdParams, TaskPushNotificationConfig, TaskQueryParams,
    TransportProtocol,
};
use tracing::Span;

use crate::config::TransportConfig;
use crate::dispatcher::{OperationDispatcher, OperationOutcome};
use crate::routing::RoutingDescriptor;

/// Name this transport is advertised under in agent cards.
pub const TRANSPORT_NAME: &str = a2a_types::WORKFLOW_NEXUS_TRANSPORT;

/// Task metadata key holding the Nexus endpoint of a pending operation.
pub const TASK_ENDPOINT_KEY: &str = "nexus.endpoint";
/// Task metadata key holding the service of a pending operation.
pub const TASK_SERVICE_KEY: &str = "nexus.service";
/// Task metadata key holding the operation name of a pending operation.
pub const TASK_OPERATION_KEY: &str = "nexus.operation";

/// Sends each message as one Nexus operation on a fixed endpoint.
///
/// The message metadata names the service and operation. Operations that
/// finish while being started come back as an agent [`Message`]; operations
/// still running come back as a [`Task`] whose id is the operation token.
///
/// Only `send_message` is served. Every other method fails with
/// [`A2AError::UnsupportedOperation`].
#[derive(Clone)]
pub struct WorkflowNexusTransport {
    config: TransportConfig,
    dispatcher: Arc<dyn OperationDispatcher>,
}

impl std::fmt::Debug for WorkflowNexusTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowNexusTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl WorkflowNexusTransport {
    pub fn new(
        config: TransportConfig,
        dispatcher: Arc<dyn OperationDispatcher>,
    ) -> A2AResult<Self> {
        config.validate()?;
        Ok(Self { config, dispatcher })
    }

    /// Build a transport for the Workflow Nexus interface an agent card advertises.
    ///
    /// The interface URL is the endpoint name and replaces `config.endpoint`.
    pub fn from_card(
        card: &AgentCard,
        config: TransportConfig,
        dispatcher: Arc<dyn OperationDispatcher>,
    ) -> A2AResult<Self> {
        let endpoint = card
            .interface_url(&TransportProtocol::WorkflowNexus)
            .ok_or_else(|| A2AError::InvalidParameter {
                message: format!(
                    "Agent card '{}' has no {} interface",
                    card.name,
                    TransportProtocol::WorkflowNexus
                ),
            })?;

        let config = TransportConfig {
            endpoint: endpoint.to_string(),
            ..config
        };
        Self::new(config, dispatcher)
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn pending_task(&self, token: String, request: &Message, route: &RoutingDescriptor) -> Task {
        let metadata: Metadata = [
            (TASK_ENDPOINT_KEY, &route.endpoint),
            (TASK_SERVICE_KEY, &route.service),
            (TASK_OPERATION_KEY, &route.operation),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), serde_json::Value::String(value.clone())))
        .collect();

        Task::new(
            token,
            self.config.context_id.resolve(request),
            self.config.initial_task_state,
        )
        .with_metadata(metadata)
    }
}

#[async_trait::async_trait]
impl ClientTransport for WorkflowNexusTransport {
    #[tracing::instrument(
        name = "nexus_a2a.send_message",
        skip_all,
        fields(
            nexus.endpoint = %self.config.endpoint,
            nexus.service = tracing::field::Empty,
            nexus.operation = tracing::field::Empty,
            nexus.outcome = tracing::field::Empty,
        )
    )]
    async fn send_message(&self, params: MessageSendParams) -> A2AResult<SendMessageResult> {
        let request = params.message;
        let route = RoutingDescriptor::from_message(
            &self.config.endpoint,
            &request,
            self.config.payload_mode,
        )?;

        let span = Span::current();
        span.record("nexus.service", route.service.as_str());
        span.record("nexus.operation", route.operation.as_str());

        let outcome = self
            .dispatcher
            .start(
                &route.endpoint,
                &route.service,
                &route.operation,
                route.payload.clone(),
            )
            .await
            .inspect_err(|error| tracing::debug!(%error, "dispatch failed"))?;

        match outcome {
            OperationOutcome::Pending(token) if token.trim().is_empty() => {
                span.record("nexus.outcome", "invalid");
                Err(A2AError::Invocation {
                    message: format!(
                        "{}/{} reported a pending operation without a token",
                        route.service, route.operation
                    ),
                })
            }
            OperationOutcome::Pending(token) => {
                span.record("nexus.outcome", "pending");
                tracing::debug!(%token, "operation still running, returning task");
                Ok(SendMessageResult::Task(
                    self.pending_task(token, &request, &route),
                ))
            }
            OperationOutcome::Immediate(result) => {
                span.record("nexus.outcome", "immediate");
                Ok(SendMessageResult::Message(result.into_reply()))
            }
        }
    }

    async fn send_message_streaming(&self, _params: MessageSendParams) -> A2AResult<EventStream> {
        Err(A2AError::unsupported("send_message_streaming"))
    }

    async fn get_task(&self, _params: TaskQueryParams) -> A2AResult<Task> {
        Err(A2AError::unsupported("get_task"))
    }

    async fn cancel_task(&self, _params: TaskIdParams) -> A2AResult<Task> {
        Err(A2AError::unsupported("cancel_task"))
    }

    async fn set_task_callback(
        &self,
        _params: TaskPushNotificationConfig,
    ) -> A2AResult<TaskPushNotificationConfig> {
        Err(A2AError::unsupported("set_task_callback"))
    }

    async fn get_task_callback(
        &self,
        _params: GetTaskPushNotificationConfigParams,
    ) -> A2AResult<TaskPushNotificationConfig> {
        Err(A2AError::unsupported("get_task_callback"))
    }

    async fn resubscribe(&self, _params: TaskIdParams) -> A2AResult<EventStream> {
        Err(A2AError::unsupported("resubscribe"))
    }

    async fn get_card(&self) -> A2AResult<AgentCard> {
        Err(A2AError::unsupported("get_card"))
    }

    async fn close(&self) -> A2AResult<()> {
        Err(A2AError::unsupported("close"))
    }
}
