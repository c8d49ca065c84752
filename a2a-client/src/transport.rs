//! The transport contract every A2A client transport implements.

use crate::error::A2AResult;
use a2a_types::{
    AgentCard, GetTaskPushNotificationConfigParams, MessageSendParams, SendMessageResult,
    SendStreamingMessageResult, Task, TaskIdParams, TaskPushNotificationConfig, TaskQueryParams,
};
use futures_core::Stream;
use std::pin::Pin;

/// Stream of events produced by `message/stream` and `tasks/resubscribe`.
pub type EventStream = Pin<Box<dyn Stream<Item = A2AResult<SendStreamingMessageResult>> + Send>>;

/// A way of delivering A2A calls to an agent.
///
/// Methods a transport cannot serve must fail with
/// [`A2AError::UnsupportedOperation`](crate::A2AError::UnsupportedOperation)
/// rather than succeed silently.
#[async_trait::async_trait]
pub trait ClientTransport: Send + Sync {
    /// Send a non-streaming message; the agent answers with a reply or a task.
    async fn send_message(&self, params: MessageSendParams) -> A2AResult<SendMessageResult>;

    /// Send a message and receive responses as they arrive.
    async fn send_message_streaming(&self, params: MessageSendParams) -> A2AResult<EventStream>;

    /// Current state of a task.
    async fn get_task(&self, params: TaskQueryParams) -> A2AResult<Task>;

    async fn cancel_task(&self, params: TaskIdParams) -> A2AResult<Task>;

    /// Set or update the push notification configuration of a task.
    async fn set_task_callback(
        &self,
        params: TaskPushNotificationConfig,
    ) -> A2AResult<TaskPushNotificationConfig>;

    async fn get_task_callback(
        &self,
        params: GetTaskPushNotificationConfigParams,
    ) -> A2AResult<TaskPushNotificationConfig>;

    /// Reconnect to the event stream of a running task.
    async fn resubscribe(&self, params: TaskIdParams) -> A2AResult<EventStream>;

    async fn get_card(&self) -> A2AResult<AgentCard>;

    async fn close(&self) -> A2AResult<()>;
}
