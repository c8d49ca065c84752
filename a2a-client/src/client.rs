//! Client facade over a [`ClientTransport`].
//!
//! The client does not pick transports by name at runtime. Callers build the
//! transport they want explicitly, or let [`Client::from_card`] find which of
//! their supported transports an agent card offers and where.

use crate::error::{A2AError, A2AResult};
use crate::transport::{ClientTransport, EventStream};
use a2a_types::{
    AgentCard, GetTaskPushNotificationConfigParams, Message, MessageSendConfiguration,
    MessageSendParams, SendMessageResult, Task, TaskIdParams, TaskPushNotificationConfig,
    TaskQueryParams, TransportProtocol,
};
use std::sync::Arc;

/// Client-side preferences used when connecting to an agent.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Transports this client can speak, in order of preference.
    pub supported_transports: Vec<TransportProtocol>,
    /// Applied to every message sent through [`Client::send_message`].
    pub send_configuration: Option<MessageSendConfiguration>,
}

impl ClientConfig {
    pub fn new(supported_transports: Vec<TransportProtocol>) -> Self {
        Self {
            supported_transports,
            send_configuration: None,
        }
    }

    pub fn with_send_configuration(mut self, configuration: MessageSendConfiguration) -> Self {
        self.send_configuration = Some(configuration);
        self
    }

    /// First supported transport the card offers, with the URL serving it.
    pub fn select_transport(&self, card: &AgentCard) -> A2AResult<(TransportProtocol, String)> {
        self.supported_transports
            .iter()
            .find_map(|transport| {
                card.interface_url(transport)
                    .map(|url| (transport.clone(), url.to_string()))
            })
            .ok_or_else(|| A2AError::InvalidParameter {
                message: format!(
                    "Agent card '{}' offers none of the supported transports [{}]",
                    card.name,
                    self.supported_transports
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
    }
}

/// A2A client bound to one transport.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn ClientTransport>,
    config: ClientConfig,
}

impl Client {
    pub fn new(transport: Arc<dyn ClientTransport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Build a client for an agent card.
    ///
    /// `connect` receives the first supported transport the card offers and
    /// the URL serving it, and constructs the transport.
    pub fn from_card<F>(card: &AgentCard, config: ClientConfig, connect: F) -> A2AResult<Self>
    where
        F: FnOnce(TransportProtocol, String) -> A2AResult<Arc<dyn ClientTransport>>,
    {
        let (protocol, url) = config.select_transport(card)?;
        tracing::debug!(%protocol, %url, agent = %card.name, "selected transport");
        let transport = connect(protocol, url)?;
        Ok(Self::new(transport, config))
    }

    pub fn transport(&self) -> &Arc<dyn ClientTransport> {
        &self.transport
    }

    /// Send a message; the result is either a reply or a task handle, never both.
    #[tracing::instrument(
        name = "a2a_client.send_message",
        skip_all,
        fields(message_id = %message.message_id)
    )]
    pub async fn send_message(&self, message: Message) -> A2AResult<SendMessageResult> {
        let params = MessageSendParams {
            message,
            configuration: self.config.send_configuration.clone(),
            metadata: None,
        };
        self.transport.send_message(params).await
    }

    pub async fn send_message_streaming(&self, message: Message) -> A2AResult<EventStream> {
        let params = MessageSendParams {
            message,
            configuration: self.config.send_configuration.clone(),
            metadata: None,
        };
        self.transport.send_message_streaming(params).await
    }

    pub async fn get_task(&self, params: TaskQueryParams) -> A2AResult<Task> {
        self.transport.get_task(params).await
    }

    pub async fn cancel_task(&self, params: TaskIdParams) -> A2AResult<Task> {
        self.transport.cancel_task(params).await
    }

    pub async fn set_task_callback(
        &self,
        params: TaskPushNotificationConfig,
    ) -> A2AResult<TaskPushNotificationConfig> {
        self.transport.set_task_callback(params).await
    }

    pub async fn get_task_callback(
        &self,
        params: GetTaskPushNotificationConfigParams,
    ) -> A2AResult<TaskPushNotificationConfig> {
        self.transport.get_task_callback(params).await
    }

    pub async fn resubscribe(&self, params: TaskIdParams) -> A2AResult<EventStream> {
        self.transport.resubscribe(params).await
    }

    pub async fn get_card(&self) -> A2AResult<AgentCard> {
        self.transport.get_card().await
    }

    pub async fn close(&self) -> A2AResult<()> {
        self.transport.close().await
    }
}
