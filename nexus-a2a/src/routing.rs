//! Extracting the Nexus target and payload from an outgoing A2A message.

use a2a_client::{A2AError, A2AResult};
use a2a_types::{Message, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dispatcher::Payload;

/// Message metadata key naming the Nexus service.
pub const SERVICE_KEY: &str = "service";
/// Message metadata key naming the operation on that service.
pub const OPERATION_KEY: &str = "operation";

/// How a message is turned into operation input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadMode {
    /// Forward the value of the message's single text or data part.
    #[default]
    Data,
    /// Forward the whole message.
    Message,
}

/// Where one call goes and what it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingDescriptor {
    pub endpoint: String,
    pub service: String,
    pub operation: String,
    pub payload: Payload,
}

impl RoutingDescriptor {
    /// Resolve the call target for `message` on `endpoint`.
    ///
    /// `service` and `operation` must be present in the message metadata as
    /// non-blank strings. Nothing is defaulted.
    pub fn from_message(endpoint: &str, message: &Message, mode: PayloadMode) -> A2AResult<Self> {
        let service = required_metadata(message, SERVICE_KEY)?;
        let operation = required_metadata(message, OPERATION_KEY)?;
        let payload = extract_payload(message, mode)?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            service,
            operation,
            payload,
        })
    }
}

fn required_metadata(message: &Message, key: &str) -> A2AResult<String> {
    let value = message
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.get(key))
        .ok_or_else(|| {
            A2AError::malformed(format!(
                "message {} has no '{key}' metadata",
                message.message_id
            ))
        })?;

    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        Value::String(_) => Err(A2AError::malformed(format!(
            "message {} has blank '{key}' metadata",
            message.message_id
        ))),
        other => Err(A2AError::malformed(format!(
            "'{key}' metadata must be a string, got {other}"
        ))),
    }
}

fn extract_payload(message: &Message, mode: PayloadMode) -> A2AResult<Payload> {
    match mode {
        PayloadMode::Message => Ok(Payload::message(message.clone())),
        PayloadMode::Data => match message.parts.as_slice() {
            [Part::Data { data, .. }] => Ok(Payload::Data(data.clone())),
            [Part::Text { text, .. }] => Ok(Payload::Data(Value::String(text.clone()))),
            [Part::File { .. }] => Err(A2AError::malformed(
                "file parts cannot be forwarded as operation input",
            )),
            [] => Err(A2AError::malformed("message has no parts to forward")),
            parts => Err(A2AError::malformed(format!(
                "expected exactly one part, got {}",
                parts.len()
            ))),
        },
    }
}
