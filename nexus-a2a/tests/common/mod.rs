//! Shared services and helpers for the integration suites.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use a2a_types::{Message, MessageSendParams, Part};
use nexus_a2a::{Payload, ServiceDefinition, OPERATION_KEY, SERVICE_KEY};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

pub const ENDPOINT: &str = "a2a-nexus-endpoint";
pub const SERVICE: &str = "test-service";

#[derive(Debug, Deserialize)]
struct GreetInput {
    name: String,
}

#[derive(Debug, Serialize)]
struct GreetOutput {
    message: String,
}

/// Stands in for the language-model activity: records prompts, answers with
/// a canned completion.
#[derive(Clone, Default)]
pub struct RecordingLlm {
    prompts: Arc<Mutex<Vec<String>>>,
}

impl RecordingLlm {
    pub fn complete(&self, prompt: String) -> String {
        self.prompts.lock().unwrap().push(prompt);
        "Bonjour !".to_string()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

/// `greet` answers inline; `translate` runs as a background workflow that
/// waits for `release` before asking the model.
pub fn test_service(llm: RecordingLlm, release: Arc<Notify>) -> ServiceDefinition {
    ServiceDefinition::new(SERVICE)
        .sync_operation("greet", |input: Payload| async move {
            let data = input.as_data().cloned().ok_or_else(|| "greet expects data".to_string())?;
            let input: GreetInput = serde_json::from_value(data).map_err(|e| e.to_string())?;
            let output = GreetOutput {
                message: format!("Hello, {}", input.name),
            };
            serde_json::to_value(output)
                .map(Payload::Data)
                .map_err(|e| e.to_string())
        })
        .workflow_run_operation("translate", move |input: Payload| {
            let text = input
                .as_message()
                .and_then(|message| message.parts.iter().find_map(Part::as_text))
                .map(str::to_string)
                .ok_or_else(|| "translate expects a message with text".to_string())?;
            let llm = llm.clone();
            let release = release.clone();
            Ok(async move {
                release.notified().await;
                let translated =
                    llm.complete(format!("Translate the following text to French: {text}"));
                Ok::<_, String>(Payload::message(Message::agent_text(translated)))
            })
        })
}

pub fn routed(message: Message, operation: &str) -> MessageSendParams {
    MessageSendParams::new(
        message
            .with_metadata_entry(SERVICE_KEY, SERVICE)
            .with_metadata_entry(OPERATION_KEY, operation),
    )
}
