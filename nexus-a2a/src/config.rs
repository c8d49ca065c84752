//! Configuration for [`WorkflowNexusTransport`](crate::WorkflowNexusTransport).
//!
//! Configuration can be built in code with the `with_*` setters or loaded
//! from YAML or JSON:
//!
//! ```yaml
//! endpoint: a2a-nexus-endpoint
//! payload_mode: message
//! context_id:
//!   policy: fixed
//!   value: translation-session
//! initial_task_state: working
//! ```

use a2a_types::{Message, TaskState};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::routing::PayloadMode;

/// Context id handed out when no better value is available.
pub const PLACEHOLDER_CONTEXT_ID: &str = "pending";

/// How the `context_id` of a returned task is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ContextIdPolicy {
    /// Always [`PLACEHOLDER_CONTEXT_ID`].
    #[default]
    Placeholder,
    /// Always the given value.
    Fixed { value: String },
    /// The request's own context id, or the placeholder when it has none.
    FromRequest,
    /// A new UUID v4 per task.
    Generated,
}

impl ContextIdPolicy {
    pub fn resolve(&self, request: &Message) -> String {
        match self {
            ContextIdPolicy::Placeholder => PLACEHOLDER_CONTEXT_ID.to_string(),
            ContextIdPolicy::Fixed { value } => value.clone(),
            ContextIdPolicy::FromRequest => request
                .context_id
                .clone()
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_CONTEXT_ID.to_string()),
            ContextIdPolicy::Generated => uuid::Uuid::new_v4().to_string(),
        }
    }
}

fn default_initial_state() -> TaskState {
    TaskState::Working
}

/// Settings for one transport instance, bound to a single Nexus endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Nexus endpoint every call is sent to.
    pub endpoint: String,

    #[serde(default)]
    pub payload_mode: PayloadMode,

    #[serde(default)]
    pub context_id: ContextIdPolicy,

    /// State of tasks returned for pending operations.
    #[serde(default = "default_initial_state")]
    pub initial_task_state: TaskState,
}

impl TransportConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            payload_mode: PayloadMode::default(),
            context_id: ContextIdPolicy::default(),
            initial_task_state: default_initial_state(),
        }
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::validation("endpoint", "cannot be empty"));
        }

        if !matches!(
            self.initial_task_state,
            TaskState::Working | TaskState::Submitted
        ) {
            return Err(ConfigError::validation(
                "initial_task_state",
                format!(
                    "must be 'working' or 'submitted', got '{}'",
                    self.initial_task_state
                ),
            ));
        }

        if let ContextIdPolicy::Fixed { value } = &self.context_id {
            if value.is_empty() {
                return Err(ConfigError::validation(
                    "context_id.value",
                    "fixed context id cannot be empty",
                ));
            }
        }

        Ok(())
    }

    pub fn with_payload_mode(mut self, mode: PayloadMode) -> Self {
        self.payload_mode = mode;
        self
    }

    pub fn with_context_id_policy(mut self, policy: ContextIdPolicy) -> Self {
        self.context_id = policy;
        self
    }

    pub fn with_initial_task_state(mut self, state: TaskState) -> Self {
        self.initial_task_state = state;
        self
    }
}
