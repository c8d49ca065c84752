use serde::{Deserialize, Serialize};

/// Wire name of [`TransportProtocol::WorkflowNexus`].
pub const WORKFLOW_NEXUS_TRANSPORT: &str = "temporal-workflow-nexus-transport";

// ============================================================================
// Agent Card and Discovery Types
// ============================================================================

/// Transports a client can use to reach an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TransportProtocol {
    /// JSON-RPC 2.0 over HTTP
    #[serde(rename = "JSONRPC")]
    #[default]
    JsonRpc,
    /// gRPC over HTTP/2
    #[serde(rename = "GRPC")]
    Grpc,
    /// REST-style HTTP with JSON
    #[serde(rename = "HTTP+JSON")]
    HttpJson,
    /// Nexus operations started from inside a durable workflow.
    ///
    /// The interface URL is the name of the Nexus endpoint, not a network address.
    #[serde(rename = "temporal-workflow-nexus-transport")]
    WorkflowNexus,
}

impl std::fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransportProtocol::JsonRpc => "JSONRPC",
            TransportProtocol::Grpc => "GRPC",
            TransportProtocol::HttpJson => "HTTP+JSON",
            TransportProtocol::WorkflowNexus => WORKFLOW_NEXUS_TRANSPORT,
        };
        f.write_str(name)
    }
}

/// A URL paired with the transport that serves it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentInterface {
    pub transport: TransportProtocol,
    pub url: String,
}

/// Optional capabilities an agent advertises.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AgentCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaming: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "pushNotifications")]
    pub push_notifications: Option<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        rename = "stateTransitionHistory"
    )]
    pub state_transition_history: Option<bool>,
}

/// A distinct capability the agent can perform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub examples: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", rename = "inputModes", default)]
    pub input_modes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", rename = "outputModes", default)]
    pub output_modes: Vec<String>,
}

/// The organization behind an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentProvider {
    pub organization: String,
    pub url: String,
}

/// Self-describing manifest for an agent.
///
/// Besides the preferred `url`/`preferred_transport` pair, a card may list
/// `additional_interfaces`; [`AgentCard::interface_url`] looks across both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub version: String,
    #[serde(rename = "protocolVersion", default = "default_protocol_version")]
    pub protocol_version: String,
    pub url: String,
    #[serde(rename = "preferredTransport", default)]
    pub preferred_transport: TransportProtocol,
    #[serde(default)]
    pub capabilities: AgentCapabilities,
    #[serde(rename = "defaultInputModes", default)]
    pub default_input_modes: Vec<String>,
    #[serde(rename = "defaultOutputModes", default)]
    pub default_output_modes: Vec<String>,
    #[serde(default)]
    pub skills: Vec<AgentSkill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<AgentProvider>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        rename = "additionalInterfaces",
        default
    )]
    pub additional_interfaces: Vec<AgentInterface>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "documentationUrl")]
    pub documentation_url: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        rename = "supportsAuthenticatedExtendedCard"
    )]
    pub supports_authenticated_extended_card: Option<bool>,
}

fn default_protocol_version() -> String {
    crate::PROTOCOL_VERSION.to_string()
}

impl AgentCard {
    /// Create a new AgentCard with minimal required fields
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: version.into(),
            protocol_version: default_protocol_version(),
            url: url.into(),
            preferred_transport: TransportProtocol::default(),
            capabilities: AgentCapabilities::default(),
            default_input_modes: vec!["text/plain".to_string()],
            default_output_modes: vec!["text/plain".to_string()],
            skills: Vec::new(),
            provider: None,
            additional_interfaces: Vec::new(),
            documentation_url: None,
            supports_authenticated_extended_card: None,
        }
    }

    /// A card that only knows where the agent lives and how to reach it.
    ///
    /// The first transport becomes the preferred one; every transport is also
    /// listed as an additional interface on the same URL.
    pub fn minimal(url: impl Into<String>, transports: &[TransportProtocol]) -> Self {
        let url = url.into();
        let mut card = Self::new("", "", "", url.clone());
        if let Some(first) = transports.first() {
            card.preferred_transport = first.clone();
        }
        card.additional_interfaces = transports
            .iter()
            .map(|transport| AgentInterface {
                transport: transport.clone(),
                url: url.clone(),
            })
            .collect();
        card
    }

    /// URL serving `transport`, preferring the card's main endpoint.
    pub fn interface_url(&self, transport: &TransportProtocol) -> Option<&str> {
        if &self.preferred_transport == transport && !self.url.is_empty() {
            return Some(&self.url);
        }
        self.additional_interfaces
            .iter()
            .find(|interface| &interface.transport == transport && !interface.url.is_empty())
            .map(|interface| interface.url.as_str())
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_preferred_transport(mut self, transport: TransportProtocol) -> Self {
        self.preferred_transport = transport;
        self
    }

    pub fn with_push_notifications(mut self, enabled: bool) -> Self {
        self.capabilities.push_notifications = Some(enabled);
        self
    }

    /// Set default input modes (replaces existing)
    pub fn with_default_input_modes(mut self, modes: Vec<String>) -> Self {
        self.default_input_modes = modes;
        self
    }

    /// Set default output modes (replaces existing)
    pub fn with_default_output_modes(mut self, modes: Vec<String>) -> Self {
        self.default_output_modes = modes;
        self
    }

    /// Create a skill using a builder pattern and add it
    pub fn add_skill_with<F>(mut self, id: impl Into<String>, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(AgentSkill) -> AgentSkill,
    {
        let skill = AgentSkill::new(id.into(), name.into());
        self.skills.push(f(skill));
        self
    }

    /// Add an additional interface
    pub fn add_interface(mut self, transport: TransportProtocol, url: impl Into<String>) -> Self {
        self.additional_interfaces.push(AgentInterface {
            transport,
            url: url.into(),
        });
        self
    }

    pub fn with_authenticated_extended_card(mut self, supported: bool) -> Self {
        self.supports_authenticated_extended_card = Some(supported);
        self
    }
}

impl AgentSkill {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            description: String::new(),
            tags: Vec::new(),
            examples: Vec::new(),
            input_modes: Vec::new(),
            output_modes: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn add_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn add_input_mode(mut self, mode: impl Into<String>) -> Self {
        self.input_modes.push(mode.into());
        self
    }

    pub fn add_output_mode(mut self, mode: impl Into<String>) -> Self {
        self.output_modes.push(mode.into());
        self
    }
}
