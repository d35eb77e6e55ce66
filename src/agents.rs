//! Agent directory
//!
//! Loads the mentionable agents from the backend once at startup. Any
//! failure is absorbed by substituting a built-in list so mentions keep
//! working offline.

use serde::{Deserialize, Serialize};

use crate::client::ChatBackend;

/// Icon shown when the backend does not supply one
pub const DEFAULT_ICON: &str = "🤖";
/// Description shown when the backend does not supply one
pub const DEFAULT_DESCRIPTION: &str = "AI assistant";

/// A named backend capability the user can address with `@name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Agent {
    /// Create an agent with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            icon: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Icon for display, falling back to [`DEFAULT_ICON`]
    pub fn display_icon(&self) -> &str {
        self.icon
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ICON)
    }

    /// Description for display, falling back to [`DEFAULT_DESCRIPTION`]
    pub fn display_description(&self) -> &str {
        self.description
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_DESCRIPTION)
    }
}

/// Built-in directory used when the backend list cannot be loaded
pub fn fallback_agents() -> Vec<Agent> {
    vec![
        Agent::new("lingxing_expert")
            .with_description("ERP financial analysis expert")
            .with_icon("📊"),
        Agent::new("search_agent")
            .with_description("Real-time web search expert")
            .with_icon("🔍"),
        Agent::new("database_agent")
            .with_description("MongoDB database operations expert")
            .with_icon("💾"),
    ]
}

/// Where a loaded directory came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorySource {
    Backend,
    Fallback,
}

/// Fetch the agent directory, substituting [`fallback_agents`] on any failure
///
/// Never fails and never retries. An empty backend list is treated like a
/// failure so the popup always has something to show.
pub async fn load_agents(backend: &dyn ChatBackend) -> (Vec<Agent>, DirectorySource) {
    match backend.available_agents().await {
        Ok(agents) if !agents.is_empty() => {
            tracing::info!("Loaded {} agents from backend", agents.len());
            (agents, DirectorySource::Backend)
        }
        Ok(_) => {
            tracing::warn!("Backend returned an empty agent list, using built-in agents");
            (fallback_agents(), DirectorySource::Fallback)
        }
        Err(e) => {
            tracing::warn!("Could not load agent list, using built-in agents: {}", e);
            (fallback_agents(), DirectorySource::Fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ChatRequest, ChatResponse, ClientError, Feedback};
    use async_trait::async_trait;

    struct StubBackend {
        agents: Result<Vec<Agent>, String>,
    }

    #[async_trait]
    impl ChatBackend for StubBackend {
        async fn available_agents(&self) -> Result<Vec<Agent>, ClientError> {
            self.agents.clone().map_err(ClientError::Network)
        }

        async fn run_chat(&self, _request: &ChatRequest) -> Result<ChatResponse, ClientError> {
            unreachable!("not used by directory tests")
        }

        async fn send_feedback(&self, _feedback: &Feedback) -> Result<(), ClientError> {
            unreachable!("not used by directory tests")
        }
    }

    #[test]
    fn test_agent_deserialize_optional_fields() {
        let agents: Vec<Agent> = serde_json::from_str(
            r#"[{"name":"search_agent"},{"name":"root_agent","description":"Coordinator","icon":"🧭"}]"#,
        )
        .unwrap();
        assert_eq!(agents[0], Agent::new("search_agent"));
        assert_eq!(agents[1].display_icon(), "🧭");
        assert_eq!(agents[1].display_description(), "Coordinator");
    }

    #[test]
    fn test_display_fallbacks() {
        let agent = Agent::new("x").with_icon("");
        assert_eq!(agent.display_icon(), DEFAULT_ICON);
        assert_eq!(agent.display_description(), DEFAULT_DESCRIPTION);
    }

    #[test]
    fn test_fallback_list_is_usable() {
        let agents = fallback_agents();
        assert!(!agents.is_empty());
        assert!(agents.iter().any(|a| a.name == "search_agent"));
    }

    #[tokio::test]
    async fn test_load_agents_from_backend() {
        let backend = StubBackend {
            agents: Ok(vec![Agent::new("root_agent")]),
        };
        let (agents, source) = load_agents(&backend).await;
        assert_eq!(source, DirectorySource::Backend);
        assert_eq!(agents, vec![Agent::new("root_agent")]);
    }

    #[tokio::test]
    async fn test_load_agents_failure_uses_fallback() {
        let backend = StubBackend {
            agents: Err("connection refused".to_string()),
        };
        let (agents, source) = load_agents(&backend).await;
        assert_eq!(source, DirectorySource::Fallback);
        assert_eq!(agents, fallback_agents());
    }

    #[tokio::test]
    async fn test_load_agents_empty_uses_fallback() {
        let backend = StubBackend { agents: Ok(vec![]) };
        let (agents, source) = load_agents(&backend).await;
        assert_eq!(source, DirectorySource::Fallback);
        assert!(!agents.is_empty());
    }
}
