//! Chat dispatch
//!
//! Network work runs in spawned tasks; results come back to the UI loop as
//! [`AppEvent`]s so only the loop ever mutates the transcript.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::agents::{self, Agent, DirectorySource};
use crate::client::{ChatBackend, ChatRequest};
use crate::session::Session;
use crate::transcript::{MessageId, Sender, Transcript};

/// Results delivered to the UI loop
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The agent directory finished loading
    AgentsLoaded {
        agents: Vec<Agent>,
        source: DirectorySource,
    },
    /// Final text for a pending placeholder
    ReplyReady { id: MessageId, text: String },
}

/// Fixed texts written into bot entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTexts {
    pub pending: String,
    pub no_response: String,
}

impl Default for ReplyTexts {
    fn default() -> Self {
        Self {
            pending: "Thinking...".to_string(),
            no_response: "No response received".to_string(),
        }
    }
}

/// Run one chat turn and produce the text the placeholder should show
///
/// Never fails: transport and decode failures become `Error: <reason>`.
pub async fn fetch_reply(
    backend: &dyn ChatBackend,
    request: &ChatRequest,
    no_response: &str,
) -> String {
    match backend.run_chat(request).await {
        Ok(response) => response.output_text().unwrap_or(no_response).to_string(),
        Err(e) => {
            tracing::warn!(session_id = %request.session_id, "Chat request failed: {}", e);
            format!("Error: {}", e)
        }
    }
}

/// Load the agent directory in the background
pub fn spawn_agent_load(backend: Arc<dyn ChatBackend>, tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let (agents, source) = agents::load_agents(backend.as_ref()).await;
        if tx.send(AppEvent::AgentsLoaded { agents, source }).is_err() {
            tracing::debug!("UI closed before agent list arrived");
        }
    });
}

/// Sends user messages and routes replies back to their placeholders
pub struct ChatDispatcher {
    backend: Arc<dyn ChatBackend>,
    session: Session,
    texts: ReplyTexts,
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl ChatDispatcher {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        session: Session,
        texts: ReplyTexts,
        tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            backend,
            session,
            texts,
            tx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Append the user entry and a placeholder, then start the request
    ///
    /// Returns the placeholder id. Each call is independent: concurrent sends
    /// resolve in whatever order their responses arrive.
    pub fn send(&self, transcript: &mut Transcript, text: &str) -> MessageId {
        transcript.append(text, Sender::User, false);
        let id = transcript.append(self.texts.pending.clone(), Sender::Bot, true);

        let request = self.session.request(text);
        let backend = Arc::clone(&self.backend);
        let no_response = self.texts.no_response.clone();
        let tx = self.tx.clone();
        let reply_id = id.clone();

        tracing::info!(message_id = %id, "Dispatching chat message");
        tokio::spawn(async move {
            let text = fetch_reply(backend.as_ref(), &request, &no_response).await;
            if tx.send(AppEvent::ReplyReady { id: reply_id, text }).is_err() {
                tracing::debug!("UI closed before reply arrived");
            }
        });

        id
    }
}
