//! CLI transport for direct terminal interaction

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;
use tabled::{settings::Style, Table, Tabled};

use crate::agents::{self, DirectorySource};
use crate::client::{ChatBackend, Feedback, HttpBackend};
use crate::config::Config;
use crate::dispatcher::fetch_reply;
use crate::session::Session;
use crate::tui::TuiApp;

/// Build the HTTP backend for the configured base URL
pub fn build_backend(config: &Config) -> Result<HttpBackend> {
    let base_url = config.api_base()?;
    tracing::debug!("Using backend at {}", base_url);
    Ok(HttpBackend::new(base_url))
}

/// Run TUI chat mode
///
/// `initial_message`, when given, is sent as soon as the UI is up.
pub async fn run_tui_chat(initial_message: Option<String>, config: &Config) -> Result<()> {
    let backend: Arc<dyn ChatBackend> = Arc::new(build_backend(config)?);
    let session = Session::new(config.api.user_id.clone());
    tracing::info!(session_id = %session.id(), "Starting chat session");

    let mut app = TuiApp::new(backend, session, config)?;
    if let Some(message) = initial_message.filter(|m| !m.trim().is_empty()) {
        app.state_mut().submit(&message);
    }
    app.run().await
}

/// Print the agent directory
pub async fn run_agents(config: &Config, format: &str) -> Result<()> {
    let backend = build_backend(config)?;
    let (agents, source) = agents::load_agents(&backend).await;

    let source_label = match source {
        DirectorySource::Backend => "backend",
        DirectorySource::Fallback => "built-in",
    };

    match format {
        "json" => {
            let output = serde_json::json!({
                "source": source_label,
                "agents": agents,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            #[derive(Tabled)]
            struct AgentRow {
                #[tabled(rename = "")]
                icon: String,
                #[tabled(rename = "Mention")]
                mention: String,
                #[tabled(rename = "Description")]
                description: String,
            }

            let rows: Vec<AgentRow> = agents
                .iter()
                .map(|a| AgentRow {
                    icon: a.display_icon().to_string(),
                    mention: format!("@{}", a.name),
                    description: a.display_description().to_string(),
                })
                .collect();

            println!(
                "\n{} {}",
                "=== AVAILABLE AGENTS ===".bold().cyan(),
                format!("({})", source_label).dimmed()
            );
            println!();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
        }
    }

    Ok(())
}

/// Send one message and print the reply
pub async fn run_ask(config: &Config, message: &str) -> Result<()> {
    if message.trim().is_empty() {
        anyhow::bail!("Message is empty");
    }

    let backend = build_backend(config)?;
    let session = Session::new(config.api.user_id.clone());
    let request = session.request(message);

    let reply = fetch_reply(&backend, &request, &config.ui.no_response_text).await;
    println!("{}", reply);
    Ok(())
}

/// Post feedback for an agent run
pub async fn run_feedback(
    config: &Config,
    score: f64,
    text: Option<String>,
    invocation_id: Option<String>,
) -> Result<()> {
    let backend = build_backend(config)?;
    let invocation_id =
        invocation_id.unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());

    let feedback = Feedback::new(
        score,
        text.unwrap_or_default(),
        invocation_id.clone(),
        config.api.service_name.clone(),
        config.api.user_id.clone(),
    );
    backend
        .send_feedback(&feedback)
        .await
        .context("Failed to send feedback")?;

    println!("{} feedback recorded ({})", "✓".green(), invocation_id);
    Ok(())
}
