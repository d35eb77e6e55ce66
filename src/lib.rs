//! agent-chat: terminal chat client for a multi-agent backend
//!
//! This library provides:
//! - Agent directory loading with a built-in fallback list
//! - An `@mention` popup for addressing agents by name
//! - A transcript that resolves each reply into its own placeholder
//! - An HTTP client for the chat, agent list and feedback endpoints
//! - Terminal UI (TUI) and one-shot CLI commands

pub mod agents;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod session;
pub mod transcript;
pub mod transport;
pub mod tui;

pub use config::Config;
