//! Status bar widget
//!
//! One line with the session, agent directory state, in-flight replies and
//! key hints.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::agents::DirectorySource;

/// Status bar state
#[derive(Debug, Clone, Default)]
pub struct StatusBar {
    /// Session identifier sent with chat requests
    pub session_id: String,
    /// Number of mentionable agents
    pub agent_count: usize,
    /// Where the agent list came from; `None` while loading
    pub agent_source: Option<DirectorySource>,
    /// Replies still in flight
    pub pending_replies: usize,
    /// Contextual keybinding hints
    pub keybind_hints: String,
}

impl StatusBar {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Self::default()
        }
    }

    pub fn agents(mut self, count: usize, source: Option<DirectorySource>) -> Self {
        self.agent_count = count;
        self.agent_source = source;
        self
    }

    pub fn pending_replies(mut self, pending: usize) -> Self {
        self.pending_replies = pending;
        self
    }

    pub fn keybind_hints(mut self, hints: impl Into<String>) -> Self {
        self.keybind_hints = hints.into();
        self
    }

    fn agents_label(&self) -> String {
        match self.agent_source {
            None => "agents: loading".to_string(),
            Some(DirectorySource::Backend) => format!("agents: {}", self.agent_count),
            Some(DirectorySource::Fallback) => format!("agents: {} (built-in)", self.agent_count),
        }
    }
}

impl Widget for StatusBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dim = Style::default().fg(Color::DarkGray);
        let sep = Span::styled(" │ ", dim);

        let mut spans = vec![
            Span::styled(
                format!(" {}", self.session_id),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            sep.clone(),
            Span::raw(self.agents_label()),
        ];

        if self.pending_replies > 0 {
            spans.push(sep.clone());
            spans.push(Span::styled(
                format!("waiting for {}", self.pending_replies),
                Style::default().fg(Color::Yellow),
            ));
        }

        if !self.keybind_hints.is_empty() {
            spans.push(sep);
            spans.push(Span::styled(self.keybind_hints.clone(), dim));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
