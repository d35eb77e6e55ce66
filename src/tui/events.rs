//! Event handling for the TUI
//!
//! Handles keyboard, mouse, and terminal events using crossterm.

use std::time::Duration;

use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};

/// Events that can occur in the TUI
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed
    Key(KeyEvent),
    /// Mouse event
    Mouse(MouseEvent),
    /// Terminal was resized
    Resize(u16, u16),
    /// Paste event (bracketed paste)
    Paste(String),
    /// Tick event for periodic updates
    Tick,
}

/// Handles events from the terminal
#[derive(Debug)]
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler with custom tick rate
    pub fn with_tick_rate(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Poll for the next event
    ///
    /// Returns `Event::Tick` if the tick rate elapsed without input.
    pub fn poll(&self) -> anyhow::Result<Event> {
        if event::poll(self.tick_rate)? {
            let event = event::read()?;
            Ok(self.convert_event(event))
        } else {
            Ok(Event::Tick)
        }
    }

    /// Convert a crossterm event to our Event type
    fn convert_event(&self, event: event::Event) -> Event {
        match event {
            // Release/repeat events are reported on some platforms; only presses drive input
            event::Event::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
            event::Event::Mouse(mouse) => Event::Mouse(mouse),
            event::Event::Resize(cols, rows) => Event::Resize(cols, rows),
            event::Event::Paste(text) => Event::Paste(text),
            _ => Event::Tick,
        }
    }
}

/// Helper functions for key event matching
impl Event {
    /// Check if this is a quit key (Ctrl-C or Ctrl-Q)
    ///
    /// Plain `q` is text in a chat composer, so it never quits.
    pub fn is_quit(&self) -> bool {
        matches!(
            self,
            Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            }) | Event::Key(KeyEvent {
                code: KeyCode::Char('q'),
                modifiers: KeyModifiers::CONTROL,
                ..
            })
        )
    }
}
