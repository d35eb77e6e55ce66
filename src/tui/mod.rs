//! Terminal User Interface (TUI) for agent chat
//!
//! A ratatui/crossterm chat screen: transcript on top, a single-line
//! composer with an `@mention` popup below, and a status line.

pub mod app;
pub mod composer;
mod events;
pub mod widgets;

pub use app::{AppState, TuiApp};
pub use composer::{Composer, ComposerAction};
pub use events::{Event, EventHandler};
