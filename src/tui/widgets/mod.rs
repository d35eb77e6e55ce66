//! UI Widgets for the TUI
//!
//! This module contains the components of the terminal chat interface.

mod input;
mod mention_popup;
mod message_list;
mod status_bar;

pub use input::{InputWidget, InputWidgetRenderer};
pub use mention_popup::{
    complete_mention, MentionPopup, MentionPopupWidget, PopupAction, PopupKey, PopupLayout,
};
pub use message_list::{MessageListState, MessageListWidget};
pub use status_bar::StatusBar;
