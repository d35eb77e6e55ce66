//! Composer: the text input plus its mention popup
//!
//! Routes keys either to popup navigation or to text editing and message
//! submission. Returns a [`ComposerAction`] instead of performing side
//! effects so the app loop decides what a submit means.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::widgets::{complete_mention, InputWidget, MentionPopup, PopupAction, PopupKey};
use crate::agents::Agent;

/// What the app should do after the composer handled an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerAction {
    /// Not a composer key
    Ignored,
    /// State changed; redraw
    Handled,
    /// Send this text as a chat message
    Submit(String),
}

#[derive(Debug, Default, Clone)]
pub struct Composer {
    input: InputWidget,
    popup: MentionPopup,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &InputWidget {
        &self.input
    }

    pub fn popup(&self) -> &MentionPopup {
        &self.popup
    }

    /// Install the agent directory
    pub fn set_agents(&mut self, agents: Vec<Agent>) {
        self.popup.set_items(agents);
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerAction {
        if self.popup.is_visible() {
            if let Some(popup_key) = Self::popup_key(&key) {
                let action = self.popup.handle_key(popup_key);
                return self.apply_popup_action(action);
            }
        } else if key.code == KeyCode::Enter {
            return self.submit();
        }

        self.handle_edit_key(key)
    }

    /// Insert pasted text
    pub fn handle_paste(&mut self, text: &str) -> ComposerAction {
        self.input.insert_str(text);
        self.text_changed();
        ComposerAction::Handled
    }

    /// Pointer selection of a popup row
    pub fn click_item(&mut self, index: usize) -> ComposerAction {
        let action = self.popup.select_at(index);
        self.apply_popup_action(action)
    }

    fn popup_key(key: &KeyEvent) -> Option<PopupKey> {
        match key.code {
            KeyCode::Up => Some(PopupKey::Up),
            KeyCode::Down => Some(PopupKey::Down),
            KeyCode::Enter => Some(PopupKey::Confirm),
            KeyCode::Tab => Some(PopupKey::AltConfirm),
            KeyCode::Esc => Some(PopupKey::Cancel),
            _ => None,
        }
    }

    fn apply_popup_action(&mut self, action: PopupAction) -> ComposerAction {
        match action {
            PopupAction::Ignored => ComposerAction::Ignored,
            PopupAction::Moved | PopupAction::Cancelled => ComposerAction::Handled,
            PopupAction::Commit(name) => {
                let (text, cursor) =
                    complete_mention(self.input.content(), self.input.cursor(), &name);
                self.input.set_content_with_cursor(text, cursor);
                ComposerAction::Handled
            }
        }
    }

    /// Enter with the popup hidden
    fn submit(&mut self) -> ComposerAction {
        if self.input.content().trim().is_empty() {
            return ComposerAction::Ignored;
        }
        let text = self.input.take();
        self.text_changed();
        ComposerAction::Submit(text)
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> ComposerAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('w') if ctrl => self.input.delete_word_before(),
            KeyCode::Char('u') if ctrl => self.input.delete_to_start(),
            KeyCode::Char('a') if ctrl => {
                self.input.move_cursor_to_start();
                return ComposerAction::Handled;
            }
            KeyCode::Char('e') if ctrl => {
                self.input.move_cursor_to_end();
                return ComposerAction::Handled;
            }
            KeyCode::Char(_) if ctrl => return ComposerAction::Ignored,
            KeyCode::Char(c) => self.input.insert_char(c),
            KeyCode::Backspace => self.input.delete_char_before(),
            KeyCode::Delete => self.input.delete_char_at(),
            KeyCode::Left => {
                self.input.move_cursor_left();
                return ComposerAction::Handled;
            }
            KeyCode::Right => {
                self.input.move_cursor_right();
                return ComposerAction::Handled;
            }
            KeyCode::Home => {
                self.input.move_cursor_to_start();
                return ComposerAction::Handled;
            }
            KeyCode::End => {
                self.input.move_cursor_to_end();
                return ComposerAction::Handled;
            }
            _ => return ComposerAction::Ignored,
        }

        self.text_changed();
        ComposerAction::Handled
    }

    fn text_changed(&mut self) {
        self.popup
            .on_text_changed(self.input.content(), self.input.cursor());
    }
}
