//! Mention popup for the `@agent` feature
//!
//! [`MentionPopup`] is the Hidden/Visible state machine that decides when the
//! agent list shows, which row is highlighted, and what a commit inserts.
//! [`MentionPopupWidget`] draws it above the composer.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::agents::Agent;

/// Keys the popup reacts to while visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKey {
    Up,
    Down,
    /// Enter
    Confirm,
    /// Tab
    AltConfirm,
    /// Esc
    Cancel,
}

/// Outcome of feeding a key to the popup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupAction {
    /// Popup is hidden; the key belongs to someone else
    Ignored,
    /// Highlight moved
    Moved,
    /// An agent was chosen; the popup is now hidden
    Commit(String),
    /// Popup was dismissed
    Cancelled,
}

/// Mention popup state
#[derive(Debug, Default, Clone)]
pub struct MentionPopup {
    /// Agents in display order
    items: Vec<Agent>,
    /// Highlighted row
    active_index: usize,
    visible: bool,
}

impl MentionPopup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the agent list
    ///
    /// Hides the popup if the new list is empty, otherwise clamps the
    /// highlight into range.
    pub fn set_items(&mut self, items: Vec<Agent>) {
        self.items = items;
        if self.items.is_empty() {
            self.hide();
        } else if self.active_index >= self.items.len() {
            self.active_index = 0;
        }
    }

    pub fn items(&self) -> &[Agent] {
        &self.items
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// Show the popup with the first row highlighted
    ///
    /// Returns false and stays hidden when there is nothing to list.
    pub fn show(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        self.visible = true;
        self.active_index = 0;
        true
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.active_index = 0;
    }

    /// Move the highlight down, wrapping to the first row
    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.active_index = (self.active_index + 1) % self.items.len();
        }
    }

    /// Move the highlight up, wrapping to the last row
    pub fn select_previous(&mut self) {
        if !self.items.is_empty() {
            self.active_index = self
                .active_index
                .checked_sub(1)
                .unwrap_or(self.items.len() - 1);
        }
    }

    /// React to the composer text changing
    ///
    /// `@` just before the cursor opens the popup. A space there, or no `@`
    /// anywhere in the text, closes it.
    pub fn on_text_changed(&mut self, text: &str, cursor: usize) {
        let last_char = text.get(..cursor).and_then(|s| s.chars().next_back());

        if last_char == Some('@') {
            self.show();
        } else if !text.contains('@') || last_char == Some(' ') {
            self.hide();
        }
    }

    /// Handle a navigation or commit key
    pub fn handle_key(&mut self, key: PopupKey) -> PopupAction {
        if !self.visible {
            return PopupAction::Ignored;
        }

        match key {
            PopupKey::Down => {
                self.select_next();
                PopupAction::Moved
            }
            PopupKey::Up => {
                self.select_previous();
                PopupAction::Moved
            }
            PopupKey::Confirm | PopupKey::AltConfirm => self.commit(self.active_index),
            PopupKey::Cancel => {
                self.hide();
                PopupAction::Cancelled
            }
        }
    }

    /// Commit the row at `index` (pointer selection)
    pub fn select_at(&mut self, index: usize) -> PopupAction {
        if !self.visible {
            return PopupAction::Ignored;
        }
        self.commit(index)
    }

    fn commit(&mut self, index: usize) -> PopupAction {
        match self.items.get(index) {
            Some(agent) => {
                let name = agent.name.clone();
                self.hide();
                PopupAction::Commit(name)
            }
            None => PopupAction::Ignored,
        }
    }

    /// First row to draw so the highlight stays inside `rows` rows
    pub fn scroll_offset(&self, rows: usize) -> usize {
        if rows == 0 || self.active_index < rows {
            0
        } else {
            self.active_index + 1 - rows
        }
    }
}

/// Replace the `@fragment` that ends at `cursor` with `@name `
///
/// Only the last `@` before the cursor is touched; earlier mentions and the
/// text after the cursor are kept. Returns the new text and cursor. With no
/// `@` before the cursor the mention is inserted at the cursor.
pub fn complete_mention(text: &str, cursor: usize, name: &str) -> (String, usize) {
    let cursor = cursor.min(text.len());
    let before = text.get(..cursor).unwrap_or(text);
    let at = before.rfind('@').unwrap_or(before.len());

    let mut result = String::with_capacity(text.len() + name.len() + 2);
    result.push_str(&text[..at]);
    result.push('@');
    result.push_str(name);
    result.push(' ');
    let new_cursor = result.len();
    result.push_str(&text[before.len()..]);

    (result, new_cursor)
}

/// Where the popup was drawn, for mouse hit-testing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupLayout {
    /// Area inside the border
    pub inner: Rect,
    /// Index of the agent on the first drawn row
    pub first_index: usize,
}

impl PopupLayout {
    /// Agent index under a terminal cell, if any
    pub fn index_at(&self, col: u16, row: u16, item_count: usize) -> Option<usize> {
        let inside = col >= self.inner.x
            && col < self.inner.x + self.inner.width
            && row >= self.inner.y
            && row < self.inner.y + self.inner.height;
        if !inside {
            return None;
        }
        let index = self.first_index + (row - self.inner.y) as usize;
        (index < item_count).then_some(index)
    }
}

/// Renderable mention popup
pub struct MentionPopupWidget<'a> {
    popup: &'a MentionPopup,
    /// Cell of the composer cursor; the popup opens above it
    anchor: (u16, u16),
}

impl<'a> MentionPopupWidget<'a> {
    pub fn new(popup: &'a MentionPopup, anchor: (u16, u16)) -> Self {
        Self { popup, anchor }
    }

    /// Calculate the popup area (above the anchor if there's room, otherwise below)
    pub fn calculate_area(&self, area: Rect) -> Rect {
        let width = 50.min(area.width.saturating_sub(2)).max(1);
        let rows = u16::try_from(self.popup.items.len()).unwrap_or(u16::MAX);
        let height = 10.min(rows.saturating_add(2)).min(area.height);

        let (anchor_x, anchor_y) = self.anchor;
        let max_x = area.x + area.width.saturating_sub(width);
        let x = anchor_x.saturating_sub(1).clamp(area.x, max_x.max(area.x));
        let y = if anchor_y >= area.y + height {
            anchor_y - height
        } else {
            (anchor_y + 1).min((area.y + area.height).saturating_sub(height))
        };

        Rect::new(x, y, width, height)
    }

    /// Area and first row the widget will use inside `area`
    pub fn layout(&self, area: Rect) -> PopupLayout {
        let popup_area = self.calculate_area(area);
        let inner = Self::block().inner(popup_area);
        PopupLayout {
            inner,
            first_index: self.popup.scroll_offset(inner.height as usize),
        }
    }

    fn block() -> Block<'static> {
        Block::default()
            .title(" Mention an agent ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
    }
}

impl Widget for MentionPopupWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.popup.visible || self.popup.items.is_empty() {
            return;
        }

        let popup_area = self.calculate_area(area);
        Clear.render(popup_area, buf);

        let block = Self::block();
        let inner = block.inner(popup_area);
        block.render(popup_area, buf);

        if inner.height < 1 {
            return;
        }

        let rows = inner.height as usize;
        let first = self.popup.scroll_offset(rows);

        let lines: Vec<Line<'static>> = self
            .popup
            .items
            .iter()
            .enumerate()
            .skip(first)
            .take(rows)
            .map(|(idx, agent)| {
                let is_active = idx == self.popup.active_index;
                let indicator = if is_active { "▶ " } else { "  " };
                let name_style = if is_active {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };

                Line::from(vec![
                    Span::styled(
                        indicator.to_string(),
                        Style::default().fg(if is_active {
                            Color::Cyan
                        } else {
                            Color::DarkGray
                        }),
                    ),
                    Span::raw(format!("{} ", agent.display_icon())),
                    Span::styled(agent.name.clone(), name_style),
                    Span::styled(
                        format!("  {}", agent.display_description()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agents(names: &[&str]) -> Vec<Agent> {
        names.iter().map(|n| Agent::new(*n)).collect()
    }

    fn popup_with(names: &[&str]) -> MentionPopup {
        let mut popup = MentionPopup::new();
        popup.set_items(agents(names));
        popup
    }

    #[test]
    fn test_at_sign_opens_with_first_row() {
        let mut popup = popup_with(&["a", "b"]);
        popup.select_next();
        popup.on_text_changed("hi @", 4);
        assert!(popup.is_visible());
        assert_eq!(popup.active_index(), 0);
    }

    #[test]
    fn test_empty_list_never_opens() {
        let mut popup = MentionPopup::new();
        popup.on_text_changed("@", 1);
        assert!(!popup.is_visible());
        assert!(!popup.show());
    }

    #[test]
    fn test_space_after_at_hides() {
        let mut popup = popup_with(&["a"]);
        popup.on_text_changed("@", 1);
        popup.on_text_changed("@ ", 2);
        assert!(!popup.is_visible());
    }

    #[test]
    fn test_removing_at_hides() {
        let mut popup = popup_with(&["a"]);
        popup.on_text_changed("x@", 2);
        popup.on_text_changed("x", 1);
        assert!(!popup.is_visible());
    }

    #[test]
    fn test_typing_fragment_keeps_visible() {
        let mut popup = popup_with(&["search_agent"]);
        popup.on_text_changed("hello @", 7);
        popup.on_text_changed("hello @s", 8);
        popup.on_text_changed("hello @sear", 11);
        assert!(popup.is_visible());
    }

    #[test]
    fn test_wraparound() {
        let mut popup = popup_with(&["a", "b", "c"]);
        popup.show();
        assert_eq!(popup.handle_key(PopupKey::Up), PopupAction::Moved);
        assert_eq!(popup.active_index(), 2);
        assert_eq!(popup.handle_key(PopupKey::Down), PopupAction::Moved);
        assert_eq!(popup.active_index(), 0);
    }

    #[test]
    fn test_commit_and_cancel() {
        let mut popup = popup_with(&["a", "b"]);
        popup.show();
        popup.handle_key(PopupKey::Down);
        assert_eq!(
            popup.handle_key(PopupKey::AltConfirm),
            PopupAction::Commit("b".to_string())
        );
        assert!(!popup.is_visible());

        popup.show();
        assert_eq!(popup.handle_key(PopupKey::Cancel), PopupAction::Cancelled);
        assert!(!popup.is_visible());
        assert_eq!(popup.handle_key(PopupKey::Confirm), PopupAction::Ignored);
    }

    #[test]
    fn test_select_at() {
        let mut popup = popup_with(&["a", "b", "c"]);
        assert_eq!(popup.select_at(1), PopupAction::Ignored);
        popup.show();
        assert_eq!(popup.select_at(7), PopupAction::Ignored);
        assert!(popup.is_visible());
        assert_eq!(popup.select_at(2), PopupAction::Commit("c".to_string()));
    }

    #[test]
    fn test_area_height_with_huge_directory() {
        let mut popup = MentionPopup::new();
        popup.set_items((0..65_535).map(|i| Agent::new(format!("agent_{}", i))).collect());
        popup.show();
        let area = MentionPopupWidget::new(&popup, (10, 30)).calculate_area(Rect::new(0, 0, 80, 40));
        assert_eq!(area.height, 10);
        assert_eq!(area.y, 20);
    }

    #[test]
    fn test_set_items_empty_hides() {
        let mut popup = popup_with(&["a"]);
        popup.show();
        popup.set_items(Vec::new());
        assert!(!popup.is_visible());
        assert_eq!(popup.active_index(), 0);
        assert!(!popup.show());
    }

    #[test]
    fn test_complete_mention_trailing_fragment() {
        assert_eq!(
            complete_mention("hello @sear", 11, "search_agent"),
            ("hello @search_agent ".to_string(), 20)
        );
    }

    #[test]
    fn test_complete_mention_keeps_earlier_mentions_and_suffix() {
        let (text, cursor) = complete_mention("@a and @d tail", 9, "database_agent");
        assert_eq!(text, "@a and @database_agent  tail");
        assert_eq!(&text[..cursor], "@a and @database_agent ");
    }

    #[test]
    fn test_complete_mention_without_at() {
        assert_eq!(complete_mention("hi", 2, "x"), ("hi@x ".to_string(), 5));
    }

    #[test]
    fn test_scroll_offset_follows_highlight() {
        let mut popup = popup_with(&["a", "b", "c", "d", "e"]);
        popup.show();
        assert_eq!(popup.scroll_offset(3), 0);
        popup.select_previous();
        assert_eq!(popup.scroll_offset(3), 2);
    }

    #[test]
    fn test_layout_hit_testing() {
        let mut popup = popup_with(&["a", "b", "c"]);
        popup.show();
        let widget = MentionPopupWidget::new(&popup, (4, 20));
        let layout = widget.layout(Rect::new(0, 0, 80, 24));

        let row = layout.inner.y + 1;
        assert_eq!(layout.index_at(layout.inner.x, row, 3), Some(1));
        assert_eq!(layout.index_at(layout.inner.x, layout.inner.y - 1, 3), None);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_down_n_times_returns_to_start(n in 1usize..=20) {
                let names: Vec<String> = (0..n).map(|i| format!("agent_{}", i)).collect();
                let mut popup = MentionPopup::new();
                popup.set_items(names.iter().map(Agent::new).collect());
                popup.on_text_changed("@", 1);
                prop_assert!(popup.is_visible());
                prop_assert_eq!(popup.active_index(), 0);

                for _ in 0..n {
                    popup.handle_key(PopupKey::Down);
                }
                prop_assert_eq!(popup.active_index(), 0);

                popup.handle_key(PopupKey::Up);
                prop_assert_eq!(popup.active_index(), n - 1);
            }

            #[test]
            fn prop_active_index_in_range(n in 1usize..=8, moves in proptest::collection::vec(any::<bool>(), 0..30)) {
                let mut popup = MentionPopup::new();
                popup.set_items((0..n).map(|i| Agent::new(format!("a{}", i))).collect());
                popup.show();
                for down in moves {
                    popup.handle_key(if down { PopupKey::Down } else { PopupKey::Up });
                    prop_assert!(popup.active_index() < n);
                }
            }

            #[test]
            fn prop_commit_replaces_only_trailing_fragment(
                prefix in "[a-z ]{0,10}(@[a-z]{1,5} )?[a-z ]{0,5}",
                fragment in "[a-z_]{0,6}",
                suffix in "[a-z ]{0,8}",
                name in "[a-z_]{1,12}",
            ) {
                let text = format!("{}@{}{}", prefix, fragment, suffix);
                let cursor = prefix.len() + 1 + fragment.len();

                let (result, new_cursor) = complete_mention(&text, cursor, &name);
                let expected_head = format!("{}@{} ", prefix, name);
                prop_assert_eq!(&result[..new_cursor], expected_head.as_str());
                prop_assert_eq!(&result[new_cursor..], suffix.as_str());
            }
        }
    }
}
