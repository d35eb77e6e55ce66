//! Composer input widget with cursor management
//!
//! A single-line text input. The cursor is a byte offset that always sits on
//! a character boundary.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

/// Input widget state
#[derive(Debug, Clone)]
pub struct InputWidget {
    /// Current input content
    content: String,
    /// Cursor position (byte offset)
    cursor: usize,
    /// Placeholder text
    placeholder: String,
}

impl Default for InputWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl InputWidget {
    /// Create a new input widget
    pub fn new() -> Self {
        Self {
            content: String::new(),
            cursor: 0,
            placeholder: "Type a message... (@ to mention an agent)".to_string(),
        }
    }

    /// Get the current content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the cursor position
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Check if the input is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Display width of the text before the cursor
    pub fn cursor_column(&self) -> usize {
        self.content[..self.cursor].width()
    }

    /// Insert a character at the cursor position
    pub fn insert_char(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Insert a string at the cursor position
    ///
    /// Newlines are flattened to spaces; the composer is single-line.
    pub fn insert_str(&mut self, s: &str) {
        let flattened: String = s
            .chars()
            .filter(|c| *c != '\r')
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        self.content.insert_str(self.cursor, &flattened);
        self.cursor += flattened.len();
    }

    /// Delete the character before the cursor (backspace)
    pub fn delete_char_before(&mut self) {
        if self.cursor > 0 {
            let prev_boundary = self.content[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.content.remove(prev_boundary);
            self.cursor = prev_boundary;
        }
    }

    /// Delete the character at the cursor (delete key)
    pub fn delete_char_at(&mut self) {
        if self.cursor < self.content.len() {
            self.content.remove(self.cursor);
        }
    }

    /// Delete the word before the cursor (Ctrl+W)
    pub fn delete_word_before(&mut self) {
        if self.cursor == 0 {
            return;
        }

        let before_cursor = &self.content[..self.cursor];
        let trimmed = before_cursor.trim_end();
        let word_start = trimmed
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);

        self.content.drain(word_start..self.cursor);
        self.cursor = word_start;
    }

    /// Delete from the start to the cursor (Ctrl+U)
    pub fn delete_to_start(&mut self) {
        self.content.drain(..self.cursor);
        self.cursor = 0;
    }

    /// Take the content, leaving the input empty
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.content)
    }

    /// Move cursor left by one character
    pub fn move_cursor_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.content[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    /// Move cursor right by one character
    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.content.len() {
            self.cursor = self.content[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.content.len());
        }
    }

    pub fn move_cursor_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.cursor = self.content.len();
    }

    /// Replace the content and place the cursor
    ///
    /// The cursor is clamped and snapped back to a character boundary.
    pub fn set_content_with_cursor(&mut self, content: impl Into<String>, cursor: usize) {
        self.content = content.into();
        let mut cursor = cursor.min(self.content.len());
        while !self.content.is_char_boundary(cursor) {
            cursor -= 1;
        }
        self.cursor = cursor;
    }
}

/// Renderable input widget
pub struct InputWidgetRenderer<'a> {
    input: &'a InputWidget,
    block: Option<Block<'a>>,
    cursor_style: Style,
}

impl<'a> InputWidgetRenderer<'a> {
    /// Create a new input widget renderer
    pub fn new(input: &'a InputWidget) -> Self {
        Self {
            input,
            block: None,
            cursor_style: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    /// Set the block for the widget
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Byte offset of the first visible character so the cursor fits in `width`
    fn scroll_start(&self, width: usize) -> usize {
        let content = &self.input.content;
        let cursor = self.input.cursor;
        // one column is kept for the cursor cell
        let budget = width.saturating_sub(1);

        let mut start = 0;
        while content[start..cursor].width() > budget {
            start += content[start..]
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(0);
        }
        start
    }
}

impl Widget for InputWidgetRenderer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let content = &self.input.content;
        let cursor = self.input.cursor;

        if content.is_empty() {
            let line = Line::from(vec![
                Span::styled(" ", self.cursor_style),
                Span::styled(
                    self.input.placeholder.as_str(),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);
            Paragraph::new(line).render(inner, buf);
            return;
        }

        let start = self.scroll_start(inner.width as usize);
        let before = &content[start..cursor];
        let mut rest = content[cursor..].chars();
        let at_cursor = rest.next().map(String::from).unwrap_or_else(|| " ".into());
        let after: String = rest.collect();

        let line = Line::from(vec![
            Span::raw(before),
            Span::styled(at_cursor, self.cursor_style),
            Span::raw(after),
        ]);
        Paragraph::new(line).render(inner, buf);
    }
}
