//! Message list widget for displaying the chat transcript
//!
//! Renders user and bot entries with role headers, `@mention` tags in user
//! text, and keeps the newest entry in view unless the user scrolled up.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    prelude::StatefulWidget,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Widget},
};
use unicode_width::UnicodeWidthChar;

use crate::transcript::{Message, Segment, Sender, Transcript};

/// Scroll position of the message list
#[derive(Debug, Clone)]
pub struct MessageListState {
    /// First visible line
    scroll_offset: usize,
    /// Pin the view to the newest line
    follow_tail: bool,
    /// Largest valid offset seen at the last render
    max_offset: usize,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            follow_tail: true,
            max_offset: 0,
        }
    }
}

impl MessageListState {
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn is_following(&self) -> bool {
        self.follow_tail
    }

    /// Jump to the newest entry and stay there as entries arrive
    pub fn scroll_to_bottom(&mut self) {
        self.follow_tail = true;
        self.scroll_offset = self.max_offset;
    }

    pub fn scroll_up(&mut self, lines: usize) {
        if self.follow_tail {
            self.scroll_offset = self.max_offset;
        }
        self.follow_tail = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        if self.follow_tail {
            return;
        }
        self.scroll_offset = (self.scroll_offset + lines).min(self.max_offset);
        if self.scroll_offset >= self.max_offset {
            self.follow_tail = true;
        }
    }

    /// Record the content height for the viewport and fix up the offset
    fn sync(&mut self, total_lines: usize, height: usize) {
        self.max_offset = total_lines.saturating_sub(height);
        if self.follow_tail {
            self.scroll_offset = self.max_offset;
        } else {
            self.scroll_offset = self.scroll_offset.min(self.max_offset);
        }
    }
}

/// Renderable message list
pub struct MessageListWidget<'a> {
    transcript: &'a Transcript,
    show_timestamps: bool,
}

impl<'a> MessageListWidget<'a> {
    pub fn new(transcript: &'a Transcript) -> Self {
        Self {
            transcript,
            show_timestamps: true,
        }
    }

    pub fn show_timestamps(mut self, show: bool) -> Self {
        self.show_timestamps = show;
        self
    }

    /// All display lines for the transcript at `width`
    pub fn build_lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for (i, message) in self.transcript.messages().iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            lines.push(self.header_line(message));
            for logical in body_lines(message) {
                lines.extend(wrap_spans(logical, width));
            }
        }
        lines
    }

    fn header_line(&self, message: &Message) -> Line<'static> {
        let color = match message.sender {
            Sender::User => Color::Cyan,
            Sender::Bot => Color::Green,
        };
        let mut spans = vec![Span::styled(
            message.sender.label().to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )];
        if self.show_timestamps {
            spans.push(Span::styled(
                format!(" · {}", message.timestamp.format("%H:%M")),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if message.pending {
            spans.push(Span::styled(" ⋯", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
    }
}

/// Styled spans for a message body, one vector per `\n`-separated line
fn body_lines(message: &Message) -> Vec<Vec<Span<'static>>> {
    let text_style = if message.pending {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC)
    } else {
        Style::default()
    };
    let mention_style = Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Vec<Span<'static>>> = vec![Vec::new()];
    for segment in message.segments() {
        let (text, style) = match segment {
            Segment::Text(t) => (t, text_style),
            Segment::Mention(m) => (m, mention_style),
        };
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                lines.push(Vec::new());
            }
            if !part.is_empty() {
                if let Some(line) = lines.last_mut() {
                    line.push(Span::styled(part.to_string(), style));
                }
            }
        }
    }
    lines
}

/// Hard-wrap styled spans to `width` display columns
fn wrap_spans(spans: Vec<Span<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![Line::from(spans)];
    }

    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut used = 0;

    for span in spans {
        let style = span.style;
        let mut chunk = String::new();
        for c in span.content.chars() {
            let w = c.width().unwrap_or(0);
            if used + w > width && used > 0 {
                if !chunk.is_empty() {
                    current.push(Span::styled(std::mem::take(&mut chunk), style));
                }
                lines.push(Line::from(std::mem::take(&mut current)));
                used = 0;
            }
            chunk.push(c);
            used += w;
        }
        if !chunk.is_empty() {
            current.push(Span::styled(chunk, style));
        }
    }
    lines.push(Line::from(current));
    lines
}

impl StatefulWidget for MessageListWidget<'_> {
    type State = MessageListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let height = area.height as usize;
        // one column is reserved for the scrollbar
        let text_width = area.width.saturating_sub(1) as usize;
        let lines = self.build_lines(text_width);
        let total = lines.len();
        state.sync(total, height);

        let visible: Vec<Line<'static>> = lines
            .into_iter()
            .skip(state.scroll_offset)
            .take(height)
            .collect();
        let text_area = Rect::new(area.x, area.y, text_width as u16, area.height);
        Paragraph::new(visible).render(text_area, buf);

        if total > height {
            let mut scrollbar_state =
                ScrollbarState::new(state.max_offset).position(state.scroll_offset);
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None)
                .render(area, buf, &mut scrollbar_state);
        }
    }
}
