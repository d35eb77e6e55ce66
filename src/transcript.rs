//! Chat transcript
//!
//! An append-only log of user and bot entries. A bot entry may start out as
//! a pending placeholder and is resolved to its final text exactly once.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// `@` followed by one or more ASCII word characters
static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@[A-Za-z0-9_]+").expect("valid mention regex"));

/// Process-wide sequence so ids never repeat across transcripts
static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Unique identifier of a transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Label shown in the message header
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Bot => "Agent",
        }
    }
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub text: String,
    /// True only for a bot placeholder awaiting its reply
    pub pending: bool,
    pub timestamp: DateTime<Local>,
}

impl Message {
    /// Split the text for display
    ///
    /// User text is split into plain and mention runs. Bot text is always a
    /// single literal run.
    pub fn segments(&self) -> Vec<Segment<'_>> {
        match self.sender {
            Sender::User => mention_segments(&self.text),
            Sender::Bot => vec![Segment::Text(&self.text)],
        }
    }
}

/// A run of message text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Mention(&'a str),
}

/// Split `text` into literal runs and `@name` mention tags
///
/// Concatenating the runs yields `text` unchanged.
pub fn mention_segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for m in MENTION_RE.find_iter(text) {
        if m.start() > last {
            segments.push(Segment::Text(&text[last..m.start()]));
        }
        segments.push(Segment::Mention(m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        segments.push(Segment::Text(&text[last..]));
    }

    segments
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("no message with id {0}")]
    UnknownMessage(MessageId),
    #[error("message {0} is not pending")]
    AlreadyResolved(MessageId),
}

/// Ordered, append-only message log
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    /// Set on every append; consumed by the renderer to jump to the newest entry
    scroll_pending: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its id
    pub fn append(&mut self, text: impl Into<String>, sender: Sender, pending: bool) -> MessageId {
        let id = MessageId(format!(
            "msg-{}-{}",
            chrono::Utc::now().timestamp_millis(),
            NEXT_SEQ.fetch_add(1, Ordering::Relaxed)
        ));

        self.messages.push(Message {
            id: id.clone(),
            sender,
            text: text.into(),
            pending,
            timestamp: Local::now(),
        });
        self.scroll_pending = true;

        id
    }

    /// Replace a pending entry's text with its final text
    pub fn resolve(
        &mut self,
        id: &MessageId,
        text: impl Into<String>,
    ) -> Result<(), TranscriptError> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| TranscriptError::UnknownMessage(id.clone()))?;

        if !message.pending {
            return Err(TranscriptError::AlreadyResolved(id.clone()));
        }

        message.text = text.into();
        message.pending = false;
        Ok(())
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of placeholders still waiting for a reply
    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.pending).count()
    }

    /// Whether an append happened since the last call
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_assigns_unique_ids_in_order() {
        let mut transcript = Transcript::new();
        let a = transcript.append("one", Sender::User, false);
        let b = transcript.append("two", Sender::Bot, true);
        let c = transcript.append("three", Sender::User, false);

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
        let texts: Vec<_> = transcript.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert_eq!(transcript.pending_count(), 1);
    }

    #[test]
    fn test_resolve_exactly_once() {
        let mut transcript = Transcript::new();
        let id = transcript.append("Thinking...", Sender::Bot, true);

        transcript.resolve(&id, "42").unwrap();
        let message = transcript.get(&id).unwrap();
        assert_eq!(message.text, "42");
        assert!(!message.pending);

        assert_eq!(
            transcript.resolve(&id, "43"),
            Err(TranscriptError::AlreadyResolved(id.clone()))
        );
        assert_eq!(transcript.get(&id).unwrap().text, "42");
    }

    #[test]
    fn test_resolve_unknown_id() {
        let mut transcript = Transcript::new();
        let mut other = Transcript::new();
        other.append("x", Sender::User, false);
        let foreign = other.append("y", Sender::Bot, true);

        transcript.append("a", Sender::User, false);
        transcript.append("b", Sender::User, false);
        assert!(matches!(
            transcript.resolve(&foreign, "z"),
            Err(TranscriptError::UnknownMessage(_))
        ));
    }

    #[test]
    fn test_append_does_not_touch_previous_entries() {
        let mut transcript = Transcript::new();
        let first = transcript.append("hello @search_agent", Sender::User, false);
        let placeholder = transcript.append("Thinking...", Sender::Bot, true);
        let before = transcript.get(&first).unwrap().clone();

        transcript.append("second", Sender::User, false);
        transcript.append("Thinking...", Sender::Bot, true);
        transcript.resolve(&placeholder, "done").unwrap();

        assert_eq!(transcript.get(&first).unwrap(), &before);
        assert_eq!(transcript.pending_count(), 1);
    }

    #[test]
    fn test_scroll_request_set_by_append() {
        let mut transcript = Transcript::new();
        assert!(!transcript.take_scroll_request());
        transcript.append("x", Sender::User, false);
        assert!(transcript.take_scroll_request());
        assert!(!transcript.take_scroll_request());
    }

    #[test]
    fn test_mention_segments() {
        assert_eq!(
            mention_segments("ask @search_agent and @db now"),
            vec![
                Segment::Text("ask "),
                Segment::Mention("@search_agent"),
                Segment::Text(" and "),
                Segment::Mention("@db"),
                Segment::Text(" now"),
            ]
        );
        assert_eq!(mention_segments("@a"), vec![Segment::Mention("@a")]);
        assert_eq!(mention_segments("mail@ "), vec![Segment::Text("mail@ ")]);
        assert!(mention_segments("").is_empty());
    }

    #[test]
    fn test_mentions_are_ascii_only() {
        assert_eq!(mention_segments("hi @你好"), vec![Segment::Text("hi @你好")]);
        assert_eq!(
            mention_segments("@db你好"),
            vec![Segment::Mention("@db"), Segment::Text("你好")]
        );
    }

    #[test]
    fn test_ids_unique_across_transcripts() {
        let mut first = Transcript::new();
        let mut second = Transcript::new();
        let a = first.append("x", Sender::User, false);
        let b = second.append("y", Sender::User, false);
        let c = first.append("z", Sender::User, false);
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert!(first.get(&b).is_none());
    }

    #[test]
    fn test_markup_stays_literal() {
        let text = "<b>@search_agent</b> <script>alert(1)</script>";
        let segments = mention_segments(text);
        assert_eq!(
            segments,
            vec![
                Segment::Text("<b>"),
                Segment::Mention("@search_agent"),
                Segment::Text("</b> <script>alert(1)</script>"),
            ]
        );
    }

    #[test]
    fn test_bot_text_never_has_mentions() {
        let mut transcript = Transcript::new();
        let id = transcript.append("ping @search_agent", Sender::Bot, false);
        let message = transcript.get(&id).unwrap();
        assert_eq!(message.segments(), vec![Segment::Text("ping @search_agent")]);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_segments_reassemble_text(text in "[a-z @_<>&]{0,40}") {
                let joined: String = mention_segments(&text)
                    .into_iter()
                    .map(|s| match s {
                        Segment::Text(t) | Segment::Mention(t) => t,
                    })
                    .collect();
                prop_assert_eq!(joined, text);
            }
        }
    }
}
