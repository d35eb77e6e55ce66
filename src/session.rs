//! Chat session identity
//!
//! A session groups the chat turns of one process run for the backend. The
//! identifier is generated once and never persisted.

use uuid::Uuid;

use crate::client::ChatRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
    user_id: String,
}

impl Session {
    /// Start a session with a fresh random identifier
    pub fn new(user_id: impl Into<String>) -> Self {
        Self::with_id(format!("session_{}", Uuid::new_v4().simple()), user_id)
    }

    pub fn with_id(id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Build the `/chat/run` body for one turn
    pub fn request(&self, input: impl Into<String>) -> ChatRequest {
        ChatRequest {
            user_id: self.user_id.clone(),
            session_id: self.id.clone(),
            input: input.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_unique() {
        let a = Session::new("test_user");
        let b = Session::new("test_user");
        assert_ne!(a.id(), b.id());
        assert!(a.id().starts_with("session_"));
    }

    #[test]
    fn test_request_carries_identity() {
        let session = Session::with_id("session_1", "alice");
        let request = session.request("hello");
        assert_eq!(request.user_id, "alice");
        assert_eq!(request.session_id, "session_1");
        assert_eq!(request.input, "hello");
    }
}
