//! UI-agnostic conversation state
//!
//! The transcript and the session fields are plain owned data. Nothing here
//! performs I/O; the dispatcher in [`crate::conversation`] is the only writer.

use serde::{Deserialize, Serialize};

/// A single entry in the transcript. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Error,
            content: content.into(),
        }
    }
}

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    Error,
}

impl ChatRole {
    pub fn label(&self) -> &'static str {
        match self {
            ChatRole::User => "You",
            ChatRole::Assistant => "Answer",
            ChatRole::Error => "Error",
        }
    }
}

/// Append-only, ordered message log.
///
/// Insertion order is display order. Entries cannot be removed or edited;
/// `revision` changes on every append so a view can tell when to follow
/// the tail.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    revision: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.revision += 1;
    }

    pub fn snapshot(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Editable inputs plus the single-flight lock.
#[derive(Debug, Default, Clone)]
pub struct Session {
    url: String,
    draft_question: String,
    pending: bool,
    last_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn draft_question(&self) -> &str {
        &self.draft_question
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Stored verbatim, no normalization.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn set_draft_question(&mut self, question: impl Into<String>) {
        self.draft_question = question.into();
    }

    pub fn url_mut(&mut self) -> &mut String {
        &mut self.url
    }

    pub fn draft_question_mut(&mut self) -> &mut String {
        &mut self.draft_question
    }

    /// Takes the lock. Returns false, changing nothing, when the draft is
    /// blank or a request is already outstanding.
    pub fn begin_submission(&mut self) -> bool {
        if self.pending || self.draft_question.trim().is_empty() {
            return false;
        }
        self.pending = true;
        self.last_error = None;
        true
    }

    /// Releases the lock and clears the draft. Must run on every exit path.
    pub fn end_submission(&mut self) {
        self.pending = false;
        self.draft_question.clear();
    }

    pub(crate) fn record_error(&mut self, message: &str) {
        self.last_error = Some(message.to_string());
    }
}
