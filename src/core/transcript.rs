//! Conversation transcript: the ordered message history of one chat.
//!
//! Appends return a handle, and the typing scheduler mutates revealed
//! text only through that handle. The transcript is append-only for
//! every other component.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::models::CourseDetail;

// === Types ===

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// Reveal lifecycle of a bot message. User messages are always complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Complete,
    Revealing,
}

/// Message body: plain text or a structured course record.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Course(CourseDetail),
}

/// One conversational turn as displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub sender: Sender,
    pub content: MessageContent,
    pub timestamp: DateTime<Utc>,
    pub reveal_state: RevealState,
}

impl Message {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.reveal_state == RevealState::Complete
    }

    /// Plain text of this message, if it has any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            MessageContent::Course(_) => None,
        }
    }
}

/// Stable address of an appended message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle(usize);

/// Ordered message history. Append-only except for the progressive text
/// of the message a reveal handle points at.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

pub type SharedTranscript = Arc<Mutex<Transcript>>;

#[must_use]
pub fn new_shared_transcript() -> SharedTranscript {
    Arc::new(Mutex::new(Transcript::default()))
}

// === Transcript ===

impl Transcript {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn get(&self, handle: MessageHandle) -> Option<&Message> {
        self.messages.get(handle.0)
    }

    /// Append a completed user message.
    pub fn push_user(&mut self, text: String) -> MessageHandle {
        self.push(Message {
            sender: Sender::User,
            content: MessageContent::Text(text),
            timestamp: Utc::now(),
            reveal_state: RevealState::Complete,
        })
    }

    /// Append an empty bot placeholder that a reveal will grow.
    pub fn push_bot_placeholder(&mut self) -> MessageHandle {
        self.push(Message {
            sender: Sender::Bot,
            content: MessageContent::Text(String::new()),
            timestamp: Utc::now(),
            reveal_state: RevealState::Revealing,
        })
    }

    /// Append an already-complete bot message (structured records skip
    /// the reveal pipeline).
    pub fn push_bot_complete(&mut self, content: MessageContent) -> MessageHandle {
        self.push(Message {
            sender: Sender::Bot,
            content,
            timestamp: Utc::now(),
            reveal_state: RevealState::Complete,
        })
    }

    /// Extend the revealed prefix of the message behind `handle`.
    ///
    /// Only grows text of a message still in `Revealing` state, keeping
    /// the monotonic-prefix invariant.
    pub fn push_progress(&mut self, handle: MessageHandle, grapheme: &str) {
        if let Some(message) = self.messages.get_mut(handle.0)
            && message.reveal_state == RevealState::Revealing
            && let MessageContent::Text(text) = &mut message.content
        {
            text.push_str(grapheme);
        }
    }

    /// Mark the message behind `handle` fully revealed.
    pub fn finish_reveal(&mut self, handle: MessageHandle) {
        if let Some(message) = self.messages.get_mut(handle.0) {
            message.reveal_state = RevealState::Complete;
        }
    }

    fn push(&mut self, message: Message) -> MessageHandle {
        self.messages.push(message);
        MessageHandle(self.messages.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_are_complete_on_append() {
        let mut transcript = Transcript::default();
        let handle = transcript.push_user("hola".to_string());
        let message = transcript.get(handle).unwrap();
        assert_eq!(message.sender, Sender::User);
        assert!(message.is_complete());
        assert_eq!(message.text(), Some("hola"));
    }

    #[test]
    fn progress_grows_text_through_the_handle() {
        let mut transcript = Transcript::default();
        let first = transcript.push_bot_placeholder();
        // A concurrent append must not confuse the reveal target.
        let second = transcript.push_bot_placeholder();

        transcript.push_progress(first, "h");
        transcript.push_progress(first, "o");
        transcript.push_progress(second, "x");

        assert_eq!(transcript.get(first).unwrap().text(), Some("ho"));
        assert_eq!(transcript.get(second).unwrap().text(), Some("x"));
    }

    #[test]
    fn progress_on_a_complete_message_is_ignored() {
        let mut transcript = Transcript::default();
        let handle = transcript.push_bot_placeholder();
        transcript.push_progress(handle, "a");
        transcript.finish_reveal(handle);
        transcript.push_progress(handle, "b");

        let message = transcript.get(handle).unwrap();
        assert!(message.is_complete());
        assert_eq!(message.text(), Some("a"));
    }

    #[test]
    fn structured_records_append_complete() {
        let mut transcript = Transcript::default();
        let handle = transcript.push_bot_complete(MessageContent::Course(CourseDetail {
            message: "m".to_string(),
            course_name: "n".to_string(),
            course_url: "https://udea.edu.co/cursos?q=1".to_string(),
            display_text: "d".to_string(),
            continue_message: None,
        }));
        assert!(transcript.get(handle).unwrap().is_complete());
    }
}
