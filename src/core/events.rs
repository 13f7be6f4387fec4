//! Events emitted by the session engine and typing scheduler to the UI.
//!
//! These events flow over a channel so the UI redraws without polling
//! the transcript.

use crate::core::transcript::MessageHandle;

/// Events emitted to update the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // === Transcript Events ===
    /// A complete message was appended (user input or a structured record).
    MessageAppended { handle: MessageHandle },

    /// A reveal placeholder was appended and starts animating.
    RevealStarted { handle: MessageHandle },

    /// The revealed prefix of a message grew by one step.
    RevealProgress { handle: MessageHandle },

    /// A reveal reached the full text and the message is complete.
    RevealFinished { handle: MessageHandle },

    // === Turn Lifecycle ===
    /// A user message was dispatched to the backend.
    TurnStarted,

    /// The backend response (or failure) was processed.
    TurnFinished { ok: bool },

    /// The backend assigned or confirmed the conversation identity.
    SessionUpdated { conversation_id: Option<i64> },
}
