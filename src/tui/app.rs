//! Application state for the cursochat TUI.

use crate::core::events::Event;
use crate::core::reveal::RevealQueue;
use crate::core::session::{EngineHandle, Op};
use crate::core::surface::{ChatSurface, OpenOutcome, greeting_batch};
use crate::core::transcript::SharedTranscript;

const MAX_INPUT_CHARS: usize = 2_000;

// === Types ===

/// Options resolved from the CLI before the TUI starts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TuiOptions {
    /// Ring the terminal bell on bot messages.
    pub sound: bool,
}

/// Mutable state behind the TUI event loop.
pub struct App {
    pub surface: ChatSurface,
    pub transcript: SharedTranscript,
    pub engine: EngineHandle,
    pub reveal: RevealQueue,
    /// Composer contents, edited in place.
    pub input: String,
    /// True between dispatching a turn and processing its response.
    pub turn_in_flight: bool,
    /// True only while the greeting sequence is being enqueued.
    pub display_suppressed: bool,
    /// Lines scrolled up from the transcript bottom.
    pub scroll_offset: u16,
    pub should_quit: bool,
}

// === App ===

impl App {
    #[must_use]
    pub fn new(transcript: SharedTranscript, engine: EngineHandle, reveal: RevealQueue) -> Self {
        Self {
            surface: ChatSurface::new(),
            transcript,
            engine,
            reveal,
            input: String::new(),
            turn_in_flight: false,
            display_suppressed: false,
            scroll_offset: 0,
            should_quit: false,
        }
    }

    /// Open the chat surface, starting the greeting sequence on the first
    /// open of an empty transcript. Display stays suppressed until the
    /// greeting batch has been enqueued.
    pub fn open_chat(&mut self) {
        let transcript_is_empty = self.lock_transcript().is_empty();
        match self.surface.open(transcript_is_empty) {
            OpenOutcome::Greet => {
                self.display_suppressed = true;
                self.reveal.enqueue(greeting_batch());
                self.display_suppressed = false;
            }
            OpenOutcome::Resume | OpenOutcome::AlreadyOpen => {}
        }
    }

    /// Close the surface. Reveals and in-flight requests keep running.
    pub fn close_chat(&mut self) {
        self.surface.close();
    }

    /// Submit the composer contents as one user turn.
    pub async fn submit_input(&mut self) {
        let text = std::mem::take(&mut self.input);
        if text.trim().is_empty() {
            return;
        }
        self.scroll_offset = 0;
        if self.engine.send(Op::UserMessage(text)).await.is_err() {
            tracing::error!("engine channel closed; dropping user message");
        }
    }

    /// Fold one engine/scheduler event into the UI state.
    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::TurnStarted => self.turn_in_flight = true,
            Event::TurnFinished { .. } => self.turn_in_flight = false,
            _ => {}
        }
    }

    pub fn push_input_char(&mut self, ch: char) {
        if self.input.chars().count() < MAX_INPUT_CHARS {
            self.input.push(ch);
        }
    }

    pub fn pop_input_char(&mut self) {
        self.input.pop();
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    fn lock_transcript(&self) -> std::sync::MutexGuard<'_, crate::core::transcript::Transcript> {
        match self.transcript.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
