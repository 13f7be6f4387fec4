//! Chat surface lifecycle: open/close state and the first-open greeting.

use crate::core::reveal::RevealItem;

/// Fixed greeting sequence revealed on the first open of an empty chat.
pub const GREETING_LINES: [&str; 4] = [
    "👋 ¡Hola! Soy tu asistente para encontrar cursos perfectos para ti.",
    "Me encanta conectar a las personas con oportunidades de aprendizaje que realmente les sirvan.",
    "Para empezar, **¿sobre qué tema te gustaría aprender?**",
    "_Puede ser cualquier cosa: programación, marketing, salud, arte, idiomas... ¡Tú dime!_ 🌟",
];

// === Types ===

/// Open/close state of the chat surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceState {
    #[default]
    Closed,
    Open,
}

/// What the caller must do after an `open` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// First open of an empty transcript: enqueue the greeting sequence.
    Greet,
    /// Reopen with existing history: show the transcript as-is.
    Resume,
    /// The surface was already open; nothing to do.
    AlreadyOpen,
}

/// Lifecycle state machine for the chat surface.
///
/// The greeting runs at most once per transcript lifetime: the `greeted`
/// latch closes the window where the greeting batch is enqueued but its
/// first placeholder has not landed in the transcript yet.
#[derive(Debug, Default)]
pub struct ChatSurface {
    state: SurfaceState,
    greeted: bool,
}

// === ChatSurface ===

impl ChatSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == SurfaceState::Open
    }

    /// Transition to open. Returns whether the greeting must start.
    pub fn open(&mut self, transcript_is_empty: bool) -> OpenOutcome {
        if self.state == SurfaceState::Open {
            return OpenOutcome::AlreadyOpen;
        }
        self.state = SurfaceState::Open;
        if transcript_is_empty && !self.greeted {
            self.greeted = true;
            OpenOutcome::Greet
        } else {
            OpenOutcome::Resume
        }
    }

    /// Transition to closed. Mutates nothing but the surface flag;
    /// in-flight reveals and requests keep running.
    pub fn close(&mut self) {
        self.state = SurfaceState::Closed;
    }
}

/// The greeting sequence as one reveal batch.
#[must_use]
pub fn greeting_batch() -> Vec<RevealItem> {
    GREETING_LINES
        .iter()
        .map(|line| RevealItem::Text((*line).to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_open_of_empty_transcript_greets() {
        let mut surface = ChatSurface::new();
        assert!(!surface.is_open());
        assert_eq!(surface.open(true), OpenOutcome::Greet);
        assert!(surface.is_open());
    }

    #[test]
    fn reopen_with_history_skips_the_greeting() {
        let mut surface = ChatSurface::new();
        surface.open(true);
        surface.close();
        assert_eq!(surface.open(false), OpenOutcome::Resume);
    }

    #[test]
    fn greeting_never_repeats_even_if_transcript_still_empty() {
        // Close/reopen can race the first greeting placeholder; the
        // latch keeps the sequence from running twice.
        let mut surface = ChatSurface::new();
        assert_eq!(surface.open(true), OpenOutcome::Greet);
        surface.close();
        assert_eq!(surface.open(true), OpenOutcome::Resume);
    }

    #[test]
    fn open_while_open_is_a_no_op() {
        let mut surface = ChatSurface::new();
        surface.open(true);
        assert_eq!(surface.open(true), OpenOutcome::AlreadyOpen);
    }

    #[test]
    fn greeting_batch_matches_the_fixed_lines() {
        let batch = greeting_batch();
        assert_eq!(batch.len(), 4);
        assert_eq!(
            batch[2],
            RevealItem::Text("Para empezar, **¿sobre qué tema te gustaría aprender?**".to_string())
        );
    }
}
