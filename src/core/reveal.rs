//! Typing scheduler: progressive character-by-character reveal of bot
//! messages.
//!
//! A single worker task consumes reveal batches from an unbounded queue,
//! so at most one reveal animates at a time and batches never interleave:
//! each item of a batch is revealed to completion before the next item's
//! placeholder is appended, and a later batch only starts after the
//! earlier one has fully revealed. Closing the chat surface does not
//! touch the worker; an in-flight reveal always runs to completion.

use std::time::Duration;

use tokio::sync::mpsc;
use unicode_segmentation::UnicodeSegmentation;

use crate::core::events::Event;
use crate::core::transcript::{MessageContent, Sender, SharedTranscript};
use crate::models::CourseDetail;
use crate::notify::SharedNotifier;
use crate::settings::Settings;

// === Types ===

/// Timing knobs for the reveal animation.
#[derive(Debug, Clone, Copy)]
pub struct RevealOptions {
    /// Delay before each revealed grapheme.
    pub typing_delay: Duration,
    /// Pause between consecutive items of one batch.
    pub reply_pause: Duration,
}

impl RevealOptions {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            typing_delay: settings.typing_delay(),
            reply_pause: settings.reply_pause(),
        }
    }
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// One reveal job. Text animates; course records bypass the animation
/// and land already complete.
#[derive(Debug, Clone, PartialEq)]
pub enum RevealItem {
    Text(String),
    Course(CourseDetail),
}

/// Handle used to enqueue reveal batches. Enqueuing is synchronous and
/// never blocks; the worker drains batches strictly in order.
#[derive(Debug, Clone)]
pub struct RevealQueue {
    tx_batch: mpsc::UnboundedSender<Vec<RevealItem>>,
}

impl RevealQueue {
    /// Queue one backend reply (or greeting sequence) for ordered reveal.
    pub fn enqueue(&self, batch: Vec<RevealItem>) {
        if batch.is_empty() {
            return;
        }
        // The worker only stops when the process does; a send failure
        // means shutdown is already underway.
        let _ = self.tx_batch.send(batch);
    }
}

// === Worker ===

/// Spawn the reveal worker and return its queue handle.
pub fn spawn_reveal_worker(
    transcript: SharedTranscript,
    tx_event: mpsc::UnboundedSender<Event>,
    notifier: SharedNotifier,
    options: RevealOptions,
) -> RevealQueue {
    let (tx_batch, rx_batch) = mpsc::unbounded_channel();
    tokio::spawn(run_worker(rx_batch, transcript, tx_event, notifier, options));
    RevealQueue { tx_batch }
}

async fn run_worker(
    mut rx_batch: mpsc::UnboundedReceiver<Vec<RevealItem>>,
    transcript: SharedTranscript,
    tx_event: mpsc::UnboundedSender<Event>,
    notifier: SharedNotifier,
    options: RevealOptions,
) {
    while let Some(batch) = rx_batch.recv().await {
        for (index, item) in batch.into_iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(options.reply_pause).await;
            }
            match item {
                RevealItem::Course(detail) => {
                    let handle = lock(&transcript).push_bot_complete(MessageContent::Course(detail));
                    notifier.message_appended(Sender::Bot);
                    let _ = tx_event.send(Event::MessageAppended { handle });
                }
                RevealItem::Text(full_text) => {
                    let handle = lock(&transcript).push_bot_placeholder();
                    notifier.message_appended(Sender::Bot);
                    let _ = tx_event.send(Event::RevealStarted { handle });

                    for grapheme in full_text.graphemes(true) {
                        tokio::time::sleep(options.typing_delay).await;
                        lock(&transcript).push_progress(handle, grapheme);
                        let _ = tx_event.send(Event::RevealProgress { handle });
                    }

                    lock(&transcript).finish_reveal(handle);
                    let _ = tx_event.send(Event::RevealFinished { handle });
                }
            }
        }
    }
}

fn lock(transcript: &SharedTranscript) -> std::sync::MutexGuard<'_, crate::core::transcript::Transcript> {
    match transcript.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use crate::core::transcript::{RevealState, new_shared_transcript};
    use crate::notify::Silent;

    fn setup(options: RevealOptions) -> (SharedTranscript, RevealQueue, mpsc::UnboundedReceiver<Event>) {
        let transcript = new_shared_transcript();
        let (tx_event, rx_event) = mpsc::unbounded_channel();
        let queue = spawn_reveal_worker(transcript.clone(), tx_event, Arc::new(Silent), options);
        (transcript, queue, rx_event)
    }

    fn course(name: &str) -> CourseDetail {
        CourseDetail {
            message: "Te recomiendo:".to_string(),
            course_name: name.to_string(),
            course_url: "https://udea.edu.co/cursos?q=7".to_string(),
            display_text: "Ver el curso".to_string(),
            continue_message: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_emits_one_growing_prefix_per_grapheme() {
        let (transcript, queue, mut rx_event) = setup(RevealOptions::default());
        queue.enqueue(vec![RevealItem::Text("hola".to_string())]);

        let started = rx_event.recv().await.unwrap();
        let Event::RevealStarted { handle } = started else {
            panic!("expected RevealStarted, got {started:?}");
        };

        let mut snapshots = Vec::new();
        loop {
            match rx_event.recv().await.unwrap() {
                Event::RevealProgress { handle: progressed } => {
                    assert_eq!(progressed, handle);
                    let guard = transcript.lock().unwrap();
                    snapshots.push(guard.get(handle).unwrap().text().unwrap().to_string());
                }
                Event::RevealFinished { handle: finished } => {
                    assert_eq!(finished, handle);
                    break;
                }
                other => panic!("unexpected event {other:?}"),
            }
        }

        assert_eq!(snapshots, vec!["h", "ho", "hol", "hola"]);
        let guard = transcript.lock().unwrap();
        assert_eq!(guard.get(handle).unwrap().reveal_state, RevealState::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn emoji_reveal_steps_by_grapheme() {
        let (transcript, queue, mut rx_event) = setup(RevealOptions::default());
        queue.enqueue(vec![RevealItem::Text("👋🌟".to_string())]);

        let mut progress = 0;
        loop {
            match rx_event.recv().await.unwrap() {
                Event::RevealProgress { .. } => progress += 1,
                Event::RevealFinished { handle } => {
                    let guard = transcript.lock().unwrap();
                    assert_eq!(guard.get(handle).unwrap().text(), Some("👋🌟"));
                    break;
                }
                _ => {}
            }
        }
        assert_eq!(progress, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_items_reveal_strictly_in_order() {
        let (transcript, queue, mut rx_event) = setup(RevealOptions::default());
        queue.enqueue(vec![
            RevealItem::Text("a".to_string()),
            RevealItem::Text("b".to_string()),
        ]);

        let mut order = Vec::new();
        let mut finished = 0;
        while finished < 2 {
            match rx_event.recv().await.unwrap() {
                Event::RevealStarted { .. } => {
                    // The second placeholder must not exist until the
                    // first item fully revealed.
                    order.push(("started", transcript.lock().unwrap().len()));
                }
                Event::RevealFinished { .. } => {
                    finished += 1;
                    order.push(("finished", transcript.lock().unwrap().len()));
                }
                _ => {}
            }
        }

        assert_eq!(
            order,
            vec![("started", 1), ("finished", 1), ("started", 2), ("finished", 2)]
        );
        let guard = transcript.lock().unwrap();
        let texts: Vec<_> = guard.messages().iter().map(|m| m.text().unwrap()).collect();
        assert_eq!(texts, vec!["a", "b"]);
        assert!(guard.messages().iter().all(|m| m.is_complete()));
    }

    #[tokio::test(start_paused = true)]
    async fn course_records_bypass_the_animation() {
        let (transcript, queue, mut rx_event) = setup(RevealOptions::default());
        queue.enqueue(vec![RevealItem::Course(course("Programación Básica"))]);

        let event = rx_event.recv().await.unwrap();
        let Event::MessageAppended { handle } = event else {
            panic!("expected MessageAppended, got {event:?}");
        };
        let guard = transcript.lock().unwrap();
        let message = guard.get(handle).unwrap();
        assert!(message.is_complete());
        assert!(matches!(message.content, MessageContent::Course(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn later_batches_wait_for_earlier_ones() {
        let (transcript, queue, mut rx_event) = setup(RevealOptions::default());
        queue.enqueue(vec![RevealItem::Text("uno".to_string())]);
        queue.enqueue(vec![RevealItem::Text("dos".to_string())]);

        let mut finished_handles = Vec::new();
        while finished_handles.len() < 2 {
            if let Event::RevealFinished { handle } = rx_event.recv().await.unwrap() {
                finished_handles.push(handle);
            }
        }

        let guard = transcript.lock().unwrap();
        let texts: Vec<_> = guard.messages().iter().map(|m| m.text().unwrap()).collect();
        assert_eq!(texts, vec!["uno", "dos"]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_text_completes_without_progress() {
        let (_transcript, queue, mut rx_event) = setup(RevealOptions::default());
        queue.enqueue(vec![RevealItem::Text(String::new())]);

        assert!(matches!(
            rx_event.recv().await.unwrap(),
            Event::RevealStarted { .. }
        ));
        assert!(matches!(
            rx_event.recv().await.unwrap(),
            Event::RevealFinished { .. }
        ));
    }
}
