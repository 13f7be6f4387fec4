//! Session engine: the turn-taking protocol with the recommendation
//! backend.
//!
//! The engine runs in a background task and consumes operations from a
//! channel, so overlapping sends are queued and dispatched strictly in
//! order: the request for turn N always carries the identity and
//! continuation state produced by turn N-1's response.

use anyhow::Result;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::client::ChatbotClient;
use crate::core::events::Event;
use crate::core::reveal::{RevealItem, RevealQueue};
use crate::core::transcript::{Sender, SharedTranscript};
use crate::models::{ChatRequest, ChatResponse, ReplyField, ReplyPayload, StructuredReply};
use crate::notify::SharedNotifier;

/// Shown as a normal bot message whenever a turn fails; raw errors never
/// reach the transcript.
pub const APOLOGY_TEXT: &str =
    "😔 Lo siento, hubo un error al conectar con el servidor. ¿Podrías intentarlo de nuevo?";

const OP_CHANNEL_CAPACITY: usize = 32;

// === Types ===

/// Backend-facing conversation identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// Assigned by the backend on the first exchange; never cleared while
    /// the surface lives.
    pub conversation_id: Option<i64>,
    /// Opaque continuation state, replaced wholesale when the backend
    /// returns one.
    pub state: Option<Value>,
}

impl Session {
    /// Fold one response into the session. Returns true when the
    /// conversation identity was set or confirmed.
    pub fn absorb(&mut self, response: &ChatResponse) -> bool {
        if let Some(state) = &response.state {
            self.state = Some(state.clone());
        }
        if let Some(id) = response.id_conversation {
            self.conversation_id = Some(id);
            return true;
        }
        false
    }
}

/// Operations accepted by the engine.
#[derive(Debug, Clone)]
pub enum Op {
    /// Dispatch one user turn.
    UserMessage(String),
}

/// Handle to communicate with the engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx_op: mpsc::Sender<Op>,
}

impl EngineHandle {
    /// Send an operation to the engine.
    pub async fn send(&self, op: Op) -> Result<()> {
        self.tx_op.send(op).await?;
        Ok(())
    }
}

// === Engine ===

struct SessionEngine {
    client: ChatbotClient,
    transcript: SharedTranscript,
    reveal: RevealQueue,
    tx_event: mpsc::UnboundedSender<Event>,
    notifier: SharedNotifier,
    session: Session,
}

/// Spawn the session engine and return its handle.
pub fn spawn_session_engine(
    client: ChatbotClient,
    transcript: SharedTranscript,
    reveal: RevealQueue,
    tx_event: mpsc::UnboundedSender<Event>,
    notifier: SharedNotifier,
) -> EngineHandle {
    let (tx_op, rx_op) = mpsc::channel(OP_CHANNEL_CAPACITY);
    let engine = SessionEngine {
        client,
        transcript,
        reveal,
        tx_event,
        notifier,
        session: Session::default(),
    };
    tokio::spawn(engine.run(rx_op));
    EngineHandle { tx_op }
}

impl SessionEngine {
    async fn run(mut self, mut rx_op: mpsc::Receiver<Op>) {
        while let Some(op) = rx_op.recv().await {
            match op {
                Op::UserMessage(text) => self.handle_user_message(text).await,
            }
        }
    }

    async fn handle_user_message(&mut self, text: String) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }

        let handle = {
            let mut transcript = lock(&self.transcript);
            transcript.push_user(trimmed.to_string())
        };
        self.notifier.message_appended(Sender::User);
        let _ = self.tx_event.send(Event::MessageAppended { handle });
        let _ = self.tx_event.send(Event::TurnStarted);

        let request = ChatRequest {
            message: trimmed.to_string(),
            id_conversation: self.session.conversation_id,
            state: self.session.state.clone(),
        };

        match self.client.send_message(&request).await {
            Ok(response) => {
                if self.session.absorb(&response) {
                    let _ = self.tx_event.send(Event::SessionUpdated {
                        conversation_id: self.session.conversation_id,
                    });
                }
                self.reveal.enqueue(reply_to_items(response.reply));
                let _ = self.tx_event.send(Event::TurnFinished { ok: true });
            }
            Err(error) => {
                // Identity and continuation state survive a failed turn so
                // the next attempt retries with the same conversation.
                tracing::warn!("turn failed: {error}");
                self.reveal
                    .enqueue(vec![RevealItem::Text(APOLOGY_TEXT.to_string())]);
                let _ = self.tx_event.send(Event::TurnFinished { ok: false });
            }
        }
    }
}

// === Reply Fan-Out ===

/// Flatten a reply into ordered reveal items.
fn reply_to_items(reply: ReplyField) -> Vec<RevealItem> {
    reply.into_payloads().into_iter().map(payload_to_item).collect()
}

fn payload_to_item(payload: ReplyPayload) -> RevealItem {
    match payload {
        ReplyPayload::Structured(StructuredReply::CourseDetail(detail)) => {
            RevealItem::Course(detail)
        }
        ReplyPayload::Enveloped { text, .. } | ReplyPayload::Text(text) => RevealItem::Text(text),
        ReplyPayload::Other(value) => RevealItem::Text(coerce_to_text(&value)),
    }
}

/// Textual rendering for payload shapes the client does not recognize.
fn coerce_to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn lock(
    transcript: &SharedTranscript,
) -> std::sync::MutexGuard<'_, crate::core::transcript::Transcript> {
    match transcript.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
