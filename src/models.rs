//! Request/response models for the chatbot message endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// === Request ===

/// Request payload for one conversational turn.
///
/// The backend expects all three keys on every request; `id_conversation`
/// and `state` are serialized as `null` until the backend has assigned
/// them.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub id_conversation: Option<i64>,
    pub state: Option<Value>,
}

// === Response ===

/// Response payload for one conversational turn.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatResponse {
    pub reply: ReplyField,
    #[serde(default)]
    pub id_conversation: Option<i64>,
    #[serde(default)]
    pub state: Option<Value>,
}

/// The `reply` field: one payload or a sequence of payloads.
///
/// Older backend builds send a bare payload; newer ones send a list. Both
/// decode here so callers only ever see a sequence.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ReplyField {
    Many(Vec<ReplyPayload>),
    One(ReplyPayload),
}

impl ReplyField {
    /// Flatten into the canonical sequence-of-payloads shape.
    #[must_use]
    pub fn into_payloads(self) -> Vec<ReplyPayload> {
        match self {
            ReplyField::Many(items) => items,
            ReplyField::One(item) => vec![item],
        }
    }
}

/// One reply item as produced by the backend.
///
/// Variant order matters for untagged deserialization: structured records
/// carry a `type` discriminator, the envelope shape carries `text`, a bare
/// JSON string is plain text, and anything else falls through to `Other`
/// so a malformed item degrades to its textual rendering instead of
/// failing the turn.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ReplyPayload {
    Structured(StructuredReply),
    /// Per-line envelope used by one backend build: `{text, created_at}`.
    Enveloped {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        created_at: Option<String>,
    },
    Text(String),
    Other(Value),
}

/// Structured (non-text) reply records, discriminated by `type`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructuredReply {
    CourseDetail(CourseDetail),
}

/// A recommended course with a direct link.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CourseDetail {
    /// Lead-in text shown above the course name.
    pub message: String,
    pub course_name: String,
    pub course_url: String,
    /// Anchor text for the course link.
    pub display_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn request_serializes_absent_fields_as_null() {
        let request = ChatRequest {
            message: "Quiero aprender programación".to_string(),
            id_conversation: None,
            state: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "message": "Quiero aprender programación",
                "id_conversation": null,
                "state": null,
            })
        );
    }

    #[test]
    fn scalar_reply_decodes_as_single_payload() {
        let response: ChatResponse =
            serde_json::from_value(json!({"reply": "¿Qué nivel tienes?", "id_conversation": 42}))
                .unwrap();
        assert_eq!(response.id_conversation, Some(42));
        assert_eq!(
            response.reply.into_payloads(),
            vec![ReplyPayload::Text("¿Qué nivel tienes?".to_string())]
        );
    }

    #[test]
    fn sequence_reply_keeps_order() {
        let response: ChatResponse =
            serde_json::from_value(json!({"reply": ["a", "b"]})).unwrap();
        assert_eq!(
            response.reply.into_payloads(),
            vec![
                ReplyPayload::Text("a".to_string()),
                ReplyPayload::Text("b".to_string()),
            ]
        );
    }

    #[test]
    fn course_detail_decodes_from_tagged_object() {
        let payload: ReplyPayload = serde_json::from_value(json!({
            "type": "course_detail",
            "message": "Este curso encaja contigo:",
            "course_name": "Programación Básica",
            "course_url": "https://udea.edu.co/cursos?q=1234",
            "display_text": "Ver el curso",
        }))
        .unwrap();
        let ReplyPayload::Structured(StructuredReply::CourseDetail(detail)) = payload else {
            panic!("expected a course_detail record");
        };
        assert_eq!(detail.course_name, "Programación Básica");
        assert_eq!(detail.continue_message, None);
    }

    #[test]
    fn enveloped_reply_decodes_text_and_timestamp() {
        let payload: ReplyPayload = serde_json::from_value(json!({
            "text": "hola",
            "created_at": "2024-05-01T10:00:00Z",
        }))
        .unwrap();
        assert_eq!(
            payload,
            ReplyPayload::Enveloped {
                text: "hola".to_string(),
                created_at: Some("2024-05-01T10:00:00Z".to_string()),
            }
        );
    }

    #[test]
    fn unknown_object_falls_through_to_other() {
        let payload: ReplyPayload =
            serde_json::from_value(json!({"unexpected": true})).unwrap();
        assert!(matches!(payload, ReplyPayload::Other(_)));
    }

    #[test]
    fn state_round_trips_as_opaque_value() {
        let response: ChatResponse = serde_json::from_value(json!({
            "reply": "ok",
            "state": {"slots": {"tema": "programación"}, "step": 3},
        }))
        .unwrap();
        assert_eq!(
            response.state,
            Some(json!({"slots": {"tema": "programación"}, "step": 3}))
        );
    }
}
