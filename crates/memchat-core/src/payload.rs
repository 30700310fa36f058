//! Inbound payload decoding.
//!
//! The server sends JSON of several shapes on the same channel. Frames are
//! decoded once, here, into [`Inbound`]; everything downstream matches on
//! the variant instead of probing the raw value.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A decoded server payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// `{"error": ...}` with a truthy error value
    Error(String),
    /// Array of retrieved snippet hits (possibly empty)
    SnippetList(Vec<SnippetHit>),
    /// Plain JSON string, `{"reply": ...}` or `{"message": ...}`
    PlainReply(String),
    /// Valid JSON of any other shape
    Unrecognized(Value),
}

/// One retrieved content match.
///
/// Fields are only populated when the element carries them with the expected
/// JSON type; anything else is treated as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnippetHit {
    /// Memory text (preferred preview source)
    pub memory: Option<String>,
    /// Raw text (fallback preview source)
    pub text: Option<String>,
    /// Relevance score
    pub score: Option<f64>,
}

impl SnippetHit {
    /// Leniently read a hit from one array element.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let string_field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_owned);
        Self {
            memory: string_field("memory"),
            text: string_field("text"),
            score: value.get("score").and_then(Value::as_f64),
        }
    }

    /// Preview source: `memory`, else `text`.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.memory.as_deref().or(self.text.as_deref())
    }
}

impl Inbound {
    /// Decode a raw text frame.
    ///
    /// Fails only when the frame is not JSON at all.
    pub fn decode(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw).map_err(Error::Decode)?;
        Ok(Self::from_value(value))
    }

    /// Classify an already-parsed JSON value.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let error = value.get("error").filter(|v| is_truthy(v)).map(describe);
        if let Some(error) = error {
            return Self::Error(error);
        }

        match value {
            Value::Array(items) => {
                Self::SnippetList(items.iter().map(SnippetHit::from_value).collect())
            }
            Value::String(text) => Self::PlainReply(text),
            Value::Object(map) => match reply_text(&map) {
                Some(text) => Self::PlainReply(text),
                None => Self::Unrecognized(Value::Object(map)),
            },
            other => Self::Unrecognized(other),
        }
    }
}

/// `{"reply": "..."}` from the minimal server, or the room broadcast
/// `{"message": "...", "sender_id": ..., "chat_id": ...}`.
fn reply_text(map: &Map<String, Value>) -> Option<String> {
    ["reply", "message"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_error_object() {
        let payload = Inbound::decode(r#"{"error":"x"}"#).unwrap();
        assert_eq!(payload, Inbound::Error("x".to_string()));
    }

    #[test]
    fn test_error_takes_precedence_over_reply() {
        let payload = Inbound::from_value(json!({"error": "quota", "reply": "ignored"}));
        assert_eq!(payload, Inbound::Error("quota".to_string()));
    }

    #[test]
    fn test_falsy_error_is_not_an_error() {
        let payload = Inbound::from_value(json!({"error": "", "reply": "hello"}));
        assert_eq!(payload, Inbound::PlainReply("hello".to_string()));

        let payload = Inbound::from_value(json!({"error": null}));
        assert!(matches!(payload, Inbound::Unrecognized(_)));
    }

    #[test]
    fn test_non_string_error_is_described() {
        let payload = Inbound::from_value(json!({"error": {"code": 401}}));
        assert_eq!(payload, Inbound::Error(r#"{"code":401}"#.to_string()));
    }

    #[test]
    fn test_decode_snippet_list() {
        let payload = Inbound::decode(
            r#"[{"memory":"m1","score":0.91},{"text":"t2"},{"memory":7,"text":"t3","score":"high"},42]"#,
        )
        .unwrap();

        let Inbound::SnippetList(hits) = payload else {
            panic!("expected SnippetList");
        };
        assert_eq!(hits.len(), 4);
        assert_eq!(hits[0].content(), Some("m1"));
        assert_eq!(hits[0].score, Some(0.91));
        assert_eq!(hits[1].content(), Some("t2"));
        assert_eq!(hits[1].score, None);
        // wrong-typed fields are ignored
        assert_eq!(hits[2].memory, None);
        assert_eq!(hits[2].content(), Some("t3"));
        assert_eq!(hits[2].score, None);
        assert_eq!(hits[3], SnippetHit::default());
    }

    #[test]
    fn test_integer_score_is_numeric() {
        let hit = SnippetHit::from_value(&json!({"memory": "m", "score": 1}));
        assert_eq!(hit.score, Some(1.0));
    }

    #[test]
    fn test_decode_empty_array() {
        assert_eq!(Inbound::decode("[]").unwrap(), Inbound::SnippetList(vec![]));
    }

    #[test]
    fn test_decode_plain_string() {
        assert_eq!(
            Inbound::decode(r#""hello there""#).unwrap(),
            Inbound::PlainReply("hello there".to_string())
        );
    }

    #[test]
    fn test_decode_reply_object() {
        assert_eq!(
            Inbound::decode(r#"{"reply":"from variant two"}"#).unwrap(),
            Inbound::PlainReply("from variant two".to_string())
        );
    }

    #[test]
    fn test_decode_room_broadcast() {
        let raw = r#"{"message":"Bob sent it Tuesday","sender_id":"u1","chat_id":"c9"}"#;
        assert_eq!(
            Inbound::decode(raw).unwrap(),
            Inbound::PlainReply("Bob sent it Tuesday".to_string())
        );
    }

    #[test]
    fn test_decode_unrecognized_shapes() {
        for raw in ["42", "true", "null", r#"{"status":"ok"}"#, r#"{"reply":5}"#] {
            let payload = Inbound::decode(raw).unwrap();
            assert!(
                matches!(payload, Inbound::Unrecognized(_)),
                "{raw} should be unrecognized"
            );
        }
    }

    #[test]
    fn test_decode_malformed_json() {
        let err = Inbound::decode("{bad").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
