//! Host payloads for the rewrite hooks
//!
//! The host hands over either a model response or an outgoing message made
//! of typed segments. Only plain-text segments are ever rewritten; every
//! other segment is carried through exactly as received.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Text returned by a language-model call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmResponse {
    #[serde(default)]
    pub completion_text: String,
}

/// One segment of an outgoing message
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Plain text, eligible for rewriting
    Plain { text: String },

    /// Anything else (images, mentions, ...) - preserved raw
    Other { raw: Value },
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Segment::Plain { text: text.into() }
    }
}

impl<'de> Deserialize<'de> for Segment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;

        if let Some(obj) = value.as_object() {
            let is_plain = obj
                .get("type")
                .and_then(|v| v.as_str())
                .is_some_and(|t| t.eq_ignore_ascii_case("plain"));
            if is_plain {
                if let Some(text) = obj.get("text").and_then(|v| v.as_str()) {
                    return Ok(Segment::Plain {
                        text: text.to_string(),
                    });
                }
            }
        }

        Ok(Segment::Other { raw: value })
    }
}

impl Serialize for Segment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Segment::Plain { text } => {
                serde_json::json!({ "type": "Plain", "text": text }).serialize(serializer)
            }
            Segment::Other { raw } => raw.serialize(serializer),
        }
    }
}

/// A hook invocation as read from stdin by the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "hook", rename_all = "snake_case")]
pub enum HookEvent {
    /// Fired after a language-model call returns
    LlmResponse(LlmResponse),

    /// Fired for every outgoing message
    DecoratingResult {
        #[serde(default)]
        chain: Vec<Segment>,
    },
}

impl HookEvent {
    /// Parse input from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Hook name for logs
    pub fn name(&self) -> &'static str {
        match self {
            HookEvent::LlmResponse(_) => "llm_response",
            HookEvent::DecoratingResult { .. } => "decorating_result",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_llm_response() {
        let json = r#"{"hook":"llm_response","completion_text":"hello"}"#;
        let event = HookEvent::from_json(json).unwrap();
        match event {
            HookEvent::LlmResponse(resp) => assert_eq!(resp.completion_text, "hello"),
            _ => panic!("Expected LlmResponse"),
        }
    }

    #[test]
    fn test_parse_chain_segments() {
        let json = r#"{"hook":"decorating_result","chain":[
            {"type":"Plain","text":"hi"},
            {"type":"Image","url":"https://example.com/a.png"},
            {"type":"Plain"}
        ]}"#;
        let event = HookEvent::from_json(json).unwrap();
        let HookEvent::DecoratingResult { chain } = event else {
            panic!("Expected DecoratingResult");
        };
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0], Segment::plain("hi"));
        assert!(matches!(chain[1], Segment::Other { .. }));
        // plain without text is not rewritable
        assert!(matches!(chain[2], Segment::Other { .. }));
    }

    #[test]
    fn test_other_segment_round_trips_verbatim() {
        let raw = serde_json::json!({"type":"At","qq":12345,"name":"bob"});
        let segment: Segment = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&segment).unwrap(), raw);
    }

    #[test]
    fn test_event_to_json_keeps_tag() {
        let event = HookEvent::DecoratingResult {
            chain: vec![Segment::plain("x")],
        };
        let json = event.to_json();
        assert!(json.contains(r#""hook":"decorating_result""#));
        assert!(json.contains(r#""type":"Plain""#));
    }

    #[test]
    fn test_unknown_hook_rejected() {
        assert!(HookEvent::from_json(r#"{"hook":"other"}"#).is_err());
    }
}
