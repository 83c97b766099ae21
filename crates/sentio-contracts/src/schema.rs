//! Expected response shapes for generation capability calls.
//!
//! Each stage declares up front which of a small closed set of shapes it
//! expects back. `ResponseSchema::decode` checks a raw JSON value against
//! that shape and produces a loosely-typed [`GeneratedPayload`]; anything
//! that does not fit is a [`GenerationError::Parse`].
//!
//! Decoding is deliberately shallow. It enforces shape (object vs. list,
//! string vs. number) and nothing more; value-level cleanup such as label
//! normalization, confidence clamping, and theme deduplication belongs to
//! the stage that made the call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GenerationError;

/// The closed set of payload shapes a capability can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSchema {
    /// An object with an optional `label` string and optional `confidence`
    /// number.
    Sentiment,
    /// A list of theme strings, either bare or under a `themes` key.
    Themes,
    /// A list of action strings, either bare or under an `actions` key.
    Actions,
}

/// A capability response that passed shape checking but not yet
/// normalization.
///
/// Sentiment fields are optional here on purpose: an absent label is a soft
/// condition the stage defaults (neutral, confidence 0.0, with a note), not
/// a parse failure.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedPayload {
    Sentiment {
        label: Option<String>,
        confidence: Option<f64>,
    },
    Themes(Vec<String>),
    Actions(Vec<String>),
}

impl ResponseSchema {
    /// Check `value` against this schema and extract the payload.
    pub fn decode(&self, value: &Value) -> Result<GeneratedPayload, GenerationError> {
        match self {
            Self::Sentiment => decode_sentiment(value),
            Self::Themes => {
                decode_string_list(value, "themes").map(GeneratedPayload::Themes)
            }
            Self::Actions => {
                decode_string_list(value, "actions").map(GeneratedPayload::Actions)
            }
        }
    }
}

fn decode_sentiment(value: &Value) -> Result<GeneratedPayload, GenerationError> {
    let obj = value.as_object().ok_or_else(|| parse_err(format!(
        "expected a sentiment object, got {}",
        kind_of(value)
    )))?;

    let label = match obj.get("label") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            return Err(parse_err(format!(
                "expected 'label' to be a string, got {}",
                kind_of(other)
            )))
        }
    };

    let confidence = match obj.get("confidence") {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.as_f64().ok_or_else(|| {
            parse_err(format!(
                "expected 'confidence' to be a number, got {}",
                kind_of(v)
            ))
        })?),
    };

    Ok(GeneratedPayload::Sentiment { label, confidence })
}

/// Accepts either a bare JSON array of strings or an object wrapping one
/// under `key`. Providers constrained to object-shaped output use the
/// wrapped form; everything else can answer with the bare list.
fn decode_string_list(value: &Value, key: &str) -> Result<Vec<String>, GenerationError> {
    let list = match value {
        Value::Array(items) => items,
        Value::Object(obj) => match obj.get(key) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(parse_err(format!(
                    "expected '{key}' to be a list, got {}",
                    kind_of(other)
                )))
            }
            None => {
                return Err(parse_err(format!(
                    "expected a list or an object with a '{key}' key"
                )))
            }
        },
        other => {
            return Err(parse_err(format!(
                "expected a list, got {}",
                kind_of(other)
            )))
        }
    };

    let mut out = Vec::with_capacity(list.len());
    for item in list {
        match item {
            Value::String(s) => out.push(s.clone()),
            other => {
                return Err(parse_err(format!(
                    "expected every list element to be a string, got {}",
                    kind_of(other)
                )))
            }
        }
    }
    Ok(out)
}

fn parse_err(reason: String) -> GenerationError {
    GenerationError::Parse { reason }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sentiment_decodes_full_object() {
        let value = json!({"label": "positive", "confidence": 0.92});
        let payload = ResponseSchema::Sentiment.decode(&value).unwrap();
        assert_eq!(
            payload,
            GeneratedPayload::Sentiment {
                label: Some("positive".to_string()),
                confidence: Some(0.92),
            }
        );
    }

    /// An absent label is not a parse failure; the stage defaults it later.
    #[test]
    fn sentiment_tolerates_missing_fields() {
        let value = json!({});
        let payload = ResponseSchema::Sentiment.decode(&value).unwrap();
        assert_eq!(
            payload,
            GeneratedPayload::Sentiment {
                label: None,
                confidence: None,
            }
        );
    }

    #[test]
    fn sentiment_rejects_non_object() {
        let err = ResponseSchema::Sentiment.decode(&json!("positive")).unwrap_err();
        assert!(matches!(err, GenerationError::Parse { .. }));
        assert!(err.to_string().contains("expected a sentiment object"));
    }

    #[test]
    fn sentiment_rejects_wrongly_typed_label() {
        let err = ResponseSchema::Sentiment
            .decode(&json!({"label": 3, "confidence": 0.5}))
            .unwrap_err();
        assert!(err.to_string().contains("'label'"));
    }

    #[test]
    fn themes_decodes_bare_list() {
        let payload = ResponseSchema::Themes
            .decode(&json!(["delivery", "support"]))
            .unwrap();
        assert_eq!(
            payload,
            GeneratedPayload::Themes(vec!["delivery".to_string(), "support".to_string()])
        );
    }

    #[test]
    fn themes_decodes_wrapped_list() {
        let payload = ResponseSchema::Themes
            .decode(&json!({"themes": ["price"]}))
            .unwrap();
        assert_eq!(payload, GeneratedPayload::Themes(vec!["price".to_string()]));
    }

    /// Free prose where a list was expected is the canonical parse failure.
    #[test]
    fn themes_rejects_prose() {
        let err = ResponseSchema::Themes
            .decode(&json!("the customer mostly talks about delivery"))
            .unwrap_err();
        assert!(matches!(err, GenerationError::Parse { .. }));
        assert!(err.to_string().contains("expected a list"));
    }

    #[test]
    fn themes_rejects_mixed_element_types() {
        let err = ResponseSchema::Themes
            .decode(&json!(["delivery", 42]))
            .unwrap_err();
        assert!(err.to_string().contains("every list element"));
    }

    #[test]
    fn actions_decodes_wrapped_list() {
        let payload = ResponseSchema::Actions
            .decode(&json!({"actions": ["Call the customer back"]}))
            .unwrap();
        assert_eq!(
            payload,
            GeneratedPayload::Actions(vec!["Call the customer back".to_string()])
        );
    }

    #[test]
    fn actions_rejects_object_without_key() {
        let err = ResponseSchema::Actions
            .decode(&json!({"items": []}))
            .unwrap_err();
        assert!(err.to_string().contains("'actions'"));
    }
}
