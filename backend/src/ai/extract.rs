use serde_json::{Map, Value};

/// Pulls a JSON object out of a model's text answer.
pub trait JsonExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Option<Map<String, Value>>;
}

/// Greedy match from the first `{` to the last `}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BraceMatchExtractor;

impl JsonExtractor for BraceMatchExtractor {
    fn extract(&self, text: &str) -> Option<Map<String, Value>> {
        let start = text.find('{')?;
        let end = text.rfind('}')?;
        if end < start {
            return None;
        }
        match serde_json::from_str::<Value>(&text[start..=end]) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("Brace-matched completion is not valid JSON: {}", e);
                None
            }
        }
    }
}

/// For providers with a structured-output mode: the whole answer must be the object.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredExtractor;

impl JsonExtractor for StructuredExtractor {
    fn extract(&self, text: &str) -> Option<Map<String, Value>> {
        match serde_json::from_str::<Value>(text.trim()) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

pub fn number_field(obj: Option<&Map<String, Value>>, key: &str) -> Option<f64> {
    match obj?.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

pub fn string_field(obj: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    match obj?.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn bool_field(obj: Option<&Map<String, Value>>, key: &str) -> Option<bool> {
    match obj?.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
