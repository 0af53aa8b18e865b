//! Redaction of credentials and card data before values reach the logs

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

const REDACTED: &str = "[REDACTED]";

fn sensitive_key() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)authorization|secret|token|api[_-]?key|bearer|credential|cvv|number")
            .expect("sensitive key pattern is valid")
    })
}

fn bearer_token() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)Bearer\s+\w+").expect("bearer pattern is valid"))
}

fn secret_key() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"sk_(?:test|live)_\w+").expect("secret key pattern is valid"))
}

fn public_key() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"pk_(?:test|live)_\w+").expect("public key pattern is valid"))
}

/// Copy of `value` with sensitive fields replaced.
///
/// Keys that look like credentials are replaced wholesale. Inside a `card`
/// object only `cvv` and `number` are hidden so the rest stays debuggable.
/// Bearer tokens and API keys embedded in strings are scrubbed.
pub fn redact_sensitive(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(redact_str(s)),
        Value::Array(items) => Value::Array(items.iter().map(redact_sensitive).collect()),
        Value::Object(map) => {
            let mut redacted = Map::with_capacity(map.len());
            for (key, value) in map {
                let replacement = if key.eq_ignore_ascii_case("card")
                    && (value.is_object() || value.is_array())
                {
                    redact_card(value)
                } else if sensitive_key().is_match(key) {
                    Value::String(REDACTED.to_string())
                } else {
                    redact_sensitive(value)
                };
                redacted.insert(key.clone(), replacement);
            }
            Value::Object(redacted)
        }
        other => other.clone(),
    }
}

fn redact_card(card: &Value) -> Value {
    match card {
        Value::Array(items) => Value::Array(items.iter().map(redact_card).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let replacement = if key == "cvv" || key == "number" {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact_sensitive(value)
                    };
                    (key.clone(), replacement)
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Scrub tokens and keys embedded in free text
pub fn redact_str(text: &str) -> String {
    let text = bearer_token().replace_all(text, "Bearer [REDACTED]");
    let text = secret_key().replace_all(&text, "[REDACTED_SECRET_KEY]");
    public_key()
        .replace_all(&text, "[REDACTED_PUBLIC_KEY]")
        .into_owned()
}
