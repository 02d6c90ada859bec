//! Redaction helpers for values that end up in logs.

/// Redact a bearer token, keeping a short prefix for debugging
pub fn redact_token(token: &str) -> String {
    match token.char_indices().nth(8) {
        Some((end, _)) => format!("{}...[REDACTED]", &token[..end]),
        None => "[REDACTED]".to_string(),
    }
}
