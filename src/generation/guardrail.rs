//! Read-only classification of extracted statements.
//!
//! The check is textual, not a full parse: the statement must begin with a
//! SELECT token, and a statement terminator followed by further text
//! rejects it as a batch. The scan skips string literals, quoted
//! identifiers and comments so a `;` inside them does not count. On
//! rejection the pipeline stops before any warehouse call is made.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("only read-only queries are permitted")]
    NotSelectOnly,

    #[error("multi-statement batches are not permitted")]
    MultipleStatements,
}

/// Classify a statement as read-only-safe, returning the trimmed text.
/// Idempotent: accepted output validates to the same outcome again.
pub fn validate(sql: &str) -> Result<String, RejectionReason> {
    let trimmed = sql.trim();
    if !begins_with_select(trimmed) {
        return Err(RejectionReason::NotSelectOnly);
    }
    if let Some(end) = statement_end(trimmed) {
        if !trimmed[end + 1..].trim().is_empty() {
            return Err(RejectionReason::MultipleStatements);
        }
    }
    Ok(trimmed.to_string())
}

fn begins_with_select(text: &str) -> bool {
    let mut chars = text.chars();
    let prefix: String = chars.by_ref().take(6).collect();
    if !prefix.eq_ignore_ascii_case("select") {
        return false;
    }
    // A word character after the prefix means a longer identifier, not SELECT
    match chars.next() {
        Some(c) => !(c.is_ascii_alphanumeric() || c == '_'),
        None => true,
    }
}

/// Byte offset of the first statement terminator outside literals,
/// quoted identifiers and comments.
fn statement_end(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_quoted(bytes, i, bytes[i]);
                continue;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
                continue;
            }
            b';' => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index just past the closing quote, honoring backslash escapes and
/// doubled-quote escapes. An unterminated literal runs to the end.
fn skip_quoted(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
        } else if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
            } else {
                return i + 1;
            }
        } else {
            i += 1;
        }
    }
    bytes.len()
}
