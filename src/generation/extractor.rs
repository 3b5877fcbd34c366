//! Textual isolation of a SQL statement from model output.
//!
//! Models preface answers with prose and wrap them in code fences; this
//! strips both. No syntax validation happens here: text without a SELECT
//! token passes through trimmed but unchanged so the validator, not the
//! extractor, decides rejection.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Fence markers with an optional language tag, e.g. ```sql
    static ref FENCE: Regex = Regex::new(r"```[A-Za-z]*").unwrap();
    static ref SELECT_TOKEN: Regex = Regex::new(r"(?i)\bselect\b").unwrap();
}

/// Strip code fences, then drop everything before the first SELECT token.
pub fn extract(raw: &str) -> String {
    let unfenced = FENCE.replace_all(raw, "");
    let trimmed = unfenced.trim();
    match SELECT_TOKEN.find(trimmed) {
        Some(token) => trimmed[token.start()..].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_statement() {
        assert_eq!(
            extract("```sql\nSELECT * FROM patient\n```"),
            "SELECT * FROM patient"
        );
    }

    #[test]
    fn test_fence_without_language_tag() {
        assert_eq!(extract("```\nSELECT 1\n```"), "SELECT 1");
    }

    #[test]
    fn test_plain_statement_unchanged() {
        assert_eq!(extract("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_leading_prose_is_discarded() {
        assert_eq!(
            extract("Here is the query: SELECT amount FROM billing WHERE bill_id = 1"),
            "SELECT amount FROM billing WHERE bill_id = 1"
        );
    }

    #[test]
    fn test_lowercase_select_found() {
        assert_eq!(
            extract("Sure!\nselect gender from patient"),
            "select gender from patient"
        );
    }

    #[test]
    fn test_no_select_returns_trimmed_text() {
        assert_eq!(extract("  DROP TABLE patient;\n"), "DROP TABLE patient;");
    }

    #[test]
    fn test_select_inside_word_is_not_a_token() {
        // "selected" must not be mistaken for the statement start
        assert_eq!(
            extract("I selected nothing useful"),
            "I selected nothing useful"
        );
    }

    #[test]
    fn test_prose_before_fenced_statement() {
        assert_eq!(
            extract("The answer:\n```sql\nSELECT gender FROM patient\n```\n"),
            "SELECT gender FROM patient"
        );
    }
}
