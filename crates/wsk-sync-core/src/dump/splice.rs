//! Boundary-rewrite parser for newline-delimited objects.
//!
//! The dump is turned into an array by replacing every `}\n{` with `},{`
//! and wrapping the text in brackets. A raw `}\n{` inside a string value
//! would be rewritten too, so the number of parsed records is checked
//! against the number of rewritten boundaries.

use serde_json::Value;

use crate::error::{SyncError, SyncResult};

const BOUNDARY: &str = "}\n{";
const JOINED: &str = "},{";

/// Parse newline-delimited objects by rewriting them into a JSON array.
pub fn parse_spliced(text: &str) -> SyncResult<Vec<Value>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let boundaries = text.matches(BOUNDARY).count();
    let array = format!("[{}]", text.replace(BOUNDARY, JOINED));

    let values: Vec<Value> = serde_json::from_str(&array)
        .map_err(|e| SyncError::parse(format!("spliced dump is not a JSON array: {e}")))?;

    if values.len() != boundaries + 1 {
        return Err(SyncError::parse(format!(
            "found {} record boundaries but parsed {} records; a value likely contains a raw '}}\\n{{'",
            boundaries,
            values.len()
        )));
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_spliced_basic() {
        let text = "{\"id\":\"a\"}\n{\"id\":\"b\"}\n";
        let values = parse_spliced(text).unwrap();
        assert_eq!(values, vec![json!({"id": "a"}), json!({"id": "b"})]);
    }

    #[test]
    fn test_parse_spliced_single_record() {
        let values = parse_spliced("{\"id\":\"only\"}").unwrap();
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_parse_spliced_empty() {
        assert!(parse_spliced("").unwrap().is_empty());
        assert!(parse_spliced("\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_spliced_escaped_boundary_survives() {
        // Escaped newline is two characters, so it is not a boundary.
        let text = "{\"id\":\"a\",\"body\":\"x}\\n{y\"}\n{\"id\":\"b\"}";
        let values = parse_spliced(text).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0]["body"], json!("x}\n{y"));
    }

    #[test]
    fn test_parse_spliced_raw_boundary_in_string_is_detected() {
        // The rewrite turns the string into "x},{y", which parses, but the
        // record count no longer matches the boundary count.
        let text = "{\"id\":\"a\",\"body\":\"x}\n{y\"}\n{\"id\":\"b\"}\n";
        let err = parse_spliced(text).unwrap_err();
        assert!(err.to_string().contains("boundaries"));
    }

    #[test]
    fn test_parse_spliced_crlf_is_rejected() {
        // Only `\n` boundaries are rewritten.
        let text = "{\"id\":\"a\"}\r\n{\"id\":\"b\"}";
        assert!(parse_spliced(text).is_err());
    }
}
