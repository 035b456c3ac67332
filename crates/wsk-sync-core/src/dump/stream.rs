//! Streaming parser for concatenated JSON values.

use serde_json::{Deserializer, Value};

use crate::error::{SyncError, SyncResult};

/// Parse every JSON value in `text`, in order.
///
/// A dump written with `--jsonArray` arrives as a single top-level array;
/// when the whole dump is one array its elements are returned as
/// individual values. An array among other values is kept as one value.
pub fn parse_stream(text: &str) -> SyncResult<Vec<Value>> {
    let mut values = Vec::new();
    let mut stream = Deserializer::from_str(text).into_iter::<Value>();

    while let Some(next) = stream.next() {
        match next {
            Ok(value) => values.push(value),
            Err(e) => {
                return Err(SyncError::parse(format!(
                    "record {} at byte {}: {}",
                    values.len() + 1,
                    stream.byte_offset(),
                    e
                )));
            }
        }
    }

    if let [Value::Array(_)] = values.as_slice() {
        if let Some(Value::Array(items)) = values.pop() {
            return Ok(items);
        }
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_stream_ndjson() {
        let text = "{\"id\":\"a\"}\n{\"id\":\"b\"}\n{\"id\":\"c\"}\n";
        let values = parse_stream(text).unwrap();
        assert_eq!(values, vec![json!({"id": "a"}), json!({"id": "b"}), json!({"id": "c"})]);
    }

    #[test]
    fn test_parse_stream_ignores_layout() {
        let text = "{\"id\":\"a\"}{\"id\":\"b\"}\r\n\r\n  {\n  \"id\": \"c\"\n}";
        assert_eq!(parse_stream(text).unwrap().len(), 3);
    }

    #[test]
    fn test_parse_stream_escaped_boundary_in_string() {
        // The value contains `}` newline `{` as escaped JSON text.
        let text = "{\"id\":\"a\",\"body\":\"x}\\n{y\"}\n{\"id\":\"b\"}\n";
        let values = parse_stream(text).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0]["body"], json!("x}\n{y"));
    }

    #[test]
    fn test_parse_stream_json_array() {
        let text = "[{\"id\":\"a\"},{\"id\":\"b\"}]";
        assert_eq!(parse_stream(text).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_stream_array_among_records_is_one_value() {
        let text = "[{\"id\":\"a\"},{\"id\":\"b\"}]\n{\"id\":\"c\"}\n";
        let values = parse_stream(text).unwrap();
        assert_eq!(values.len(), 2);
        assert!(values[0].is_array());
        assert_eq!(values[1], json!({"id": "c"}));
    }

    #[test]
    fn test_parse_stream_error_index_counts_dump_values() {
        let text = "[1, 2, 3]\n{\"id\":\"b\"}\n{\"id\": }\n";
        let err = parse_stream(text).unwrap_err();
        assert!(err.to_string().contains("record 3"), "{err}");
    }

    #[test]
    fn test_parse_stream_empty() {
        assert!(parse_stream("").unwrap().is_empty());
        assert!(parse_stream("\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_stream_reports_position() {
        let text = "{\"id\":\"a\"}\n{\"id\": }\n";
        let err = parse_stream(text).unwrap_err();
        assert!(err.to_string().contains("record 2"));
    }
}
