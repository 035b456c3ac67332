//! Exported record type and filename derivation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// File extension appended to every normalized id.
pub const RECORD_EXTENSION: &str = ".json";

/// One exported document: a string-keyed mapping of arbitrary JSON values.
///
/// Keys keep the order in which the export tool emitted them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create a record from a parsed JSON value. Returns `None` for non-objects.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Get the string value of `field`, if present and a string.
    pub fn id(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Remove `field` without disturbing the order of the remaining keys.
    pub fn strip_field(&mut self, field: &str) -> Option<Value> {
        self.0.shift_remove(field)
    }

    /// Serialize with 2-space indentation and a trailing newline.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string_pretty(&self.0)?;
        json.push('\n');
        Ok(json)
    }
}

/// Derive the output filename for a record id.
///
/// Spaces become `_`, `@` becomes `-`, the result is lowercased and
/// `.json` appended. No other characters are touched.
pub fn normalize_filename(id: &str) -> String {
    let mut name = id.replace(' ', "_").replace('@', "-").to_lowercase();
    name.push_str(RECORD_EXTENSION);
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_filename() {
        assert_eq!(normalize_filename("My Source @ Foo"), "my_source_-_foo.json");
        assert_eq!(normalize_filename("plain"), "plain.json");
        assert_eq!(normalize_filename("a@b@c"), "a-b-c.json");
        assert_eq!(normalize_filename(""), ".json");
    }

    #[test]
    fn test_normalize_filename_case_collision() {
        assert_eq!(normalize_filename("Foo"), normalize_filename("foo"));
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Record::from_value(json!([1, 2])).is_none());
        assert!(Record::from_value(json!("id")).is_none());
        assert!(Record::from_value(json!({"id": "x"})).is_some());
    }

    #[test]
    fn test_strip_field_preserves_order() {
        let mut record = Record::from_value(json!({
            "name": "n",
            "_id": {"$oid": "65a1"},
            "id": "x",
            "kind": "k"
        }))
        .unwrap();

        let removed = record.strip_field("_id");
        assert_eq!(removed, Some(json!({"$oid": "65a1"})));

        let value = serde_json::to_value(&record).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["name", "id", "kind"]);
    }

    #[test]
    fn test_id_requires_string() {
        let record = Record::from_value(json!({"id": 42})).unwrap();
        assert_eq!(record.id("id"), None);

        let record = Record::from_value(json!({"id": "abc"})).unwrap();
        assert_eq!(record.id("id"), Some("abc"));
    }

    #[test]
    fn test_to_pretty_json() {
        let record = Record::from_value(json!({"id": "x", "tags": ["a"]})).unwrap();
        let text = record.to_pretty_json().unwrap();
        assert_eq!(text, "{\n  \"id\": \"x\",\n  \"tags\": [\n    \"a\"\n  ]\n}\n");
    }
}
