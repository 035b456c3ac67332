//! Dump parsing: turn the export tool's output into JSON values.
//!
//! Two strategies are available:
//! - [`DumpFormat::Stream`] reads back-to-back JSON values with a streaming
//!   deserializer. Whitespace between values is irrelevant.
//! - [`DumpFormat::Splice`] rewrites `}\n{` boundaries to `},{` and parses the
//!   result as one array. Kept for parity with dumps produced by older
//!   tooling; boundary mismatches are reported as parse errors.

pub mod splice;
pub mod stream;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::SyncResult;

pub use splice::parse_spliced;
pub use stream::parse_stream;

/// How dump text is split into records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DumpFormat {
    /// Streaming parse of concatenated JSON values.
    #[default]
    Stream,
    /// Textual boundary rewrite into a JSON array.
    Splice,
}

/// Parse dump text into values using the given strategy.
pub fn parse_dump(text: &str, format: DumpFormat) -> SyncResult<Vec<Value>> {
    match format {
        DumpFormat::Stream => parse_stream(text),
        DumpFormat::Splice => parse_spliced(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_format_from_str() {
        assert_eq!("stream".parse::<DumpFormat>().unwrap(), DumpFormat::Stream);
        assert_eq!("splice".parse::<DumpFormat>().unwrap(), DumpFormat::Splice);
        assert!("array".parse::<DumpFormat>().is_err());
        assert_eq!(DumpFormat::Splice.to_string(), "splice");
    }

    #[test]
    fn test_formats_agree_on_plain_dump() {
        let text = "{\"id\":\"a\",\"n\":1}\n{\"id\":\"b\",\"n\":2}\n";
        let streamed = parse_dump(text, DumpFormat::Stream).unwrap();
        let spliced = parse_dump(text, DumpFormat::Splice).unwrap();
        assert_eq!(streamed, spliced);
        assert_eq!(streamed.len(), 2);
    }
}
