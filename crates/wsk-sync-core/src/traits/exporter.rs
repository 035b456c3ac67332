//! Exporter trait: produces the dump file the splitter consumes.

use std::path::Path;

use async_trait::async_trait;

use crate::error::SyncResult;

/// Captured output of a finished export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOutput {
    /// Standard output of the export tool.
    pub stdout: String,
    /// Standard error of the export tool. `mongoexport` reports progress here.
    pub stderr: String,
}

/// Exports a collection to a newline-delimited JSON dump file.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataExporter: Send + Sync {
    /// Write the dump to `dump_path`, returning the tool's captured output.
    ///
    /// Any failure means no usable dump exists.
    async fn export(&self, dump_path: &Path) -> SyncResult<ExportOutput>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}
