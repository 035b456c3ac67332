//! End-to-end sync pipeline.
//!
//! Verifies the output directory, runs the export, parses the dump, writes
//! one file per record, then removes the dump. Each step runs only if the
//! previous one succeeded; per-record write failures do not stop the run.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::dump::parse_dump;
use crate::error::{SyncError, SyncResult};
use crate::split::{split_records, SplitOptions, SplitStats};
use crate::traits::{DataExporter, ExportOutput};

/// Outcome of a completed run.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Captured output of the export tool.
    pub export: ExportOutput,
    /// Split statistics, available after every write has settled.
    pub split: SplitStats,
    /// Whether the dump file was removed.
    pub dump_removed: bool,
}

/// Export-and-split pipeline.
pub struct SyncPipeline<E: DataExporter> {
    config: SyncConfig,
    exporter: E,
}

impl<E: DataExporter> SyncPipeline<E> {
    /// Create a pipeline from an explicit configuration and exporter.
    pub fn new(config: SyncConfig, exporter: E) -> Self {
        Self { config, exporter }
    }

    /// Run the pipeline once.
    pub async fn run(&self) -> SyncResult<SyncReport> {
        let config = &self.config;
        ensure_output_dir(&config.output_dir).await?;

        info!(exporter = self.exporter.name(), "Exporting collection");
        let export = self.exporter.export(&config.dump_path).await?;
        info!(stdout = %export.stdout.trim(), "Export stdout");
        info!(stderr = %export.stderr.trim(), "Export stderr");

        let text = tokio::fs::read_to_string(&config.dump_path).await?;
        debug!(bytes = text.len(), format = %config.dump_format, "Read dump");

        // A dump that fails to parse is left on disk for inspection.
        let values = parse_dump(&text, config.dump_format)?;
        drop(text);

        let split = split_records(values, &SplitOptions::from(config), &config.output_dir).await?;
        if !split.is_success() || !split.collisions.is_empty() {
            warn!(
                errors = split.errors.len(),
                collisions = split.collisions.len(),
                policy = %config.collision_policy,
                "Split finished with problems"
            );
        }

        let dump_removed = if config.keep_dump {
            info!(dump = %config.dump_path.display(), "Keeping dump");
            false
        } else {
            remove_dump(&config.dump_path).await
        };

        Ok(SyncReport {
            export,
            split,
            dump_removed,
        })
    }
}

async fn ensure_output_dir(path: &Path) -> SyncResult<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        _ => Err(SyncError::MissingOutputDir {
            path: path.display().to_string(),
        }),
    }
}

async fn remove_dump(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(dump = %path.display(), "Removed dump");
            true
        }
        Err(e) => {
            warn!(dump = %path.display(), error = %e, "Failed to remove dump");
            false
        }
    }
}
