//! Concurrent record writer.

use std::path::Path;

use futures::StreamExt;
use tracing::{error, info};

use super::plan::PlannedWrite;
use crate::error::SyncResult;

/// Result of writing one planned record.
#[derive(Debug)]
pub struct WriteOutcome {
    /// Output filename.
    pub filename: String,
    /// Whether the file was written.
    pub result: SyncResult<()>,
}

/// Write every planned record into `output_dir`, at most `concurrency` at a time.
///
/// Existing files are overwritten. Returns one outcome per planned write,
/// only after all of them have finished; completion order is not preserved.
pub async fn write_planned(
    writes: Vec<PlannedWrite>,
    output_dir: &Path,
    concurrency: usize,
) -> Vec<WriteOutcome> {
    futures::stream::iter(writes)
        .map(|write| async move {
            let result = write_one(&write, output_dir).await;
            match &result {
                Ok(()) => info!(file = %write.filename, "Wrote record"),
                Err(e) => error!(file = %write.filename, error = %e, "Failed to write record"),
            }
            WriteOutcome {
                filename: write.filename,
                result,
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

async fn write_one(write: &PlannedWrite, output_dir: &Path) -> SyncResult<()> {
    let json = write.record.to_pretty_json()?;
    tokio::fs::write(output_dir.join(&write.filename), json).await?;
    Ok(())
}
