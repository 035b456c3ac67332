//! Split parsed dump values into one pretty-printed file per record.
//!
//! Splitting happens in two phases:
//! 1. [`plan_writes`] strips the identity field, derives filenames and
//!    resolves collisions, so every filename is written at most once.
//! 2. [`write_planned`] writes all files concurrently and waits for every
//!    write to settle before returning.
//!
//! # Example
//!
//! ```ignore
//! use wsk_sync_core::split::{split_records, SplitOptions};
//!
//! let stats = split_records(values, &SplitOptions::from(&config), &config.output_dir).await?;
//! println!("Wrote {}/{} records", stats.written, stats.total);
//! ```

pub mod plan;
pub mod writer;

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use tracing::info;

use crate::config::SyncConfig;
use crate::error::SyncResult;

pub use plan::{plan_writes, Collision, PlannedWrite, WritePlan};
pub use writer::{write_planned, WriteOutcome};

/// What to do when two ids normalize to the same filename.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CollisionPolicy {
    /// Last record in dump order is written.
    #[default]
    Overwrite,
    /// First record in dump order is written.
    KeepFirst,
    /// Abort before writing anything.
    Fail,
}

/// Settings for one split run.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Field used to derive the filename.
    pub id_field: String,
    /// Field removed from every record.
    pub identity_field: String,
    /// Collision handling.
    pub collision_policy: CollisionPolicy,
    /// Maximum concurrent writes.
    pub write_concurrency: usize,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            id_field: "id".to_string(),
            identity_field: "_id".to_string(),
            collision_policy: CollisionPolicy::Overwrite,
            write_concurrency: 16,
        }
    }
}

impl From<&SyncConfig> for SplitOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            id_field: config.id_field.clone(),
            identity_field: config.identity_field.clone(),
            collision_policy: config.collision_policy,
            write_concurrency: config.write_concurrency,
        }
    }
}

/// Statistics from a split operation.
#[derive(Debug, Default, Clone)]
pub struct SplitStats {
    /// Records found in the dump.
    pub total: u64,
    /// Files successfully written.
    pub written: u64,
    /// Records not written because another record took their filename.
    pub superseded: u64,
    /// Filenames shared by more than one record.
    pub collisions: Vec<Collision>,
    /// Filenames written, sorted.
    pub files: Vec<String>,
    /// Error messages for skipped records and failed writes.
    pub errors: Vec<String>,
}

impl SplitStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if every planned file was written.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Plan and write every record in `values` into `output_dir`.
///
/// Returns once all writes have completed or failed. Only a collision under
/// [`CollisionPolicy::Fail`] aborts; per-record problems land in
/// [`SplitStats::errors`].
pub async fn split_records(
    values: Vec<Value>,
    options: &SplitOptions,
    output_dir: &Path,
) -> SyncResult<SplitStats> {
    let plan = plan_writes(values, options)?;

    let mut stats = SplitStats::new();
    stats.total = plan.total;
    stats.superseded = plan.superseded;
    stats.collisions = plan.collisions;
    stats.errors = plan.errors;

    let outcomes = write_planned(plan.writes, output_dir, options.write_concurrency).await;
    for outcome in outcomes {
        match outcome.result {
            Ok(()) => {
                stats.written += 1;
                stats.files.push(outcome.filename);
            }
            Err(e) => stats
                .errors
                .push(format!("Write error for {}: {}", outcome.filename, e)),
        }
    }
    stats.files.sort();

    info!(
        total = stats.total,
        written = stats.written,
        superseded = stats.superseded,
        errors = stats.errors.len(),
        "Processed {} records",
        stats.total
    );

    Ok(stats)
}
