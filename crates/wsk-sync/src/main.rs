//! wsk-sync - export web source kinds and split them into per-kind files.
//!
//! Run from the repository root with no arguments.
//!
//! # Configuration
//!
//! - `MONGO_CONN_PROD` - Required, connection URI for the source store
//! - `WSK_OUTPUT_DIR` - Optional, defaults to
//!   `./modules/core/src/main/resources/web-source-kinds/`
//! - `WSK_CONFIG` - Optional TOML/JSON/YAML file with non-secret settings
//!
//! See `SyncConfig::from_env` for the full list. A `.env` file in the
//! working directory is loaded first.

use std::process::ExitCode;

use anyhow::{bail, Result};
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wsk_sync_core::{MongoExport, SyncConfig, SyncPipeline, SyncReport, SyncResult};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    if std::env::args().len() > 1 {
        bail!("wsk-sync takes no arguments; configure it through WSK_* environment variables");
    }

    let config = SyncConfig::from_env()?;
    info!(
        database = %config.database,
        collection = %config.collection,
        output_dir = %config.output_dir.display(),
        "Starting sync"
    );

    let exporter = MongoExport::from_config(&config)?;
    let pipeline = SyncPipeline::new(config, exporter);

    if report_outcome(&pipeline.run().await) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Log the outcome of a run once. Returns whether the run succeeded.
fn report_outcome(result: &SyncResult<SyncReport>) -> bool {
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            error!(code = e.code().as_str(), "{}", e);
            if let Some(suggestion) = e.suggestion() {
                error!("{}", suggestion);
            }
            return false;
        }
    };

    let split = &report.split;
    for collision in &split.collisions {
        warn!(
            file = %collision.filename,
            ids = ?collision.ids,
            "Distinct ids share one output file"
        );
    }
    info!(
        total = split.total,
        written = split.written,
        superseded = split.superseded,
        errors = split.errors.len(),
        "Sync finished"
    );

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use wsk_sync_core::{ErrorCode, SyncError};

    #[test]
    fn test_report_outcome_failure() {
        let result = Err(SyncError::export("boom", ErrorCode::ExpNonZeroExit));
        assert!(!report_outcome(&result));
    }

    #[test]
    fn test_report_outcome_success() {
        assert!(report_outcome(&Ok(SyncReport::default())));
    }
}
