//! `mongoexport` runner.
//!
//! Invokes the tool once, waits for it, and captures both output streams.
//! There is no retry; a non-zero exit is reported as [`SyncError::Export`].

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::{SyncConfig, URI_ENV};
use crate::error::{ErrorCode, SyncError, SyncResult};
use crate::traits::{DataExporter, ExportOutput};

/// Exports a collection with `mongoexport` (or a compatible executable).
#[derive(Debug)]
pub struct MongoExport {
    command: String,
    uri: SecretString,
    database: String,
    collection: String,
    timeout: Option<Duration>,
}

impl MongoExport {
    /// Create a runner for `collection` in `database`.
    pub fn new(
        command: impl Into<String>,
        uri: SecretString,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            uri,
            database: database.into(),
            collection: collection.into(),
            timeout: None,
        }
    }

    /// Kill the export if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build a runner from the sync configuration.
    ///
    /// Fails if no connection URI was configured.
    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        let uri = config
            .uri
            .as_ref()
            .ok_or_else(|| SyncError::configuration(format!("{URI_ENV} is not set")))?;

        let runner = Self::new(
            config.export_command.clone(),
            SecretString::new(uri.expose_secret().clone()),
            config.database.clone(),
            config.collection.clone(),
        );

        Ok(match config.export_timeout_secs {
            Some(secs) => runner.with_timeout(Duration::from_secs(secs)),
            None => runner,
        })
    }

    /// Arguments passed to the tool, URI included.
    fn args(&self, dump_path: &Path) -> Vec<String> {
        vec![
            format!("--uri={}", self.uri.expose_secret()),
            format!("--db={}", self.database),
            format!("--collection={}", self.collection),
            format!("--out={}", dump_path.display()),
        ]
    }
}

#[async_trait]
impl DataExporter for MongoExport {
    async fn export(&self, dump_path: &Path) -> SyncResult<ExportOutput> {
        info!(
            command = %self.command,
            database = %self.database,
            collection = %self.collection,
            out = %dump_path.display(),
            "Starting export"
        );

        let child = Command::new(&self.command)
            .args(self.args(dump_path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SyncError::export_spawn(format!("failed to start '{}'", self.command), e)
            })?;

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| {
                    SyncError::export(
                        format!("'{}' timed out after {:?}", self.command, timeout),
                        ErrorCode::ExpTimeout,
                    )
                })??,
            None => child.wait_with_output().await?,
        };

        let result = ExportOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(stdout = %result.stdout, stderr = %result.stderr, "Export output");

        if !output.status.success() {
            return Err(SyncError::export(
                format!(
                    "'{}' exited with {}: {}",
                    self.command,
                    output.status,
                    result.stderr.trim()
                ),
                ErrorCode::ExpNonZeroExit,
            ));
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        &self.command
    }
}
