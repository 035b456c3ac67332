//! Configuration system for wsk-sync.
//!
//! Settings are layered: defaults, then an optional config file named by
//! `WSK_CONFIG`, then individual `WSK_*` environment variables. The
//! connection URI is only ever read from `MONGO_CONN_PROD`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::dump::DumpFormat;
use crate::error::{SyncError, SyncResult};
use crate::split::CollisionPolicy;

/// Environment variable holding the store connection URI.
pub const URI_ENV: &str = "MONGO_CONN_PROD";

/// Default output directory, relative to the repository root.
pub const DEFAULT_OUTPUT_DIR: &str = "./modules/core/src/main/resources/web-source-kinds/";

/// Main sync configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Connection URI for the source store.
    #[serde(skip)]
    pub uri: Option<SecretString>,
    /// Source database name.
    pub database: String,
    /// Source collection name.
    pub collection: String,
    /// Export executable, resolved through `PATH`.
    pub export_command: String,
    /// Intermediate dump file written by the export tool.
    pub dump_path: PathBuf,
    /// Directory receiving one file per record. Must already exist.
    pub output_dir: PathBuf,
    /// Field used to derive the output filename.
    pub id_field: String,
    /// Store-internal identity field stripped before writing.
    pub identity_field: String,
    /// How the dump text is split into records.
    pub dump_format: DumpFormat,
    /// What to do when two ids normalize to the same filename.
    pub collision_policy: CollisionPolicy,
    /// Maximum number of record files written at once.
    pub write_concurrency: usize,
    /// Kill the export tool after this many seconds (default: wait forever).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_timeout_secs: Option<u64>,
    /// Keep the dump file after a successful run.
    pub keep_dump: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            uri: None,
            database: "precog".to_string(),
            collection: "web-source-kinds".to_string(),
            export_command: "mongoexport".to_string(),
            dump_path: PathBuf::from("./wsk.json"),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            id_field: "id".to_string(),
            identity_field: "_id".to_string(),
            dump_format: DumpFormat::default(),
            collision_policy: CollisionPolicy::default(),
            write_concurrency: 16,
            export_timeout_secs: None,
            keep_dump: false,
        }
    }
}

impl SyncConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    ///
    /// The connection URI is never read from a file.
    pub fn from_file(path: impl AsRef<Path>) -> SyncResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| SyncError::Configuration(e.to_string()))
            }
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| SyncError::Configuration(e.to_string()))
            }
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|e| SyncError::Configuration(e.to_string()))
            }
            _ => Err(SyncError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Create config from environment variables.
    ///
    /// Reads:
    /// - `MONGO_CONN_PROD` (connection URI)
    /// - `WSK_CONFIG` (optional config file, applied first)
    /// - `WSK_DATABASE`, `WSK_COLLECTION`, `WSK_EXPORT_COMMAND`
    /// - `WSK_DUMP_PATH`, `WSK_OUTPUT_DIR`
    /// - `WSK_ID_FIELD`, `WSK_IDENTITY_FIELD`
    /// - `WSK_DUMP_FORMAT` (`stream` | `splice`)
    /// - `WSK_COLLISION_POLICY` (`overwrite` | `keep_first` | `fail`)
    /// - `WSK_WRITE_CONCURRENCY`, `WSK_EXPORT_TIMEOUT_SECS`
    /// - `WSK_KEEP_DUMP` (set to keep the dump)
    pub fn from_env() -> SyncResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("WSK_CONFIG") {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(uri) = lookup(URI_ENV) {
            config.uri = Some(SecretString::new(uri));
        }
        if let Some(database) = lookup("WSK_DATABASE") {
            config.database = database;
        }
        if let Some(collection) = lookup("WSK_COLLECTION") {
            config.collection = collection;
        }
        if let Some(command) = lookup("WSK_EXPORT_COMMAND") {
            config.export_command = command;
        }
        if let Some(path) = lookup("WSK_DUMP_PATH") {
            config.dump_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("WSK_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(path);
        }
        if let Some(field) = lookup("WSK_ID_FIELD") {
            config.id_field = field;
        }
        if let Some(field) = lookup("WSK_IDENTITY_FIELD") {
            config.identity_field = field;
        }
        if let Some(format) = lookup("WSK_DUMP_FORMAT") {
            config.dump_format = parse_var("WSK_DUMP_FORMAT", &format)?;
        }
        if let Some(policy) = lookup("WSK_COLLISION_POLICY") {
            config.collision_policy = parse_var("WSK_COLLISION_POLICY", &policy)?;
        }
        if let Some(concurrency) = lookup("WSK_WRITE_CONCURRENCY") {
            config.write_concurrency = parse_var("WSK_WRITE_CONCURRENCY", &concurrency)?;
        }
        if let Some(timeout) = lookup("WSK_EXPORT_TIMEOUT_SECS") {
            config.export_timeout_secs = Some(parse_var("WSK_EXPORT_TIMEOUT_SECS", &timeout)?);
        }
        if lookup("WSK_KEEP_DUMP").is_some() {
            config.keep_dump = true;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check settings that cannot be expressed in the type system.
    pub fn validate(&self) -> SyncResult<()> {
        if self.write_concurrency == 0 {
            return Err(SyncError::configuration(
                "write_concurrency must be at least 1",
            ));
        }
        if self.id_field.is_empty() {
            return Err(SyncError::configuration("id_field must not be empty"));
        }
        if self.id_field == self.identity_field {
            return Err(SyncError::configuration(format!(
                "id_field and identity_field are both '{}'",
                self.id_field
            )));
        }
        Ok(())
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }
}

fn parse_var<T>(name: &str, value: &str) -> SyncResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| SyncError::Configuration(format!("{name}='{value}': {e}")))
}

/// Builder for SyncConfig.
#[derive(Default)]
pub struct SyncConfigBuilder {
    config: SyncConfig,
}

impl SyncConfigBuilder {
    /// Set the connection URI.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.config.uri = Some(SecretString::new(uri.into()));
        self
    }

    /// Set the source database.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.config.database = database.into();
        self
    }

    /// Set the source collection.
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.config.collection = collection.into();
        self
    }

    /// Set the export executable.
    pub fn export_command(mut self, command: impl Into<String>) -> Self {
        self.config.export_command = command.into();
        self
    }

    /// Set the dump file path.
    pub fn dump_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.dump_path = path.into();
        self
    }

    /// Set the output directory.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_dir = path.into();
        self
    }

    /// Set the field used to derive filenames.
    pub fn id_field(mut self, field: impl Into<String>) -> Self {
        self.config.id_field = field.into();
        self
    }

    /// Set the identity field to strip.
    pub fn identity_field(mut self, field: impl Into<String>) -> Self {
        self.config.identity_field = field.into();
        self
    }

    /// Set the dump format.
    pub fn dump_format(mut self, format: DumpFormat) -> Self {
        self.config.dump_format = format;
        self
    }

    /// Set the collision policy.
    pub fn collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.config.collision_policy = policy;
        self
    }

    /// Set the write concurrency bound.
    pub fn write_concurrency(mut self, concurrency: usize) -> Self {
        self.config.write_concurrency = concurrency.max(1);
        self
    }

    /// Set the export timeout.
    pub fn export_timeout_secs(mut self, secs: u64) -> Self {
        self.config.export_timeout_secs = Some(secs);
        self
    }

    /// Keep the dump after a successful run.
    pub fn keep_dump(mut self) -> Self {
        self.config.keep_dump = true;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> SyncResult<SyncConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
