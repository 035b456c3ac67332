//! wsk-sync-core - Export a collection and split it into per-record JSON files.
//!
//! This crate provides the configuration, exporter trait, dump parsers and
//! split writer behind the `wsk-sync` binary.
//!
//! # Example
//!
//! ```ignore
//! use wsk_sync_core::{MongoExport, SyncConfig, SyncPipeline};
//!
//! let config = SyncConfig::from_env()?;
//! let exporter = MongoExport::from_config(&config)?;
//! let report = SyncPipeline::new(config, exporter).run().await?;
//! println!("Wrote {}/{} records", report.split.written, report.split.total);
//! ```

pub mod config;
pub mod dump;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod split;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{SyncConfig, SyncConfigBuilder};
pub use dump::{parse_dump, DumpFormat};
pub use error::{ErrorCode, SyncError, SyncResult};
pub use export::MongoExport;
pub use pipeline::{SyncPipeline, SyncReport};
pub use split::{split_records, Collision, CollisionPolicy, SplitOptions, SplitStats};
pub use traits::{DataExporter, ExportOutput};
pub use types::{normalize_filename, Record};
