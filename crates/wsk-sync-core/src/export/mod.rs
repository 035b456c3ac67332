//! Export step: run the external tool that produces the dump file.
//!
//! # Example
//!
//! ```ignore
//! use wsk_sync_core::export::MongoExport;
//! use wsk_sync_core::{DataExporter, SyncConfig};
//!
//! let config = SyncConfig::from_env()?;
//! let exporter = MongoExport::from_config(&config)?;
//! let output = exporter.export(&config.dump_path).await?;
//! ```

pub mod mongoexport;

pub use mongoexport::MongoExport;
