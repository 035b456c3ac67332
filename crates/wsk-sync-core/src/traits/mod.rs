//! Core traits for wsk-sync collaborators.

mod exporter;

pub use exporter::*;
