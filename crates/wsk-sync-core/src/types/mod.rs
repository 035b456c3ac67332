//! Core types for wsk-sync.

mod record;

pub use record::*;
