//! Error types for wsk-sync operations.
//!
//! Only run-level failures become a [`SyncError`]. Per-record problems
//! (missing id, failed write) are collected in
//! [`SplitStats`](crate::split::SplitStats) and never abort the run.

use thiserror::Error;

/// Result type alias for wsk-sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Main error type for all wsk-sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The output directory is missing or is not a directory.
    #[error("Output directory not found: {path}")]
    MissingOutputDir { path: String },

    /// The external export tool failed to start, exited non-zero, or timed out.
    #[error("Export error: {message}")]
    Export {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The dump could not be parsed into records.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// Distinct ids normalized to the same filename under the `fail` policy.
    #[error("Filename collision on {filename}: ids {ids:?}")]
    Collision { filename: String, ids: Vec<String> },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Configuration (CFG_xxx)
    CfgInvalid,
    CfgMissingOutputDir,

    // Export (EXP_xxx)
    ExpSpawnFailed,
    ExpNonZeroExit,
    ExpTimeout,

    // Parse (PARSE_xxx)
    ParseInvalidJson,

    // Split (SPLIT_xxx)
    SplitCollision,

    // IO (IO_xxx)
    IoFailed,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::CfgInvalid => "CFG_001",
            ErrorCode::CfgMissingOutputDir => "CFG_002",
            ErrorCode::ExpSpawnFailed => "EXP_001",
            ErrorCode::ExpNonZeroExit => "EXP_002",
            ErrorCode::ExpTimeout => "EXP_003",
            ErrorCode::ParseInvalidJson => "PARSE_001",
            ErrorCode::SplitCollision => "SPLIT_001",
            ErrorCode::IoFailed => "IO_001",
        }
    }
}

impl SyncError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an export error with the given code.
    pub fn export(message: impl Into<String>, code: ErrorCode) -> Self {
        Self::Export {
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Create an export error for a process that could not be started.
    pub fn export_spawn(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Export {
            message: message.into(),
            code: ErrorCode::ExpSpawnFailed,
            source: Some(Box::new(source)),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidJson,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Configuration(_) => ErrorCode::CfgInvalid,
            Self::MissingOutputDir { .. } => ErrorCode::CfgMissingOutputDir,
            Self::Export { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            Self::Collision { .. } => ErrorCode::SplitCollision,
            Self::Io(_) => ErrorCode::IoFailed,
            Self::Serialization(_) => ErrorCode::ParseInvalidJson,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Configuration(_) => {
                Some("Please check the WSK_* environment variables and MONGO_CONN_PROD")
            }
            Self::MissingOutputDir { .. } => {
                Some("Run from the repository root or set WSK_OUTPUT_DIR")
            }
            Self::Export { .. } => {
                Some("Please check that mongoexport is on PATH and the connection URI is valid")
            }
            Self::Parse { .. } => Some("The dump file was kept; inspect it for malformed records"),
            Self::Collision { .. } => {
                Some("Rename one of the colliding ids or set WSK_COLLISION_POLICY=overwrite")
            }
            _ => None,
        }
    }
}
