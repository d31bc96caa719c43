//! Error hierarchy for the parts of the crate that sit around the pure
//! engine: decoding persisted plan/history state, loading configuration,
//! and calendar arithmetic. The engine's public entry points
//! (`recommend_session`, `update_lift_state`, ...) never return an error —
//! anomalous inputs fold into conservative neutral outputs (see
//! `planner` and `state_update`). This hierarchy exists for the layers
//! around that boundary.

use thiserror::Error;

/// Top-level error type for everything outside the pure engine core.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Decoding a persisted `TrainingPlan` or `WorkoutHistory` failed.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Loading or validating an `EngineConfig` failed.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Calendar arithmetic could not be performed (e.g. component
    /// subtraction overflowed `i64`).
    #[error("calendar error: {0}")]
    Calendar(String),

    /// IO performed by the CLI or config loader, not by the engine core.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors decoding persisted value trees (§6 "Persisted state layout").
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("templates field was neither a map nor a pair-array: {reason}")]
    InvalidTemplatesEncoding { reason: String },

    #[error("unknown progression policy kind: {kind}")]
    UnknownProgressionKind { kind: String },

    #[error("unknown in-session policy kind: {kind}")]
    UnknownInSessionKind { kind: String },

    #[error("malformed schedule kind: {reason}")]
    InvalidSchedule { reason: String },

    #[error("malformed JSON: {0}")]
    Json(String),
}

/// Errors validating an `EngineConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("rounding increment must be > 0, got {0}")]
    InvalidRoundingIncrement(rust_decimal::Decimal),

    #[error("readiness threshold must be within [0, 100], got {0}")]
    InvalidReadinessThreshold(i32),

    #[error("failed to parse TOML config: {0}")]
    Toml(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Severity levels, mirrored for consistency with the logging layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Critical,
    Error,
    Warning,
}

impl EngineError {
    /// Whether an operation that produced this error is worth retrying
    /// (only ever true for IO).
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Io(_))
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EngineError::Io(_) => ErrorSeverity::Warning,
            EngineError::Decode(_) => ErrorSeverity::Warning,
            EngineError::Configuration(_) => ErrorSeverity::Error,
            EngineError::Calendar(_) => ErrorSeverity::Critical,
        }
    }
}
