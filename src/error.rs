//! Error types for the planner.

use thiserror::Error;

/// Planner error type.
///
/// Empty viewpoint sets and unreachable goals are not errors: both are
/// recovered inside the plan cycle and only logged.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// The input cloud cannot be planned on (bad layout, missing or
    /// wrongly-typed fields, stale stamp, frame mismatch).
    #[error("invalid input cloud: {0}")]
    InputInvalid(String),

    /// A coordinate-frame lookup failed or timed out.
    #[error("frame unavailable: {0}")]
    FrameUnavailable(String),

    /// Configuration could not be loaded or is out of range.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for PlannerError {
    fn from(e: toml::de::Error) -> Self {
        PlannerError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
