use thiserror::Error;

/// Why a single control option was refused. The previous value stays in place.
#[derive(Debug, Error)]
pub enum OptionError {
    #[error("options payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("options payload must be a JSON object")]
    NotAnObject,
    #[error("option `{key}` has the wrong type")]
    WrongType { key: &'static str },
    #[error("option `{key}` is not finite")]
    NotFinite { key: &'static str },
    #[error("scale must be greater than 5 (got {0})")]
    ScaleTooSmall(f32),
    #[error("option `{key}` must be positive (got {value})")]
    NonPositive { key: &'static str, value: f32 },
    #[error("option `{key}` must be at least 1 (got {value})")]
    LagTooSmall { key: &'static str, value: f32 },
}
