use thiserror::Error;

/// Errors returned by codec construction and key decoding.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid codec configuration: {0}")]
    InvalidConfig(String),
    #[error("malformed key '{key}': {reason}")]
    MalformedKey { key: String, reason: String },
}
