use crate::error::StorageError;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// The value persisted under a short key.
///
/// Stored as a flat JSON document: `{"url": ..., "created": ..., "access": ...}`
/// where `created` is an ISO-8601 timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// The target to redirect to.
    pub url: String,
    /// When the link was created. Never changes afterwards.
    pub created: Timestamp,
    /// Best-effort count of successful resolutions.
    #[serde(default)]
    pub access: u64,
}

impl LinkRecord {
    /// A fresh record for `url`, created now with no recorded access.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            created: Timestamp::now(),
            access: 0,
        }
    }

    /// The same record with one more access counted.
    pub fn accessed(self) -> Self {
        Self {
            access: self.access.saturating_add(1),
            ..self
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StorageError> {
        serde_json::to_vec(self)
            .map_err(|e| StorageError::InvalidData(format!("failed to encode link record: {e}")))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        serde_json::from_slice(bytes)
            .map_err(|e| StorageError::InvalidData(format!("failed to decode link record: {e}")))
    }
}
