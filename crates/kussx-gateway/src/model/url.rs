use jiff::Timestamp;
use kussx_core::{LinkRecord, ShortKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    /// Missing and `null` are both rejected by the handler.
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub key: ShortKey,
}

#[derive(Debug, Serialize)]
pub struct LinkInfoResponse {
    pub url: String,
    pub created: Timestamp,
    pub access: u64,
}

impl From<LinkRecord> for LinkInfoResponse {
    fn from(record: LinkRecord) -> Self {
        Self {
            url: record.url,
            created: record.created,
            access: record.access,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
