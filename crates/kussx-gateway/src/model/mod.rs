mod url;

pub use url::{HealthResponse, LinkInfoResponse, ShortenRequest, ShortenResponse};
