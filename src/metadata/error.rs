use reqwest::StatusCode;

/// Errors from the external metadata provider and its token exchange
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("metadata request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("metadata provider returned {status} from {endpoint}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },
}
