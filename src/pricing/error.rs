use reqwest::StatusCode;

/// Errors from the external pricing provider
///
/// These never cross the pipeline boundary: `fetch_offers` logs them and
/// degrades to an empty offer list, so a bad title or a provider outage
/// can never stall the queue.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("pricing request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("pricing provider returned {status} from {endpoint}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },
}

/// Errors from the Redis work queue
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue operation failed: {0}")]
    Redis(#[from] redis::RedisError),
}
