// Redis-backed work queue for price synchronization
//
// Producers LPUSH game ids onto the main list; the consumer moves each
// message into a processing list before working on it and only removes
// it after the work is done. Messages left in the processing list by a
// crashed consumer are moved back on startup, giving at-least-once
// delivery.

use axum::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{info, warn};

use crate::pricing::error::QueueError;

/// Producer side of the price-sync queue
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Push a game id onto the queue
    async fn enqueue(&self, game_id: &str) -> Result<(), QueueError>;
}

/// Redis list pair implementing the reliable-queue pattern
#[derive(Clone)]
pub struct PriceSyncQueue {
    conn: ConnectionManager,
    queue_key: String,
    processing_key: String,
}

impl PriceSyncQueue {
    pub fn new(conn: ConnectionManager, queue_name: &str) -> Self {
        Self {
            conn,
            queue_key: queue_name.to_string(),
            processing_key: format!("{}:processing", queue_name),
        }
    }

    /// Block up to `timeout_secs` for the next message, moving it into
    /// the processing list. `None` means the wait timed out.
    pub async fn receive(&self, timeout_secs: f64) -> Result<Option<String>, QueueError> {
        let mut conn = self.conn.clone();
        let message: Option<String> = redis::cmd("BLMOVE")
            .arg(&self.queue_key)
            .arg(&self.processing_key)
            .arg("RIGHT")
            .arg("LEFT")
            .arg(timeout_secs)
            .query_async(&mut conn)
            .await?;
        Ok(message)
    }

    /// Acknowledge a processed message by removing it from the
    /// processing list
    pub async fn ack(&self, message: &str) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.lrem(&self.processing_key, 1, message).await?;
        if removed == 0 {
            warn!("Ack for '{}' removed nothing from the processing list", message);
        }
        Ok(())
    }

    /// Move messages abandoned by a previous run back onto the main
    /// queue. Returns how many were recovered.
    pub async fn recover_pending(&self) -> Result<usize, QueueError> {
        let mut conn = self.conn.clone();
        let mut recovered = 0;
        loop {
            let message: Option<String> = redis::cmd("LMOVE")
                .arg(&self.processing_key)
                .arg(&self.queue_key)
                .arg("RIGHT")
                .arg("LEFT")
                .query_async(&mut conn)
                .await?;
            if message.is_none() {
                break;
            }
            recovered += 1;
        }
        if recovered > 0 {
            info!("Recovered {} pending price-sync message(s)", recovered);
        }
        Ok(recovered)
    }
}

#[async_trait]
impl WorkQueue for PriceSyncQueue {
    async fn enqueue(&self, game_id: &str) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(&self.queue_key, game_id).await?;
        Ok(())
    }
}
