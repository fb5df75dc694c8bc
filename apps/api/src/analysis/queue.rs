//! Deferred summary jobs.
//!
//! The CV pipeline enqueues a [`SummaryTask`] after it has persisted a
//! profile and returns without waiting for it. A worker consumes the queue and
//! fills in the narrative summary later, so readers may see the placeholder
//! for a while after analysis completes.
//!
//! The Redis queue is a reliable list: workers atomically move a task onto a
//! processing list while they run it and remove it once its result is stored.
//! A task whose result could not be stored goes back onto the queue. Tasks
//! left on the processing list by a crashed worker are pushed back at startup,
//! giving at-least-once execution.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;

/// Seconds a worker blocks waiting for a task before polling again.
const CLAIM_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTask {
    pub file_id: Uuid,
    pub candidate_id: Uuid,
}

#[async_trait]
pub trait SummaryQueue: Send + Sync {
    async fn enqueue(&self, task: SummaryTask) -> Result<(), AppError>;
}

/// A task claimed by a worker. `raw` is the exact payload on the processing
/// list, needed to acknowledge it.
#[derive(Debug)]
pub struct ClaimedTask {
    pub raw: String,
    pub task: Result<SummaryTask, String>,
}

/// Worker-side settlement of a claimed task.
#[async_trait]
pub trait TaskLedger: Send + Sync {
    /// The task is finished and leaves the queue for good.
    async fn ack(&self, claimed: &ClaimedTask) -> Result<(), AppError>;

    /// The task goes back onto the queue to be claimed again.
    async fn requeue(&self, claimed: &ClaimedTask) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct RedisSummaryQueue {
    client: redis::Client,
    key: String,
}

fn queue_error(e: redis::RedisError) -> AppError {
    AppError::Queue(e.to_string())
}

impl RedisSummaryQueue {
    pub fn new(client: redis::Client, key: String) -> Self {
        Self { client, key }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn processing_key(&self) -> String {
        format!("{}:processing", self.key)
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, AppError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(queue_error)
    }

    /// Blocks up to a few seconds for the next task, moving it to the
    /// processing list. `Ok(None)` on timeout.
    pub async fn claim(
        &self,
        conn: &mut redis::aio::MultiplexedConnection,
    ) -> Result<Option<ClaimedTask>, AppError> {
        let raw: Option<String> = redis::cmd("BRPOPLPUSH")
            .arg(&self.key)
            .arg(self.processing_key())
            .arg(CLAIM_TIMEOUT_SECS)
            .query_async(conn)
            .await
            .map_err(queue_error)?;

        Ok(raw.map(|raw| {
            let task = serde_json::from_str::<SummaryTask>(&raw).map_err(|e| e.to_string());
            ClaimedTask { raw, task }
        }))
    }

    /// Removes a finished task from the processing list.
    pub async fn ack(
        &self,
        conn: &mut redis::aio::MultiplexedConnection,
        claimed: &ClaimedTask,
    ) -> Result<(), AppError> {
        let _: i64 = redis::cmd("LREM")
            .arg(self.processing_key())
            .arg(1)
            .arg(&claimed.raw)
            .query_async(conn)
            .await
            .map_err(queue_error)?;
        Ok(())
    }

    /// Moves a claimed task from the processing list back to the tail of the
    /// queue in one MULTI block.
    pub async fn requeue(
        &self,
        conn: &mut redis::aio::MultiplexedConnection,
        claimed: &ClaimedTask,
    ) -> Result<(), AppError> {
        let _: () = redis::pipe()
            .atomic()
            .cmd("LREM")
            .arg(self.processing_key())
            .arg(1)
            .arg(&claimed.raw)
            .ignore()
            .cmd("LPUSH")
            .arg(&self.key)
            .arg(&claimed.raw)
            .ignore()
            .query_async(conn)
            .await
            .map_err(queue_error)?;
        Ok(())
    }

    /// Pushes tasks abandoned on the processing list back onto the queue.
    pub async fn requeue_in_flight(&self) -> Result<usize, AppError> {
        let mut conn = self.connection().await?;
        let mut moved = 0;
        loop {
            let raw: Option<String> = redis::cmd("RPOPLPUSH")
                .arg(self.processing_key())
                .arg(&self.key)
                .query_async(&mut conn)
                .await
                .map_err(queue_error)?;
            if raw.is_none() {
                break;
            }
            moved += 1;
        }
        if moved > 0 {
            warn!("Requeued {moved} in-flight summary tasks from a previous worker");
        }
        Ok(moved)
    }

    pub async fn worker_connection(&self) -> Result<redis::aio::MultiplexedConnection, AppError> {
        self.connection().await
    }

    /// Settles tasks over `conn`, the connection they were claimed on.
    pub fn ledger(&self, conn: redis::aio::MultiplexedConnection) -> RedisTaskLedger {
        RedisTaskLedger {
            queue: self.clone(),
            conn,
        }
    }
}

pub struct RedisTaskLedger {
    queue: RedisSummaryQueue,
    conn: redis::aio::MultiplexedConnection,
}

#[async_trait]
impl TaskLedger for RedisTaskLedger {
    async fn ack(&self, claimed: &ClaimedTask) -> Result<(), AppError> {
        self.queue.ack(&mut self.conn.clone(), claimed).await
    }

    async fn requeue(&self, claimed: &ClaimedTask) -> Result<(), AppError> {
        self.queue.requeue(&mut self.conn.clone(), claimed).await
    }
}

#[async_trait]
impl SummaryQueue for RedisSummaryQueue {
    async fn enqueue(&self, task: SummaryTask) -> Result<(), AppError> {
        let payload = serde_json::to_string(&task)
            .map_err(|e| AppError::Queue(format!("Failed to serialize summary task: {e}")))?;
        let mut conn = self.connection().await?;
        let _: i64 = redis::cmd("LPUSH")
            .arg(&self.key)
            .arg(payload)
            .query_async(&mut conn)
            .await
            .map_err(queue_error)?;

        info!(
            "Enqueued summary task for file {} (candidate {})",
            task.file_id, task.candidate_id
        );
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_wire_format() {
        let task = SummaryTask {
            file_id: Uuid::nil(),
            candidate_id: Uuid::nil(),
        };
        let raw = serde_json::to_string(&task).unwrap();
        assert_eq!(
            raw,
            r#"{"file_id":"00000000-0000-0000-0000-000000000000","candidate_id":"00000000-0000-0000-0000-000000000000"}"#
        );
    }

    #[test]
    fn test_processing_key_is_derived_from_queue_key() {
        let client = redis::Client::open("redis://127.0.0.1/").unwrap();
        let queue = RedisSummaryQueue::new(client, "jobs".to_string());
        assert_eq!(queue.processing_key(), "jobs:processing");
        assert_eq!(queue.key(), "jobs");
    }
}
