//! Redis-backed enrichment queue.
//!
//! The `jobs` table is the source of truth: the queue only carries row ids,
//! and the worker re-checks each row's status before touching it, so a lost
//! or repeated id is harmless. Pending rows are re-queued at worker start.

use std::time::Duration;

use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingest::pipeline::{enrich_pending_job, EnrichmentOutcome};
use crate::state::AppState;

pub const ENRICHMENT_QUEUE_KEY: &str = "jobtrail:enrichment";
const POP_TIMEOUT_SECS: u64 = 5;
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Pushes job ids onto the enrichment queue.
pub async fn enqueue(redis: &redis::Client, ids: &[Uuid]) -> Result<(), AppError> {
    if ids.is_empty() {
        return Ok(());
    }
    let mut conn = redis.get_multiplexed_async_connection().await?;
    let values: Vec<String> = ids.iter().map(Uuid::to_string).collect();
    conn.lpush::<_, _, ()>(ENRICHMENT_QUEUE_KEY, values).await?;
    Ok(())
}

/// Blocks up to `POP_TIMEOUT_SECS` for the next id.
async fn pop(conn: &mut MultiplexedConnection) -> Result<Option<String>, redis::RedisError> {
    let popped: Option<(String, String)> = redis::cmd("BRPOP")
        .arg(ENRICHMENT_QUEUE_KEY)
        .arg(POP_TIMEOUT_SECS)
        .query_async(conn)
        .await?;
    Ok(popped.map(|(_, id)| id))
}

/// Ids of every row still waiting for enrichment.
async fn pending_ids(pool: &PgPool) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT id FROM jobs WHERE status = 'pending_enrichment' ORDER BY created_at ASC",
    )
    .fetch_all(pool)
    .await
}

/// Long-running worker: recovers pending rows, then enriches ids as they
/// arrive. Reconnects after Redis failures; never returns.
pub async fn run_enrichment_worker(state: AppState) {
    match pending_ids(&state.db).await {
        Ok(ids) if !ids.is_empty() => {
            info!(count = ids.len(), "Re-queueing pending enrichment jobs");
            if let Err(e) = enqueue(&state.redis, &ids).await {
                error!("Failed to re-queue pending jobs: {e}");
            }
        }
        Ok(_) => {}
        Err(e) => error!("Failed to load pending jobs: {e}"),
    }

    loop {
        let mut conn = match state.redis.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("Enrichment worker cannot reach Redis: {e}");
                tokio::time::sleep(RECONNECT_DELAY).await;
                continue;
            }
        };
        info!("Enrichment worker listening on {ENRICHMENT_QUEUE_KEY}");

        loop {
            let raw_id = match pop(&mut conn).await {
                Ok(Some(id)) => id,
                Ok(None) => continue,
                Err(e) => {
                    error!("Enrichment queue pop failed: {e}");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                    break;
                }
            };

            let Ok(job_id) = Uuid::parse_str(&raw_id) else {
                warn!(raw_id = %raw_id, "Dropping malformed enrichment queue entry");
                continue;
            };

            match enrich_pending_job(&state, job_id).await {
                Ok(EnrichmentOutcome::Retry) => {
                    if let Err(e) = enqueue(&state.redis, &[job_id]).await {
                        error!(job_id = %job_id, "Failed to re-queue job: {e}");
                    }
                }
                Ok(_) => {}
                Err(e) => error!(job_id = %job_id, "Enrichment bookkeeping failed: {e}"),
            }
        }
    }
}
