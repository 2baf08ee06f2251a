//! Sliding-window rate limiter for the intake chat.
//!
//! Counts live in the database, one row per accepted request. There is no
//! compare-and-increment: two concurrent requests from the same session may
//! both read a count below the limit and both be admitted.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{generic_failure, ApiError};
use crate::store::RateLimitStore;

#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub max_requests: i64,
    pub window: Duration,
    /// Chance that an accepted request also triggers a cleanup of expired rows.
    pub cleanup_probability: f64,
    /// Admit requests when the count cannot be read.
    pub fail_open: bool,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        RateLimitPolicy {
            max_requests: 50,
            window: Duration::seconds(3600),
            cleanup_probability: 0.1,
            fail_open: false,
        }
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    policy: RateLimitPolicy,
}

/// Hex SHA-256 of the session token. Only the digest is stored or logged.
pub fn session_digest(session_id: &str) -> String {
    hex::encode(Sha256::digest(session_id.as_bytes()))
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, policy: RateLimitPolicy) -> Self {
        Self { store, policy }
    }

    /// Admits or rejects one chat request for `session_id`.
    ///
    /// An admitted request is recorded before returning. Failing to record it
    /// is logged but does not fail the request.
    pub async fn admit(&self, session_id: &str, company_id: Option<Uuid>) -> Result<(), ApiError> {
        self.admit_at(session_id, company_id, Utc::now()).await
    }

    pub async fn admit_at(
        &self,
        session_id: &str,
        company_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        let session_hash = session_digest(session_id);
        let short_hash = &session_hash[..12];
        let since = now - self.policy.window;

        match self.store.count_since(&session_hash, since).await {
            Ok(count) if count >= self.policy.max_requests => {
                warn!(
                    session = short_hash,
                    count, "Chat rate limit exceeded for session"
                );
                return Err(ApiError::RateLimitExceeded { upstream: false });
            }
            Ok(count) => {
                debug!(session = short_hash, count, "Chat request within rate limit");
            }
            Err(e) if self.policy.fail_open => {
                warn!(
                    session = short_hash,
                    "Failed to read rate limit count, admitting request: {:?}", e
                );
            }
            Err(e) => {
                error!(
                    session = short_hash,
                    "Failed to read rate limit count, rejecting request: {:?}", e
                );
                return Err(ApiError::storage(generic_failure(), e));
            }
        }

        if let Err(e) = self.store.record(&session_hash, company_id, now).await {
            error!(session = short_hash, "Failed to record chat request: {:?}", e);
        }

        self.maybe_schedule_cleanup();
        Ok(())
    }

    /// Rolls the cleanup die and, on a hit, deletes expired rows in a
    /// detached task. Gives eventual cleanup only; nothing bounds how many
    /// stale rows pile up between hits.
    pub fn maybe_schedule_cleanup(&self) -> bool {
        let hit = rand::thread_rng().gen_bool(self.policy.cleanup_probability);
        if !hit {
            return false;
        }

        let limiter = self.clone();
        actix_web::rt::spawn(async move {
            if let Err(e) = limiter.sweep_expired().await {
                error!("Rate limit cleanup failed: {:?}", e);
            }
        });
        true
    }

    /// Deletes every record that has left the window.
    pub async fn sweep_expired(&self) -> Result<u64, sqlx::Error> {
        let cutoff = Utc::now() - self.policy.window;
        let deleted = self.store.delete_before(cutoff).await?;
        if deleted > 0 {
            info!("Deleted {} expired rate limit records", deleted);
        }
        Ok(deleted)
    }
}

/// Starts a cron-driven sweep of expired records, independent of traffic.
pub async fn schedule_sweep(limiter: RateLimiter, cron: &str) -> Result<JobScheduler, anyhow::Error> {
    let job = Job::new_async(cron, move |_uuid, _scheduler| {
        let limiter = limiter.clone();
        Box::pin(async move {
            match limiter.sweep_expired().await {
                Ok(deleted) => debug!("Scheduled rate limit sweep removed {} records", deleted),
                Err(e) => error!("Scheduled rate limit sweep failed: {:?}", e),
            }
        })
    })?;

    let scheduler = JobScheduler::new().await?;
    scheduler.add(job).await?;
    scheduler.start().await?;

    info!("Rate limit sweep scheduled: {}", cron);
    Ok(scheduler)
}
