use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as, query_scalar, FromRow, PgPool};
use uuid::Uuid;

/// One accepted chat request. Rows are insert-only and are deleted in bulk
/// once they fall out of the rate-limit window.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RateLimitRecord {
    pub id: i64,
    pub session_hash: String,
    pub company_id: Option<Uuid>,
    pub request_count: i32,
    pub created_at: DateTime<Utc>,
}

impl RateLimitRecord {
    pub async fn count_since(
        pool: &PgPool,
        session_hash: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = query_scalar(
            r#"
            SELECT COALESCE(SUM(request_count), 0)::BIGINT FROM chat_rate_limits
            WHERE session_hash = $1
            AND created_at >= $2
            "#,
        )
        .bind(session_hash)
        .bind(since)
        .fetch_one(pool)
        .await?;

        Ok(count.unwrap_or(0))
    }

    pub async fn create(
        pool: &PgPool,
        session_hash: &str,
        company_id: Option<Uuid>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        query_as::<_, RateLimitRecord>(
            r#"
            INSERT INTO chat_rate_limits (session_hash, company_id, request_count, created_at)
            VALUES ($1, $2, 1, $3)
            RETURNING *
            "#,
        )
        .bind(session_hash)
        .bind(company_id)
        .bind(created_at)
        .fetch_one(pool)
        .await
    }

    pub async fn delete_older_than(
        pool: &PgPool,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = query(
            r#"
            DELETE FROM chat_rate_limits
            WHERE created_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
