//! Storage seams used by the handlers.
//!
//! Handlers only see these traits; production wires them to [`PgStore`],
//! tests wire them to in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Company, NewReport, RateLimitRecord, Report, ReportStatus};

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn insert_report(&self, report: &NewReport) -> Result<Report, sqlx::Error>;

    async fn report_status(&self, tracking_code: &str)
        -> Result<Option<ReportStatus>, sqlx::Error>;

    async fn find_report(&self, tracking_code: &str) -> Result<Option<Report>, sqlx::Error>;
}

#[async_trait]
pub trait CompanyDirectory: Send + Sync {
    async fn find_company(&self, company_id: Uuid) -> Result<Option<Company>, sqlx::Error>;
}

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Sum of request contributions for the session at or after `since`.
    async fn count_since(&self, session_hash: &str, since: DateTime<Utc>)
        -> Result<i64, sqlx::Error>;

    async fn record(
        &self,
        session_hash: &str,
        company_id: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error>;

    /// Deletes records strictly older than `cutoff`, returning how many went.
    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error>;
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PgStore {
    async fn insert_report(&self, report: &NewReport) -> Result<Report, sqlx::Error> {
        Report::create(&self.pool, report).await
    }

    async fn report_status(
        &self,
        tracking_code: &str,
    ) -> Result<Option<ReportStatus>, sqlx::Error> {
        ReportStatus::get_by_tracking_code(&self.pool, tracking_code).await
    }

    async fn find_report(&self, tracking_code: &str) -> Result<Option<Report>, sqlx::Error> {
        Report::get_by_tracking_code(&self.pool, tracking_code).await
    }
}

#[async_trait]
impl CompanyDirectory for PgStore {
    async fn find_company(&self, company_id: Uuid) -> Result<Option<Company>, sqlx::Error> {
        Company::get_by_id(&self.pool, company_id).await
    }
}

#[async_trait]
impl RateLimitStore for PgStore {
    async fn count_since(
        &self,
        session_hash: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        RateLimitRecord::count_since(&self.pool, session_hash, since).await
    }

    async fn record(
        &self,
        session_hash: &str,
        company_id: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        RateLimitRecord::create(&self.pool, session_hash, company_id, at).await?;
        Ok(())
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        RateLimitRecord::delete_older_than(&self.pool, cutoff).await
    }
}
