use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{query_as, FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    pub ai_summary: Option<String>,
    pub category: String,
    pub is_anonymous: bool,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    pub department: Option<String>,
    pub tracking_code: String, // SOIA-3F9A0C12BE, set by the column default
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// A validated, sanitized report ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    pub ai_summary: Option<String>,
    pub category: String,
    pub is_anonymous: bool,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    pub department: Option<String>,
}

/// The non-identifying slice of a report that a reporter may look up.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ReportStatus {
    pub tracking_code: String,
    pub status: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub async fn create(pool: &PgPool, new_report: &NewReport) -> Result<Self, sqlx::Error> {
        let report = query_as::<_, Report>(
            r#"
            INSERT INTO reports (
                company_id, title, description, ai_summary, category, is_anonymous,
                reporter_name, reporter_email, reporter_phone, department
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(new_report.company_id)
        .bind(&new_report.title)
        .bind(&new_report.description)
        .bind(&new_report.ai_summary)
        .bind(&new_report.category)
        .bind(new_report.is_anonymous)
        .bind(&new_report.reporter_name)
        .bind(&new_report.reporter_email)
        .bind(&new_report.reporter_phone)
        .bind(&new_report.department)
        .fetch_one(pool)
        .await?;

        debug!(
            "Report created: {} for company {}",
            report.tracking_code, report.company_id
        );
        Ok(report)
    }

    pub async fn get_by_tracking_code(
        pool: &PgPool,
        tracking_code: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        query_as::<_, Report>("SELECT * FROM reports WHERE tracking_code = $1")
            .bind(tracking_code)
            .fetch_optional(pool)
            .await
    }
}

impl ReportStatus {
    pub async fn get_by_tracking_code(
        pool: &PgPool,
        tracking_code: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        query_as::<_, ReportStatus>(
            r#"
            SELECT tracking_code, status, category, created_at FROM reports
            WHERE tracking_code = $1
            "#,
        )
        .bind(tracking_code)
        .fetch_optional(pool)
        .await
    }
}
