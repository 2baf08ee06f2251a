use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Raw submission body. Everything is optional here so that missing fields
/// produce a descriptive validation error instead of a JSON decode error.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SubmitReportRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ai_summary: Option<String>,
    pub category: Option<String>,
    pub company_id: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitReportResponse {
    pub success: bool,
    pub tracking_code: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportStatusResponse {
    pub tracking_code: String,
    pub status: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}
