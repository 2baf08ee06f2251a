use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Identifies a saved report. The email is built from the stored record.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NotifyReportRequest {
    pub company_id: Uuid,
    pub tracking_code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotifyReportResponse {
    pub success: bool,
    pub recipients: usize,
}
