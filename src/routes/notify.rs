use actix_web::{post, web, HttpRequest};
use tracing::{error, warn};

use crate::error::ApiError;
use crate::services::notifier::ReportNotice;
use crate::services::validation::normalize_tracking_code;
use crate::types::{NotifyReportRequest, NotifyReportResponse};
use crate::AppState;

const LOOKUP_FAILURE: &str = "Erro ao consultar denúncia. Tente novamente.";

fn authorized(req: &HttpRequest, expected: &str) -> bool {
    req.headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token == expected)
        .unwrap_or(false)
}

/// Out-of-band trigger for the new-report email of a saved report.
///
/// Callers must present the internal API key as a bearer token. Without a
/// configured key every call is rejected. The email content comes from the
/// stored report, never from the request.
#[utoipa::path(
    post,
    path = "/notify-report",
    tag = "intake",
    request_body = NotifyReportRequest,
    responses(
        (status = 200, description = "Email sent, or no recipients configured", body = NotifyReportResponse),
        (status = 401, description = "Missing or wrong internal API key"),
        (status = 404, description = "Unknown report or company"),
        (status = 500, description = "Email provider or storage failure"),
    )
)]
#[post("/notify-report")]
pub async fn notify_report(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    web::Json(request): web::Json<NotifyReportRequest>,
) -> Result<web::Json<NotifyReportResponse>, ApiError> {
    match app_state.internal_api_key.as_deref() {
        Some(expected) if authorized(&req, expected) => {}
        Some(_) => {
            warn!("Rejected notify-report call without a valid internal key");
            return Err(ApiError::AuthenticationMissing);
        }
        None => {
            warn!("Rejected notify-report call: INTERNAL_API_KEY is not configured");
            return Err(ApiError::AuthenticationMissing);
        }
    }

    let tracking_code = normalize_tracking_code(&request.tracking_code)?;
    let report = app_state
        .reports
        .find_report(&tracking_code)
        .await
        .map_err(|e| {
            error!("Failed to load report {}: {:?}", tracking_code, e);
            ApiError::storage(LOOKUP_FAILURE, e)
        })?
        .filter(|report| report.company_id == request.company_id)
        .ok_or_else(|| {
            warn!(
                "No report {} for company {} to notify about",
                tracking_code, request.company_id
            );
            ApiError::NotFound("Denúncia não encontrada")
        })?;

    let notice = ReportNotice {
        company_id: report.company_id,
        tracking_code: report.tracking_code,
        title: report.title,
        category: report.category,
    };
    let outcome = app_state.notifier.dispatch(&notice).await?;

    Ok(web::Json(NotifyReportResponse {
        success: true,
        recipients: outcome.recipients(),
    }))
}
