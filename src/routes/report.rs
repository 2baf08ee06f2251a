use actix_web::{get, post, web};
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::services::notifier::ReportNotice;
use crate::services::validation::{normalize_tracking_code, validate_submission};
use crate::types::{ReportStatusResponse, SubmitReportRequest, SubmitReportResponse};
use crate::AppState;

const SAVE_FAILURE: &str = "Erro ao salvar denúncia. Tente novamente.";
const LOOKUP_FAILURE: &str = "Erro ao consultar denúncia. Tente novamente.";

#[utoipa::path(
    post,
    path = "/submit-report",
    tag = "intake",
    request_body = SubmitReportRequest,
    responses(
        (status = 200, description = "Report saved", body = SubmitReportResponse),
        (status = 400, description = "Missing or invalid field"),
        (status = 500, description = "Report could not be saved"),
    )
)]
#[post("/submit-report")]
pub async fn submit_report(
    app_state: web::Data<AppState>,
    web::Json(request): web::Json<SubmitReportRequest>,
) -> Result<web::Json<SubmitReportResponse>, ApiError> {
    let new_report = validate_submission(&request).map_err(|e| {
        warn!("Rejected report submission: {}", e);
        e
    })?;

    let report = app_state
        .reports
        .insert_report(&new_report)
        .await
        .map_err(|e| {
            error!("Failed to save report: {:?}", e);
            ApiError::storage(SAVE_FAILURE, e)
        })?;

    info!(
        tracking_code = %report.tracking_code,
        company_id = %report.company_id,
        anonymous = report.is_anonymous,
        "Report submitted"
    );

    // Notification is a separate step: a failure here never undoes the report.
    let notifier = app_state.notifier.clone();
    let notice = ReportNotice {
        company_id: report.company_id,
        tracking_code: report.tracking_code.clone(),
        title: report.title.clone(),
        category: report.category.clone(),
    };
    actix_web::rt::spawn(async move {
        if let Err(e) = notifier.dispatch(&notice).await {
            warn!(
                "Report {} saved but notification failed: {}",
                notice.tracking_code, e
            );
        }
    });

    Ok(web::Json(SubmitReportResponse {
        success: true,
        tracking_code: report.tracking_code,
        message: "Denúncia enviada com sucesso. Guarde o protocolo para acompanhar o andamento."
            .to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/report-status/{tracking_code}",
    tag = "intake",
    params(("tracking_code" = String, Path, description = "Protocol returned on submission")),
    responses(
        (status = 200, description = "Current triage status", body = ReportStatusResponse),
        (status = 404, description = "Unknown tracking code"),
    )
)]
#[get("/report-status/{tracking_code}")]
pub async fn report_status(
    app_state: web::Data<AppState>,
    tracking_code: web::Path<String>,
) -> Result<web::Json<ReportStatusResponse>, ApiError> {
    let tracking_code = normalize_tracking_code(&tracking_code)?;

    let status = app_state
        .reports
        .report_status(&tracking_code)
        .await
        .map_err(|e| {
            error!("Failed to look up report {}: {:?}", tracking_code, e);
            ApiError::storage(LOOKUP_FAILURE, e)
        })?
        .ok_or(ApiError::NotFound("Denúncia não encontrada"))?;

    Ok(web::Json(ReportStatusResponse {
        tracking_code: status.tracking_code,
        status: status.status,
        category: status.category,
        created_at: status.created_at,
    }))
}
