use actix_web::{get, web};
use tracing::warn;
use utoipa::OpenApi;

use crate::error::ApiError;

pub mod chat;
pub mod notify;
pub mod report;

#[derive(OpenApi)]
#[openapi(
    paths(
        chat::chat_report,
        report::submit_report,
        report::report_status,
        notify::notify_report,
    ),
    components(schemas(
        crate::types::ChatRole,
        crate::types::ChatTurn,
        crate::types::ChatReportRequest,
        crate::types::SubmitReportRequest,
        crate::types::SubmitReportResponse,
        crate::types::ReportStatusResponse,
        crate::types::NotifyReportRequest,
        crate::types::NotifyReportResponse,
    )),
    tags((name = "intake", description = "Anonymous report intake"))
)]
pub struct ApiDoc;

#[get("/")]
async fn health() -> &'static str {
    "SOIA intake OK"
}

/// Malformed bodies get the same `{"error": ...}` shape as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(256 * 1024)
        .error_handler(|err, req| {
            warn!("Rejected request body on {}: {}", req.path(), err);
            ApiError::validation("Corpo da requisição inválido").into()
        })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(health)
        .service(chat::chat_report)
        .service(report::submit_report)
        .service(report::report_status)
        .service(notify::notify_report);
}
