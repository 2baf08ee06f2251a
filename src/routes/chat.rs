use actix_web::{post, web, HttpResponse};
use tracing::info;

use crate::error::ApiError;
use crate::middleware::session::ChatSession;
use crate::services::assistant::ensure_history;
use crate::types::ChatReportRequest;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/chat-report",
    tag = "intake",
    request_body = ChatReportRequest,
    params(
        ("x-session-id" = String, Header, description = "Opaque browser session token"),
        ("x-company-id" = Option<String>, Header, description = "Company the report is for"),
    ),
    responses(
        (status = 200, description = "Chat completion returned by the AI gateway"),
        (status = 400, description = "Empty or malformed message history"),
        (status = 401, description = "Missing session header"),
        (status = 402, description = "AI credits exhausted"),
        (status = 429, description = "Too many requests for this session or upstream"),
        (status = 500, description = "Processing error"),
    )
)]
#[post("/chat-report")]
pub async fn chat_report(
    app_state: web::Data<AppState>,
    session: ChatSession,
    web::Json(request): web::Json<ChatReportRequest>,
) -> Result<HttpResponse, ApiError> {
    ensure_history(&request.messages)?;

    app_state
        .rate_limiter
        .admit(&session.session_id, session.company_id)
        .await?;

    info!(
        "Intake chat turn with {} messages (company: {:?})",
        request.messages.len(),
        session.company_id
    );
    let completion = app_state.assistant.reply(&request.messages).await?;

    Ok(HttpResponse::Ok().json(completion))
}
