use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;

pub const SESSION_HEADER: &str = "x-session-id";
pub const COMPANY_HEADER: &str = "x-company-id";

/// The anonymous browser session behind an intake chat request.
///
/// Extracting it fails with `401` when `x-session-id` is missing or blank,
/// and with `400` when `x-company-id` is present but not a UUID.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub session_id: String,
    pub company_id: Option<Uuid>,
}

impl FromRequest for ChatSession {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_session(req))
    }
}

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn extract_session(req: &HttpRequest) -> Result<ChatSession, ApiError> {
    let session_id = match header_value(req, SESSION_HEADER) {
        Some(session_id) => session_id.to_string(),
        None => {
            info!("No session header on request to {}", req.path());
            return Err(ApiError::AuthenticationMissing);
        }
    };

    let company_id = header_value(req, COMPANY_HEADER)
        .map(|raw| {
            Uuid::parse_str(raw).map_err(|_| {
                debug!("Rejecting malformed company header: {}", raw);
                ApiError::validation("Identificador de empresa inválido")
            })
        })
        .transpose()?;

    Ok(ChatSession {
        session_id,
        company_id,
    })
}
