use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

const GENERIC_FAILURE: &str = "Ocorreu um erro inesperado. Tente novamente mais tarde.";

/// Errors surfaced at the HTTP boundary.
///
/// Every variant renders as `{"error": "<message>"}`. Storage and upstream
/// variants keep the raw cause in `detail` for logging only; the rendered
/// message is the handler's fallback unless the cause is a data problem the
/// caller can fix.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Sessão não identificada")]
    AuthenticationMissing,

    #[error("rate limit exceeded (upstream: {upstream})")]
    RateLimitExceeded { upstream: bool },

    #[error("Créditos de IA esgotados. Entre em contato com o suporte.")]
    QuotaExhausted,

    #[error("{0}")]
    ValidationFailed(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("storage failure: {detail}")]
    StorageFailure {
        fallback: &'static str,
        detail: String,
    },

    #[error("upstream failure: {detail}")]
    UpstreamFailure {
        fallback: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn validation(reason: impl Into<String>) -> Self {
        ApiError::ValidationFailed(reason.into())
    }

    pub fn storage(fallback: &'static str, err: impl std::fmt::Display) -> Self {
        ApiError::StorageFailure {
            fallback,
            detail: err.to_string(),
        }
    }

    pub fn upstream(fallback: &'static str, err: impl std::fmt::Display) -> Self {
        ApiError::UpstreamFailure {
            fallback,
            detail: err.to_string(),
        }
    }

    /// The text a client is allowed to see.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::RateLimitExceeded { upstream: false } => {
                "Muitas requisições. Aguarde alguns minutos antes de tentar novamente.".to_string()
            }
            ApiError::RateLimitExceeded { upstream: true } => {
                "Limite de requisições excedido. Tente novamente em alguns instantes.".to_string()
            }
            ApiError::StorageFailure { fallback, detail }
            | ApiError::UpstreamFailure { fallback, detail } => {
                client_error_message(detail).unwrap_or(fallback).to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::AuthenticationMissing => StatusCode::UNAUTHORIZED,
            ApiError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::QuotaExhausted => StatusCode::PAYMENT_REQUIRED,
            ApiError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::StorageFailure { .. } | ApiError::UpstreamFailure { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.public_message() }))
    }
}

/// Recognised classes of raw database, auth and network error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Duplicate,
    InvalidReference,
    PermissionDenied,
    SessionExpired,
    Connection,
}

impl ErrorClass {
    /// Returns `None` when nothing recognisable is found.
    pub fn classify(raw: &str) -> Option<Self> {
        let raw = raw.to_lowercase();
        let contains_any = |needles: &[&str]| needles.iter().any(|n| raw.contains(n));

        if contains_any(&["duplicate key", "unique constraint", "23505"]) {
            Some(ErrorClass::Duplicate)
        } else if contains_any(&["foreign key", "23503"]) {
            Some(ErrorClass::InvalidReference)
        } else if contains_any(&["permission denied", "row-level security", "42501"]) {
            Some(ErrorClass::PermissionDenied)
        } else if contains_any(&["jwt", "invalid token", "not authenticated"]) {
            Some(ErrorClass::SessionExpired)
        } else if contains_any(&[
            "network",
            "timed out",
            "timeout",
            "failed to fetch",
            "connection refused",
            "connection reset",
        ]) {
            Some(ErrorClass::Connection)
        } else {
            None
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorClass::Duplicate => "Este registro já existe.",
            ErrorClass::InvalidReference => "Referência inválida. Verifique os dados informados.",
            ErrorClass::PermissionDenied => "Você não tem permissão para realizar esta ação.",
            ErrorClass::SessionExpired => "Sessão expirada. Faça login novamente.",
            ErrorClass::Connection => "Erro de conexão. Verifique sua internet e tente novamente.",
        }
    }

    /// Whether the caller can fix the cause by changing what it sent.
    pub fn is_client_actionable(self) -> bool {
        matches!(self, ErrorClass::Duplicate | ErrorClass::InvalidReference)
    }
}

/// The safe text for a raw storage or upstream error, when it describes a
/// problem with the submitted data. Server-side causes (timeouts, auth,
/// permissions) return `None` so the handler's own message is used instead.
pub fn client_error_message(raw: &str) -> Option<&'static str> {
    ErrorClass::classify(raw)
        .filter(|class| class.is_client_actionable())
        .map(ErrorClass::message)
}

/// Fallback used when a handler has no more specific text.
pub fn generic_failure() -> &'static str {
    GENERIC_FAILURE
}
