//! Validation and sanitization of report submissions.
//!
//! Primary length bounds are checked on the trimmed text and rejected when
//! violated. Everything else is trimmed and truncated to its column size.

use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::NewReport;
use crate::types::SubmitReportRequest;

pub const TITLE_MIN_CHARS: usize = 5;
pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MIN_CHARS: usize = 20;
pub const DESCRIPTION_MAX_CHARS: usize = 5000;
pub const AI_SUMMARY_MAX_CHARS: usize = 1000;
pub const CATEGORY_MAX_CHARS: usize = 50;
pub const REPORTER_NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 255;
pub const PHONE_MAX_CHARS: usize = 20;
pub const DEPARTMENT_MAX_CHARS: usize = 100;
pub const TRACKING_CODE_MAX_CHARS: usize = 32;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[1-9]\d{1,14}$").unwrap();
    static ref PHONE_SEPARATORS: Regex = Regex::new(r"[\s()\-]").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// E.164-like check after removing spaces, parentheses and hyphens.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_REGEX.is_match(&PHONE_SEPARATORS.replace_all(phone, ""))
}

/// Trims and cuts to at most `max_chars` characters, never splitting a char.
pub fn truncate(value: &str, max_chars: usize) -> String {
    value.trim().chars().take(max_chars).collect()
}

/// Trims and uppercases a tracking code taken from a URL or request body.
pub fn normalize_tracking_code(raw: &str) -> Result<String, ApiError> {
    let code = raw.trim().to_uppercase();
    if code.is_empty() || code.chars().count() > TRACKING_CODE_MAX_CHARS {
        return Err(ApiError::validation("Protocolo inválido"));
    }
    Ok(code)
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn optional(value: &Option<String>, max_chars: usize) -> Option<String> {
    present(value).map(|v| truncate(v, max_chars))
}

/// Checks a raw submission and returns the record to persist.
///
/// When the report is anonymous the reporter's name, email, phone and
/// department are dropped, whatever the client sent.
pub fn validate_submission(request: &SubmitReportRequest) -> Result<NewReport, ApiError> {
    let missing: Vec<&str> = [
        ("title", present(&request.title)),
        ("description", present(&request.description)),
        ("category", present(&request.category)),
        ("company_id", present(&request.company_id)),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_none())
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
        return Err(ApiError::validation(format!(
            "Campos obrigatórios ausentes: {}",
            missing.join(", ")
        )));
    }

    // All four are present past this point.
    let title = present(&request.title).unwrap_or_default();
    let description = present(&request.description).unwrap_or_default();
    let category = present(&request.category).unwrap_or_default();
    let company_id = present(&request.company_id).unwrap_or_default();

    let title_len = title.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&title_len) {
        return Err(ApiError::validation(format!(
            "O título deve ter entre {} e {} caracteres",
            TITLE_MIN_CHARS, TITLE_MAX_CHARS
        )));
    }

    let description_len = description.chars().count();
    if !(DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&description_len) {
        return Err(ApiError::validation(format!(
            "A descrição deve ter entre {} e {} caracteres",
            DESCRIPTION_MIN_CHARS, DESCRIPTION_MAX_CHARS
        )));
    }

    let company_id = Uuid::parse_str(company_id)
        .map_err(|_| ApiError::validation("Identificador de empresa inválido"))?;

    let reporter_email = present(&request.reporter_email);
    if let Some(email) = reporter_email {
        if !is_valid_email(email) {
            return Err(ApiError::validation("Email inválido"));
        }
    }

    let reporter_phone = present(&request.reporter_phone);
    if let Some(phone) = reporter_phone {
        if !is_valid_phone(phone) {
            return Err(ApiError::validation("Telefone inválido"));
        }
    }

    let identity = |value: &Option<String>, max_chars: usize| {
        if request.is_anonymous {
            None
        } else {
            optional(value, max_chars)
        }
    };

    Ok(NewReport {
        company_id,
        title: truncate(title, TITLE_MAX_CHARS),
        description: truncate(description, DESCRIPTION_MAX_CHARS),
        ai_summary: optional(&request.ai_summary, AI_SUMMARY_MAX_CHARS),
        category: truncate(category, CATEGORY_MAX_CHARS),
        is_anonymous: request.is_anonymous,
        reporter_name: identity(&request.reporter_name, REPORTER_NAME_MAX_CHARS),
        reporter_email: identity(&request.reporter_email, EMAIL_MAX_CHARS),
        reporter_phone: identity(&request.reporter_phone, PHONE_MAX_CHARS),
        department: identity(&request.department, DEPARTMENT_MAX_CHARS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPANY_ID: &str = "6f1c2a9e-4b7d-4c1e-9a51-2f0d8e3b7c44";

    fn valid_request() -> SubmitReportRequest {
        SubmitReportRequest {
            title: Some("Assédio moral na equipe".into()),
            description: Some("Meu gestor grita comigo na frente dos colegas toda semana.".into()),
            category: Some("assedio_moral".into()),
            company_id: Some(COMPANY_ID.into()),
            is_anonymous: true,
            ..Default::default()
        }
    }

    fn rejection(request: &SubmitReportRequest) -> String {
        match validate_submission(request) {
            Err(ApiError::ValidationFailed(reason)) => reason,
            other => panic!("expected a validation failure, got {:?}", other),
        }
    }

    #[test]
    fn accepts_a_complete_anonymous_report() {
        let report = validate_submission(&valid_request()).unwrap();
        assert_eq!(report.title, "Assédio moral na equipe");
        assert_eq!(report.company_id.to_string(), COMPANY_ID);
        assert!(report.is_anonymous);
    }

    #[test]
    fn names_every_missing_field() {
        let request = SubmitReportRequest {
            title: Some("   ".into()),
            category: None,
            ..valid_request()
        };
        let reason = rejection(&request);
        assert!(reason.contains("title"));
        assert!(reason.contains("category"));
        assert!(!reason.contains("description"));
    }

    #[test]
    fn title_bounds_are_inclusive() {
        for len in [4, 201] {
            let request = SubmitReportRequest {
                title: Some("t".repeat(len)),
                ..valid_request()
            };
            assert!(rejection(&request).contains("entre 5 e 200"));
        }
        for len in [5, 200] {
            let request = SubmitReportRequest {
                title: Some("t".repeat(len)),
                ..valid_request()
            };
            assert_eq!(validate_submission(&request).unwrap().title.len(), len);
        }
    }

    #[test]
    fn description_bounds_are_inclusive() {
        for len in [19, 5001] {
            let request = SubmitReportRequest {
                description: Some("d".repeat(len)),
                ..valid_request()
            };
            assert!(rejection(&request).contains("entre 20 e 5000"));
        }
        for len in [20, 5000] {
            let request = SubmitReportRequest {
                description: Some("d".repeat(len)),
                ..valid_request()
            };
            assert!(validate_submission(&request).is_ok());
        }
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let request = SubmitReportRequest {
            title: Some("ã".repeat(200)),
            ..valid_request()
        };
        assert!(validate_submission(&request).is_ok());
    }

    #[test]
    fn email_must_look_like_an_address() {
        let request = SubmitReportRequest {
            is_anonymous: false,
            reporter_email: Some("not-an-email".into()),
            ..valid_request()
        };
        assert_eq!(rejection(&request), "Email inválido");

        let request = SubmitReportRequest {
            is_anonymous: false,
            reporter_email: Some("a@b.co".into()),
            ..valid_request()
        };
        let report = validate_submission(&request).unwrap();
        assert_eq!(report.reporter_email.as_deref(), Some("a@b.co"));
    }

    #[test]
    fn phone_separators_are_ignored_when_validating() {
        assert!(is_valid_phone("+55 (11) 98765-4321"));
        assert!(is_valid_phone("11987654321"));
        assert!(!is_valid_phone("0800 123"));
        assert!(!is_valid_phone("telefone"));

        let request = SubmitReportRequest {
            is_anonymous: false,
            reporter_phone: Some("abc-123".into()),
            ..valid_request()
        };
        assert_eq!(rejection(&request), "Telefone inválido");
    }

    #[test]
    fn company_id_must_be_a_uuid() {
        let request = SubmitReportRequest {
            company_id: Some("acme".into()),
            ..valid_request()
        };
        assert_eq!(rejection(&request), "Identificador de empresa inválido");
    }

    #[test]
    fn optional_fields_are_trimmed_and_truncated() {
        let request = SubmitReportRequest {
            is_anonymous: false,
            ai_summary: Some(format!("  {}  ", "s".repeat(1200))),
            reporter_name: Some("n".repeat(150)),
            department: Some("  Financeiro  ".into()),
            category: Some("c".repeat(80)),
            ..valid_request()
        };
        let report = validate_submission(&request).unwrap();
        assert_eq!(report.ai_summary.unwrap().len(), AI_SUMMARY_MAX_CHARS);
        assert_eq!(report.reporter_name.unwrap().len(), REPORTER_NAME_MAX_CHARS);
        assert_eq!(report.department.as_deref(), Some("Financeiro"));
        assert_eq!(report.category.len(), CATEGORY_MAX_CHARS);
    }

    #[test]
    fn anonymous_reports_drop_identifying_fields() {
        let request = SubmitReportRequest {
            is_anonymous: true,
            reporter_name: Some("Maria Souza".into()),
            reporter_email: Some("maria@empresa.com.br".into()),
            reporter_phone: Some("+5511987654321".into()),
            department: Some("Vendas".into()),
            ..valid_request()
        };
        let report = validate_submission(&request).unwrap();
        assert!(report.reporter_name.is_none());
        assert!(report.reporter_email.is_none());
        assert!(report.reporter_phone.is_none());
        assert!(report.department.is_none());
    }

    #[test]
    fn tracking_codes_are_normalized() {
        assert_eq!(normalize_tracking_code("  soia-ab12cd34ef ").unwrap(), "SOIA-AB12CD34EF");
        assert!(normalize_tracking_code("   ").is_err());
        assert!(normalize_tracking_code(&"A".repeat(TRACKING_CODE_MAX_CHARS)).is_ok());
        assert!(normalize_tracking_code(&"A".repeat(TRACKING_CODE_MAX_CHARS + 1)).is_err());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("  ação  ", 2), "aç");
    }
}
