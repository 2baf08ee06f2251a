//! Emails a company's configured recipients when a report arrives.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::mailer::{Mailer, OutboundEmail};
use crate::store::CompanyDirectory;

const LOOKUP_FAILURE: &str = "Erro ao carregar os dados da empresa.";
const SEND_FAILURE: &str = "Erro ao enviar notificação.";

#[derive(Debug, Clone)]
pub struct ReportNotice {
    pub company_id: Uuid,
    pub tracking_code: String,
    pub title: String,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent { recipients: usize },
    NoRecipients,
}

impl DispatchOutcome {
    pub fn recipients(&self) -> usize {
        match self {
            DispatchOutcome::Sent { recipients } => *recipients,
            DispatchOutcome::NoRecipients => 0,
        }
    }
}

pub struct NotificationDispatcher {
    companies: Arc<dyn CompanyDirectory>,
    mailer: Arc<dyn Mailer>,
    from: String,
    app_url: Option<String>,
}

impl NotificationDispatcher {
    pub fn new(
        companies: Arc<dyn CompanyDirectory>,
        mailer: Arc<dyn Mailer>,
        from: impl Into<String>,
        app_url: Option<String>,
    ) -> Self {
        Self {
            companies,
            mailer,
            from: from.into(),
            app_url,
        }
    }

    pub async fn dispatch(&self, notice: &ReportNotice) -> Result<DispatchOutcome, ApiError> {
        let company = self
            .companies
            .find_company(notice.company_id)
            .await
            .map_err(|e| {
                error!("Failed to load company {}: {:?}", notice.company_id, e);
                ApiError::storage(LOOKUP_FAILURE, e)
            })?
            .ok_or_else(|| {
                warn!("Company not found for notification: {}", notice.company_id);
                ApiError::NotFound("Empresa não encontrada")
            })?;

        let recipients = company.notification_recipients();
        if recipients.is_empty() {
            info!(
                "Company {} has no notification emails configured, skipping",
                company.id
            );
            return Ok(DispatchOutcome::NoRecipients);
        }

        let email = self.compose(&company.name, notice, recipients);
        let count = email.to.len();
        self.mailer.send(&email).await.map_err(|e| {
            error!(
                "Failed to send report notification {}: {:?}",
                notice.tracking_code, e
            );
            ApiError::upstream(SEND_FAILURE, e)
        })?;

        info!(
            "Report notification {} sent to {} recipients",
            notice.tracking_code, count
        );
        Ok(DispatchOutcome::Sent { recipients: count })
    }

    fn compose(&self, company_name: &str, notice: &ReportNotice, to: Vec<String>) -> OutboundEmail {
        let dashboard = self
            .app_url
            .as_ref()
            .map(|url| {
                format!(
                    r#"<p><a href="{}/dashboard/denuncias">Acessar o painel de denúncias</a></p>"#,
                    url
                )
            })
            .unwrap_or_default();

        let html = format!(
            r#"<h2>Nova denúncia recebida</h2>
<p>Uma nova denúncia foi registrada no canal da empresa <strong>{company}</strong>.</p>
<ul>
<li><strong>Protocolo:</strong> {code}</li>
<li><strong>Título:</strong> {title}</li>
<li><strong>Categoria:</strong> {category}</li>
</ul>
{dashboard}
<p>Trate esta informação com sigilo.</p>"#,
            company = escape_html(company_name),
            code = escape_html(&notice.tracking_code),
            title = escape_html(&notice.title),
            category = escape_html(&notice.category),
            dashboard = dashboard,
        );

        OutboundEmail {
            from: self.from.clone(),
            to,
            subject: format!("Nova denúncia recebida - Protocolo {}", notice.tracking_code),
            html,
        }
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
