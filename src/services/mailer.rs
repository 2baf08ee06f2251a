use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Transactional email sender.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), anyhow::Error>;
}

/// Sends through a Resend-style JSON API authenticated with a bearer key.
pub struct HttpMailer {
    client: Client,
    url: String,
    api_key: String,
}

impl HttpMailer {
    pub fn new(client: Client, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), anyhow::Error> {
        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(email)
            .send()
            .await
            .map_err(|e| {
                error!("HTTP request error calling email provider: {}", e);
                anyhow!(e)
            })?;

        if response.status().is_success() {
            debug!("Email provider accepted message for {} recipients", email.to.len());
            Ok(())
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            error!("Error response from email provider ({}): {}", status, error_body);
            Err(anyhow!("email provider returned {}", status))
        }
    }
}
