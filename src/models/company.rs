use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{query_as, FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub notification_email_1: Option<String>,
    pub notification_email_2: Option<String>,
    pub notification_email_3: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Company {
    fn default() -> Self {
        Company {
            id: Uuid::new_v4(),
            name: String::new(),
            email: None,
            notification_email_1: None,
            notification_email_2: None,
            notification_email_3: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

impl Company {
    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        query_as::<_, Company>(
            r#"
            SELECT id, name, email, notification_email_1, notification_email_2,
                   notification_email_3, created_at, updated_at
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Every configured, non-blank notification address, primary first,
    /// without case-insensitive duplicates.
    pub fn notification_recipients(&self) -> Vec<String> {
        let mut recipients: Vec<String> = Vec::with_capacity(4);
        for address in [
            &self.email,
            &self.notification_email_1,
            &self.notification_email_2,
            &self.notification_email_3,
        ]
        .into_iter()
        .flatten()
        {
            let address = address.trim();
            if address.is_empty()
                || recipients
                    .iter()
                    .any(|existing| existing.eq_ignore_ascii_case(address))
            {
                continue;
            }
            recipients.push(address.to_string());
        }
        recipients
    }
}
