//! In-memory fakes for the storage, gateway and mailer seams.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::web;
use anyhow::anyhow;
use async_openai::types::CreateChatCompletionRequest;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::models::{Company, NewReport, Report, ReportStatus};
use crate::services::assistant::{ChatGateway, GatewayError, IntakeAssistant};
use crate::services::mailer::{Mailer, OutboundEmail};
use crate::services::notifier::NotificationDispatcher;
use crate::services::rate_limiter::{RateLimitPolicy, RateLimiter};
use crate::store::{CompanyDirectory, RateLimitStore, ReportStore};
use crate::AppState;

pub const INTERNAL_KEY: &str = "internal-secret";

type InsertFailure = fn() -> sqlx::Error;

fn relation_missing() -> sqlx::Error {
    sqlx::Error::Protocol("relation \"reports\" does not exist (SQLSTATE 42P01)".into())
}

#[derive(Default)]
pub struct MemoryStore {
    reports: Mutex<Vec<Report>>,
    companies: Mutex<HashMap<Uuid, Company>>,
    rate_limits: Mutex<Vec<(String, Option<Uuid>, DateTime<Utc>)>>,
    report_insert_failure: Mutex<Option<InsertFailure>>,
    fail_rate_limit_reads: AtomicBool,
}

impl MemoryStore {
    pub fn add_company(&self, company: Company) -> Company {
        self.companies
            .lock()
            .unwrap()
            .insert(company.id, company.clone());
        company
    }

    pub fn fail_report_inserts(&self, fail: bool) {
        let failure: Option<InsertFailure> = if fail { Some(relation_missing) } else { None };
        *self.report_insert_failure.lock().unwrap() = failure;
    }

    pub fn fail_report_inserts_with(&self, failure: InsertFailure) {
        *self.report_insert_failure.lock().unwrap() = Some(failure);
    }

    pub fn fail_rate_limit_reads(&self, fail: bool) {
        self.fail_rate_limit_reads.store(fail, Ordering::SeqCst);
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }

    pub fn rate_limit_rows(&self) -> usize {
        self.rate_limits.lock().unwrap().len()
    }

    pub fn rate_limit_snapshot(&self) -> Vec<(String, Option<Uuid>)> {
        self.rate_limits
            .lock()
            .unwrap()
            .iter()
            .map(|(hash, company_id, _)| (hash.clone(), *company_id))
            .collect()
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn insert_report(&self, report: &NewReport) -> Result<Report, sqlx::Error> {
        if let Some(failure) = *self.report_insert_failure.lock().unwrap() {
            return Err(failure());
        }
        if !self.companies.lock().unwrap().contains_key(&report.company_id) {
            return Err(sqlx::Error::Protocol(
                "insert on table \"reports\" violates foreign key constraint (SQLSTATE 23503)"
                    .into(),
            ));
        }

        let mut reports = self.reports.lock().unwrap();
        let saved = Report {
            id: Uuid::new_v4(),
            company_id: report.company_id,
            title: report.title.clone(),
            description: report.description.clone(),
            ai_summary: report.ai_summary.clone(),
            category: report.category.clone(),
            is_anonymous: report.is_anonymous,
            reporter_name: report.reporter_name.clone(),
            reporter_email: report.reporter_email.clone(),
            reporter_phone: report.reporter_phone.clone(),
            department: report.department.clone(),
            tracking_code: format!("SOIA-{:010X}", reports.len() + 1),
            status: "pending".into(),
            created_at: Utc::now(),
        };
        reports.push(saved.clone());
        Ok(saved)
    }

    async fn report_status(
        &self,
        tracking_code: &str,
    ) -> Result<Option<ReportStatus>, sqlx::Error> {
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .find(|report| report.tracking_code == tracking_code)
            .map(|report| ReportStatus {
                tracking_code: report.tracking_code.clone(),
                status: report.status.clone(),
                category: report.category.clone(),
                created_at: report.created_at,
            }))
    }

    async fn find_report(&self, tracking_code: &str) -> Result<Option<Report>, sqlx::Error> {
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .find(|report| report.tracking_code == tracking_code)
            .cloned())
    }
}

#[async_trait]
impl CompanyDirectory for MemoryStore {
    async fn find_company(&self, company_id: Uuid) -> Result<Option<Company>, sqlx::Error> {
        Ok(self.companies.lock().unwrap().get(&company_id).cloned())
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn count_since(
        &self,
        session_hash: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        if self.fail_rate_limit_reads.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        let count = self
            .rate_limits
            .lock()
            .unwrap()
            .iter()
            .filter(|(hash, _, at)| hash == session_hash && *at >= since)
            .count();
        Ok(count as i64)
    }

    async fn record(
        &self,
        session_hash: &str,
        company_id: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        self.rate_limits
            .lock()
            .unwrap()
            .push((session_hash.to_string(), company_id, at));
        Ok(())
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let mut rows = self.rate_limits.lock().unwrap();
        let before = rows.len();
        rows.retain(|(_, _, at)| *at >= cutoff);
        Ok((before - rows.len()) as u64)
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), anyhow::Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("email provider returned 422 Unprocessable Entity"));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

type Script = Box<dyn Fn() -> Result<Value, GatewayError> + Send + Sync>;

pub struct ScriptedGateway {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new(script: impl Fn() -> Result<Value, GatewayError> + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn replying(completion: Value) -> Self {
        Self::new(move || Ok(completion.clone()))
    }

    /// For handlers that never reach the gateway.
    pub fn unused() -> Self {
        Self::new(|| {
            Err(GatewayError::Status {
                status: 500,
                body: "gateway should not be called".into(),
            })
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatGateway for ScriptedGateway {
    async fn complete(&self, _request: &CreateChatCompletionRequest) -> Result<Value, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)()
    }
}

/// Wires the fakes into an [`AppState`] with cleanup draws disabled and
/// [`INTERNAL_KEY`] as the notify key.
pub fn app_state(
    store: &Arc<MemoryStore>,
    gateway: Arc<ScriptedGateway>,
    mailer: Arc<RecordingMailer>,
) -> web::Data<AppState> {
    let policy = RateLimitPolicy {
        cleanup_probability: 0.0,
        ..Default::default()
    };

    web::Data::new(AppState {
        reports: store.clone(),
        rate_limiter: RateLimiter::new(store.clone(), policy),
        assistant: IntakeAssistant::new(gateway, "test-model"),
        notifier: Arc::new(NotificationDispatcher::new(
            store.clone(),
            mailer,
            "SOIA <notificacoes@soia.app>",
            None,
        )),
        internal_api_key: Some(INTERNAL_KEY.into()),
    })
}
