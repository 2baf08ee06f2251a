use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{http::header, web, web::ServiceConfig};
use anyhow::Context;
use shuttle_actix_web::ShuttleActixWeb;
use shuttle_runtime::SecretStore;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use config::AppConfig;
use routes::ApiDoc;
use services::assistant::{HttpChatGateway, IntakeAssistant};
use services::mailer::HttpMailer;
use services::notifier::NotificationDispatcher;
use services::rate_limiter::{schedule_sweep, RateLimiter};
use store::{PgStore, ReportStore};

mod config;
mod error;
mod middleware;
mod models;
mod prompts;
mod routes;
mod services;
mod store;
#[cfg(test)]
mod testing;
mod types;

pub struct AppState {
    pub reports: Arc<dyn ReportStore>,
    pub rate_limiter: RateLimiter,
    pub assistant: IntakeAssistant,
    pub notifier: Arc<NotificationDispatcher>,
    /// Bearer key required by `/notify-report`, when set.
    pub internal_api_key: Option<String>,
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_runtime::Secrets] secret_store: SecretStore,
) -> ShuttleActixWeb<impl FnOnce(&mut ServiceConfig) + Send + Clone + 'static> {
    let app_config = AppConfig::new(&secret_store)?;

    let pool = PgPoolOptions::new()
        .max_connections(app_config.db_max_connections)
        .connect(&app_config.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("Database migrations applied");

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(app_config.http_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let store = Arc::new(PgStore::new(pool));
    let gateway = Arc::new(HttpChatGateway::new(
        http_client.clone(),
        app_config.ai_gateway_url.clone(),
        app_config.ai_gateway_api_key.clone(),
    ));
    let mailer = Arc::new(HttpMailer::new(
        http_client,
        app_config.email_api_url.clone(),
        app_config.email_api_key.clone(),
    ));
    let notifier = Arc::new(NotificationDispatcher::new(
        store.clone(),
        mailer,
        app_config.email_from.clone(),
        app_config.app_url.clone(),
    ));
    let rate_limiter = RateLimiter::new(store.clone(), app_config.rate_limit_policy());

    if let Some(cron) = app_config.rate_limit_sweep_cron.as_deref() {
        // The scheduler keeps running after its handle is dropped.
        schedule_sweep(rate_limiter.clone(), cron).await?;
    }

    let app_state = web::Data::new(AppState {
        reports: store,
        rate_limiter,
        assistant: IntakeAssistant::new(gateway, app_config.ai_model.clone()),
        notifier,
        internal_api_key: app_config.internal_api_key.clone(),
    });

    let config = move |cfg: &mut ServiceConfig| {
        cfg.service(
            web::scope("")
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                        .allowed_headers(vec![
                            header::AUTHORIZATION,
                            header::CONTENT_TYPE,
                            header::HeaderName::from_static("apikey"),
                            header::HeaderName::from_static("x-client-info"),
                            header::HeaderName::from_static("x-session-id"),
                            header::HeaderName::from_static("x-company-id"),
                        ])
                        .max_age(3600),
                )
                .app_data(app_state.clone())
                .service(Scalar::with_url("/scalar", ApiDoc::openapi()))
                .configure(routes::configure),
        );
    };

    Ok(config.into())
}
