//! HTTP entry points for the external scheduler and other callers.
//!
//! Every `/functions/*` route is gated by the `x-cron-secret` header. The
//! check runs before the body is parsed, so an unauthorized caller never
//! reaches validation, the store, or the mail provider.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderName, Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use kaizen_core::{
    config::ApiConfig,
    error::KaizenError,
    model::{ReminderRequest, ReportRequest},
};
use kaizen_store::Store;
use serde_json::{json, Value};
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::jobs;
use crate::notify::Notifier;

pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct AppState {
    store: Store,
    notifier: Notifier,
    cron_secret: String,
    concurrency: usize,
    uptime: Instant,
}

impl AppState {
    pub fn new(store: Store, notifier: Notifier, cron_secret: &str, concurrency: usize) -> Self {
        Self {
            store,
            notifier,
            cron_secret: cron_secret.to_string(),
            concurrency,
            uptime: Instant::now(),
        }
    }
}

/// Constant-time string comparison to prevent timing attacks on the secret.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Check the shared secret. Returns `None` if authorized, `Some(response)` if rejected.
///
/// An empty configured secret rejects everything.
fn check_cron_secret(headers: &HeaderMap, secret: &str) -> Option<(StatusCode, Json<Value>)> {
    let provided = headers
        .get(CRON_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(value) if !secret.is_empty() && constant_time_eq(value, secret) => None,
        _ => {
            warn!("api: rejected request with missing or invalid {CRON_SECRET_HEADER}");
            Some(error_response(&KaizenError::Unauthorized))
        }
    }
}

fn status_for(err: &KaizenError) -> StatusCode {
    match err {
        KaizenError::Unauthorized => StatusCode::UNAUTHORIZED,
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &KaizenError) -> (StatusCode, Json<Value>) {
    (status_for(err), Json(json!({"error": err.to_string()})))
}

fn bad_body(rejection: JsonRejection) -> (StatusCode, Json<Value>) {
    let message = format!("invalid request: {}", rejection.body_text());
    (StatusCode::BAD_REQUEST, Json(json!({"error": message})))
}

/// `GET /health` — Liveness and uptime. Not gated.
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_secs": state.uptime.elapsed().as_secs(),
    }))
}

/// `POST /functions/check-overdue-tasks` — Remind owners of overdue tasks.
async fn check_overdue_tasks(headers: HeaderMap, State(state): State<AppState>) -> ApiResult {
    if let Some(err) = check_cron_secret(&headers, &state.cron_secret) {
        return Err(err);
    }

    let now = Utc::now();
    let summary = jobs::check_overdue_tasks(&state.store, &state.notifier, state.concurrency, now)
        .await
        .map_err(|e| {
            error!("api: overdue scan failed: {e}");
            error_response(&e)
        })?;

    Ok(Json(json!(summary)))
}

/// `POST /functions/check-report-due` — Send the report cards due now.
async fn check_report_due(headers: HeaderMap, State(state): State<AppState>) -> ApiResult {
    if let Some(err) = check_cron_secret(&headers, &state.cron_secret) {
        return Err(err);
    }

    let now = Utc::now();
    let summary = jobs::check_report_due(&state.store, &state.notifier, state.concurrency, now)
        .await
        .map_err(|e| {
            error!("api: report check failed: {e}");
            error_response(&e)
        })?;

    Ok(Json(json!(summary)))
}

/// `POST /functions/send-task-reminder` — Send one reminder email.
async fn send_task_reminder(
    headers: HeaderMap,
    State(state): State<AppState>,
    body: Result<Json<ReminderRequest>, JsonRejection>,
) -> ApiResult {
    if let Some(err) = check_cron_secret(&headers, &state.cron_secret) {
        return Err(err);
    }
    let Json(request) = body.map_err(bad_body)?;

    let email_response = state
        .notifier
        .send_reminder(&request)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(json!({
        "success": true,
        "emailResponse": email_response,
    })))
}

/// `POST /functions/send-report-email` — Send one report card.
async fn send_report_email(
    headers: HeaderMap,
    State(state): State<AppState>,
    body: Result<Json<ReportRequest>, JsonRejection>,
) -> ApiResult {
    if let Some(err) = check_cron_secret(&headers, &state.cron_secret) {
        return Err(err);
    }
    let Json(request) = body.map_err(bad_body)?;

    let email_response = state
        .notifier
        .send_report(&request)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(json!({
        "success": true,
        "emailResponse": email_response,
    })))
}

/// Preflight answers for browser callers.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("apikey"),
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static(CRON_SECRET_HEADER),
        ])
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/functions/check-overdue-tasks", post(check_overdue_tasks))
        .route("/functions/check-report-due", post(check_report_due))
        .route("/functions/send-task-reminder", post(send_task_reminder))
        .route("/functions/send-report-email", post(send_report_email))
        .layer(axum::extract::DefaultBodyLimit::max(64 * 1024))
        .layer(cors_layer())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &ApiConfig, state: AppState) -> anyhow::Result<()> {
    if config.cron_secret.is_empty() {
        warn!("api: no cron secret configured, every /functions request will be rejected");
    }

    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;

    info!("API server listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests;
