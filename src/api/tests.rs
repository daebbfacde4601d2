use super::*;
use crate::testing::{memory_store, notifier, pending, preference, RecordingMailer};
use axum::body::Body;
use axum::http::Request;
use chrono::Duration;
use http_body_util::BodyExt;
use kaizen_core::model::ReportFrequency;
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "s3cret-token";

const OVERDUE_ROUTE: &str = "/functions/check-overdue-tasks";
const REPORT_DUE_ROUTE: &str = "/functions/check-report-due";
const REMINDER_ROUTE: &str = "/functions/send-task-reminder";
const REPORT_ROUTE: &str = "/functions/send-report-email";

async fn app_with(mailer: Arc<RecordingMailer>, secret: &str) -> (Router, Store) {
    let store = memory_store().await;
    let state = AppState::new(store.clone(), notifier(mailer), secret, 1);
    (build_router(state), store)
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, secret: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(s) = secret {
        builder = builder.header(CRON_SECRET_HEADER, s);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn reminder_body(email: &str) -> Value {
    json!({
        "userEmail": email,
        "taskTitle": "Finish the draft",
        "taskDescription": "Chapter 3",
        "xp": 50,
        "estimatedTime": 25,
    })
}

fn report_body(email: &str) -> Value {
    json!({
        "userEmail": email,
        "reportType": "weekly",
        "completedTasks": 4,
        "totalTasks": 5,
        "xpEarned": 40,
        "xpMissed": 10,
        "focusMinutes": 120,
        "interruptedSessions": 2,
        "completionRate": 80,
        "topInsight": "Keep going",
    })
}

/// One subscriber with a task an hour overdue.
async fn seed_overdue(store: &Store) {
    let pref = preference("a", "a@example.com", ReportFrequency::None, None);
    store.upsert_preference(&pref).await.unwrap();
    let t = pending("t1", "a", Utc::now() - Duration::hours(1));
    store.insert_task(&t).await.unwrap();
}

// --- auth ---

#[test]
fn test_constant_time_eq() {
    assert!(constant_time_eq("abc", "abc"));
    assert!(!constant_time_eq("abc", "abd"));
    assert!(!constant_time_eq("abc", "abcd"));
    assert!(constant_time_eq("", ""));
}

#[test]
fn test_check_cron_secret() {
    let mut headers = HeaderMap::new();
    assert!(check_cron_secret(&headers, SECRET).is_some());

    headers.insert(CRON_SECRET_HEADER, "wrong".parse().unwrap());
    let (status, Json(body)) = check_cron_secret(&headers, SECRET).unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Unauthorized"}));

    headers.insert(CRON_SECRET_HEADER, SECRET.parse().unwrap());
    assert!(check_cron_secret(&headers, SECRET).is_none());
}

#[test]
fn test_empty_configured_secret_fails_closed() {
    let mut headers = HeaderMap::new();
    headers.insert(CRON_SECRET_HEADER, "".parse().unwrap());
    assert!(check_cron_secret(&headers, "").is_some());
    assert!(check_cron_secret(&HeaderMap::new(), "").is_some());
}

#[tokio::test]
async fn test_every_function_route_requires_secret() {
    let mailer = Arc::new(RecordingMailer::default());
    let (app, _store) = app_with(mailer.clone(), SECRET).await;

    let cases = [
        (OVERDUE_ROUTE, json!({})),
        (REPORT_DUE_ROUTE, json!({})),
        (REMINDER_ROUTE, reminder_body("user@example.com")),
        (REPORT_ROUTE, report_body("user@example.com")),
    ];
    for (uri, body) in cases {
        for secret in [None, Some("nope")] {
            let resp = app
                .clone()
                .oneshot(post_json(uri, secret, body.clone()))
                .await
                .unwrap();
            assert_eq!(
                resp.status(),
                StatusCode::UNAUTHORIZED,
                "{uri} with {secret:?}"
            );
            assert_eq!(body_json(resp).await, json!({"error": "Unauthorized"}));
        }
    }
    assert_eq!(mailer.calls(), 0);
}

#[tokio::test]
async fn test_unauthorized_wins_over_bad_body() {
    let mailer = Arc::new(RecordingMailer::default());
    let (app, _store) = app_with(mailer.clone(), SECRET).await;

    let req = Request::builder()
        .method("POST")
        .uri(REMINDER_ROUTE)
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_overdue_scan_without_secret_leaves_store_untouched() {
    let mailer = Arc::new(RecordingMailer::default());
    let (app, store) = app_with(mailer.clone(), SECRET).await;
    seed_overdue(&store).await;

    let resp = app
        .oneshot(post_json(OVERDUE_ROUTE, None, json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(mailer.calls(), 0);
}

// --- senders ---

#[tokio::test]
async fn test_send_reminder_success() {
    let mailer = Arc::new(RecordingMailer::default());
    let (app, _store) = app_with(mailer.clone(), SECRET).await;

    let body = reminder_body("user@example.com");
    let resp = app
        .oneshot(post_json(REMINDER_ROUTE, Some(SECRET), body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["emailResponse"]["id"], "msg-1");

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["user@example.com".to_string()]);
    assert!(sent[0].html.contains("Finish the draft"));
    assert!(sent[0].html.contains("⏱️ 25 minutes"));
}

#[tokio::test]
async fn test_send_reminder_invalid_email_is_400_without_provider_call() {
    let mailer = Arc::new(RecordingMailer::default());
    let (app, _store) = app_with(mailer.clone(), SECRET).await;

    let too_long = format!("{}@example.com", "a".repeat(250));
    for email in ["not-an-email", "a b@example.com", too_long.as_str()] {
        let body = reminder_body(email);
        let resp = app
            .clone()
            .oneshot(post_json(REMINDER_ROUTE, Some(SECRET), body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{email}");
        assert_eq!(
            body_json(resp).await,
            json!({"error": "Invalid email address"})
        );
    }
    assert_eq!(mailer.calls(), 0);
}

#[tokio::test]
async fn test_send_reminder_missing_title_is_400() {
    let mailer = Arc::new(RecordingMailer::default());
    let (app, _store) = app_with(mailer.clone(), SECRET).await;

    let body = json!({"userEmail": "user@example.com", "taskTitle": "   "});
    let resp = app
        .oneshot(post_json(REMINDER_ROUTE, Some(SECRET), body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "taskTitle is required");
    assert_eq!(mailer.calls(), 0);
}

#[tokio::test]
async fn test_malformed_and_unknown_fields_are_400() {
    let mailer = Arc::new(RecordingMailer::default());
    let (app, _store) = app_with(mailer.clone(), SECRET).await;

    let mut extra = reminder_body("user@example.com");
    extra["isAdmin"] = json!(true);
    let mut mistyped = reminder_body("user@example.com");
    mistyped["xp"] = json!("lots");

    for body in [extra, mistyped] {
        let resp = app
            .clone()
            .oneshot(post_json(REMINDER_ROUTE, Some(SECRET), body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        let error = json["error"].as_str().unwrap();
        assert!(error.starts_with("invalid request"));
    }

    let req = Request::builder()
        .method("POST")
        .uri(REPORT_ROUTE)
        .header("content-type", "application/json")
        .header(CRON_SECRET_HEADER, SECRET)
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(mailer.calls(), 0);
}

#[tokio::test]
async fn test_send_reminder_escapes_markup() {
    let mailer = Arc::new(RecordingMailer::default());
    let (app, _store) = app_with(mailer.clone(), SECRET).await;

    let mut body = reminder_body("user@example.com");
    body["taskTitle"] = json!("<script>alert('x')</script>");
    let resp = app
        .oneshot(post_json(REMINDER_ROUTE, Some(SECRET), body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let html = &mailer.sent()[0].html;
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
}

#[tokio::test]
async fn test_provider_failure_is_500() {
    let mailer = Arc::new(RecordingMailer::failing_for(&["user@example.com"]));
    let (app, _store) = app_with(mailer.clone(), SECRET).await;

    let body = reminder_body("user@example.com");
    let resp = app
        .oneshot(post_json(REMINDER_ROUTE, Some(SECRET), body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp).await;
    let error = json["error"].as_str().unwrap();
    assert!(error.contains("provider rejected"));
    assert_eq!(mailer.calls(), 1);
}

#[tokio::test]
async fn test_send_report_success() {
    let mailer = Arc::new(RecordingMailer::default());
    let (app, _store) = app_with(mailer.clone(), SECRET).await;

    let body = report_body("user@example.com");
    let resp = app
        .oneshot(post_json(REPORT_ROUTE, Some(SECRET), body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["success"], true);

    let sent = mailer.sent();
    assert_eq!(sent[0].subject, "🌸 Your Weekly Report Card is Ready!");
    assert!(sent[0].html.contains("<strong>2 sessions</strong>"));
}

#[tokio::test]
async fn test_send_report_bad_type_is_400() {
    let mailer = Arc::new(RecordingMailer::default());
    let (app, _store) = app_with(mailer.clone(), SECRET).await;

    let mut body = report_body("user@example.com");
    body["reportType"] = json!("daily");
    let resp = app
        .oneshot(post_json(REPORT_ROUTE, Some(SECRET), body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await["error"],
        "reportType must be 'weekly' or 'monthly'"
    );
    assert_eq!(mailer.calls(), 0);
}

// --- jobs ---

#[tokio::test]
async fn test_check_overdue_tasks_route() {
    let mailer = Arc::new(RecordingMailer::default());
    let (app, store) = app_with(mailer.clone(), SECRET).await;
    seed_overdue(&store).await;

    let resp = app
        .oneshot(post_json(OVERDUE_ROUTE, Some(SECRET), json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["overdueTasksCount"], 1);
    assert_eq!(
        json["emailResults"],
        json!([{"taskId": "t1", "success": true}])
    );
    assert_eq!(mailer.calls(), 1);
}

#[tokio::test]
async fn test_check_report_due_route_shape() {
    let mailer = Arc::new(RecordingMailer::default());
    let (app, _store) = app_with(mailer.clone(), SECRET).await;

    let resp = app
        .oneshot(post_json(REPORT_DUE_ROUTE, Some(SECRET), json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Checked 0 users, sent 0 reports");
    assert_eq!(json["usersChecked"], 0);
    assert_eq!(json["reportsSent"], 0);
}

// --- misc ---

#[tokio::test]
async fn test_health_is_open() {
    let (app, _store) = app_with(Arc::new(RecordingMailer::default()), SECRET).await;
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert!(json["uptime_secs"].is_u64());
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _store) = app_with(Arc::new(RecordingMailer::default()), SECRET).await;
    let req = Request::builder()
        .method("OPTIONS")
        .uri(REMINDER_ROUTE)
        .header("origin", "https://app.example")
        .header("access-control-request-method", "POST")
        .header(
            "access-control-request-headers",
            "x-cron-secret, content-type",
        )
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
    let allowed = resp
        .headers()
        .get("access-control-allow-headers")
        .unwrap()
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed.contains("x-cron-secret"));
}

#[test]
fn test_error_status_mapping() {
    let cases = [
        (KaizenError::Unauthorized, 401),
        (KaizenError::Validation("x".into()), 400),
        (KaizenError::Store("x".into()), 500),
        (KaizenError::Timeout("x".into()), 500),
        (KaizenError::Mailer("x".into()), 500),
        (KaizenError::Config("x".into()), 500),
    ];
    for (err, code) in cases {
        assert_eq!(status_for(&err).as_u16(), code, "{err}");
        assert_eq!(err.is_client_error(), code < 500, "{err}");
    }
}
