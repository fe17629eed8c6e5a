//! Router tests over an in-memory SQLite store

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use report_server::api::create_router;
use report_server::db::SqliteRepository;
use report_server::state::AppState;
use serde_json::{Value, json};
use shared::models::{ReportEnvelope, ReportPayload};
use tower::ServiceExt;

async fn seeded_repo() -> SqliteRepository {
    let repo = SqliteRepository::in_memory().await.unwrap();
    let pool = repo.pool();

    sqlx::query(
        "INSERT INTO users (id, created_at, status) VALUES
         ('1', '2024-01-01', 'active'),
         ('2', '2024-01-15 08:00:00+00', 'inactive')",
    )
    .execute(pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO feedback (user_id, rating, submitted_at) VALUES
         ('1', 4, '2024-01-02T10:00:00Z'),
         ('1', 2, '2024-01-03T10:00:00Z')",
    )
    .execute(pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO redemptions (user_id, is_active, redeemed_date, points_redeemed) VALUES
         ('2', 1, '2024-02-01', 40),
         ('2', 0, '2024-03-01', 90)",
    )
    .execute(pool)
    .await
    .unwrap();

    repo
}

async fn add_tickets(repo: &SqliteRepository) {
    sqlx::query(
        "INSERT INTO support_tickets (id, user_id, created_at, updated_at, status) VALUES
         ('t1', '1', '2024-01-01T00:00:00Z', '2024-01-01T02:00:00Z', 'resolved'),
         ('t2', '2', '2024-01-01T00:00:00Z', NULL, 'open')",
    )
    .execute(repo.pool())
    .await
    .unwrap();
}

fn app(repo: SqliteRepository) -> Router {
    create_router(AppState::new(Arc::new(repo), 2))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn generate(body: Value) -> Request<Body> {
    Request::post("/api/generate-reports")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app(SqliteRepository::in_memory().await.unwrap());
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "report-server");
}

#[tokio::test]
async fn report_types_are_listed() {
    let app = app(SqliteRepository::in_memory().await.unwrap());
    let (status, body) = send(&app, get("/api/reports/types")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            "User Engagement",
            "User Engagement - Activity",
            "User Engagement - Feedback",
            "User Engagement - Rewards",
            "Ticket Metrics"
        ])
    );
}

#[tokio::test]
async fn generate_user_engagement_report() {
    let app = app(seeded_repo().await);

    let (status, body) = send(&app, generate(json!({"reportType": "User Engagement"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let report: ReportEnvelope = serde_json::from_value(body["report"].clone()).unwrap();
    assert_eq!(report.report_type, "User Engagement");

    let data: Value = serde_json::from_str(&report.data).unwrap();
    assert_eq!(
        data,
        json!([
            {
                "userId": "1",
                "createdAt": "2024-01-01",
                "activityCount": 0,
                "feedbackCount": 2,
                "pointsRedeemed": 0,
                "avgFeedbackRating": 3.0
            },
            {
                "userId": "2",
                "createdAt": "2024-01-15",
                "activityCount": 0,
                "feedbackCount": 0,
                "pointsRedeemed": 90,
                "avgFeedbackRating": 0.0
            }
        ])
    );
}

#[tokio::test]
async fn generate_for_single_user() {
    let app = app(seeded_repo().await);

    let (status, body) = send(
        &app,
        generate(json!({"reportType": "User Engagement - Rewards", "userId": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let report: ReportEnvelope = serde_json::from_value(body["report"].clone()).unwrap();
    let ReportPayload::RewardsEngagement(rows) = report.decode().unwrap() else {
        panic!("expected rewards rows");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].user_id, "2");
    assert_eq!(rows[0].points_redeemed, 90);
}

#[tokio::test]
async fn generate_ticket_metrics_then_read_latest() {
    let repo = seeded_repo().await;
    add_tickets(&repo).await;
    let app = app(repo);

    let (status, _) = send(&app, generate(json!({"reportType": "User Engagement"}))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, generate(json!({"reportType": "Ticket Metrics"}))).await;
    assert_eq!(status, StatusCode::OK);
    let generated: ReportEnvelope = serde_json::from_value(body["report"].clone()).unwrap();

    let (status, body) = send(&app, get("/api/reports/latest")).await;
    assert_eq!(status, StatusCode::OK);
    let latest: Vec<ReportEnvelope> = serde_json::from_value(body).unwrap();
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0], generated);
    assert_eq!(latest[1].report_type, "User Engagement");

    let metrics: Value = serde_json::from_str(&latest[0].data).unwrap();
    assert_eq!(
        metrics,
        json!({
            "totalTickets": 2,
            "resolvedTickets": 1,
            "resolutionRate": "50.00",
            "avgResponseTimeHours": "2.00",
            "submissionRate": "2.00"
        })
    );

    let (status, body) = send(&app, get("/api/reports/latest?limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_report_type_is_bad_request() {
    let app = app(seeded_repo().await);

    let (status, body) = send(&app, generate(json!({"userId": "1"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required parameter: reportType");

    let request = Request::post("/api/generate-reports")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unsupported_type_is_not_persisted() {
    let app = app(seeded_repo().await);

    let (status, body) = send(&app, generate(json!({"reportType": "Earnings"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to generate reports");
    assert_eq!(body["details"], "Unsupported report type: Earnings");

    let (status, _) = send(&app, get("/api/reports/latest")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ticket_metrics_without_tickets_fails() {
    let app = app(seeded_repo().await);

    let (status, body) = send(&app, generate(json!({"reportType": "Ticket Metrics"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["details"], "No tickets data found");
}

#[tokio::test]
async fn latest_without_reports_is_not_found() {
    let app = app(SqliteRepository::in_memory().await.unwrap());
    let (status, body) = send(&app, get("/api/reports/latest")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Failed to fetch reports");
    assert_eq!(body["details"], "No reports found");
}

#[tokio::test]
async fn latest_limit_out_of_range_is_bad_request() {
    let app = app(SqliteRepository::in_memory().await.unwrap());
    let (status, _) = send(&app, get("/api/reports/latest?limit=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, get("/api/reports/latest?limit=51")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, get("/api/reports/latest?limit=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = app(SqliteRepository::in_memory().await.unwrap());
    let request = Request::get("/health")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
