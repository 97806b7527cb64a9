//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use pulse_core::test_utils::{sample_request_json, valid_reply};
use pulse_core::{AIClient, AiAnalyzer, MockBackend, PromptTemplate};
use std::time::Duration;
use tower::ServiceExt;

fn setup_test_app() -> Router {
    create_router(
        Arc::new(AnalysisOrchestrator::heuristic_only()),
        ServerConfig::default(),
    )
}

fn setup_app_with_mock(mock: MockBackend) -> Router {
    let analyzer = AiAnalyzer::new(
        AIClient::Mock(mock),
        PromptTemplate::default(),
        Duration::from_secs(5),
    );
    create_router(
        Arc::new(AnalysisOrchestrator::new(Some(analyzer))),
        ServerConfig::default(),
    )
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_analyze(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

// ========== Health Tests ==========

#[tokio::test]
async fn test_health_heuristic_only() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["ai_enabled"], false);
    assert!(json["provider"].is_null());
    assert!(json["model"].is_null());
}

#[tokio::test]
async fn test_health_with_ai() {
    let app = setup_app_with_mock(MockBackend::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = get_body_json(response).await;
    assert_eq!(json["ai_enabled"], true);
    assert_eq!(json["provider"], "mock");
    assert_eq!(json["model"], "mock");
}

// ========== Analyze Tests ==========

#[tokio::test]
async fn test_analyze_heuristic() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_analyze(sample_request_json().to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(SOURCE_HEADER).unwrap(), "heuristic");

    let json = get_body_json(response).await;
    assert_eq!(json["best_day_date"], "2024-01-02");
    assert_eq!(json["best_day_weekday"], "Tuesday");
    assert_eq!(json["score"], 0.55);
    assert!((json["volatility"].as_f64().unwrap() - 0.202).abs() < 0.001);
    assert_eq!(json["insights"].as_array().unwrap().len(), 4);
    assert_eq!(
        json["reason"],
        "Heuristic analysis based on average revenue per weekday"
    );
}

#[tokio::test]
async fn test_analyze_ai_result() {
    let app = setup_app_with_mock(MockBackend::with_reply(&valid_reply()));

    let response = app
        .oneshot(post_analyze(sample_request_json().to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(SOURCE_HEADER).unwrap(), "ai");

    let json = get_body_json(response).await;
    assert_eq!(json["score"], 0.85);
    assert_eq!(json["insights"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_analyze_ai_failure_is_invisible() {
    let app = setup_app_with_mock(MockBackend::failing("provider exploded"));

    let response = app
        .oneshot(post_analyze(sample_request_json().to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(SOURCE_HEADER).unwrap(), "heuristic");

    let json = get_body_json(response).await;
    assert_eq!(json["score"], 0.55);
    assert!(!json.to_string().contains("exploded"));
}

#[tokio::test]
async fn test_analyze_single_metric_is_bad_request() {
    let app = setup_test_app();

    let mut body = sample_request_json();
    body["metrics"].as_array_mut().unwrap().truncate(1);

    let response = app.oneshot(post_analyze(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(
        json["error"],
        "at least 2 metrics are required for analysis, got 1"
    );
}

#[tokio::test]
async fn test_analyze_missing_timezone_is_bad_request() {
    let app = setup_test_app();

    let mut body = sample_request_json();
    body.as_object_mut().unwrap().remove("timezone");

    let response = app.oneshot(post_analyze(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "timezone is required");
}

#[tokio::test]
async fn test_analyze_metric_out_of_period_is_bad_request() {
    let app = setup_test_app();

    let mut body = sample_request_json();
    body["metrics"][0]["date"] = "2023-12-31".into();

    let response = app.oneshot(post_analyze(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("2023-12-31"));
}

#[tokio::test]
async fn test_analyze_negative_revenue_names_metric() {
    let app = setup_test_app();

    let mut body = sample_request_json();
    body["metrics"][1]["revenue"] = (-10.0).into();

    let response = app.oneshot(post_analyze(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().starts_with("metrics[1]:"));
}

#[tokio::test]
async fn test_analyze_missing_revenue_reports_rule_order() {
    let app = setup_test_app();

    // One metric left, and it has no revenue: the count rule fires first
    let mut body = sample_request_json();
    body["metrics"].as_array_mut().unwrap().truncate(1);
    body["metrics"][0].as_object_mut().unwrap().remove("revenue");

    let response = app.oneshot(post_analyze(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(
        json["error"],
        "at least 2 metrics are required for analysis, got 1"
    );
}

#[tokio::test]
async fn test_analyze_missing_revenue_is_bad_request() {
    let app = setup_test_app();

    let mut body = sample_request_json();
    body["metrics"][1].as_object_mut().unwrap().remove("revenue");

    let response = app.oneshot(post_analyze(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "metrics[1]: revenue is required");
}

#[tokio::test]
async fn test_analyze_malformed_json_is_rejected() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_analyze("{not json".to_string()))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_analyze_wrong_type_is_unprocessable() {
    let app = setup_test_app();

    let mut body = sample_request_json();
    body["metrics"][0]["revenue"] = "lots".into();

    let response = app.oneshot(post_analyze(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ========== Error Mapping Tests ==========

#[test]
fn test_app_error_hides_internal_detail() {
    let err: AppError = pulse_core::Error::Config("secret path /etc/x".into()).into();
    assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.message, "An internal error occurred");
}

#[test]
fn test_app_error_validation_is_bad_request() {
    let err: AppError = pulse_core::Error::from(pulse_core::ValidationError::NoMetrics).into();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.message, "metrics must not be empty");
}
