//! HTTP API integration tests
//!
//! Drives the real router in-process; no listener is needed.

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use calcsrv::api::ApiServer;
use calcsrv::config::Config;
use formula_calc::FormulaEngine;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_router() -> Router {
    let engine = Arc::new(FormulaEngine::new());
    ApiServer::new(engine, Config::default()).router()
}

async fn post_calculate(body: &Value) -> Result<(StatusCode, Value)> {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
        )
        .await?;

    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body: Value = serde_json::from_slice(&bytes)?;
    Ok((status, body))
}

#[tokio::test]
async fn test_health_check() -> Result<()> {
    let response = test_router()
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await?.to_bytes();
    let health: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["service"], "calcsrv");

    Ok(())
}

#[tokio::test]
async fn test_calculate_with_variables() -> Result<()> {
    let (status, body) =
        post_calculate(&json!({"formula": "2 + x * 3", "variables": {"x": 4}})).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], json!(14));
    assert!(body.get("error").is_none());

    Ok(())
}

#[tokio::test]
async fn test_calculate_without_variables() -> Result<()> {
    let (status, body) = post_calculate(&json!({"formula": "1 + 1"})).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], json!(2));

    Ok(())
}

#[tokio::test]
async fn test_float_result() -> Result<()> {
    let (status, body) = post_calculate(&json!({"formula": "10 / 4"})).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], json!(2.5));

    Ok(())
}

#[tokio::test]
async fn test_comparison_result_is_numeric() -> Result<()> {
    let (status, body) = post_calculate(&json!({"formula": "1 < 2"})).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], json!(1));

    Ok(())
}

#[tokio::test]
async fn test_unknown_identifier_is_client_error() -> Result<()> {
    let (status, body) = post_calculate(&json!({"formula": "x + 1", "variables": {}})).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("unknown identifier"), "error was: {}", error);
    assert!(body.get("result").is_none());

    Ok(())
}

#[tokio::test]
async fn test_division_by_zero_is_client_error() -> Result<()> {
    let (status, body) = post_calculate(&json!({"formula": "10 / 0"})).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("domain error"), "error was: {}", error);

    Ok(())
}

#[tokio::test]
async fn test_injection_attempt_is_rejected() -> Result<()> {
    let (status, body) =
        post_calculate(&json!({"formula": "__import__('os')"})).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(
        error.contains("disallowed operation"),
        "error was: {}",
        error
    );

    Ok(())
}

#[tokio::test]
async fn test_non_numeric_variable_is_client_error() -> Result<()> {
    let (status, body) =
        post_calculate(&json!({"formula": "x + 1", "variables": {"x": "abc"}})).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("type mismatch"), "error was: {}", error);

    Ok(())
}

#[tokio::test]
async fn test_missing_formula_is_malformed_request() -> Result<()> {
    let (status, body) = post_calculate(&json!({"variables": {"x": 1}})).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("malformed request"), "error was: {}", error);

    Ok(())
}

#[tokio::test]
async fn test_invalid_json_body_is_malformed_request() -> Result<()> {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await?.to_bytes();
    let body: Value = serde_json::from_slice(&bytes)?;
    assert!(body["error"].as_str().unwrap().contains("malformed request"));

    Ok(())
}

#[tokio::test]
async fn test_cors_preflight_is_permitted() -> Result<()> {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/calculate")
                .header(header::ORIGIN, "http://example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_requests_are_isolated() -> Result<()> {
    let mut handles = Vec::new();

    for i in 0..16 {
        handles.push(tokio::spawn(async move {
            let seed = if i % 2 == 0 { 1_i64 } else { 100 };
            let (status, body) =
                post_calculate(&json!({"formula": "x + 1", "variables": {"x": seed}}))
                    .await
                    .unwrap();
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["result"], json!(seed + 1));
        }));
    }

    for handle in handles {
        handle.await?;
    }

    Ok(())
}
