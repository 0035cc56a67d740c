mod helpers;

use axum::http::StatusCode;
use base64::prelude::*;
use chrono::DateTime;
use helpers::{TEST_ACCESS_KEY_ID, TEST_SECRET_ACCESS_KEY, TestApp};
use hmac::{Hmac, Mac};
use report_gateway::Strategy;
use sha2::Sha256;

/// Independent HMAC-SHA256/base64 over a canonical string
fn expected_signature(payload: &str, secret: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload.as_bytes());
    BASE64_STANDARD.encode(mac.finalize().into_bytes())
}

#[tokio::test]
async fn test_header_strategy_response() {
    let app = TestApp::single(Strategy::Header, "reports/q1/summary.xlsx");

    let response = app.get("/api/v1/reports/file/42").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body_bytes().is_empty(), "No body expected");
    assert_eq!(
        response.header("x-accel-redirect"),
        Some("/internal/report-files/q1/summary.xlsx")
    );
    assert_eq!(response.header("x-filename"), Some("summary.xlsx"));

    let amz_date = response.header("x-amz-date").unwrap();
    assert!(DateTime::parse_from_str(amz_date, "%a, %d %b %Y %H:%M:%S %z").is_ok());

    let canonical = format!(
        "GET\n\napplication/vnd.openxmlformats-officedocument.spreadsheetml.sheet\n\nx-amz-date:{}\n/reports/q1/summary.xlsx",
        amz_date
    );
    let authorization = response.header("x-authorization").unwrap();
    assert_eq!(
        authorization,
        format!(
            "AWS4 {}:{}",
            TEST_ACCESS_KEY_ID,
            expected_signature(&canonical, TEST_SECRET_ACCESS_KEY)
        )
    );
}

#[tokio::test]
async fn test_header_strategy_redirect_is_percent_encoded() {
    let app = TestApp::single(Strategy::Header, "reports/2024/Q1 draft?.pdf");

    let response = app.get("/api/v1/reports/file/1").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header("x-accel-redirect"),
        Some("/internal/report-files/2024/Q1%20draft%3F.pdf")
    );
    assert_eq!(response.header("x-filename"), Some("Q1 draft?.pdf"));

    // The signature still covers the raw resource path
    let amz_date = response.header("x-amz-date").unwrap();
    let canonical = format!(
        "GET\n\napplication/pdf\n\nx-amz-date:{}\n/reports/2024/Q1 draft?.pdf",
        amz_date
    );
    assert_eq!(
        response.header("x-authorization").unwrap(),
        format!(
            "AWS4 {}:{}",
            TEST_ACCESS_KEY_ID,
            expected_signature(&canonical, TEST_SECRET_ACCESS_KEY)
        )
    );
}

#[tokio::test]
async fn test_header_strategy_never_leaks_secret() {
    let app = TestApp::single(Strategy::Header, "reports/q1.xlsx");

    let response = app.get("/api/v1/reports/file/1").await;

    for (_, value) in response.headers.iter() {
        assert!(
            !value
                .to_str()
                .unwrap_or_default()
                .contains(TEST_SECRET_ACCESS_KEY)
        );
    }
    assert!(response.headers.get("content-type").is_none());
}

#[tokio::test]
async fn test_header_strategy_does_not_need_object() {
    // Existence is only discovered downstream
    let app = TestApp::single(Strategy::Header, "reports/missing.xlsx");

    let response = app.get("/api/v1/reports/file/1").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("x-filename"), Some("missing.xlsx"));
}

#[tokio::test]
async fn test_header_strategy_unknown_extension() {
    let app = TestApp::single(Strategy::Header, "reports/export.csv");

    let response = app.get("/api/v1/reports/file/1").await;
    assert_eq!(response.status, StatusCode::OK);

    let amz_date = response.header("x-amz-date").unwrap();
    let canonical = format!("GET\n\n\n\nx-amz-date:{}\n/reports/export.csv", amz_date);
    let authorization = response.header("x-authorization").unwrap();
    assert!(authorization.ends_with(&expected_signature(&canonical, TEST_SECRET_ACCESS_KEY)));
}
