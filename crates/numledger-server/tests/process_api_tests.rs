//! HTTP tests for `POST /process`
//!
//! Each test gets a fresh database from `#[sqlx::test]` and a temporary audit
//! log, then drives the full router (middleware included) with `oneshot`.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use numledger_server::{
    api::create_router,
    audit::AuditLog,
    config::{Config, LedgerConfig},
    NumberLedger,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

// ============================================================================
// Helper Functions
// ============================================================================

struct TestApp {
    router: Router,
    ledger: NumberLedger,
    _dir: TempDir,
}

async fn create_test_app(pool: PgPool) -> TestApp {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.ledger = LedgerConfig {
        max_number: 100,
        audit_log_path: dir.path().join("logs.txt"),
    };

    let ledger = NumberLedger::initialize(pool, &config.ledger).await.unwrap();
    let router = create_router(ledger.clone(), &config);

    TestApp {
        router,
        ledger,
        _dir: dir,
    }
}

async fn post_raw(app: &Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/process")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();

    (status, body)
}

async fn post_json(app: &Router, body: Value) -> (StatusCode, Value) {
    post_raw(app, body.to_string()).await
}

async fn audit_messages(audit: &AuditLog) -> Vec<String> {
    audit
        .entries()
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.message)
        .collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[sqlx::test(migrations = false)]
async fn test_insert_on_empty_ledger(pool: PgPool) {
    let app = create_test_app(pool).await;

    let (status, body) = post_json(&app.router, json!({ "number": 5 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Response: 6. Number 5 has been added to the database." })
    );
    assert_eq!(app.ledger.numbers().await.unwrap(), vec![5]);
}

#[sqlx::test(migrations = false)]
async fn test_repeat_number_is_case_one(pool: PgPool) {
    let app = create_test_app(pool).await;

    post_json(&app.router, json!({ "number": 5 })).await;
    let (status, body) = post_json(&app.router, json!({ "number": 5 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Number 5 is already in the database. (case 1)" })
    );
    assert_eq!(app.ledger.numbers().await.unwrap(), vec![5]);
}

#[sqlx::test(migrations = false)]
async fn test_predecessor_of_stored_number_is_case_two(pool: PgPool) {
    let app = create_test_app(pool).await;

    post_json(&app.router, json!({ "number": 5 })).await;
    let (status, body) = post_json(&app.router, json!({ "number": 4 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Number 5 is already in the database. (case 2)" })
    );
    assert_eq!(app.ledger.numbers().await.unwrap(), vec![5]);
}

#[sqlx::test(migrations = false)]
async fn test_out_of_range_numbers_are_rejected(pool: PgPool) {
    let app = create_test_app(pool).await;

    for number in [0, 100, 150, -3] {
        let (status, body) = post_json(&app.router, json!({ "number": number })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "number {}", number);
        assert_eq!(body, json!({ "error": "The input must be between 1 and 99." }));
    }

    // Integer literals that do not fit a float or an i64 cleanly
    for raw in [r#"{"number": -0}"#, r#"{"number": 18446744073709551616}"#] {
        let (status, body) = post_raw(&app.router, raw).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", raw);
        assert_eq!(body, json!({ "error": "The input must be between 1 and 99." }));
    }

    assert!(app.ledger.numbers().await.unwrap().is_empty());
}

#[sqlx::test(migrations = false)]
async fn test_bounds_are_accepted(pool: PgPool) {
    let app = create_test_app(pool).await;

    let (status, _) = post_json(&app.router, json!({ "number": 1 })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(&app.router, json!({ "number": 99 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Response: 100. Number 99 has been added to the database." })
    );
}

#[sqlx::test(migrations = false)]
async fn test_missing_number_is_rejected(pool: PgPool) {
    let app = create_test_app(pool).await;

    for body in [json!({}), json!({ "number": null }), json!({ "value": 5 })] {
        let (status, body) = post_json(&app.router, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid input. Please send a number." }));
    }

    let (status, body) = post_raw(&app.router, Body::empty()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid input. Please send a number." }));

    // Malformed requests are not audited
    assert!(audit_messages(app.ledger.audit()).await.is_empty());
}

#[sqlx::test(migrations = false)]
async fn test_non_integer_numbers_are_rejected(pool: PgPool) {
    let app = create_test_app(pool).await;

    for number in [json!(5.5), json!(5.0), json!("5"), json!(true), json!([5]), json!({ "n": 5 })]
    {
        let (status, body) = post_json(&app.router, json!({ "number": number })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "number {}", number);
        assert_eq!(body, json!({ "error": "The input must be a valid integer." }));
    }

    assert!(app.ledger.numbers().await.unwrap().is_empty());
}

// ============================================================================
// Audit Log
// ============================================================================

#[sqlx::test(migrations = false)]
async fn test_audit_log_records_outcomes_in_order(pool: PgPool) {
    let app = create_test_app(pool).await;

    post_json(&app.router, json!({ "number": 5 })).await;
    post_json(&app.router, json!({ "number": 5 })).await;
    post_json(&app.router, json!({ "number": 4 })).await;
    post_json(&app.router, json!({ "number": 150 })).await;
    post_json(&app.router, json!({ "number": "x" })).await;
    post_json(&app.router, json!({})).await;

    assert_eq!(
        audit_messages(app.ledger.audit()).await,
        vec![
            "Response: 6. Number 5 has been added to the database.",
            "Number 5 is already in the database. (case 1)",
            "Number 5 is already in the database. (case 2)",
            "The input must be between 1 and 99.",
            "The input must be a valid integer.",
        ]
    );
}

#[sqlx::test(migrations = false)]
async fn test_audit_file_uses_timestamped_lines(pool: PgPool) {
    let app = create_test_app(pool).await;

    post_json(&app.router, json!({ "number": 7 })).await;

    let contents = tokio::fs::read_to_string(app.ledger.audit().path())
        .await
        .unwrap();
    let line = contents.lines().next().unwrap();
    let (timestamp, message) = line.split_once(" - ").unwrap();

    assert!(is_audit_timestamp(timestamp), "unexpected timestamp {:?}", timestamp);
    assert_eq!(message, "Response: 8. Number 7 has been added to the database.");
    assert!(contents.ends_with('\n'));
}

/// `YYYY-MM-DD HH:MM:SS`
fn is_audit_timestamp(timestamp: &str) -> bool {
    let bytes = timestamp.as_bytes();
    bytes.len() == 19
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            10 => *b == b' ',
            13 | 16 => *b == b':',
            _ => b.is_ascii_digit(),
        })
}

#[sqlx::test(migrations = false)]
async fn test_storage_failure_is_internal_error_and_not_audited(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;

    sqlx::query("DROP TABLE numbers").execute(&pool).await.unwrap();

    let (status, body) = post_json(&app.router, json!({ "number": 5 })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
    assert!(audit_messages(app.ledger.audit()).await.is_empty());
}

// ============================================================================
// Initialization
// ============================================================================

#[sqlx::test(migrations = false)]
async fn test_restart_starts_from_empty_state(pool: PgPool) {
    let dir = TempDir::new().unwrap();
    let config = LedgerConfig {
        max_number: 100,
        audit_log_path: dir.path().join("nested").join("logs.txt"),
    };

    let first = NumberLedger::initialize(pool.clone(), &config).await.unwrap();
    let router = create_router(first.clone(), &Config::default());
    post_json(&router, json!({ "number": 5 })).await;
    assert_eq!(first.numbers().await.unwrap(), vec![5]);

    let second = NumberLedger::initialize(pool, &config).await.unwrap();
    let router = create_router(second.clone(), &Config::default());

    assert!(second.numbers().await.unwrap().is_empty());
    assert!(audit_messages(second.audit()).await.is_empty());

    let (status, body) = post_json(&router, json!({ "number": 5 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Response: 6. Number 5 has been added to the database." })
    );
}

#[sqlx::test(migrations = false)]
async fn test_unknown_routes_are_not_found(pool: PgPool) {
    let app = create_test_app(pool).await;

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/process")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
