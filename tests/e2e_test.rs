use axum::body::Body;
use axum::http::{Request, StatusCode};
use library_lending::api::handlers::AppState;
use library_lending::api::router::create_router;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

mod common;

use common::TestContext;

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

/// インメモリストアと固定時計でルーターを組み立てる
fn setup_e2e_app() -> (TestContext, axum::Router) {
    let ctx = TestContext::new();
    let app_state = Arc::new(AppState {
        service_deps: ctx.deps.clone(),
    });
    (ctx, create_router(app_state))
}

/// リクエストを送り、ステータスとJSONボディを返す
async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

async fn create_book(app: &axum::Router, isbn: &str, title: &str, copies: i64) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/books",
        Some(json!({
            "isbn": isbn,
            "title": title,
            "author": "Ursula K. Le Guin",
            "category": "Fiction",
            "publication_year": 1968,
            "total_copies": copies,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

async fn create_member(app: &axum::Router, name: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/members",
        Some(json!({
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "phone": "555-0100",
            "address": "1 Library Lane",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

async fn create_loan(app: &axum::Router, member: &Value, book: &Value) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/transactions",
        Some(json!({
            "member_id": member["member_id"],
            "book_id": book["book_id"],
        })),
    )
    .await
}

// ============================================================================
// E2Eテスト: 正常系フロー
// ============================================================================

#[tokio::test]
async fn test_e2e_health_check() {
    let (_ctx, app) = setup_e2e_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_e2e_full_lending_flow() {
    // Arrange
    let (ctx, app) = setup_e2e_app();
    let book = create_book(&app, "978-0553383041", "A Wizard of Earthsea", 1).await;
    let member = create_member(&app, "Alice").await;
    assert_eq!(book["status"], "available");
    assert_eq!(member["status"], "active");

    // Step 1: 貸出（POST /transactions）
    let (status, loan) = create_loan(&app, &member, &book).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["status"], "active");
    assert_eq!(loan["renewal_count"], 0);
    assert_eq!(loan["days_remaining"], 14);
    let transaction_id = loan["transaction_id"].as_str().unwrap().to_string();

    // Step 2: 書籍は貸出中
    let (status, stored_book) = send(&app, "GET", &format!("/books/{}", book["book_id"].as_str().unwrap()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored_book["status"], "borrowed");
    assert_eq!(stored_book["available_copies"], 0);

    // Step 3: 20日後に返却（6日延滞）
    ctx.advance_days(20);
    let (status, receipt) = send(&app, "POST", &format!("/transactions/{transaction_id}/return"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["days_overdue"], 6);
    assert_eq!(decimal(&receipt["fine"]), Decimal::new(300, 2));
    assert_eq!(receipt["transaction"]["status"], "returned");

    // Step 4: 会員に罰金が加算されている
    let member_uri = format!("/members/{}", member["member_id"].as_str().unwrap());
    let (status, stored_member) = send(&app, "GET", &member_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&stored_member["fine_balance"]), Decimal::new(300, 2));
    assert_eq!(stored_member["active_transactions"], json!([]));

    // Step 5: 罰金を支払う
    let (status, paid) = send(
        &app,
        "POST",
        &format!("{member_uri}/fine-payments"),
        Some(json!({ "amount": "3.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&paid["fine_balance"]), Decimal::ZERO);

    // Step 6: 履歴に返却済みの取引が残る
    let (status, history) = send(&app, "GET", &format!("{member_uri}/transactions"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
    let (_, active) = send(&app, "GET", &format!("{member_uri}/transactions?active=true"), None).await;
    assert!(active.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_e2e_renewal_limit() {
    // Arrange
    let (ctx, app) = setup_e2e_app();
    let book = create_book(&app, "978-1", "Tehanu", 1).await;
    let member = create_member(&app, "Alice").await;
    let (_, loan) = create_loan(&app, &member, &book).await;
    let renew_uri = format!("/transactions/{}/renew", loan["transaction_id"].as_str().unwrap());

    // Act & Assert
    for expected in 1..=2 {
        ctx.advance_days(3);
        let (status, renewed) = send(&app, "POST", &renew_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renewed["status"], "renewed");
        assert_eq!(renewed["renewal_count"], expected);
    }

    let (status, error) = send(&app, "POST", &renew_uri, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["error"], "RENEWAL_LIMIT_REACHED");
}

#[tokio::test]
async fn test_e2e_overdue_check_and_report() {
    // Arrange
    let (ctx, app) = setup_e2e_app();
    let book = create_book(&app, "978-1", "Tehanu", 2).await;
    let member = create_member(&app, "Alice").await;
    let (_, loan) = create_loan(&app, &member, &book).await;
    ctx.advance_days(15);

    // Act
    let (status, check) = send(&app, "POST", "/overdue-checks", None).await;
    let (_, again) = send(&app, "POST", "/overdue-checks", None).await;
    let (report_status, report) = send(&app, "GET", "/reports", None).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(check["detected_count"], 1);
    assert_eq!(again["detected_count"], 0);

    let uri = format!("/transactions/{}", loan["transaction_id"].as_str().unwrap());
    let (_, stored) = send(&app, "GET", &uri, None).await;
    assert_eq!(stored["status"], "overdue");
    assert_eq!(stored["is_overdue"], true);
    assert_eq!(stored["days_overdue"], 1);

    assert_eq!(report_status, StatusCode::OK);
    assert_eq!(report["total_books"], 1);
    assert_eq!(report["available_books"], 1);
    assert_eq!(report["total_members"], 1);
    assert_eq!(report["total_transactions"], 1);
    assert_eq!(report["active_transactions"], 0);
    assert_eq!(report["overdue_transactions"], 1);
}

#[tokio::test]
async fn test_e2e_search_books() {
    // Arrange
    let (_ctx, app) = setup_e2e_app();
    create_book(&app, "978-1", "A Wizard of Earthsea", 1).await;
    create_book(&app, "978-2", "The Left Hand of Darkness", 1).await;

    // Act
    let (status, found) = send(&app, "GET", "/books?title=earthsea&category=fiction", None).await;
    let (_, all) = send(&app, "GET", "/books", None).await;
    let (bad_status, bad) = send(&app, "GET", "/books?status=misplaced", None).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let found = found.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["isbn"], "978-1");
    assert_eq!(all.as_array().unwrap().len(), 2);
    assert_eq!(bad_status, StatusCode::BAD_REQUEST);
    assert_eq!(bad["error"], "INVALID_STATUS");
}

// ============================================================================
// E2Eテスト: エラーケース
// ============================================================================

#[tokio::test]
async fn test_e2e_validation_errors_are_aggregated() {
    let (_ctx, app) = setup_e2e_app();

    let (status, body) = send(
        &app,
        "POST",
        "/members",
        Some(json!({
            "name": "",
            "email": "nope",
            "phone": "555-0100",
            "address": "",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert_eq!(
        body["details"],
        json!(["name is required", "email is invalid", "address is required"])
    );
}

#[tokio::test]
async fn test_e2e_duplicate_isbn_returns_409() {
    let (_ctx, app) = setup_e2e_app();
    create_book(&app, "978-1", "Tehanu", 1).await;

    let (status, body) = send(
        &app,
        "POST",
        "/books",
        Some(json!({
            "isbn": "978-1",
            "title": "Another",
            "author": "Someone",
            "category": "Fiction",
            "publication_year": 2001,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "DUPLICATE_ISBN");
}

#[tokio::test]
async fn test_e2e_unknown_ids_return_404() {
    let (_ctx, app) = setup_e2e_app();
    let unknown = Uuid::new_v4();

    let (book_status, book) = send(&app, "GET", &format!("/books/{unknown}"), None).await;
    let (member_status, _) = send(&app, "GET", &format!("/members/{unknown}"), None).await;
    let (return_status, _) = send(&app, "POST", &format!("/transactions/{unknown}/return"), None).await;

    assert_eq!(book_status, StatusCode::NOT_FOUND);
    assert_eq!(book["error"], "BOOK_NOT_FOUND");
    assert_eq!(member_status, StatusCode::NOT_FOUND);
    assert_eq!(return_status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_e2e_unavailable_book_returns_422() {
    // Arrange
    let (_ctx, app) = setup_e2e_app();
    let book = create_book(&app, "978-1", "Tehanu", 1).await;
    let alice = create_member(&app, "Alice").await;
    let bob = create_member(&app, "Bob").await;
    create_loan(&app, &alice, &book).await;

    // Act
    let (status, body) = create_loan(&app, &bob, &book).await;

    // Assert
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "BORROWING_NOT_PERMITTED");
}

#[tokio::test]
async fn test_e2e_book_status_override() {
    // Arrange
    let (_ctx, app) = setup_e2e_app();
    let book = create_book(&app, "978-1", "Tehanu", 1).await;
    let uri = format!("/books/{}/status", book["book_id"].as_str().unwrap());

    // Act
    let (status, updated) = send(&app, "PUT", &uri, Some(json!({ "status": "Maintenance" }))).await;
    let (bad_status, bad) = send(&app, "PUT", &uri, Some(json!({ "status": "shelved" }))).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "maintenance");
    assert_eq!(bad_status, StatusCode::BAD_REQUEST);
    assert_eq!(bad["error"], "INVALID_STATUS");
}

#[tokio::test]
async fn test_e2e_borrowed_status_rejected_while_copies_remain() {
    // Arrange
    let (_ctx, app) = setup_e2e_app();
    let book = create_book(&app, "978-1", "Tehanu", 2).await;
    let uri = format!("/books/{}", book["book_id"].as_str().unwrap());

    // Act
    let (status, body) = send(
        &app,
        "PUT",
        &format!("{uri}/status"),
        Some(json!({ "status": "borrowed" })),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "COPY_COUNT_CONFLICT");
    let (_, stored) = send(&app, "GET", &uri, None).await;
    assert_eq!(stored["status"], "available");
}

#[tokio::test]
async fn test_e2e_incomplete_book_reports_all_violations() {
    // Arrange
    let (_ctx, app) = setup_e2e_app();

    // Act
    let (status, body) = send(
        &app,
        "POST",
        "/books",
        Some(json!({
            "isbn": "978-1",
            "author": "Ursula K. Le Guin",
            "category": "Fiction",
            "publication_year": 1968,
            "total_copies": 2.5,
        })),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert_eq!(
        body["details"],
        json!(["title is required", "total copies must be a positive integer"])
    );
}

#[tokio::test]
async fn test_e2e_incomplete_member_reports_all_violations() {
    // Arrange
    let (_ctx, app) = setup_e2e_app();

    // Act
    let (status, body) = send(
        &app,
        "POST",
        "/members",
        Some(json!({ "email": "alice@example.com", "phone": "555-0100" })),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert_eq!(
        body["details"],
        json!(["name is required", "address is required"])
    );
}

#[tokio::test]
async fn test_e2e_unreadable_body_returns_json_error() {
    // Arrange
    let (_ctx, app) = setup_e2e_app();

    // Act
    let (status, body) = send(
        &app,
        "POST",
        "/transactions",
        Some(json!({ "member_id": "not-a-uuid" })),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert_eq!(body["details"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_e2e_member_lifecycle() {
    // Arrange
    let (_ctx, app) = setup_e2e_app();
    let member = create_member(&app, "Alice").await;
    let uri = format!("/members/{}", member["member_id"].as_str().unwrap());

    // Act & Assert
    let (_, suspended) = send(&app, "POST", &format!("{uri}/suspend"), None).await;
    assert_eq!(suspended["status"], "suspended");

    let (_, active) = send(&app, "POST", &format!("{uri}/activate"), None).await;
    assert_eq!(active["status"], "active");

    let (_, inactive) = send(&app, "POST", &format!("{uri}/deactivate"), None).await;
    assert_eq!(inactive["status"], "inactive");

    let (status, body) = send(
        &app,
        "POST",
        &format!("{uri}/fine-payments"),
        Some(json!({ "amount": "1.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "OVERPAYMENT_REJECTED");
}
