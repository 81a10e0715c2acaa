use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, activate_member, add_book, borrow_book, check_overdue, deactivate_member,
    generate_report, get_book, get_member, get_transaction, list_member_transactions,
    mark_transaction_lost, pay_fine, register_member, renew_book, return_book, search_books,
    set_book_status, suspend_member,
};

/// Creates the API router with all lending endpoints
///
/// Catalog:
/// - POST /books, GET /books, GET /books/:id, PUT /books/:id/status
///
/// Members:
/// - POST /members, GET /members/:id
/// - POST /members/:id/fine-payments
/// - POST /members/:id/suspend | activate | deactivate
/// - GET /members/:id/transactions?active=true
///
/// Transactions:
/// - POST /transactions, GET /transactions/:id
/// - POST /transactions/:id/return | renew | lost
///
/// Batch and reporting:
/// - POST /overdue-checks, GET /reports
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Catalog
        .route("/books", post(add_book).get(search_books))
        .route("/books/:id", get(get_book))
        .route("/books/:id/status", put(set_book_status))
        // Members
        .route("/members", post(register_member))
        .route("/members/:id", get(get_member))
        .route("/members/:id/fine-payments", post(pay_fine))
        .route("/members/:id/suspend", post(suspend_member))
        .route("/members/:id/activate", post(activate_member))
        .route("/members/:id/deactivate", post(deactivate_member))
        .route("/members/:id/transactions", get(list_member_transactions))
        // Transactions
        .route("/transactions", post(borrow_book))
        .route("/transactions/:id", get(get_transaction))
        .route("/transactions/:id/return", post(return_book))
        .route("/transactions/:id/renew", post(renew_book))
        .route("/transactions/:id/lost", post(mark_transaction_lost))
        // Batch and reporting
        .route("/overdue-checks", post(check_overdue))
        .route("/reports", get(generate_report))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
