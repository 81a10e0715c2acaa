use crate::application::lending::{LendingError, LendingErrorKind};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(LendingError);

impl From<LendingError> for ApiError {
    fn from(err: LendingError) -> Self {
        ApiError(err)
    }
}

/// 読めないJSONボディは入力検証の失敗として扱う
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(LendingError::ValidationFailed(vec![rejection.body_text()]))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0.kind() {
            LendingErrorKind::Validation => StatusCode::BAD_REQUEST,
            LendingErrorKind::Conflict => StatusCode::CONFLICT,
            LendingErrorKind::NotFound => StatusCode::NOT_FOUND,
            // ビジネスルール違反・終端状態の取引
            LendingErrorKind::PolicyViolation | LendingErrorKind::StateConflict => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            LendingErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self.0 {
            LendingError::ValidationFailed(_) => "VALIDATION_FAILED",
            LendingError::DuplicateIsbn(_) => "DUPLICATE_ISBN",
            LendingError::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            LendingError::BookNotFound(_) => "BOOK_NOT_FOUND",
            LendingError::MemberNotFound(_) => "MEMBER_NOT_FOUND",
            LendingError::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            LendingError::BorrowingNotPermitted(_) => "BORROWING_NOT_PERMITTED",
            LendingError::RenewalLimitReached => "RENEWAL_LIMIT_REACHED",
            LendingError::AlreadyReturned => "ALREADY_RETURNED",
            LendingError::AlreadyLost => "ALREADY_LOST",
            LendingError::NegativeAmount => "NEGATIVE_AMOUNT",
            LendingError::OverpaymentRejected { .. } => "OVERPAYMENT_REJECTED",
            LendingError::UnpaidFines(_) => "UNPAID_FINES",
            LendingError::InvalidStatus(_) => "INVALID_STATUS",
            LendingError::CopyCountConflict(_) => "COPY_COUNT_CONFLICT",
            LendingError::StoreError(_) => "STORE_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_code = self.error_code();

        let body = match self.0 {
            LendingError::ValidationFailed(errors) => {
                ErrorResponse::new(error_code, "validation failed").with_details(errors)
            }
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            LendingError::StoreError(ref e) => {
                tracing::error!("Store error: {}", e);
                ErrorResponse::new(error_code, "An unexpected error occurred")
            }
            ref err => ErrorResponse::new(error_code, err.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
