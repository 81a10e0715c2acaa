use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{
    ActivationError, BookError, BookId, BorrowRefusal, CloseError, FineError, MAX_RENEWALS,
    MemberId, RenewError, TransactionId, ValidationReport,
};

/// エラーの分類
///
/// 呼び出し側（API層など）はこの分類で応答を決める。どれもプロセスを止めるものではない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LendingErrorKind {
    /// 入力の検証エラー（変更前に検出）
    Validation,
    /// 既存エンティティとの重複
    Conflict,
    /// 指定されたIDが存在しない
    NotFound,
    /// 貸出ポリシー違反
    PolicyViolation,
    /// 終端状態の取引など、現在の状態では実行できない
    StateConflict,
    /// ストレージ障害
    Internal,
}

/// 貸出サービスのエラー
#[derive(Debug, Error)]
pub enum LendingError {
    /// 入力の検証に失敗（違反をすべて含む）
    #[error("validation failed: {}", .0.join(", "))]
    ValidationFailed(Vec<String>),

    #[error("a book with ISBN {0} already exists")]
    DuplicateIsbn(String),

    #[error("a member with email {0} already exists")]
    DuplicateEmail(String),

    #[error("book not found: {0}")]
    BookNotFound(BookId),

    #[error("member not found: {0}")]
    MemberNotFound(MemberId),

    #[error("transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// 貸出不可（最初に失敗した理由を含む）
    #[error("borrowing not permitted: {0}")]
    BorrowingNotPermitted(BorrowRefusal),

    #[error("renewal limit reached ({} maximum)", MAX_RENEWALS)]
    RenewalLimitReached,

    #[error("transaction is already returned")]
    AlreadyReturned,

    #[error("transaction is already marked as lost")]
    AlreadyLost,

    #[error("amount cannot be negative")]
    NegativeAmount,

    #[error("payment of {amount} exceeds the outstanding fine balance of {balance}")]
    OverpaymentRejected { amount: Decimal, balance: Decimal },

    /// 罰金が残っているため再有効化できない
    #[error("cannot activate member: unpaid fines ({0})")]
    UnpaidFines(Decimal),

    #[error("invalid book status: {0}")]
    InvalidStatus(String),

    /// 台帳とコピー数が食い違っている（全コピーが既に戻っている本の返却など）
    #[error("copy count conflict: {0}")]
    CopyCountConflict(String),

    /// リポジトリのエラー
    #[error("store error")]
    StoreError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LendingError {
    pub fn kind(&self) -> LendingErrorKind {
        match self {
            LendingError::ValidationFailed(_) | LendingError::InvalidStatus(_) => {
                LendingErrorKind::Validation
            }
            LendingError::DuplicateIsbn(_) | LendingError::DuplicateEmail(_) => {
                LendingErrorKind::Conflict
            }
            LendingError::BookNotFound(_)
            | LendingError::MemberNotFound(_)
            | LendingError::TransactionNotFound(_) => LendingErrorKind::NotFound,
            LendingError::BorrowingNotPermitted(_)
            | LendingError::RenewalLimitReached
            | LendingError::NegativeAmount
            | LendingError::OverpaymentRejected { .. }
            | LendingError::UnpaidFines(_) => LendingErrorKind::PolicyViolation,
            LendingError::AlreadyReturned
            | LendingError::AlreadyLost
            | LendingError::CopyCountConflict(_) => LendingErrorKind::StateConflict,
            LendingError::StoreError(_) => LendingErrorKind::Internal,
        }
    }
}

impl From<ValidationReport> for LendingError {
    fn from(report: ValidationReport) -> Self {
        LendingError::ValidationFailed(report.into_errors())
    }
}

impl From<BorrowRefusal> for LendingError {
    fn from(refusal: BorrowRefusal) -> Self {
        LendingError::BorrowingNotPermitted(refusal)
    }
}

impl From<BookError> for LendingError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Unavailable { title, status } => {
                LendingError::BorrowingNotPermitted(BorrowRefusal::BookUnavailable { title, status })
            }
            BookError::AlreadyFull { .. } | BookError::StatusMismatch { .. } => {
                LendingError::CopyCountConflict(err.to_string())
            }
            BookError::InvalidStatus(status) => LendingError::InvalidStatus(status),
        }
    }
}

impl From<FineError> for LendingError {
    fn from(err: FineError) -> Self {
        match err {
            FineError::NegativeAmount => LendingError::NegativeAmount,
            FineError::OverpaymentRejected { amount, balance } => {
                LendingError::OverpaymentRejected { amount, balance }
            }
        }
    }
}

impl From<ActivationError> for LendingError {
    fn from(err: ActivationError) -> Self {
        match err {
            ActivationError::UnpaidFines { balance } => LendingError::UnpaidFines(balance),
        }
    }
}

impl From<RenewError> for LendingError {
    fn from(err: RenewError) -> Self {
        match err {
            RenewError::AlreadyReturned => LendingError::AlreadyReturned,
            RenewError::AlreadyLost => LendingError::AlreadyLost,
            RenewError::RenewalLimitReached => LendingError::RenewalLimitReached,
        }
    }
}

impl From<CloseError> for LendingError {
    fn from(err: CloseError) -> Self {
        match err {
            CloseError::AlreadyReturned => LendingError::AlreadyReturned,
            CloseError::AlreadyLost => LendingError::AlreadyLost,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LendingError>;
