use rust_decimal::Decimal;
use thiserror::Error;

use super::{BookStatus, MemberStatus};

/// 更新回数のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenewalCountError {
    /// 更新回数の上限に達した
    #[error("renewal limit reached")]
    LimitReached,
}

/// 蔵書（コピー）操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// 貸出可能なコピーがない、または状態が貸出不可
    #[error("book \"{title}\" is not available for borrowing (status: {status})")]
    Unavailable { title: String, status: BookStatus },

    /// 全コピーが既に返却済み
    #[error("cannot return book \"{title}\": all copies are already in")]
    AlreadyFull { title: String },

    /// 指定された状態がコピー数と矛盾する
    #[error(
        "cannot mark book \"{title}\" as {requested}: {available} of {total} copies are available"
    )]
    StatusMismatch {
        title: String,
        requested: BookStatus,
        available: u32,
        total: u32,
    },

    /// 5種類以外の状態が指定された
    #[error("invalid book status: {0}")]
    InvalidStatus(String),
}

/// 罰金の加算・支払いのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FineError {
    #[error("amount cannot be negative")]
    NegativeAmount,

    /// 支払額が残高を超えている
    #[error("payment of {amount} exceeds the outstanding fine balance of {balance}")]
    OverpaymentRejected { amount: Decimal, balance: Decimal },
}

/// 会員の明示的な再有効化のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivationError {
    #[error("cannot activate member: unpaid fines ({balance})")]
    UnpaidFines { balance: Decimal },
}

/// 貸出不可の理由
///
/// 判定順（会員状態 → 罰金 → 冊数上限 → 書籍の在庫）で最初に失敗したものが返る。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BorrowRefusal {
    #[error("member is {0} and cannot borrow")]
    MemberNotActive(MemberStatus),

    #[error("unpaid fines ({0}) - please settle the account")]
    UnpaidFines(Decimal),

    #[error("borrowing limit reached ({0} books)")]
    BorrowLimitReached(usize),

    #[error("book \"{title}\" is not available (status: {status})")]
    BookUnavailable { title: String, status: BookStatus },
}

/// 更新のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenewError {
    /// 既に返却済み
    #[error("cannot renew a transaction that is already returned")]
    AlreadyReturned,
    /// 紛失扱い
    #[error("cannot renew a transaction whose book is declared lost")]
    AlreadyLost,
    #[error("renewal limit reached ({} maximum)", super::MAX_RENEWALS)]
    RenewalLimitReached,
}

impl From<RenewalCountError> for RenewError {
    fn from(err: RenewalCountError) -> Self {
        match err {
            RenewalCountError::LimitReached => RenewError::RenewalLimitReached,
        }
    }
}

/// 返却・紛失処理のエラー（どちらも終端状態への遷移）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloseError {
    #[error("transaction is already returned")]
    AlreadyReturned,
    #[error("transaction is already marked as lost")]
    AlreadyLost,
}
