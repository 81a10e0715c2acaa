use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{BookStatus, MemberStatus, TransactionStatus};

use super::errors::{LendingError, Result};
use super::lending_service::ServiceDependencies;

/// 図書館全体の集計
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryReport {
    pub total_books: usize,
    /// 状態が Available の蔵書
    pub available_books: usize,
    /// 状態が Borrowed の蔵書
    pub borrowed_books: usize,
    pub total_members: usize,
    pub active_members: usize,
    pub total_transactions: usize,
    /// 状態が Active の取引（Renewed / Overdue は含まない）
    pub active_transactions: usize,
    /// 集計時点で延滞している取引
    pub overdue_transactions: usize,
    /// 全会員の罰金残高の合計
    pub total_fines: Decimal,
}

/// レポートを生成する（読み取りのみ）
#[tracing::instrument(skip(deps))]
pub fn generate_report(deps: &ServiceDependencies) -> Result<LibraryReport> {
    let now = deps.clock.now();

    let books = deps.books.list_all().map_err(LendingError::StoreError)?;
    let members = deps.members.list_all().map_err(LendingError::StoreError)?;
    let transactions = deps
        .transactions
        .list_all()
        .map_err(LendingError::StoreError)?;

    let report = LibraryReport {
        total_books: books.len(),
        available_books: books
            .iter()
            .filter(|b| b.status() == BookStatus::Available)
            .count(),
        borrowed_books: books
            .iter()
            .filter(|b| b.status() == BookStatus::Borrowed)
            .count(),
        total_members: members.len(),
        active_members: members
            .iter()
            .filter(|m| m.status() == MemberStatus::Active)
            .count(),
        total_transactions: transactions.len(),
        active_transactions: transactions
            .iter()
            .filter(|t| t.status() == TransactionStatus::Active)
            .count(),
        overdue_transactions: transactions.iter().filter(|t| t.is_overdue(now)).count(),
        total_fines: members.iter().map(|m| m.fine_balance()).sum(),
    };

    tracing::debug!(?report, "report generated");
    Ok(report)
}
