use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::lending::{LendingError, ReturnReceipt};
use crate::domain::{
    Book, BookId, BookSearch, BookStatus, BorrowBook, LendingTransaction, Member, MemberId,
};

// ============================================================================
// Requests
// ============================================================================

/// 蔵書検索のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct SearchBooksQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

impl SearchBooksQuery {
    /// 検索条件に変換する（状態の文字列が不正なら `InvalidStatus`）
    pub fn to_criteria(self) -> Result<BookSearch, LendingError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(status) => Some(status.parse::<BookStatus>()?),
        };

        Ok(BookSearch {
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            category: self.category,
            status,
        })
    }
}

/// PUT /books/:id/status のリクエスト
#[derive(Debug, Deserialize)]
pub struct SetBookStatusRequest {
    pub status: String,
}

/// POST /members/:id/fine-payments のリクエスト
#[derive(Debug, Deserialize)]
pub struct PayFineRequest {
    pub amount: Decimal,
}

/// 会員の取引一覧のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct MemberTransactionsQuery {
    /// `true` なら返却されていない取引のみ
    #[serde(default)]
    pub active: bool,
}

/// POST /transactions のリクエスト
#[derive(Debug, Deserialize)]
pub struct BorrowBookRequest {
    pub member_id: Uuid,
    pub book_id: Uuid,
}

impl BorrowBookRequest {
    pub fn to_command(&self) -> BorrowBook {
        BorrowBook {
            member_id: MemberId::from_uuid(self.member_id),
            book_id: BookId::from_uuid(self.book_id),
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub book_id: Uuid,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub category: String,
    pub publication_year: i32,
    pub total_copies: u32,
    pub available_copies: u32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub summary: String,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            book_id: book.id().value(),
            isbn: book.isbn().to_string(),
            title: book.title().to_string(),
            author: book.author().to_string(),
            category: book.category().to_string(),
            publication_year: book.publication_year(),
            total_copies: book.total_copies(),
            available_copies: book.available_copies(),
            status: book.status().as_str().to_string(),
            created_at: book.created_at(),
            summary: book.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub member_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub status: String,
    pub fine_balance: Decimal,
    pub borrow_limit: usize,
    pub active_transactions: Vec<Uuid>,
    pub registered_at: DateTime<Utc>,
    pub summary: String,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            member_id: member.id().value(),
            name: member.name().to_string(),
            email: member.email().to_string(),
            phone: member.phone().to_string(),
            address: member.address().to_string(),
            status: member.status().as_str().to_string(),
            fine_balance: member.fine_balance(),
            borrow_limit: member.borrow_limit(),
            active_transactions: member
                .active_transactions()
                .iter()
                .map(|id| id.value())
                .collect(),
            registered_at: member.registered_at(),
            summary: member.to_string(),
        }
    }
}

/// 取引レスポンス
///
/// 延滞の有無・延滞日数・残り日数は応答時刻で評価する。
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub transaction_id: Uuid,
    pub book_id: Uuid,
    pub member_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: String,
    pub renewal_count: u8,
    pub fine_amount: Decimal,
    pub is_overdue: bool,
    pub days_overdue: i64,
    pub days_remaining: i64,
    pub summary: String,
}

impl TransactionResponse {
    pub fn new(transaction: &LendingTransaction, now: DateTime<Utc>) -> Self {
        Self {
            transaction_id: transaction.id().value(),
            book_id: transaction.book_id().value(),
            member_id: transaction.member_id().value(),
            borrowed_at: transaction.borrowed_at(),
            due_date: transaction.due_date(),
            returned_at: transaction.returned_at(),
            status: transaction.status().as_str().to_string(),
            renewal_count: transaction.renewal_count().value(),
            fine_amount: transaction.fine_amount(),
            is_overdue: transaction.is_overdue(now),
            days_overdue: transaction.days_overdue(now),
            days_remaining: transaction.days_remaining(now),
            summary: transaction.to_string(),
        }
    }
}

/// POST /transactions/:id/return のレスポンス
#[derive(Debug, Serialize)]
pub struct BookReturnedResponse {
    pub fine: Decimal,
    pub days_overdue: i64,
    pub transaction: TransactionResponse,
}

impl BookReturnedResponse {
    pub fn new(receipt: &ReturnReceipt, now: DateTime<Utc>) -> Self {
        Self {
            fine: receipt.fine,
            days_overdue: receipt.days_overdue,
            transaction: TransactionResponse::new(&receipt.transaction, now),
        }
    }
}

/// POST /overdue-checks のレスポンス
#[derive(Debug, Serialize)]
pub struct OverdueCheckResponse {
    pub detected_count: usize,
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// 入力検証の違反一覧
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}
