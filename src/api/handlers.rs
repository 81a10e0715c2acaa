use crate::application::lending::{self, LendingError, LibraryReport, ServiceDependencies};
use crate::domain::{
    BookId, BookStatus, LendingTransaction, MemberId, NewBook, NewMember, TransactionId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    extract::ApiJson,
    types::{
        BookResponse, BookReturnedResponse, BorrowBookRequest, MemberResponse,
        MemberTransactionsQuery, OverdueCheckResponse, PayFineRequest, SearchBooksQuery,
        SetBookStatusRequest, TransactionResponse,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

impl AppState {
    fn transaction_response(&self, transaction: &LendingTransaction) -> TransactionResponse {
        TransactionResponse::new(transaction, self.service_deps.clock.now())
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// POST /books - 蔵書をカタログに追加
///
/// 強制されるビジネスルール:
/// - 必須項目がすべて入力されていること（違反はまとめて400で返す）
/// - ISBNが重複しないこと
pub async fn add_book(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<NewBook>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let book = lending::add_book(&state.service_deps, req)?;
    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// GET /books - 蔵書検索
///
/// クエリパラメータ（すべてオプション、AND条件）:
/// - title, author: 部分一致
/// - isbn: 完全一致
/// - category: 完全一致（大文字小文字を区別しない）
/// - status: available, borrowed, maintenance, lost, retired
pub async fn search_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchBooksQuery>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let criteria = query.to_criteria()?;
    let books = lending::search_books(&state.service_deps, &criteria)?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/:id - 蔵書をIDで取得
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = lending::get_book(&state.service_deps, BookId::from_uuid(book_id))?;
    Ok(Json(BookResponse::from(book)))
}

/// PUT /books/:id/status - 蔵書の状態を設定
pub async fn set_book_status(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
    ApiJson(req): ApiJson<SetBookStatusRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let status = req
        .status
        .parse::<BookStatus>()
        .map_err(LendingError::from)?;

    let book = lending::set_book_status(&state.service_deps, BookId::from_uuid(book_id), status)?;
    Ok(Json(BookResponse::from(book)))
}

// ============================================================================
// Members
// ============================================================================

/// POST /members - 会員を登録
///
/// 強制されるビジネスルール:
/// - 必須項目がすべて入力され、メールアドレスの形式が正しいこと
/// - メールアドレスが重複しないこと
pub async fn register_member(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<NewMember>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    let member = lending::register_member(&state.service_deps, req)?;
    Ok((StatusCode::CREATED, Json(MemberResponse::from(member))))
}

/// GET /members/:id - 会員をIDで取得
pub async fn get_member(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member = lending::get_member(&state.service_deps, MemberId::from_uuid(member_id))?;
    Ok(Json(MemberResponse::from(member)))
}

/// POST /members/:id/fine-payments - 罰金を支払う
///
/// 残高を超える金額・負の金額は422を返す。
pub async fn pay_fine(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
    ApiJson(req): ApiJson<PayFineRequest>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member = lending::pay_fine(
        &state.service_deps,
        MemberId::from_uuid(member_id),
        req.amount,
    )?;
    Ok(Json(MemberResponse::from(member)))
}

/// POST /members/:id/suspend - 会員を利用停止にする
pub async fn suspend_member(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member = lending::suspend_member(&state.service_deps, MemberId::from_uuid(member_id))?;
    Ok(Json(MemberResponse::from(member)))
}

/// POST /members/:id/activate - 会員を再有効化する
pub async fn activate_member(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member = lending::activate_member(&state.service_deps, MemberId::from_uuid(member_id))?;
    Ok(Json(MemberResponse::from(member)))
}

/// POST /members/:id/deactivate - 会員を無効化する
pub async fn deactivate_member(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member = lending::deactivate_member(&state.service_deps, MemberId::from_uuid(member_id))?;
    Ok(Json(MemberResponse::from(member)))
}

/// GET /members/:id/transactions - 会員の取引一覧
///
/// `active=true` なら返却されていない取引のみ、それ以外は全履歴を返す。
pub async fn list_member_transactions(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
    Query(query): Query<MemberTransactionsQuery>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let member_id = MemberId::from_uuid(member_id);

    let transactions = if query.active {
        lending::member_active_transactions(&state.service_deps, member_id)?
    } else {
        lending::member_transaction_history(&state.service_deps, member_id)?
    };

    Ok(Json(
        transactions
            .iter()
            .map(|t| state.transaction_response(t))
            .collect(),
    ))
}

// ============================================================================
// Transactions
// ============================================================================

/// POST /transactions - 書籍を貸し出す
///
/// 強制されるビジネスルール:
/// - 会員・書籍が存在すること
/// - 会員が Active で、罰金が10.00未満、貸出中が5冊未満であること
/// - 書籍が貸出可能であること
pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<BorrowBookRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    let transaction = lending::borrow_book(&state.service_deps, req.to_command())?;
    Ok((
        StatusCode::CREATED,
        Json(state.transaction_response(&transaction)),
    ))
}

/// GET /transactions/:id - 取引をIDで取得
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let transaction = lending::get_transaction(
        &state.service_deps,
        TransactionId::from_uuid(transaction_id),
    )?;
    Ok(Json(state.transaction_response(&transaction)))
}

/// POST /transactions/:id/return - 書籍を返却
///
/// 延滞していれば罰金（1日0.50）が確定し、会員の残高に加算される。
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<BookReturnedResponse>, ApiError> {
    let receipt = lending::return_book(
        &state.service_deps,
        TransactionId::from_uuid(transaction_id),
    )?;
    Ok(Json(BookReturnedResponse::new(
        &receipt,
        state.service_deps.clock.now(),
    )))
}

/// POST /transactions/:id/renew - 貸出を更新
///
/// 強制されるビジネスルール:
/// - 返却済み・紛失でないこと
/// - 更新回数が2回未満であること
pub async fn renew_book(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let transaction = lending::renew_book(
        &state.service_deps,
        TransactionId::from_uuid(transaction_id),
    )?;
    Ok(Json(state.transaction_response(&transaction)))
}

/// POST /transactions/:id/lost - 紛失として記録
pub async fn mark_transaction_lost(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let transaction = lending::mark_transaction_lost(
        &state.service_deps,
        TransactionId::from_uuid(transaction_id),
    )?;
    Ok(Json(state.transaction_response(&transaction)))
}

// ============================================================================
// Batch / reports
// ============================================================================

/// POST /overdue-checks - 延滞チェックを実行
pub async fn check_overdue(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OverdueCheckResponse>, ApiError> {
    let detected_count = lending::check_overdue_transactions(&state.service_deps)?;
    Ok(Json(OverdueCheckResponse { detected_count }))
}

/// GET /reports - 集計レポート
pub async fn generate_report(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LibraryReport>, ApiError> {
    let report = lending::generate_report(&state.service_deps)?;
    Ok(Json(report))
}
