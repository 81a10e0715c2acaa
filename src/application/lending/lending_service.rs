use rust_decimal::Decimal;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::{
    Book, BookId, BorrowBook, BorrowRefusal, LendingTransaction, Member, MemberId,
    TransactionId, TransactionStatus,
};
use crate::ports::*;

use super::errors::{LendingError, Result};

/// サービスの依存関係
///
/// 振る舞いはサービス関数側に置き、ここには依存だけをまとめる。
///
/// `lending_lock` は複数エンティティにまたがる読み取り→判定→更新の区間を直列化する。
/// 更新系の操作はすべてこのロックを保持したまま実行される。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub books: Arc<dyn BookRepository>,
    pub members: Arc<dyn MemberRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
    pub clock: Arc<dyn Clock>,
    pub lending_lock: Arc<Mutex<()>>,
}

impl ServiceDependencies {
    pub fn new(
        books: Arc<dyn BookRepository>,
        members: Arc<dyn MemberRepository>,
        transactions: Arc<dyn TransactionRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            books,
            members,
            transactions,
            clock,
            lending_lock: Arc::default(),
        }
    }

    /// 更新区間のロックを取得する
    ///
    /// 保護対象はデータを持たないので、ポイズニングは無視してよい。
    pub(super) fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.lending_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// 返却の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnReceipt {
    /// 会員に加算された罰金
    pub fine: Decimal,
    pub days_overdue: i64,
    pub transaction: LendingTransaction,
}

pub(super) fn load_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.books
        .get(book_id)
        .map_err(LendingError::StoreError)?
        .ok_or(LendingError::BookNotFound(book_id))
}

pub(super) fn load_member(deps: &ServiceDependencies, member_id: MemberId) -> Result<Member> {
    deps.members
        .get(member_id)
        .map_err(LendingError::StoreError)?
        .ok_or(LendingError::MemberNotFound(member_id))
}

pub(super) fn load_transaction(
    deps: &ServiceDependencies,
    transaction_id: TransactionId,
) -> Result<LendingTransaction> {
    deps.transactions
        .get(transaction_id)
        .map_err(LendingError::StoreError)?
        .ok_or(LendingError::TransactionNotFound(transaction_id))
}

/// 書籍・会員・取引の順に保存する
///
/// 途中で保存に失敗したら、保存済みの書籍・会員を `original` の状態に書き戻す。
/// 取引は最後に保存するので、失敗時に台帳だけが先に進むことはない。
fn save_lending(
    deps: &ServiceDependencies,
    original: (Book, Member),
    book: Book,
    member: Member,
    transaction: &LendingTransaction,
) -> Result<()> {
    let (original_book, original_member) = original;

    deps.books.save(book).map_err(LendingError::StoreError)?;

    if let Err(err) = deps.members.save(member) {
        restore("book", deps.books.save(original_book));
        return Err(LendingError::StoreError(err));
    }

    if let Err(err) = deps.transactions.save(transaction.clone()) {
        restore("book", deps.books.save(original_book));
        restore("member", deps.members.save(original_member));
        return Err(LendingError::StoreError(err));
    }

    Ok(())
}

fn restore(entity: &str, result: book_repository::Result<()>) {
    if let Err(err) = result {
        tracing::error!(entity, error = %err, "failed to restore snapshot after store error");
    }
}

/// 会員と書籍の両方から貸出可否を判定する（会員が先）
fn check_borrowing(member: &Member, book: &Book) -> std::result::Result<(), BorrowRefusal> {
    member.can_borrow()?;

    if !book.is_available() {
        return Err(BorrowRefusal::BookUnavailable {
            title: book.title().to_string(),
            status: book.status(),
        });
    }

    Ok(())
}

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 会員・書籍が存在すること
/// - 会員が Active で、罰金が閾値未満で、貸出中が5冊未満であること
/// - 書籍が貸出可能であること
///
/// # 一貫性保証
///
/// 判定はすべて変更の前に行う。取引の生成・コピー数の減算・会員の貸出中一覧への追加は
/// 取得したスナップショット上で済ませてから保存する（`save_lending()` を参照）。
/// 区間全体を `lending_lock` で保護するので、最後の1冊を2人が同時に借りることはない。
#[tracing::instrument(skip(deps), fields(member_id = %cmd.member_id, book_id = %cmd.book_id))]
pub fn borrow_book(deps: &ServiceDependencies, cmd: BorrowBook) -> Result<LendingTransaction> {
    let _guard = deps.lock_writes();

    let mut member = load_member(deps, cmd.member_id)?;
    let mut book = load_book(deps, cmd.book_id)?;

    if let Err(refusal) = check_borrowing(&member, &book) {
        tracing::warn!(reason = %refusal, "borrowing refused");
        return Err(refusal.into());
    }

    let original = (book.clone(), member.clone());
    let transaction = LendingTransaction::open(book.id(), member.id(), deps.clock.now());
    book.borrow_copy()?;
    member.add_borrowing(transaction.id());

    save_lending(deps, original, book, member, &transaction)?;

    tracing::info!(
        transaction_id = %transaction.id(),
        due_date = %transaction.due_date(),
        "book borrowed"
    );

    Ok(transaction)
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 取引が存在し、返却済み・紛失でないこと
/// - 罰金は返却時刻で確定し、0より大きければ会員に加算する
///   （閾値を超えれば会員は自動的に利用停止になる）
///
/// # 一貫性保証
///
/// `borrow_book()` と同じ。すべての変更が成功してから保存する。
#[tracing::instrument(skip(deps))]
pub fn return_book(
    deps: &ServiceDependencies,
    transaction_id: TransactionId,
) -> Result<ReturnReceipt> {
    let _guard = deps.lock_writes();

    let mut transaction = load_transaction(deps, transaction_id)?;
    let mut book = load_book(deps, transaction.book_id())?;
    let mut member = load_member(deps, transaction.member_id())?;

    let original = (book.clone(), member.clone());
    let outcome = transaction.complete(deps.clock.now())?;
    book.return_copy()?;
    member.remove_borrowing(transaction_id);
    if outcome.fine > Decimal::ZERO {
        member.add_fine(outcome.fine)?;
    }

    save_lending(deps, original, book, member, &transaction)?;

    tracing::info!(
        fine = %outcome.fine,
        days_overdue = outcome.days_overdue,
        "book returned"
    );

    Ok(ReturnReceipt {
        fine: outcome.fine,
        days_overdue: outcome.days_overdue,
        transaction,
    })
}

/// 貸出を更新する
///
/// ビジネスルール：
/// - 取引が存在すること
/// - 返却済み・紛失でないこと
/// - 更新は2回まで、新しい返却期限は更新時刻 + 14日
#[tracing::instrument(skip(deps))]
pub fn renew_book(
    deps: &ServiceDependencies,
    transaction_id: TransactionId,
) -> Result<LendingTransaction> {
    let _guard = deps.lock_writes();

    let mut transaction = load_transaction(deps, transaction_id)?;
    if let Err(err) = transaction.renew(deps.clock.now()) {
        tracing::warn!(reason = %err, "renewal refused");
        return Err(err.into());
    }

    deps.transactions
        .save(transaction.clone())
        .map_err(LendingError::StoreError)?;

    tracing::info!(
        renewal_count = transaction.renewal_count().value(),
        due_date = %transaction.due_date(),
        "loan renewed"
    );

    Ok(transaction)
}

/// 取引を紛失扱いにする
///
/// 罰金の計算・コピー数・会員の貸出中一覧には触れない。
/// 紛失した取引は終端状態になり、以後は返却も更新もできない。
#[tracing::instrument(skip(deps))]
pub fn mark_transaction_lost(
    deps: &ServiceDependencies,
    transaction_id: TransactionId,
) -> Result<LendingTransaction> {
    let _guard = deps.lock_writes();

    let mut transaction = load_transaction(deps, transaction_id)?;
    transaction.mark_as_lost()?;

    deps.transactions
        .save(transaction.clone())
        .map_err(LendingError::StoreError)?;

    tracing::info!("transaction marked as lost");
    Ok(transaction)
}

pub fn get_transaction(
    deps: &ServiceDependencies,
    transaction_id: TransactionId,
) -> Result<LendingTransaction> {
    load_transaction(deps, transaction_id)
}

/// 会員の返却されていない取引（貸出中・更新済み・延滞中・紛失）
pub fn member_active_transactions(
    deps: &ServiceDependencies,
    member_id: MemberId,
) -> Result<Vec<LendingTransaction>> {
    let history = member_transaction_history(deps, member_id)?;
    Ok(history
        .into_iter()
        .filter(|t| t.status() != TransactionStatus::Returned)
        .collect())
}

/// 会員の全取引（貸出順）
pub fn member_transaction_history(
    deps: &ServiceDependencies,
    member_id: MemberId,
) -> Result<Vec<LendingTransaction>> {
    load_member(deps, member_id)?;

    let transactions = deps
        .transactions
        .find_by_member(member_id)
        .map_err(LendingError::StoreError)?;

    tracing::debug!(%member_id, count = transactions.len(), "loaded member transactions");
    Ok(transactions)
}
