use crate::domain::{Book, BookId, BookSearch, BookStatus, NewBook};

use super::errors::{LendingError, Result};
use super::lending_service::{ServiceDependencies, load_book};

/// 蔵書をカタログに追加する
///
/// ビジネスルール：
/// - 入力の違反はすべてまとめて `ValidationFailed` で返す
/// - ISBNはカタログ内で一意
/// - 冊数の省略時は1冊
#[tracing::instrument(skip(deps, data), fields(isbn = %data.isbn))]
pub fn add_book(deps: &ServiceDependencies, data: NewBook) -> Result<Book> {
    let _guard = deps.lock_writes();

    let book = Book::create(data, deps.clock.now())?;

    let existing = deps
        .books
        .find_by_isbn(book.isbn())
        .map_err(LendingError::StoreError)?;
    if existing.is_some() {
        tracing::warn!("duplicate isbn rejected");
        return Err(LendingError::DuplicateIsbn(book.isbn().to_string()));
    }

    deps.books
        .save(book.clone())
        .map_err(LendingError::StoreError)?;

    tracing::info!(book_id = %book.id(), copies = book.total_copies(), "book added");
    Ok(book)
}

pub fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    load_book(deps, book_id)
}

/// 条件に一致する蔵書を登録順に返す
///
/// 空文字の条件は指定なしとして扱う。
#[tracing::instrument(skip(deps))]
pub fn search_books(deps: &ServiceDependencies, criteria: &BookSearch) -> Result<Vec<Book>> {
    let books = deps.books.list_all().map_err(LendingError::StoreError)?;
    let found: Vec<Book> = books
        .into_iter()
        .filter(|book| book.matches(criteria))
        .collect();

    tracing::debug!(count = found.len(), "catalog searched");
    Ok(found)
}

/// 蔵書の状態を明示的に設定する
///
/// Maintenance / Lost / Retired は貸出中のコピー数に関係なく優先される。
/// Available / Borrowed を指定するとコピー数からの導出に戻る。
#[tracing::instrument(skip(deps))]
pub fn set_book_status(
    deps: &ServiceDependencies,
    book_id: BookId,
    status: BookStatus,
) -> Result<Book> {
    let _guard = deps.lock_writes();

    let mut book = load_book(deps, book_id)?;
    if let Err(err) = book.set_status(status) {
        tracing::warn!(reason = %err, "status change refused");
        return Err(err.into());
    }

    deps.books
        .save(book.clone())
        .map_err(LendingError::StoreError)?;

    tracing::info!(status = %book.status(), "book status changed");
    Ok(book)
}
