//! インメモリのリポジトリ実装
//!
//! プロセスの生存期間だけ状態を保持する。永続化はしない。

pub mod book_repository;
pub mod member_repository;
pub mod transaction_repository;

pub use book_repository::InMemoryBookRepository;
pub use member_repository::InMemoryMemberRepository;
pub use transaction_repository::InMemoryTransactionRepository;

use std::sync::PoisonError;

type StoreError = Box<dyn std::error::Error + Send + Sync>;

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    "in-memory store lock poisoned".into()
}
