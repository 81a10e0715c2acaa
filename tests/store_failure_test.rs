use library_lending::adapters::memory::InMemoryTransactionRepository;
use library_lending::application::lending::{self, LendingError, LendingErrorKind};
use library_lending::domain::*;
use library_lending::ports::TransactionRepository;
use library_lending::ports::transaction_repository::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

mod common;

use common::TestContext;

/// 保存を拒否できる貸出台帳
#[derive(Default)]
struct FlakyTransactionRepository {
    inner: InMemoryTransactionRepository,
    refuse_saves: AtomicBool,
}

impl FlakyTransactionRepository {
    fn refuse_saves(&self) {
        self.refuse_saves.store(true, Ordering::SeqCst);
    }
}

impl TransactionRepository for FlakyTransactionRepository {
    fn get(&self, transaction_id: TransactionId) -> Result<Option<LendingTransaction>> {
        self.inner.get(transaction_id)
    }

    fn save(&self, transaction: LendingTransaction) -> Result<()> {
        if self.refuse_saves.load(Ordering::SeqCst) {
            return Err("ledger unavailable".into());
        }
        self.inner.save(transaction)
    }

    fn delete(&self, transaction_id: TransactionId) -> Result<bool> {
        self.inner.delete(transaction_id)
    }

    fn find_by_member(&self, member_id: MemberId) -> Result<Vec<LendingTransaction>> {
        self.inner.find_by_member(member_id)
    }

    fn list_all(&self) -> Result<Vec<LendingTransaction>> {
        self.inner.list_all()
    }
}

fn setup() -> (TestContext, Arc<FlakyTransactionRepository>) {
    let ledger = Arc::new(FlakyTransactionRepository::default());
    let ctx = TestContext::with_transactions(ledger.clone());
    (ctx, ledger)
}

#[test]
fn test_failed_borrow_leaves_book_and_member_unchanged() {
    // Arrange
    let (ctx, ledger) = setup();
    let book = ctx.add_book("Earthsea", 1);
    let alice = ctx.register("Alice");
    ledger.refuse_saves();

    // Act
    let result = lending::borrow_book(
        &ctx.deps,
        BorrowBook {
            member_id: alice.id(),
            book_id: book.id(),
        },
    );

    // Assert
    let err = result.unwrap_err();
    assert!(matches!(err, LendingError::StoreError(_)));
    assert_eq!(err.kind(), LendingErrorKind::Internal);

    let book = lending::get_book(&ctx.deps, book.id()).unwrap();
    assert_eq!(book.available_copies(), 1);
    assert_eq!(book.status(), BookStatus::Available);

    let alice = lending::get_member(&ctx.deps, alice.id()).unwrap();
    assert_eq!(alice.current_borrow_count(), 0);
    assert!(
        lending::member_transaction_history(&ctx.deps, alice.id())
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_failed_return_keeps_loan_open() {
    // Arrange
    let (ctx, ledger) = setup();
    let book = ctx.add_book("Earthsea", 1);
    let alice = ctx.register("Alice");
    let transaction = lending::borrow_book(
        &ctx.deps,
        BorrowBook {
            member_id: alice.id(),
            book_id: book.id(),
        },
    )
    .unwrap();
    ctx.advance_days(20);
    ledger.refuse_saves();

    // Act
    let result = lending::return_book(&ctx.deps, transaction.id());

    // Assert
    assert!(matches!(result, Err(LendingError::StoreError(_))));

    let book = lending::get_book(&ctx.deps, book.id()).unwrap();
    assert_eq!(book.available_copies(), 0);

    let alice = lending::get_member(&ctx.deps, alice.id()).unwrap();
    assert_eq!(alice.active_transactions(), &[transaction.id()]);
    assert_eq!(alice.fine_balance(), rust_decimal::Decimal::ZERO);

    let stored = lending::get_transaction(&ctx.deps, transaction.id()).unwrap();
    assert_eq!(stored.status(), TransactionStatus::Active);
}
