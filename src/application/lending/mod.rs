mod catalog_service;
mod errors;
mod lending_service;
mod member_service;
mod overdue_detection;
mod report;

pub use catalog_service::{add_book, get_book, search_books, set_book_status};
pub use errors::{LendingError, LendingErrorKind, Result};
pub use lending_service::{
    ReturnReceipt, ServiceDependencies, borrow_book, get_transaction, mark_transaction_lost,
    member_active_transactions, member_transaction_history, renew_book, return_book,
};
pub use member_service::{
    activate_member, deactivate_member, get_member, pay_fine, register_member, suspend_member,
};
pub use overdue_detection::check_overdue_transactions;
pub use report::{LibraryReport, generate_report};
