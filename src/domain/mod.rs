pub mod book;
pub mod commands;
pub mod errors;
pub mod member;
pub mod transaction;
pub mod validation;
pub mod value_objects;

pub use book::{Book, BookStatus};
pub use commands::*;
pub use errors::*;
pub use member::{FINE_THRESHOLD, MAX_BORROW_LIMIT, Member, MemberStatus};
pub use transaction::{
    DAILY_FINE_RATE, LOAN_PERIOD_DAYS, LendingTransaction, ReturnOutcome, TransactionStatus,
};
pub use validation::ValidationReport;
pub use value_objects::*;
