pub mod book_repository;
pub mod clock;
pub mod member_repository;
pub mod transaction_repository;

pub use book_repository::BookRepository;
pub use clock::Clock;
pub use member_repository::MemberRepository;
pub use transaction_repository::TransactionRepository;
