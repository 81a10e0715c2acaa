#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use library_lending::adapters::memory::{
    InMemoryBookRepository, InMemoryMemberRepository, InMemoryTransactionRepository,
};
use library_lending::adapters::mock::FixedClock;
use library_lending::application::lending::{self, ServiceDependencies};
use library_lending::domain::{Book, Member, NewBook, NewMember};
use library_lending::ports::{Clock, TransactionRepository};
use std::sync::Arc;

/// テストの開始時刻（2024-03-01 10:00 UTC）
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
}

/// 固定時計と空のインメモリストアで構成したテスト環境
pub struct TestContext {
    pub deps: ServiceDependencies,
    pub clock: Arc<FixedClock>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_transactions(Arc::new(InMemoryTransactionRepository::new()))
    }

    /// 貸出台帳だけ差し替えたテスト環境
    pub fn with_transactions(transactions: Arc<dyn TransactionRepository>) -> Self {
        let clock = Arc::new(FixedClock::new(start_time()));
        let deps = ServiceDependencies::new(
            Arc::new(InMemoryBookRepository::new()),
            Arc::new(InMemoryMemberRepository::new()),
            transactions,
            clock.clone(),
        );
        Self { deps, clock }
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn advance_days(&self, days: i64) {
        self.clock.advance(chrono::Duration::days(days));
    }

    /// 冊数を指定して蔵書を追加する（ISBNはタイトルから作る）
    pub fn add_book(&self, title: &str, copies: i64) -> Book {
        lending::add_book(&self.deps, new_book(&format!("978-{title}"), title, copies))
            .expect("book should be added")
    }

    pub fn register(&self, name: &str) -> Member {
        let email = format!("{}@example.com", name.to_lowercase());
        lending::register_member(&self.deps, new_member(name, &email))
            .expect("member should be registered")
    }
}

pub fn new_book(isbn: &str, title: &str, copies: i64) -> NewBook {
    NewBook {
        isbn: isbn.to_string(),
        title: title.to_string(),
        author: "Ursula K. Le Guin".to_string(),
        category: "Fiction".to_string(),
        publication_year: 1969,
        total_copies: Some(copies.into()),
    }
}

pub fn new_member(name: &str, email: &str) -> NewMember {
    NewMember {
        name: name.to_string(),
        email: email.to_string(),
        phone: "555-0100".to_string(),
        address: "1 Library Lane".to_string(),
    }
}
