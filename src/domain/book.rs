use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use super::validation::{ValidationReport, is_present};
use super::{BookError, BookId, BookSearch, NewBook};

/// 出版年の下限
pub const MIN_PUBLICATION_YEAR: i32 = 1000;

/// 蔵書の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    /// 貸出可能なコピーがある
    Available,
    /// 全コピー貸出中
    Borrowed,
    /// 修理・整備中
    Maintenance,
    /// 紛失
    Lost,
    /// 除籍
    Retired,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::Borrowed => "borrowed",
            BookStatus::Maintenance => "maintenance",
            BookStatus::Lost => "lost",
            BookStatus::Retired => "retired",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookStatus {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(BookStatus::Available),
            "borrowed" => Ok(BookStatus::Borrowed),
            "maintenance" => Ok(BookStatus::Maintenance),
            "lost" => Ok(BookStatus::Lost),
            "retired" => Ok(BookStatus::Retired),
            _ => Err(BookError::InvalidStatus(s.to_string())),
        }
    }
}

/// 明示的に設定される状態
///
/// コピー数から導出される Available / Borrowed より優先される。
/// 返却では解除されない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusOverride {
    Maintenance,
    Lost,
    Retired,
}

impl From<StatusOverride> for BookStatus {
    fn from(value: StatusOverride) -> Self {
        match value {
            StatusOverride::Maintenance => BookStatus::Maintenance,
            StatusOverride::Lost => BookStatus::Lost,
            StatusOverride::Retired => BookStatus::Retired,
        }
    }
}

/// 蔵書 - カタログ上の1タイトルとそのコピー数
///
/// 不変条件：`0 <= available_copies <= total_copies`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: BookId,
    isbn: String,
    title: String,
    author: String,
    category: String,
    publication_year: i32,
    total_copies: u32,
    available_copies: u32,
    status_override: Option<StatusOverride>,
    created_at: DateTime<Utc>,
}

impl Book {
    /// 入力を検証する
    ///
    /// 違反をすべて集めて返す。`current_year` は出版年の上限。
    pub fn validate(data: &NewBook, current_year: i32) -> ValidationReport {
        let mut report = ValidationReport::new();

        report.require(is_present(&data.isbn), "isbn is required");
        report.require(is_present(&data.title), "title is required");
        report.require(is_present(&data.author), "author is required");
        report.require(is_present(&data.category), "category is required");
        report.require(
            (MIN_PUBLICATION_YEAR..=current_year).contains(&data.publication_year),
            "publication year is invalid",
        );
        if let Some(total) = data.total_copies {
            report.require(
                total.fract().is_zero() && total >= Decimal::ONE && total.to_u32().is_some(),
                "total copies must be a positive integer",
            );
        }

        report
    }

    /// 検証してから新しい蔵書を生成する
    ///
    /// 全コピーが貸出可能な状態で作られる。
    pub fn create(data: NewBook, created_at: DateTime<Utc>) -> Result<Self, ValidationReport> {
        let report = Self::validate(&data, created_at.year());
        if !report.is_valid() {
            return Err(report);
        }

        let total_copies = data
            .total_copies
            .and_then(|total| total.to_u32())
            .unwrap_or(1);

        Ok(Self {
            id: BookId::new(),
            isbn: data.isbn.trim().to_string(),
            title: data.title.trim().to_string(),
            author: data.author.trim().to_string(),
            category: data.category.trim().to_string(),
            publication_year: data.publication_year,
            total_copies,
            available_copies: total_copies,
            status_override: None,
            created_at,
        })
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn publication_year(&self) -> i32 {
        self.publication_year
    }

    pub fn total_copies(&self) -> u32 {
        self.total_copies
    }

    pub fn available_copies(&self) -> u32 {
        self.available_copies
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 現在の状態
    ///
    /// 明示的な状態があればそれを、なければコピー数から導出する。
    pub fn status(&self) -> BookStatus {
        match self.status_override {
            Some(status) => status.into(),
            None if self.available_copies > 0 => BookStatus::Available,
            None => BookStatus::Borrowed,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status() == BookStatus::Available && self.available_copies > 0
    }

    /// コピーを1冊貸し出す
    ///
    /// 最後の1冊なら状態は Borrowed になる。
    pub fn borrow_copy(&mut self) -> Result<(), BookError> {
        if !self.is_available() {
            return Err(BookError::Unavailable {
                title: self.title.clone(),
                status: self.status(),
            });
        }

        self.available_copies -= 1;
        Ok(())
    }

    /// コピーを1冊戻す
    ///
    /// Borrowed は Available に戻るが、Maintenance / Lost / Retired はそのまま残る。
    pub fn return_copy(&mut self) -> Result<(), BookError> {
        if self.available_copies >= self.total_copies {
            return Err(BookError::AlreadyFull {
                title: self.title.clone(),
            });
        }

        self.available_copies += 1;
        Ok(())
    }

    /// 状態を明示的に設定する
    ///
    /// Available / Borrowed を指定すると明示的な状態を解除し、コピー数からの導出に戻す。
    /// その場合、指定した状態がコピー数から導出される状態と一致しなければ失敗する。
    pub fn set_status(&mut self, status: BookStatus) -> Result<(), BookError> {
        self.status_override = match status {
            BookStatus::Available | BookStatus::Borrowed => {
                let derived = if self.available_copies > 0 {
                    BookStatus::Available
                } else {
                    BookStatus::Borrowed
                };
                if status != derived {
                    return Err(BookError::StatusMismatch {
                        title: self.title.clone(),
                        requested: status,
                        available: self.available_copies,
                        total: self.total_copies,
                    });
                }
                None
            }
            BookStatus::Maintenance => Some(StatusOverride::Maintenance),
            BookStatus::Lost => Some(StatusOverride::Lost),
            BookStatus::Retired => Some(StatusOverride::Retired),
        };
        Ok(())
    }

    pub fn set_maintenance(&mut self) {
        self.status_override = Some(StatusOverride::Maintenance);
    }

    pub fn set_lost(&mut self) {
        self.status_override = Some(StatusOverride::Lost);
    }

    pub fn retire(&mut self) {
        self.status_override = Some(StatusOverride::Retired);
    }

    /// 検索条件にすべて一致するか
    pub fn matches(&self, criteria: &BookSearch) -> bool {
        fn given(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|v| !v.is_empty())
        }

        let contains = |haystack: &str, needle: &str| {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        };

        given(&criteria.title).is_none_or(|title| contains(&self.title, title))
            && given(&criteria.author).is_none_or(|author| contains(&self.author, author))
            && given(&criteria.isbn).is_none_or(|isbn| self.isbn == isbn)
            && given(&criteria.category)
                .is_none_or(|category| self.category.to_lowercase() == category.to_lowercase())
            && criteria.status.is_none_or(|status| self.status() == status)
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} by {} ({}) - {}/{} available",
            self.title, self.author, self.isbn, self.available_copies, self.total_copies
        )
    }
}
