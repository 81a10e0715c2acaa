use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BookId, BookStatus, MemberId};

/// コマンド：蔵書をカタログに追加する
///
/// 欠けた項目は空のまま受け取り、`Book::validate` でまとめて報告する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub category: String,
    pub publication_year: i32,
    /// 省略時は1冊。整数でない数値も受け取り、検証で弾く
    pub total_copies: Option<Decimal>,
}

/// コマンド：会員を登録する
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// コマンド：書籍を借りる
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowBook {
    pub member_id: MemberId,
    pub book_id: BookId,
}

/// 蔵書検索の条件
///
/// 指定された条件すべてを満たす蔵書が対象（AND）。何も指定しなければ全件。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSearch {
    /// 部分一致（大文字小文字を区別しない）
    pub title: Option<String>,
    /// 部分一致（大文字小文字を区別しない）
    pub author: Option<String>,
    /// 完全一致
    pub isbn: Option<String>,
    /// 完全一致（大文字小文字を区別しない）
    pub category: Option<String>,
    pub status: Option<BookStatus>,
}
