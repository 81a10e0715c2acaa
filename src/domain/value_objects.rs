use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RenewalCountError;

/// 書籍ID - カタログ上の1タイトルを識別する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BOOK-{}", self.0)
    }
}

/// 会員ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(Uuid);

impl MemberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MBR-{}", self.0)
    }
}

/// 貸出取引ID - 台帳上の1回の貸出〜返却を識別する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TXN-{}", self.0)
    }
}

/// 延長（更新）の上限回数
pub const MAX_RENEWALS: u8 = 2;

/// 更新回数
///
/// 不変条件：更新は2回まで。
/// 型システムでこの制約を強制し、不正な値（3以上）を作成できないようにする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RenewalCount(u8);

impl RenewalCount {
    /// 新規作成（0回）
    pub fn new() -> Self {
        Self(0)
    }

    /// 更新回数を増やす
    ///
    /// # エラー
    /// 既に上限まで更新済みの場合は`RenewalCountError::LimitReached`を返す
    pub fn increment(self) -> Result<Self, RenewalCountError> {
        if !self.can_renew() {
            return Err(RenewalCountError::LimitReached);
        }
        Ok(Self(self.0 + 1))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// まだ更新できるか
    pub fn can_renew(&self) -> bool {
        self.0 < MAX_RENEWALS
    }
}

impl Default for RenewalCount {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<u8> for RenewalCount {
    type Error = RenewalCountError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > MAX_RENEWALS {
            return Err(RenewalCountError::LimitReached);
        }
        Ok(Self(value))
    }
}

impl From<RenewalCount> for u8 {
    fn from(count: RenewalCount) -> Self {
        count.0
    }
}
