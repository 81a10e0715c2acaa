use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::validation::{ValidationReport, is_present};
use super::{ActivationError, BorrowRefusal, FineError, MemberId, NewMember, TransactionId};

/// 会員1人あたりの最大貸出冊数
pub const MAX_BORROW_LIMIT: usize = 5;

/// 罰金の閾値（10.00）
///
/// 残高がこの額以上になると新規貸出ができず、自動的に利用停止になる。
pub const FINE_THRESHOLD: Decimal = Decimal::from_parts(1000, 0, 0, false, 2);

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// 会員の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    /// 利用停止（罰金の滞納など）
    Suspended,
    /// 退会・休眠
    Inactive,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Suspended => "suspended",
            MemberStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 会員
///
/// 不変条件：
/// - 罰金残高は0以上
/// - Active のまま残高が閾値以上になることはない（自動で Suspended になる）
///
/// 貸出中の取引IDは参照として保持するだけで、取引そのものは台帳が所有する。
/// 冊数上限の強制は貸出サービス側の責務。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    id: MemberId,
    name: String,
    email: String,
    phone: String,
    address: String,
    registered_at: DateTime<Utc>,
    status: MemberStatus,
    fine_balance: Decimal,
    borrow_limit: usize,
    active_transactions: Vec<TransactionId>,
}

impl Member {
    /// 入力を検証する
    pub fn validate(data: &NewMember) -> ValidationReport {
        let mut report = ValidationReport::new();

        report.require(is_present(&data.name), "name is required");
        report.require(
            EMAIL_PATTERN.is_match(data.email.trim()),
            "email is invalid",
        );
        report.require(is_present(&data.phone), "phone is required");
        report.require(is_present(&data.address), "address is required");

        report
    }

    /// 検証してから新しい会員を生成する（Active、罰金0）
    pub fn register(
        data: NewMember,
        registered_at: DateTime<Utc>,
    ) -> Result<Self, ValidationReport> {
        let report = Self::validate(&data);
        if !report.is_valid() {
            return Err(report);
        }

        Ok(Self {
            id: MemberId::new(),
            name: data.name.trim().to_string(),
            email: data.email.trim().to_string(),
            phone: data.phone.trim().to_string(),
            address: data.address.trim().to_string(),
            registered_at,
            status: MemberStatus::Active,
            fine_balance: Decimal::ZERO,
            borrow_limit: MAX_BORROW_LIMIT,
            active_transactions: Vec::new(),
        })
    }

    pub fn id(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    pub fn status(&self) -> MemberStatus {
        self.status
    }

    pub fn fine_balance(&self) -> Decimal {
        self.fine_balance
    }

    pub fn borrow_limit(&self) -> usize {
        self.borrow_limit
    }

    /// 貸出中の取引ID（登録順）
    pub fn active_transactions(&self) -> &[TransactionId] {
        &self.active_transactions
    }

    pub fn current_borrow_count(&self) -> usize {
        self.active_transactions.len()
    }

    /// 貸出可否を判定する
    ///
    /// 判定順：
    /// 1. 状態が Active であること
    /// 2. 罰金残高が閾値未満であること
    /// 3. 貸出中の冊数が上限未満であること
    pub fn can_borrow(&self) -> Result<(), BorrowRefusal> {
        if self.status != MemberStatus::Active {
            return Err(BorrowRefusal::MemberNotActive(self.status));
        }

        if self.fine_balance >= FINE_THRESHOLD {
            return Err(BorrowRefusal::UnpaidFines(self.fine_balance));
        }

        if self.active_transactions.len() >= self.borrow_limit {
            return Err(BorrowRefusal::BorrowLimitReached(self.borrow_limit));
        }

        Ok(())
    }

    /// 貸出中の取引を追加する（既にあれば何もしない）
    pub fn add_borrowing(&mut self, transaction_id: TransactionId) {
        if !self.active_transactions.contains(&transaction_id) {
            self.active_transactions.push(transaction_id);
        }
    }

    /// 貸出中の取引を外す（なければ何もしない）
    pub fn remove_borrowing(&mut self, transaction_id: TransactionId) {
        self.active_transactions.retain(|id| *id != transaction_id);
    }

    /// 罰金を加算する
    ///
    /// 残高が閾値以上になり、かつ Active だった場合は Suspended にする。
    pub fn add_fine(&mut self, amount: Decimal) -> Result<(), FineError> {
        if amount < Decimal::ZERO {
            return Err(FineError::NegativeAmount);
        }

        self.fine_balance += amount;

        if self.fine_balance >= FINE_THRESHOLD && self.status == MemberStatus::Active {
            self.status = MemberStatus::Suspended;
        }
        Ok(())
    }

    /// 罰金を支払う
    ///
    /// 残高が閾値未満になり、かつ Suspended だった場合は Active に戻す。
    pub fn pay_fine(&mut self, amount: Decimal) -> Result<(), FineError> {
        if amount < Decimal::ZERO {
            return Err(FineError::NegativeAmount);
        }

        if amount > self.fine_balance {
            return Err(FineError::OverpaymentRejected {
                amount,
                balance: self.fine_balance,
            });
        }

        self.fine_balance -= amount;

        if self.fine_balance < FINE_THRESHOLD && self.status == MemberStatus::Suspended {
            self.status = MemberStatus::Active;
        }
        Ok(())
    }

    pub fn suspend(&mut self) {
        self.status = MemberStatus::Suspended;
    }

    /// 明示的に再有効化する
    ///
    /// `pay_fine` による自動復帰と違い、罰金が閾値以上残っていれば失敗する。
    pub fn activate(&mut self) -> Result<(), ActivationError> {
        if self.fine_balance >= FINE_THRESHOLD {
            return Err(ActivationError::UnpaidFines {
                balance: self.fine_balance,
            });
        }
        self.status = MemberStatus::Active;
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.status = MemberStatus::Inactive;
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - {}/{} borrowings - fines: {}",
            self.name,
            self.email,
            self.active_transactions.len(),
            self.borrow_limit,
            self.fine_balance.round_dp(2)
        )
    }
}
