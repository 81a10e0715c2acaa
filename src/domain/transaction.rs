use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BookId, CloseError, MemberId, RenewError, RenewalCount, TransactionId};

/// 貸出期間（日数）
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// 延滞1日あたりの罰金（0.50）
pub const DAILY_FINE_RATE: Decimal = Decimal::from_parts(50, 0, 0, false, 2);

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// 貸出取引の状態
///
/// ```text
/// Active ──┬─> Renewed ─┐
///          └─> Overdue ─┴─> Returned | Lost（終端）
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// 貸出中
    Active,
    /// 更新済み
    Renewed,
    /// 延滞中
    Overdue,
    /// 返却済み
    Returned,
    /// 紛失
    Lost,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Active => "active",
            TransactionStatus::Renewed => "renewed",
            TransactionStatus::Overdue => "overdue",
            TransactionStatus::Returned => "returned",
            TransactionStatus::Lost => "lost",
        }
    }

    /// これ以上遷移しない状態か
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Returned | TransactionStatus::Lost)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 返却結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReturnOutcome {
    /// 確定した罰金
    pub fine: Decimal,
    /// 返却日時点での延滞日数
    pub days_overdue: i64,
}

/// 貸出取引 - 1冊の書籍の1回の貸出（貸出〜返却）
///
/// 書籍・会員はIDで参照するだけ。
/// 時刻に依存する操作はすべて評価時刻を引数で受け取る。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LendingTransaction {
    id: TransactionId,
    book_id: BookId,
    member_id: MemberId,
    borrowed_at: DateTime<Utc>,
    due_date: DateTime<Utc>,
    returned_at: Option<DateTime<Utc>>,
    status: TransactionStatus,
    fine_amount: Decimal,
    renewal_count: RenewalCount,
}

impl LendingTransaction {
    /// 貸出を開始する
    ///
    /// 返却期限は貸出日 + 14日。
    pub fn open(book_id: BookId, member_id: MemberId, borrowed_at: DateTime<Utc>) -> Self {
        Self {
            id: TransactionId::new(),
            book_id,
            member_id,
            borrowed_at,
            due_date: due_date_from(borrowed_at),
            returned_at: None,
            status: TransactionStatus::Active,
            fine_amount: Decimal::ZERO,
            renewal_count: RenewalCount::new(),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    pub fn borrowed_at(&self) -> DateTime<Utc> {
        self.borrowed_at
    }

    pub fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    pub fn returned_at(&self) -> Option<DateTime<Utc>> {
        self.returned_at
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    /// 最後に計算された罰金（返却後は確定値）
    pub fn fine_amount(&self) -> Decimal {
        self.fine_amount
    }

    pub fn renewal_count(&self) -> RenewalCount {
        self.renewal_count
    }

    /// `now` 時点で延滞しているか（返却済み・紛失は対象外）
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal() && now > self.due_date
    }

    /// `at` 時点での延滞日数（端数は切り上げ、0未満にはならない）
    ///
    /// 返却済みなら返却日で評価する。
    pub fn days_overdue(&self, at: DateTime<Utc>) -> i64 {
        let at = self.returned_at.unwrap_or(at);
        ceil_days(at - self.due_date).max(0)
    }

    /// 罰金を計算して保持する
    ///
    /// 延滞日数 × 0.50 を小数点以下2桁に丸める。延滞していなければ 0.00。
    /// 返却済みの取引は確定値を返すだけで再計算しない。
    pub fn calculate_fine(&mut self, now: DateTime<Utc>) -> Decimal {
        if self.status == TransactionStatus::Returned {
            return self.fine_amount;
        }
        self.assess_fine(now)
    }

    fn assess_fine(&mut self, at: DateTime<Utc>) -> Decimal {
        let days = self.days_overdue(at);
        self.fine_amount = (Decimal::from(days) * DAILY_FINE_RATE).round_dp(2);
        self.fine_amount
    }

    /// 貸出を更新する
    ///
    /// ビジネスルール：
    /// - 返却済み・紛失は更新不可
    /// - 更新は2回まで
    /// - 新しい返却期限は更新日 + 14日（延滞中でも更新でき、罰金は新しい期限から再計算される）
    pub fn renew(&mut self, now: DateTime<Utc>) -> Result<(), RenewError> {
        match self.status {
            TransactionStatus::Returned => return Err(RenewError::AlreadyReturned),
            TransactionStatus::Lost => return Err(RenewError::AlreadyLost),
            _ => {}
        }

        self.renewal_count = self.renewal_count.increment()?;
        self.due_date = due_date_from(now);
        self.status = TransactionStatus::Renewed;
        Ok(())
    }

    /// 延滞していれば Overdue に遷移させる
    ///
    /// 状態が変わった場合のみ `true`。何度呼んでも結果は同じ。
    pub fn check_and_update_overdue(&mut self, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }

        if now > self.due_date && self.status != TransactionStatus::Overdue {
            self.status = TransactionStatus::Overdue;
            return true;
        }

        false
    }

    /// 返却して取引を完了する
    ///
    /// 罰金は呼び出し時刻ではなく `return_date` で評価して確定させる。
    pub fn complete(&mut self, return_date: DateTime<Utc>) -> Result<ReturnOutcome, CloseError> {
        self.ensure_open()?;

        let days_overdue = ceil_days(return_date - self.due_date).max(0);
        let fine = self.assess_fine(return_date);

        self.returned_at = Some(return_date);
        self.status = TransactionStatus::Returned;

        Ok(ReturnOutcome { fine, days_overdue })
    }

    /// 紛失扱いにする（罰金は計算しない）
    pub fn mark_as_lost(&mut self) -> Result<(), CloseError> {
        self.ensure_open()?;
        self.status = TransactionStatus::Lost;
        Ok(())
    }

    /// 返却期限までの残り日数（延滞中は負）
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        if self.status == TransactionStatus::Returned {
            return 0;
        }
        ceil_days(self.due_date - now)
    }

    fn ensure_open(&self) -> Result<(), CloseError> {
        match self.status {
            TransactionStatus::Returned => Err(CloseError::AlreadyReturned),
            TransactionStatus::Lost => Err(CloseError::AlreadyLost),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for LendingTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transaction {} - book {} - status: {} - due {}",
            self.id,
            self.book_id,
            self.status,
            self.due_date.format("%Y-%m-%d")
        )
    }
}

fn due_date_from(from: DateTime<Utc>) -> DateTime<Utc> {
    from + Duration::days(LOAN_PERIOD_DAYS)
}

/// 期間を日数に変換する（端数切り上げ）
fn ceil_days(span: Duration) -> i64 {
    let millis = span.num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) > 0 {
        days + 1
    } else {
        days
    }
}
