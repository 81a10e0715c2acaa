use crate::domain::{LendingTransaction, MemberId, TransactionId};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出台帳のリポジトリポート
pub trait TransactionRepository: Send + Sync {
    /// IDで取引を取得する
    fn get(&self, transaction_id: TransactionId) -> Result<Option<LendingTransaction>>;

    /// 取引を保存する（upsert）
    fn save(&self, transaction: LendingTransaction) -> Result<()>;

    /// 取引を削除する。存在した場合は `true`
    fn delete(&self, transaction_id: TransactionId) -> Result<bool>;

    /// 会員の全取引を貸出順に取得する
    ///
    /// 会員の貸出履歴表示に使用される。
    fn find_by_member(&self, member_id: MemberId) -> Result<Vec<LendingTransaction>>;

    /// 全取引を貸出順に取得する
    ///
    /// 延滞チェックとレポートに使用される。
    fn list_all(&self) -> Result<Vec<LendingTransaction>>;
}
