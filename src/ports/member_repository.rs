use crate::domain::{Member, MemberId};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 会員名簿のリポジトリポート
pub trait MemberRepository: Send + Sync {
    /// IDで会員を取得する
    fn get(&self, member_id: MemberId) -> Result<Option<Member>>;

    /// 会員を保存する（upsert）
    fn save(&self, member: Member) -> Result<()>;

    /// 会員を削除する。存在した場合は `true`
    fn delete(&self, member_id: MemberId) -> Result<bool>;

    /// メールアドレスで会員を検索する
    ///
    /// メールアドレスの一意性チェックに使用される。
    fn find_by_email(&self, email: &str) -> Result<Option<Member>>;

    /// 全会員を登録順に取得する
    fn list_all(&self) -> Result<Vec<Member>>;
}
