use crate::domain::{Book, BookId};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 蔵書カタログのリポジトリポート
///
/// 貸出ポリシーからストレージの実装を切り離す。
/// 取得したエンティティはスナップショットで、変更は `save` で書き戻す。
pub trait BookRepository: Send + Sync {
    /// IDで蔵書を取得する
    fn get(&self, book_id: BookId) -> Result<Option<Book>>;

    /// 蔵書を保存する（新規なら追加、既存なら置き換え）
    fn save(&self, book: Book) -> Result<()>;

    /// 蔵書を削除する。存在した場合は `true`
    fn delete(&self, book_id: BookId) -> Result<bool>;

    /// ISBNで蔵書を検索する
    ///
    /// ISBNの一意性チェックに使用される。
    fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>>;

    /// 全蔵書を登録順に取得する
    fn list_all(&self) -> Result<Vec<Book>>;
}
