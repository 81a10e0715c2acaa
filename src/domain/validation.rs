use serde::Serialize;

/// 入力検証の結果
///
/// 最初の違反で止めずにすべての違反を集める。呼び出し側はまとめて利用者に返せる。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    errors: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 条件が偽なら違反メッセージを追加する
    pub fn require(&mut self, condition: bool, message: impl Into<String>) {
        if !condition {
            self.errors.push(message.into());
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

/// 前後の空白を除いて空でないか
pub(crate) fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}
