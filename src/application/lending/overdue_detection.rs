use super::errors::{LendingError, Result};
use super::lending_service::ServiceDependencies;

/// 延滞検出バッチ
///
/// 外部のスケジューラから定期的に呼ばれ、返却期限を過ぎた取引を Overdue に遷移させる。
///
/// ビジネスルール：
/// - 返却期限を過ぎた Active / Renewed の取引を延滞とする
/// - 既に Overdue の取引は数えない（何度実行しても同じ結果になる）
/// - Returned / Lost の取引は対象外
///
/// # 戻り値
/// 今回 Overdue に遷移した取引の件数
#[tracing::instrument(skip(deps))]
pub fn check_overdue_transactions(deps: &ServiceDependencies) -> Result<usize> {
    let _guard = deps.lock_writes();

    let now = deps.clock.now();
    let transactions = deps
        .transactions
        .list_all()
        .map_err(LendingError::StoreError)?;

    let mut detected_count = 0;
    for mut transaction in transactions {
        if !transaction.check_and_update_overdue(now) {
            continue;
        }

        deps.transactions
            .save(transaction)
            .map_err(LendingError::StoreError)?;
        detected_count += 1;
    }

    tracing::info!(detected_count, "overdue check finished");
    Ok(detected_count)
}
