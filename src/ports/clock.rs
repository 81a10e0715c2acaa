use chrono::{DateTime, Utc};

/// 時刻ソースのポート
///
/// 返却期限・延滞・罰金の計算はすべてここから得た時刻で行う。
/// テストでは固定時計を注入して時間を進める。
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
