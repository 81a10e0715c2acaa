//! 設定の読み込み
//!
//! 優先順位（後勝ち）：組み込みの既定値 → `config/default` → `config/{RUN_MODE}`
//! → `LENDING__` で始まる環境変数 → `PORT`。
//! 貸出ポリシーの定数（貸出期間・更新回数・罰金）は設定ではなくドメインの定数。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `RUST_LOG` が未設定のときに使うフィルタ
    pub level: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct OverdueConfig {
    /// 延滞チェックの実行間隔（秒）
    pub check_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub overdue: OverdueConfig,
}

impl AppConfig {
    /// 設定ファイルと環境変数から読み込む（ファイルはどちらも省略可）
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // e.g. LENDING__SERVER__PORT=8080
            .add_source(
                Environment::with_prefix("LENDING")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", env::var("PORT").ok())?
            .build()?;

        config.try_deserialize()
    }

    /// サーバーの待ち受けアドレス
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "library_lending=debug,tower_http=debug".to_string(),
        }
    }
}

impl Default for OverdueConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 3600,
        }
    }
}
