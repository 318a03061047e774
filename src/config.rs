//! Configuration management
//!
//! Monitored targets come from a YAML file read once at startup; everything
//! else (bind address, database URL, check interval) comes from environment
//! variables with sensible defaults.

use crate::error::WatchError;
use crate::types::Target;
use serde::Deserialize;
use std::path::Path;

/// Get an environment variable or a default value
///
/// # Arguments
/// * `name` - The environment variable name
/// * `default` - The default value to return if the variable is not set
pub fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable, parsing to a specific type
///
/// Returns the default if the variable is not set or does not parse.
pub fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// 監視設定
///
/// YAML設定ファイル全体に対応する。`timeout` は全ターゲット共通の
/// 応答待ちタイムアウト（秒）。
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WatchConfig {
    /// 監視対象サーバー一覧
    pub servers: Vec<Target>,
    /// 応答待ちタイムアウト（秒）
    pub timeout: u64,
}

/// YAML設定ファイルを読み込む
///
/// ファイルが読めない・パースできない場合はエラーを返す（起動時致命）。
pub fn load(path: impl AsRef<Path>) -> Result<WatchConfig, WatchError> {
    let data = std::fs::read_to_string(path.as_ref())?;
    let config: WatchConfig = serde_yaml::from_str(&data)?;

    if config.timeout == 0 {
        return Err(WatchError::Config(
            "timeout must be greater than zero".to_string(),
        ));
    }
    if config.servers.is_empty() {
        tracing::warn!("Configuration contains no servers; nothing will be probed");
    }

    Ok(config)
}
