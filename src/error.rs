//! エラー型定義
//!
//! 統一エラー型（thiserror使用）

use thiserror::Error;

/// llmwatch error type
#[derive(Debug, Error)]
pub enum WatchError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file I/O error
    #[error("Failed to read configuration file: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Configuration parse error
    #[error("Failed to parse configuration file: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
