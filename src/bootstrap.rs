//! 起動時初期化ロジック
//!
//! データベース接続プールの初期化を担当する。

use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;

/// デフォルトのデータベースURL
///
/// ホームディレクトリ直下の `~/.llmwatch/llmwatch.db` を指す。
pub fn default_database_url() -> String {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    format!("sqlite:{}/.llmwatch/llmwatch.db", home)
}

/// SQLite接続プールを初期化する
///
/// SQLiteファイルはディレクトリが存在しないと作成できないため、先に作成する。
pub async fn init_db_pool(database_url: &str) -> sqlx::Result<sqlx::SqlitePool> {
    if let Some(path) = database_url.strip_prefix("sqlite:") {
        // `sqlite::memory:` のような特殊指定はスキップ
        if !path.starts_with(':') {
            // `sqlite://` 形式に備えてスラッシュを除去し、クエリ部分を除外
            let normalized = path.trim_start_matches("//");
            let path_without_params = normalized.split('?').next().unwrap_or(normalized);
            let db_path = std::path::Path::new(path_without_params);
            if let Some(parent) = db_path.parent() {
                std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    sqlx::SqlitePool::connect_with(connect_options).await
}
