//! llmwatch
//!
//! LLM推論サーバー群を定期プローブし、失敗を記録して
//! バックエンドコンテナの再起動を試みるウォッチャー

#![warn(missing_docs)]

/// REST APIハンドラー
pub mod api;

/// 起動時初期化（DB接続プール）
pub mod bootstrap;

/// 設定管理（YAML + 環境変数ヘルパー）
pub mod config;

/// データベースアクセス
pub mod db;

/// エラー型
pub mod error;

/// ロギング初期化ユーティリティ
pub mod logging;

/// コンテナ再起動アクション
pub mod restart;

/// axumサーバー起動
pub mod server;

/// 型定義
pub mod types;

/// サーバー監視（プローブ・スケジューラ・リカバリー）
pub mod watch;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// イベントストレージ
    pub store: db::EventStore,
}
