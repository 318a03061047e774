//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング。ストレージ障害の詳細はサーバー側の
//! ログにのみ残し、呼び出し元には短い定型メッセージだけを返す。

use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::error;

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError {
    /// 呼び出し元へ返す短いメッセージ
    message: &'static str,
    /// ログにのみ残す内部エラー
    source: sqlx::Error,
}

impl AppError {
    /// ストレージ操作の失敗をエラーレスポンスに変換する
    pub fn database(message: &'static str, source: sqlx::Error) -> Self {
        Self { message, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        error!(error = %self.source, "{}", self.message);
        (StatusCode::INTERNAL_SERVER_ERROR, self.message).into_response()
    }
}
