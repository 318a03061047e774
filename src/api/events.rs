//! イベント照会・削除APIハンドラー
//!
//! `/crashes` と `/restarts` のハンドラー群

use super::error::AppError;
use crate::db::SortOrder;
use crate::types::{CrashEvent, RestartEvent};
use crate::AppState;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

/// 件数上限のデフォルト
const DEFAULT_LIMIT: i64 = 10;

/// イベント照会のクエリパラメータ
#[derive(Debug, Deserialize, Default)]
pub struct EventQueryParams {
    /// 取得件数上限（正の整数、デフォルト: 10）
    pub limit: Option<String>,
    /// ソート順（`asc` | `desc`、デフォルト: `desc`）
    pub sort: Option<String>,
}

impl EventQueryParams {
    /// パラメータを解釈する
    ///
    /// 不正な `limit`（非数値・0以下）はデフォルトの10に落とす。
    fn resolve(&self) -> (SortOrder, i64) {
        let limit = self
            .limit
            .as_deref()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_LIMIT);
        let order = SortOrder::from_query(self.sort.as_deref());
        (order, limit)
    }
}

/// 全削除のレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// 結果メッセージ
    pub message: String,
    /// 削除した件数
    #[serde(rename = "deletedCount")]
    pub deleted_count: u64,
}

/// GET /crashes - クラッシュイベント一覧取得
pub async fn list_crashes(
    State(state): State<AppState>,
    Query(params): Query<EventQueryParams>,
) -> Result<Json<Vec<CrashEvent>>, AppError> {
    let (order, limit) = params.resolve();
    let events = state
        .store
        .list_crashes(order, limit)
        .await
        .map_err(|e| AppError::database("Failed to query crash events", e))?;

    Ok(Json(events))
}

/// DELETE /crashes - 全クラッシュイベント削除
pub async fn delete_crashes(
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, AppError> {
    let deleted_count = state
        .store
        .delete_all_crashes()
        .await
        .map_err(|e| AppError::database("Failed to delete crash events", e))?;

    info!(deleted_count, "Deleted crash events");

    Ok(Json(DeleteResponse {
        message: "All crash events deleted".to_string(),
        deleted_count,
    }))
}

/// GET /restarts - 再起動イベント一覧取得
pub async fn list_restarts(
    State(state): State<AppState>,
    Query(params): Query<EventQueryParams>,
) -> Result<Json<Vec<RestartEvent>>, AppError> {
    let (order, limit) = params.resolve();
    let events = state
        .store
        .list_restarts(order, limit)
        .await
        .map_err(|e| AppError::database("Failed to query restart events", e))?;

    Ok(Json(events))
}
