//! REST APIハンドラー

/// 共通エラーレスポンス
pub mod error;

/// イベント照会・削除ハンドラー
pub mod events;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

/// APIルーターを構築する
///
/// 定義外のメソッド（例: `POST /crashes`）はaxumが405を返す。
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/crashes",
            get(events::list_crashes).delete(events::delete_crashes),
        )
        .route("/restarts", get(events::list_restarts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
