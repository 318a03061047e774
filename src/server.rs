//! axumサーバー起動

use crate::AppState;
use tracing::info;

/// axumサーバーを起動する
///
/// 外部から終了させられるまで戻らない。バインド失敗は起動時致命。
pub async fn run(state: AppState, bind_addr: &str) {
    let app = crate::api::create_app(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .expect("Failed to bind to address");

    info!("llmwatch API server listening on {}", bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
