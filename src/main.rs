//! llmwatch Entry Point

use llmwatch::config::{env_or, env_parse};
use llmwatch::db::EventStore;
use llmwatch::restart::DockerRestarter;
use llmwatch::watch::ServerWatcher;
use llmwatch::{bootstrap, config, logging, server, AppState};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init().expect("failed to initialize logging");

    info!("llmwatch v{}", env!("CARGO_PKG_VERSION"));

    // 設定ファイルは起動時に一度だけ読む
    let config_path = env_or("LLMWATCH_CONFIG", "/etc/llmwatch/config.yaml");
    let config = match config::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            error!(path = %config_path, error = %err, "Failed to load config");
            std::process::exit(1);
        }
    };
    info!(
        path = %config_path,
        servers = config.servers.len(),
        timeout_secs = config.timeout,
        "Configuration loaded"
    );

    // イベントストレージへ接続（失敗は起動時致命）
    let database_url = env_or("LLMWATCH_DATABASE_URL", &bootstrap::default_database_url());
    let pool = match bootstrap::init_db_pool(&database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            error!(error = %err, "Failed to connect to database");
            std::process::exit(1);
        }
    };
    if let Err(err) = sqlx::migrate!("./migrations").run(&pool).await {
        error!(error = %err, "Failed to run database migrations");
        std::process::exit(1);
    }
    let store = EventStore::new(pool);

    // ウォッチャーをバックグラウンドで開始
    let interval_secs: u64 = env_parse("LLMWATCH_CHECK_INTERVAL_SECS", 1800);
    let max_concurrent_probes: usize = env_parse("LLMWATCH_MAX_CONCURRENT_PROBES", 0);
    ServerWatcher::new(
        config.servers,
        store.clone(),
        config.timeout,
        Arc::new(DockerRestarter),
    )
    .with_interval(interval_secs)
    .with_max_concurrent_probes(max_concurrent_probes)
    .start();

    // REST APIサーバーを起動（戻らない）
    let host = env_or("LLMWATCH_HOST", "0.0.0.0");
    let port: u16 = env_parse("LLMWATCH_PORT", 8080);
    let state = AppState { store };
    server::run(state, &format!("{}:{}", host, port)).await;
}
