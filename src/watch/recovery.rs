//! リカバリー処理
//!
//! プローブ失敗を受けて、クラッシュイベントの記録とコンテナ再起動を行う。
//! ストレージ書き込みはベストエフォート: 失敗はログに残すが処理は続行する。

use crate::db::EventStore;
use crate::restart::ProcessRestarter;
use crate::types::{CrashEvent, FailureKind, RestartEvent, RestartStatus, Target};
use chrono::Utc;
use tracing::{error, info, warn};

/// プローブ失敗を処理する
///
/// 1. クラッシュイベントを記録する（失敗しても中断しない）
/// 2. コンテナ名が設定されていれば再起動を1回だけ試みる
/// 3. 再起動を試みた場合は結果を再起動イベントとして正確に1件記録する
pub async fn handle_failure(
    store: &EventStore,
    restarter: &dyn ProcessRestarter,
    target: &Target,
    kind: FailureKind,
) {
    warn!(
        url = %target.url,
        model = %target.model,
        crash_type = %kind,
        "Probe failed"
    );

    let crash = CrashEvent::now(&target.url, &target.model, kind);
    match store.insert_crash(&crash).await {
        Ok(()) => info!(
            url = %target.url,
            model = %target.model,
            crash_type = %kind,
            "Logged crash event"
        ),
        Err(err) => error!(
            url = %target.url,
            error = %err,
            "Failed to insert crash event"
        ),
    }

    let Some(container_name) = target.restart_handle() else {
        info!(url = %target.url, "No container_name configured, skipping restart");
        return;
    };

    // 再起動は1回だけ。失敗してもリトライせず、結果を記録して終わる。
    let (status, error_message) = match restarter.restart(container_name).await {
        Ok(()) => {
            info!(container_name, url = %target.url, "Container restarted");
            (RestartStatus::Success, None)
        }
        Err(err) => {
            error!(
                container_name,
                url = %target.url,
                error = %err,
                "Failed to restart container"
            );
            (RestartStatus::Fail, Some(err.to_string()))
        }
    };

    let event = RestartEvent {
        timestamp: Utc::now(),
        container_name: container_name.to_string(),
        url: target.url.clone(),
        model: target.model.clone(),
        status,
        error_message,
    };
    match store.insert_restart(&event).await {
        Ok(()) => info!(container_name, status = %status, "Logged restart event"),
        Err(err) => error!(
            container_name,
            error = %err,
            "Failed to insert restart event"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db_pool;
    use crate::db::SortOrder;
    use crate::restart::test_support::MockRestarter;

    async fn test_store() -> EventStore {
        EventStore::new(test_db_pool().await)
    }

    fn target(container: Option<&str>) -> Target {
        Target {
            url: "http://10.0.0.1:11434/v1/chat/completions".to_string(),
            model: "llama3".to_string(),
            container_name: container.map(|s| s.to_string()),
        }
    }

    #[tokio::test]
    async fn test_failure_without_container_records_only_crash() {
        let store = test_store().await;
        let restarter = MockRestarter::succeeding();

        handle_failure(
            &store,
            &restarter,
            &target(None),
            FailureKind::TransportTimeout,
        )
        .await;

        assert_eq!(store.count_crashes().await.unwrap(), 1);
        assert_eq!(store.count_restarts().await.unwrap(), 0);
        assert!(restarter.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_failure_with_empty_container_name_skips_restart() {
        let store = test_store().await;
        let restarter = MockRestarter::succeeding();

        handle_failure(
            &store,
            &restarter,
            &target(Some("")),
            FailureKind::ModelTimeout,
        )
        .await;

        assert_eq!(store.count_crashes().await.unwrap(), 1);
        assert_eq!(store.count_restarts().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_successful_restart_recorded_as_success() {
        let store = test_store().await;
        let restarter = MockRestarter::succeeding();

        handle_failure(
            &store,
            &restarter,
            &target(Some("ollama-1")),
            FailureKind::TransportTimeout,
        )
        .await;

        assert_eq!(store.count_crashes().await.unwrap(), 1);
        assert_eq!(restarter.calls.lock().await.as_slice(), ["ollama-1"]);

        let restarts = store.list_restarts(SortOrder::Desc, 10).await.unwrap();
        assert_eq!(restarts.len(), 1);
        assert_eq!(restarts[0].status, RestartStatus::Success);
        assert_eq!(restarts[0].error_message, None);
        assert_eq!(restarts[0].container_name, "ollama-1");
    }

    #[tokio::test]
    async fn test_failed_restart_recorded_with_error_detail() {
        let store = test_store().await;
        let restarter = MockRestarter::failing("No such container: ollama-1");

        handle_failure(
            &store,
            &restarter,
            &target(Some("ollama-1")),
            FailureKind::ModelTimeout,
        )
        .await;

        let restarts = store.list_restarts(SortOrder::Desc, 10).await.unwrap();
        assert_eq!(restarts.len(), 1);
        assert_eq!(restarts[0].status, RestartStatus::Fail);
        assert!(restarts[0]
            .error_message
            .as_deref()
            .unwrap()
            .contains("No such container"));
    }

    #[tokio::test]
    async fn test_store_failure_does_not_block_restart() {
        // 閉じたプールへの書き込みは失敗するが、リカバリーは続行する
        let pool = test_db_pool().await;
        pool.close().await;
        let store = EventStore::new(pool);
        let restarter = MockRestarter::succeeding();

        handle_failure(
            &store,
            &restarter,
            &target(Some("ollama-1")),
            FailureKind::TransportTimeout,
        )
        .await;

        assert_eq!(restarter.calls.lock().await.as_slice(), ["ollama-1"]);
    }

    #[tokio::test]
    async fn test_crash_event_carries_failure_kind() {
        let store = test_store().await;
        let restarter = MockRestarter::succeeding();

        handle_failure(
            &store,
            &restarter,
            &target(None),
            FailureKind::ModelTimeout,
        )
        .await;

        let crashes = store.list_crashes(SortOrder::Desc, 10).await.unwrap();
        assert_eq!(crashes[0].crash_type, FailureKind::ModelTimeout);
        assert_eq!(crashes[0].model, "llama3");
    }
}
