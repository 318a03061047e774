//! イベントストレージ
//!
//! クラッシュイベントと再起動イベントの追記・検索・全削除を提供する。
//! タイムスタンプはRFC 3339文字列（UTC）で格納するため、文字列順ソートが
//! 時刻順ソートと一致する。

use crate::types::{CrashEvent, FailureKind, RestartEvent, RestartStatus};
use sqlx::SqlitePool;

/// 検索時のソート順
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// 古い順
    Asc,
    /// 新しい順（デフォルト）
    #[default]
    Desc,
}

impl SortOrder {
    /// SQLのORDER BY句に埋め込む文字列
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    /// クエリパラメータから解釈する（`asc` のみ昇順、それ以外は降順）
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

/// イベントストレージ
///
/// `SqlitePool` は内部で接続を共有するため、クローンして
/// 複数タスクから並行に使用できる。
#[derive(Clone)]
pub struct EventStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct CrashEventRow {
    timestamp: String,
    url: String,
    model: String,
    crash_type: String,
}

impl From<CrashEventRow> for CrashEvent {
    fn from(row: CrashEventRow) -> Self {
        Self {
            timestamp: chrono::DateTime::parse_from_rfc3339(&row.timestamp)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
            url: row.url,
            model: row.model,
            crash_type: row.crash_type.parse::<FailureKind>().unwrap_or_default(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct RestartEventRow {
    timestamp: String,
    container_name: String,
    url: String,
    model: String,
    status: String,
    error_message: Option<String>,
}

impl From<RestartEventRow> for RestartEvent {
    fn from(row: RestartEventRow) -> Self {
        Self {
            timestamp: chrono::DateTime::parse_from_rfc3339(&row.timestamp)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
            container_name: row.container_name,
            url: row.url,
            model: row.model,
            status: row.status.parse::<RestartStatus>().unwrap_or_default(),
            error_message: row.error_message,
        }
    }
}

impl EventStore {
    /// 新しいイベントストレージを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// クラッシュイベントを追記
    pub async fn insert_crash(&self, event: &CrashEvent) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO crash_events (timestamp, url, model, crash_type)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(event.timestamp.to_rfc3339())
        .bind(&event.url)
        .bind(&event.model)
        .bind(event.crash_type.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 再起動イベントを追記
    pub async fn insert_restart(&self, event: &RestartEvent) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO restart_events (timestamp, container_name, url, model, status, error_message)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.timestamp.to_rfc3339())
        .bind(&event.container_name)
        .bind(&event.url)
        .bind(&event.model)
        .bind(event.status.as_str())
        .bind(&event.error_message)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// クラッシュイベント一覧を取得（timestamp順、件数上限付き）
    pub async fn list_crashes(
        &self,
        order: SortOrder,
        limit: i64,
    ) -> Result<Vec<CrashEvent>, sqlx::Error> {
        let query = format!(
            "SELECT timestamp, url, model, crash_type \
             FROM crash_events ORDER BY timestamp {} LIMIT ?",
            order.as_sql()
        );
        let rows = sqlx::query_as::<_, CrashEventRow>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// 再起動イベント一覧を取得（timestamp順、件数上限付き）
    pub async fn list_restarts(
        &self,
        order: SortOrder,
        limit: i64,
    ) -> Result<Vec<RestartEvent>, sqlx::Error> {
        let query = format!(
            "SELECT timestamp, container_name, url, model, status, error_message \
             FROM restart_events ORDER BY timestamp {} LIMIT ?",
            order.as_sql()
        );
        let rows = sqlx::query_as::<_, RestartEventRow>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// 全クラッシュイベントを削除し、削除件数を返す
    pub async fn delete_all_crashes(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM crash_events")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// クラッシュイベント件数
    pub async fn count_crashes(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM crash_events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// 再起動イベント件数
    pub async fn count_restarts(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM restart_events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db_pool;
    use chrono::{Duration, Utc};

    async fn test_store() -> EventStore {
        EventStore::new(test_db_pool().await)
    }

    fn crash_at(offset_secs: i64, url: &str) -> CrashEvent {
        CrashEvent {
            timestamp: Utc::now() + Duration::seconds(offset_secs),
            url: url.to_string(),
            model: "llama3".to_string(),
            crash_type: FailureKind::TransportTimeout,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_crashes_desc_by_default() {
        let store = test_store().await;
        store.insert_crash(&crash_at(0, "http://a")).await.unwrap();
        store.insert_crash(&crash_at(10, "http://b")).await.unwrap();
        store.insert_crash(&crash_at(20, "http://c")).await.unwrap();

        let events = store.list_crashes(SortOrder::Desc, 10).await.unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].url, "http://c");
        assert_eq!(events[2].url, "http://a");
    }

    #[tokio::test]
    async fn test_list_crashes_asc_with_limit() {
        let store = test_store().await;
        store.insert_crash(&crash_at(0, "http://t1")).await.unwrap();
        store
            .insert_crash(&crash_at(10, "http://t2"))
            .await
            .unwrap();
        store
            .insert_crash(&crash_at(20, "http://t3"))
            .await
            .unwrap();

        let events = store.list_crashes(SortOrder::Asc, 2).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].url, "http://t1");
        assert_eq!(events[1].url, "http://t2");
    }

    #[tokio::test]
    async fn test_crash_kind_survives_roundtrip() {
        let store = test_store().await;
        let event = CrashEvent::now("http://a", "llama3", FailureKind::ModelTimeout);
        store.insert_crash(&event).await.unwrap();

        let events = store.list_crashes(SortOrder::Desc, 1).await.unwrap();
        assert_eq!(events[0].crash_type, FailureKind::ModelTimeout);
    }

    #[tokio::test]
    async fn test_delete_all_crashes_returns_count() {
        let store = test_store().await;
        store.insert_crash(&crash_at(0, "http://a")).await.unwrap();
        store.insert_crash(&crash_at(1, "http://b")).await.unwrap();

        let deleted = store.delete_all_crashes().await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.count_crashes().await.unwrap(), 0);

        // 空のコレクションに対しては0を返す
        let deleted = store.delete_all_crashes().await.unwrap();
        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn test_insert_and_list_restarts() {
        let store = test_store().await;
        let event = RestartEvent {
            timestamp: Utc::now(),
            container_name: "ollama-1".to_string(),
            url: "http://a".to_string(),
            model: "llama3".to_string(),
            status: RestartStatus::Fail,
            error_message: Some("exit status 1".to_string()),
        };
        store.insert_restart(&event).await.unwrap();

        let events = store.list_restarts(SortOrder::Desc, 10).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, RestartStatus::Fail);
        assert_eq!(events[0].error_message.as_deref(), Some("exit status 1"));
    }

    #[tokio::test]
    async fn test_concurrent_appends() {
        let store = test_store().await;

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert_crash(&crash_at(i, &format!("http://t{}", i)))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.count_crashes().await.unwrap(), 8);
    }

    #[test]
    fn test_sort_order_from_query() {
        assert_eq!(SortOrder::from_query(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::from_query(Some("desc")), SortOrder::Desc);
        assert_eq!(SortOrder::from_query(Some("bogus")), SortOrder::Desc);
        assert_eq!(SortOrder::from_query(None), SortOrder::Desc);
    }
}
