//! サーバー監視
//!
//! 定期的に全ターゲットへ合成チャットリクエストを送信し、
//! 失敗を記録してコンテナ再起動を試みる。

/// プローブ実行と失敗分類
pub mod prober;

/// 失敗時のリカバリー処理
pub mod recovery;

pub use prober::{ProbeOutcome, Prober};

use crate::db::EventStore;
use crate::restart::ProcessRestarter;
use crate::types::{FailureKind, Target};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// デフォルトのチェック間隔（秒）
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 1800;

/// サーバーウォッチャー
///
/// 起動直後に1巡、以後は固定間隔で1巡、全ターゲットを並列にプローブする。
/// 各巡回はプローブの完了を待たずにスケジュールされるため、
/// 遅いプローブが残っていても次の巡回と並行して実行される。
#[derive(Clone)]
pub struct ServerWatcher {
    /// 監視対象（ロード後は不変）
    targets: Arc<Vec<Target>>,
    /// プローバー
    prober: Prober,
    /// 再起動アクション
    restarter: Arc<dyn ProcessRestarter>,
    /// イベントストレージ
    store: EventStore,
    /// チェック間隔（秒）
    interval_secs: u64,
    /// 同時プローブ数の上限（Noneで無制限）
    probe_limit: Option<Arc<Semaphore>>,
}

impl ServerWatcher {
    /// 新しいウォッチャーを作成
    ///
    /// `timeout_secs` は全ターゲット共通の応答待ちタイムアウト。
    pub fn new(
        targets: Vec<Target>,
        store: EventStore,
        timeout_secs: u64,
        restarter: Arc<dyn ProcessRestarter>,
    ) -> Self {
        Self {
            targets: Arc::new(targets),
            prober: Prober::new(timeout_secs),
            restarter,
            store,
            interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            probe_limit: None,
        }
    }

    /// チェック間隔を設定
    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    /// 同時プローブ数の上限を設定（0で無制限）
    ///
    /// デフォルトは無制限。上限を設けてもプローブが破棄されることはなく、
    /// 順番待ちになるだけで巡回契約は変わらない。
    pub fn with_max_concurrent_probes(mut self, limit: usize) -> Self {
        self.probe_limit = if limit == 0 {
            None
        } else {
            Some(Arc::new(Semaphore::new(limit)))
        };
        self
    }

    /// バックグラウンドで監視を開始
    pub fn start(self) {
        tokio::spawn(async move {
            // 起動直後に1巡目を実行し、状態を早期に反映する
            self.dispatch_round();
            self.monitor_loop().await;
        });
    }

    /// 監視ループ
    async fn monitor_loop(&self) {
        let mut timer = interval(Duration::from_secs(self.interval_secs));

        info!(
            interval_secs = self.interval_secs,
            targets = self.targets.len(),
            "Server watcher started"
        );

        // `interval()` ticks immediately on the first call. The initial round
        // was already dispatched, so consume the first tick before looping.
        timer.tick().await;

        loop {
            timer.tick().await;
            self.dispatch_round();
        }
    }

    /// 1巡分のプローブを起動する
    ///
    /// ターゲットごとに独立タスクを起動し、完了は待たない。
    pub fn dispatch_round(&self) {
        debug!(count = self.targets.len(), "Dispatching probe round");

        for target in self.targets.iter().cloned() {
            let watcher = self.clone();
            tokio::spawn(async move {
                watcher.check_target(&target).await;
            });
        }
    }

    /// 単一ターゲットのプローブと失敗処理
    pub async fn check_target(&self, target: &Target) {
        let _permit = match self.probe_limit.as_ref() {
            Some(limit) => limit.clone().acquire_owned().await.ok(),
            None => None,
        };

        match self.prober.probe(target).await {
            ProbeOutcome::Ok => {
                debug!(url = %target.url, model = %target.model, "Probe succeeded");
            }
            ProbeOutcome::HttpError(status) => {
                // 非200応答はログのみで、クラッシュイベントにはしない。
                // 接続レベル・タイムアウト失敗だけがリカバリーの対象。
                warn!(
                    url = %target.url,
                    model = %target.model,
                    status = %status,
                    "Server returned non-200 status"
                );
            }
            ProbeOutcome::TransportTimeout => {
                self.on_failure(target, FailureKind::TransportTimeout).await;
            }
            ProbeOutcome::ModelTimeout => {
                self.on_failure(target, FailureKind::ModelTimeout).await;
            }
        }
    }

    async fn on_failure(&self, target: &Target, kind: FailureKind) {
        recovery::handle_failure(&self.store, self.restarter.as_ref(), target, kind).await;
    }
}
