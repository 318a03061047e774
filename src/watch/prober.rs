//! プローバー
//!
//! ターゲットに合成チャットリクエストを1回送信し、結果を分類する。
//!
//! タイムアウトは二層構造:
//! - 接続確立は固定5秒、応答待ちは設定されたタイムアウト
//! - リクエスト全体は `タイムアウト+5秒` の絶対デッドラインで必ず終了する

use crate::types::Target;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// 接続確立のタイムアウト（秒）
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// 絶対デッドラインの猶予（秒）
const DEADLINE_GRACE_SECS: u64 = 5;

/// 合成リクエストの固定プロンプト
///
/// 応答を引き出すためだけの使い捨て内容で、応答の正しさは検証しない。
const PROBE_PROMPT: &str =
    "Reply with a JSON object whose \"status\" field is true. JSON only, no explanation.";

/// プローブ結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 200応答を受信
    Ok,
    /// デッドライン内のトランスポート失敗（接続拒否、DNS失敗、下位タイムアウト等）
    TransportTimeout,
    /// 絶対デッドライン超過
    ModelTimeout,
    /// 非200のHTTP応答
    HttpError(StatusCode),
}

/// プローバー
#[derive(Clone)]
pub struct Prober {
    /// HTTPクライアント（接続タイムアウトのみ設定）
    client: Client,
    /// 応答待ちタイムアウト
    response_timeout: Duration,
    /// 絶対デッドライン
    overall_deadline: Duration,
}

impl Prober {
    /// 新しいプローバーを作成
    pub fn new(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            response_timeout: Duration::from_secs(timeout_secs),
            overall_deadline: Duration::from_secs(timeout_secs.saturating_add(DEADLINE_GRACE_SECS)),
        }
    }

    /// タイムアウトを個別に設定する
    ///
    /// 通常は `new` の導出値（応答待ち=設定値、絶対デッドライン=設定値+5秒）
    /// で十分。下位タイムアウトとデッドラインの関係を検証するテストや
    /// チューニング用。
    pub fn with_deadlines(mut self, response_timeout: Duration, overall_deadline: Duration) -> Self {
        self.response_timeout = response_timeout;
        self.overall_deadline = overall_deadline;
        self
    }

    /// ターゲットを1回プローブする
    ///
    /// ネットワーク呼び出し以外の副作用はない。失敗の記録は呼び出し側が行う。
    pub async fn probe(&self, target: &Target) -> ProbeOutcome {
        let payload = json!({
            "model": target.model,
            "messages": [
                { "role": "user", "content": PROBE_PROMPT }
            ]
        });

        let request = self
            .client
            .post(&target.url)
            .json(&payload)
            .timeout(self.response_timeout)
            .send();

        match tokio::time::timeout(self.overall_deadline, request).await {
            // 絶対デッドライン超過。下位タイムアウトが発火しなかった場合でも
            // ここで必ず終了する。
            Err(_) => ProbeOutcome::ModelTimeout,
            Ok(Err(err)) => {
                debug!(url = %target.url, error = %err, "Probe transport failure");
                ProbeOutcome::TransportTimeout
            }
            Ok(Ok(response)) => {
                let status = response.status();
                if status == StatusCode::OK {
                    ProbeOutcome::Ok
                } else {
                    ProbeOutcome::HttpError(status)
                }
            }
        }
    }
}
