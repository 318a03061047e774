//! イベント型定義
//!
//! プローブ失敗とコンテナ再起動の2種類のイベントを扱う。
//! どちらも追記専用で、作成後に変更されることはない。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// プローブ失敗の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 接続確立・応答ヘッダー待ちでの失敗（接続拒否、DNS失敗、下位タイムアウト等）
    #[default]
    TransportTimeout,
    /// 絶対デッドライン（タイムアウト+5秒）超過
    ModelTimeout,
}

impl FailureKind {
    /// DB格納用の文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::TransportTimeout => "transport_timeout",
            FailureKind::ModelTimeout => "model_timeout",
        }
    }
}

impl FromStr for FailureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transport_timeout" => Ok(FailureKind::TransportTimeout),
            "model_timeout" => Ok(FailureKind::ModelTimeout),
            other => Err(format!("unknown failure kind: {}", other)),
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 再起動試行の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RestartStatus {
    /// 再起動成功
    Success,
    /// 再起動失敗（`error_message` に詳細を保持）
    #[default]
    Fail,
}

impl RestartStatus {
    /// DB格納用の文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            RestartStatus::Success => "success",
            RestartStatus::Fail => "fail",
        }
    }
}

impl FromStr for RestartStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(RestartStatus::Success),
            "fail" => Ok(RestartStatus::Fail),
            other => Err(format!("unknown restart status: {}", other)),
        }
    }
}

impl fmt::Display for RestartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// プローブ失敗イベント
///
/// プローブが失敗するたびにProberが1件作成する。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrashEvent {
    /// 失敗を検知した時刻
    pub timestamp: DateTime<Utc>,
    /// 対象サーバーのURL
    pub url: String,
    /// 対象モデル名
    pub model: String,
    /// 失敗の分類
    pub crash_type: FailureKind,
}

impl CrashEvent {
    /// 現在時刻でイベントを作成する
    pub fn now(url: &str, model: &str, crash_type: FailureKind) -> Self {
        Self {
            timestamp: Utc::now(),
            url: url.to_string(),
            model: model.to_string(),
            crash_type,
        }
    }
}

/// コンテナ再起動イベント
///
/// 再起動を試行するたびにRecovery側が正確に1件作成する。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestartEvent {
    /// 再起動を試行した時刻
    pub timestamp: DateTime<Utc>,
    /// 再起動対象のコンテナ名
    pub container_name: String,
    /// 対象サーバーのURL
    pub url: String,
    /// 対象モデル名
    pub model: String,
    /// 試行結果
    pub status: RestartStatus,
    /// 失敗時のエラー詳細（`status = fail` の場合のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
