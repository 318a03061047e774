//! 監視対象サーバーの型定義

use serde::Deserialize;

/// 監視対象のLLM推論サーバー
///
/// YAML設定ファイルから読み込まれ、プロセス生存中は不変。
/// `container_name` が設定されている場合のみ、プローブ失敗時に
/// コンテナ再起動を試みる。
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Target {
    /// チャット補完エンドポイントのURL
    pub url: String,
    /// 合成リクエストで指定するモデル名
    pub model: String,
    /// 再起動対象のコンテナ名（省略時は再起動しない）
    #[serde(default)]
    pub container_name: Option<String>,
}

impl Target {
    /// 再起動可能なターゲットかどうか
    ///
    /// 空文字列のコンテナ名は未設定と同じ扱いにする。
    pub fn restart_handle(&self) -> Option<&str> {
        self.container_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }
}
