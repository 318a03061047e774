//! コンテナ再起動アクション
//!
//! プローブ失敗時に呼び出される外部プロセス再起動の抽象。
//! 本番実装は `docker restart <name>` を実行する。

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// 再起動アクションのエラー
#[derive(Debug, Error)]
pub enum RestartError {
    /// コマンドの起動自体に失敗（dockerバイナリ未検出等）
    #[error("Failed to spawn restart command: {0}")]
    Spawn(#[from] std::io::Error),

    /// コマンドが非ゼロ終了
    #[error("Restart command failed ({status}): {stderr}")]
    Command {
        /// 終了ステータス
        status: std::process::ExitStatus,
        /// 標準エラー出力（トリム済み）
        stderr: String,
    },
}

/// プロセス再起動アクション
///
/// 1回の呼び出しで1回だけ再起動を試みる。リトライは呼び出し側でも
/// 行わない（再起動の失敗は記録されるだけで再試行されない）。
#[async_trait]
pub trait ProcessRestarter: Send + Sync {
    /// 指定ハンドルのプロセスを再起動する
    async fn restart(&self, container_name: &str) -> Result<(), RestartError>;
}

/// `docker restart` による再起動
pub struct DockerRestarter;

#[async_trait]
impl ProcessRestarter for DockerRestarter {
    async fn restart(&self, container_name: &str) -> Result<(), RestartError> {
        debug!(container_name, "Running docker restart");

        let output = tokio::process::Command::new("docker")
            .args(["restart", container_name])
            .output()
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(RestartError::Command {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// テスト用の再起動アクション
    ///
    /// 呼び出されたコンテナ名を記録し、設定された結果を返す。
    pub struct MockRestarter {
        /// 記録された呼び出し
        pub calls: Arc<Mutex<Vec<String>>>,
        fail_with: Option<String>,
    }

    impl MockRestarter {
        pub fn succeeding() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                fail_with: None,
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                fail_with: Some(message.to_string()),
            }
        }
    }

    #[async_trait]
    impl ProcessRestarter for MockRestarter {
        async fn restart(&self, container_name: &str) -> Result<(), RestartError> {
            self.calls.lock().await.push(container_name.to_string());
            match &self.fail_with {
                None => Ok(()),
                Some(message) => Err(RestartError::Spawn(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    message.clone(),
                ))),
            }
        }
    }
}
