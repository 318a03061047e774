//! 型定義

/// 監視対象サーバー
pub mod target;

/// クラッシュ・再起動イベント
pub mod event;

pub use event::{CrashEvent, FailureKind, RestartEvent, RestartStatus};
pub use target::Target;
