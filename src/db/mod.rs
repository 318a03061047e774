//! データベースアクセス層
//!
//! SQLiteベースのイベント永続化

/// イベントストレージ
pub mod events;

pub use events::{EventStore, SortOrder};
