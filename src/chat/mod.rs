//! ライブチャット取得の抽象化
//!
//! 取り込みループはこのトレイト越しにチャットへアクセスするため、
//! テストでは偽のセッションを差し込める。

pub mod youtube;

use crate::api::innertube::FetchError;
use crate::api::youtube::VideoId;
use async_trait::async_trait;

pub use youtube::{InnerTubeSession, YouTubeChatFactory};

/// チャット取得エラー
#[derive(thiserror::Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Chat session closed")]
    Closed,
}

/// チャット1件分（本文のみが取り込み対象）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatItem {
    /// ログ表示用。匿名・削除済みの投稿者は `None`
    pub author: Option<String>,
    pub message: String,
}

impl ChatItem {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            author: None,
            message: message.into(),
        }
    }
}

/// 1本の動画に対するチャットセッション
#[async_trait]
pub trait ChatSession: Send {
    /// セッションがまだライブかどうか
    fn is_alive(&self) -> bool;

    /// 次のチャットバッチを取得（空の場合もある）
    async fn next_batch(&mut self) -> Result<Vec<ChatItem>, ChatError>;
}

/// 動画IDからチャットセッションを生成する
#[async_trait]
pub trait ChatSessionFactory: Send + Sync {
    async fn create(&self, video_id: &VideoId) -> Result<Box<dyn ChatSession>, ChatError>;
}
