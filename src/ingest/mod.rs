//! チャットから名前を取り込むループ

pub mod filter;
pub mod ingestor;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use filter::{is_name_candidate, name_candidate, MAX_NAME_CHARS};
pub use ingestor::{IngestError, IngestState, NameIngestor, PollingState};

/// 取り込みループの待機時間（秒）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// 起動直後に動画IDの設定を待つ間隔
    pub startup_poll_secs: u64,
    /// 動画ID未設定時の確認間隔
    pub video_id_poll_secs: u64,
    /// セッション生成失敗・非ライブ判定後の待機
    pub reconnect_delay_secs: u64,
    /// 名前を1件採用するごとの待機
    pub accept_pause_secs: u64,
    /// この時間採用がなければランダム名を投入
    pub idle_timeout_secs: u64,
    /// アイドル判定後の待機
    pub idle_pause_secs: u64,
    /// 取得エラー時の待機
    pub error_backoff_secs: u64,
    /// 名前として受け付ける最大文字数
    pub max_name_chars: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            startup_poll_secs: 2,
            video_id_poll_secs: 3,
            reconnect_delay_secs: 3,
            accept_pause_secs: 10,
            idle_timeout_secs: 15,
            idle_pause_secs: 10,
            error_backoff_secs: 5,
            max_name_chars: MAX_NAME_CHARS,
        }
    }
}

impl IngestConfig {
    pub fn startup_poll(&self) -> Duration {
        Duration::from_secs(self.startup_poll_secs)
    }

    pub fn video_id_poll(&self) -> Duration {
        Duration::from_secs(self.video_id_poll_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn accept_pause(&self) -> Duration {
        Duration::from_secs(self.accept_pause_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn idle_pause(&self) -> Duration {
        Duration::from_secs(self.idle_pause_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }
}
