//! 名前取り込みの状態機械
//!
//! `AwaitingVideoId → Connecting → Polling ⇄ (アイドル時フォールバック) → SessionEnded`
//! を永久に繰り返す。`step()` は1遷移だけを実行するので、各遷移を個別に検証できる。
//! 待機はすべて `tokio::time` を使うため、テストでは時計を止めて進められる。

use super::filter::name_candidate_with_limit;
use super::IngestConfig;
use crate::api::youtube::VideoId;
use crate::chat::{ChatError, ChatItem, ChatSession, ChatSessionFactory};
use crate::store::{NameListStore, StoreError, VideoIdStore};
use rand::seq::SliceRandom;
use std::fmt;
use std::sync::Arc;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

/// ポーリング中のエラー（いずれも一時的なものとして扱う）
#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("chat fetch failed: {0}")]
    Chat(#[from] ChatError),
    #[error("name list update failed: {0}")]
    Store(#[from] StoreError),
}

/// ライブ中のセッションと最終採用時刻
pub struct PollingState {
    pub video_id: VideoId,
    pub session: Box<dyn ChatSession>,
    pub last_accepted: Instant,
}

/// 取り込みループの状態
pub enum IngestState {
    /// 動画IDの設定待ち
    AwaitingVideoId,
    /// セッション生成とライブ判定
    Connecting(VideoId),
    /// チャット取得中
    Polling(PollingState),
    /// セッションが終了した
    SessionEnded,
}

impl IngestState {
    pub fn name(&self) -> &'static str {
        match self {
            IngestState::AwaitingVideoId => "AwaitingVideoId",
            IngestState::Connecting(_) => "Connecting",
            IngestState::Polling(_) => "Polling",
            IngestState::SessionEnded => "SessionEnded",
        }
    }
}

impl fmt::Debug for IngestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestState::Connecting(video_id) => write!(f, "Connecting({})", video_id),
            IngestState::Polling(polling) => write!(f, "Polling({})", polling.video_id),
            other => f.write_str(other.name()),
        }
    }
}

/// チャットから名前リストへ取り込むループ本体
#[derive(Clone)]
pub struct NameIngestor {
    factory: Arc<dyn ChatSessionFactory>,
    video_ids: Arc<dyn VideoIdStore>,
    names: Arc<dyn NameListStore>,
    config: IngestConfig,
}

impl NameIngestor {
    pub fn new(
        factory: Arc<dyn ChatSessionFactory>,
        video_ids: Arc<dyn VideoIdStore>,
        names: Arc<dyn NameListStore>,
        config: IngestConfig,
    ) -> Self {
        Self {
            factory,
            video_ids,
            names,
            config,
        }
    }

    /// 起動時、動画IDが設定されるまでブロックする
    pub async fn wait_for_video_id(&self) -> VideoId {
        loop {
            if let Some(video_id) = self.video_ids.get_video_id() {
                return video_id;
            }
            info!("⏳ Waiting for a video ID via /set_video_id ...");
            sleep(self.config.startup_poll()).await;
        }
    }

    /// 永久に状態遷移を繰り返す
    pub async fn run(&self) {
        info!("🚀 Starting YouTube chat polling loop");
        let mut state = IngestState::AwaitingVideoId;
        loop {
            state = self.step(state).await;
        }
    }

    /// 1遷移分を実行して次の状態を返す
    pub async fn step(&self, state: IngestState) -> IngestState {
        match state {
            IngestState::AwaitingVideoId => self.await_video_id().await,
            IngestState::Connecting(video_id) => self.connect(video_id).await,
            IngestState::Polling(polling) => self.poll(polling).await,
            IngestState::SessionEnded => {
                info!("🔁 Returning to the start of the polling loop");
                IngestState::AwaitingVideoId
            }
        }
    }

    async fn await_video_id(&self) -> IngestState {
        match self.video_ids.get_video_id() {
            Some(video_id) => IngestState::Connecting(video_id),
            None => {
                debug!("⏳ No video ID configured yet");
                sleep(self.config.video_id_poll()).await;
                IngestState::AwaitingVideoId
            }
        }
    }

    async fn connect(&self, video_id: VideoId) -> IngestState {
        info!("▶️ Starting chat polling for video: {}", video_id);

        let session = match self.factory.create(&video_id).await {
            Ok(session) => session,
            Err(e) => {
                error!("❌ Failed to create chat session for {}: {}", video_id, e);
                sleep(self.config.reconnect_delay()).await;
                return IngestState::AwaitingVideoId;
            }
        };

        if !session.is_alive() {
            warn!(
                "❌ Chat for {} is not live (not streaming or wrong ID)",
                video_id
            );
            match self.video_ids.clear_video_id_if(&video_id) {
                Ok(true) => info!("🗑️ Video ID removed, waiting for a new one"),
                Ok(false) => debug!("Video ID changed meanwhile, keeping the new one"),
                Err(e) => error!("❌ Failed to clear video ID {}: {}", video_id, e),
            }
            sleep(self.config.reconnect_delay()).await;
            return IngestState::AwaitingVideoId;
        }

        IngestState::Polling(PollingState {
            video_id,
            session,
            last_accepted: Instant::now(),
        })
    }

    async fn poll(&self, mut polling: PollingState) -> IngestState {
        if !polling.session.is_alive() {
            info!("🏁 Chat session for {} is no longer alive", polling.video_id);
            return IngestState::SessionEnded;
        }

        debug!("💤 Polling active, waiting for messages...");
        if let Err(e) = self.poll_batch(&mut polling).await {
            error!("❌ Error while polling chat: {}", e);
            sleep(self.config.error_backoff()).await;
        }
        IngestState::Polling(polling)
    }

    /// 1バッチ取得して名前候補を取り込み、必要ならフォールバック名を投入する
    async fn poll_batch(&self, polling: &mut PollingState) -> Result<(), IngestError> {
        let items = polling.session.next_batch().await?;
        let found_chat = self.drain_batch(polling, &items).await?;

        if !found_chat && polling.last_accepted.elapsed() >= self.config.idle_timeout() {
            if let Some(name) = self.pick_random_name() {
                info!("🔄 Using random name: {}", name);
                self.names.add_name(&name)?;
                polling.last_accepted = Instant::now();
            }
            sleep(self.config.idle_pause()).await;
        }
        Ok(())
    }

    async fn drain_batch(
        &self,
        polling: &mut PollingState,
        items: &[ChatItem],
    ) -> Result<bool, IngestError> {
        let mut found_chat = false;
        for item in items {
            match name_candidate_with_limit(&item.message, self.config.max_name_chars) {
                Some(name) => {
                    info!("✅ Saved from chat: {} ({})", name, author_label(item));
                    self.names.add_name(name)?;
                    found_chat = true;
                    polling.last_accepted = Instant::now();
                    sleep(self.config.accept_pause()).await;
                }
                None => debug!("❌ Ignored: {} ({})", item.message.trim(), author_label(item)),
            }
        }
        Ok(found_chat)
    }

    fn pick_random_name(&self) -> Option<String> {
        let pool = self.names.random_names();
        pool.choose(&mut rand::thread_rng()).cloned()
    }
}

fn author_label(item: &ChatItem) -> &str {
    item.author.as_deref().unwrap_or("anonymous")
}
