//! InnerTube経由のYouTubeライブチャットセッション

use super::{ChatError, ChatItem, ChatSession, ChatSessionFactory};
use crate::api::innertube::get_live_chat::get_next_continuation;
use crate::api::innertube::{
    fetch_live_chat_messages, fetch_live_chat_page, FetchError, HttpSettings, InnerTube,
};
use crate::api::youtube::{Continuation, VideoId};
use async_trait::async_trait;
use tokio::time::{Duration, Instant};

/// YouTubeが指定するポーリング間隔の上限
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// 指定がない場合のポーリング間隔
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// この回数連続で403/404が返ったら配信終了とみなす
const MAX_CONSECUTIVE_FORBIDDEN: u32 = 5;

/// `YouTubeChatFactory::create` が返すセッション
#[derive(Debug)]
pub struct InnerTubeSession {
    inner_tube: InnerTube,
    continuation: Option<Continuation>,
    next_fetch_at: Instant,
    /// 取得失敗後、次のリクエストまで空ける時間
    error_retry_interval: Duration,
    consecutive_forbidden: u32,
}

impl InnerTubeSession {
    pub fn new(inner_tube: InnerTube) -> Self {
        // アーカイブはライブではないので最初から終了扱い
        let continuation = if inner_tube.is_replay {
            None
        } else {
            inner_tube.continuation.clone()
        };
        Self {
            inner_tube,
            continuation,
            next_fetch_at: Instant::now(),
            error_retry_interval: MAX_POLL_INTERVAL,
            consecutive_forbidden: 0,
        }
    }

    fn end(&mut self, reason: &str) {
        if self.continuation.take().is_some() {
            tracing::info!(
                "🏁 Live chat for {} ended: {}",
                self.inner_tube.video_id,
                reason
            );
        }
    }
}

/// Poll interval requested by the continuation data, capped.
fn requested_interval(continuations: &[serde_json::Value]) -> Duration {
    continuations
        .first()
        .and_then(|v| {
            v.get("invalidationContinuationData")
                .or_else(|| v.get("timedContinuationData"))
        })
        .and_then(|v| v.get("timeoutMs"))
        .and_then(|v| v.as_u64())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_POLL_INTERVAL)
        .min(MAX_POLL_INTERVAL)
}

#[async_trait]
impl ChatSession for InnerTubeSession {
    fn is_alive(&self) -> bool {
        self.continuation.is_some()
    }

    async fn next_batch(&mut self) -> Result<Vec<ChatItem>, ChatError> {
        let continuation = self.continuation.clone().ok_or(ChatError::Closed)?;

        tokio::time::sleep_until(self.next_fetch_at).await;

        let response = match fetch_live_chat_messages(&self.inner_tube, &continuation).await {
            Ok(response) => response,
            Err(FetchError::Status(status))
                if status == reqwest::StatusCode::FORBIDDEN
                    || status == reqwest::StatusCode::NOT_FOUND =>
            {
                self.consecutive_forbidden += 1;
                self.next_fetch_at = Instant::now() + self.error_retry_interval;
                if self.consecutive_forbidden >= MAX_CONSECUTIVE_FORBIDDEN {
                    let reason =
                        format!("{} consecutive {} responses", self.consecutive_forbidden, status);
                    self.end(&reason);
                }
                return Err(FetchError::Status(status).into());
            }
            Err(e) => {
                self.next_fetch_at = Instant::now() + self.error_retry_interval;
                return Err(e.into());
            }
        };
        self.consecutive_forbidden = 0;

        let interval = response
            .continuation_contents
            .as_ref()
            .map(|c| requested_interval(&c.live_chat_continuation.continuations))
            .unwrap_or(DEFAULT_POLL_INTERVAL);
        self.next_fetch_at = Instant::now() + interval;

        let items: Vec<ChatItem> = response
            .text_messages()
            .map(|renderer| ChatItem {
                author: renderer.author_name.as_ref().map(|a| a.simple_text.clone()),
                message: renderer.message.to_plain_text(),
            })
            .collect();

        match get_next_continuation(&response) {
            Some(next) => self.continuation = Some(next),
            None => self.end("no continuation in response"),
        }

        tracing::debug!("📨 Received {} chat messages", items.len());
        Ok(items)
    }
}

/// InnerTubeセッションを生成するファクトリ
#[derive(Debug, Clone)]
pub struct YouTubeChatFactory {
    http_client: reqwest::Client,
    base_url: String,
}

impl YouTubeChatFactory {
    pub fn new(settings: &HttpSettings) -> Result<Self, FetchError> {
        Ok(Self {
            http_client: settings.build_client()?,
            base_url: settings.base_url.clone(),
        })
    }
}

#[async_trait]
impl ChatSessionFactory for YouTubeChatFactory {
    async fn create(&self, video_id: &VideoId) -> Result<Box<dyn ChatSession>, ChatError> {
        let inner_tube = fetch_live_chat_page(video_id, &self.http_client, &self.base_url).await?;
        Ok(Box::new(InnerTubeSession::new(inner_tube)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::youtube::{ApiKey, ClientVersion};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use warp::http::StatusCode;
    use warp::Filter;

    const LIVE_PAGE: &str = r#"<script>ytcfg.set({"INNERTUBE_API_KEY": "test_key", "INNERTUBE_CLIENT_VERSION": "2.20240101", "hl": "ja", "gl": "JP"});
        window["ytInitialData"] = {"continuation": "c1"};</script>"#;
    const REPLAY_PAGE: &str = r#"<script>ytcfg.set({"INNERTUBE_API_KEY": "test_key", "INNERTUBE_CLIENT_VERSION": "2.20240101"});
        window["ytInitialData"] = {"continuation": "c1", "isReplay": true};</script>"#;

    type Responder = Arc<dyn Fn(&str) -> (StatusCode, serde_json::Value) + Send + Sync>;

    /// ローカルに立てたYouTube互換サーバー
    struct MockYouTube {
        base_url: String,
        /// get_live_chatが受け取ったcontinuationの履歴
        tokens: Arc<Mutex<Vec<String>>>,
    }

    fn serve_mock(page: &'static str, respond: Responder) -> MockYouTube {
        let tokens = Arc::new(Mutex::new(Vec::new()));
        let recorded = tokens.clone();

        let page_route = warp::get()
            .and(warp::path("live_chat"))
            .and(warp::path::end())
            .map(move || warp::reply::html(page));
        let chat_route = warp::post()
            .and(warp::path!("youtubei" / "v1" / "live_chat" / "get_live_chat"))
            .and(warp::body::json())
            .map(move |body: serde_json::Value| {
                let token = body["continuation"].as_str().unwrap_or_default().to_string();
                recorded.lock().push(token.clone());
                let (status, json) = respond(&token);
                warp::reply::with_status(warp::reply::json(&json), status)
            });

        let (addr, server) =
            warp::serve(page_route.or(chat_route)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        MockYouTube {
            base_url: format!("http://{}", addr),
            tokens,
        }
    }

    fn settings(base_url: &str) -> HttpSettings {
        HttpSettings {
            base_url: base_url.to_string(),
            ..HttpSettings::default()
        }
    }

    fn chat_response(next: &str, message: &str) -> serde_json::Value {
        serde_json::json!({
            "continuationContents": {
                "liveChatContinuation": {
                    "continuations": [
                        {"timedContinuationData": {"continuation": next, "timeoutMs": 0}}
                    ],
                    "actions": [
                        {"addChatItemAction": {"item": {"liveChatTextMessageRenderer": {
                            "id": "m1",
                            "message": {"runs": [{"text": message}]},
                            "authorName": {"simpleText": "viewer1"}
                        }}}}
                    ]
                }
            }
        })
    }

    fn inner_tube(is_replay: bool, continuation: Option<&str>) -> InnerTube {
        InnerTube {
            video_id: VideoId::new("test_video"),
            api_key: ApiKey::new("test_key".to_string()),
            is_replay,
            client_version: ClientVersion::new("2.0".to_string()),
            gl: "JP".to_string(),
            hl: "ja".to_string(),
            continuation: continuation.map(|c| Continuation(c.to_string())),
            base_url: "http://127.0.0.1:9".to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    #[tokio::test]
    async fn test_session_alive_with_continuation() {
        let session = InnerTubeSession::new(inner_tube(false, Some("token")));
        assert!(session.is_alive());
    }

    #[tokio::test]
    async fn test_session_without_continuation_is_not_alive() {
        let session = InnerTubeSession::new(inner_tube(false, None));
        assert!(!session.is_alive());
    }

    #[tokio::test]
    async fn test_replay_is_not_alive() {
        let session = InnerTubeSession::new(inner_tube(true, Some("token")));
        assert!(!session.is_alive());
    }

    #[tokio::test]
    async fn test_closed_session_returns_error() {
        let mut session = InnerTubeSession::new(inner_tube(false, None));
        let result = session.next_batch().await;
        assert!(matches!(result, Err(ChatError::Closed)));
    }

    #[tokio::test]
    async fn test_batches_advance_continuation_until_chat_ends() {
        let mock = serve_mock(
            LIVE_PAGE,
            Arc::new(|token: &str| match token {
                "c1" => (StatusCode::OK, chat_response("c2", "Bob")),
                _ => (StatusCode::OK, serde_json::json!({})),
            }),
        );
        let factory = YouTubeChatFactory::new(&settings(&mock.base_url)).unwrap();

        let mut session = factory.create(&VideoId::new("live")).await.unwrap();
        assert!(session.is_alive());

        let items = session.next_batch().await.unwrap();
        assert_eq!(
            items,
            vec![ChatItem {
                author: Some("viewer1".to_string()),
                message: "Bob".to_string(),
            }]
        );
        assert!(session.is_alive());

        // continuationのない応答で配信終了
        let items = session.next_batch().await.unwrap();
        assert!(items.is_empty());
        assert!(!session.is_alive());
        assert!(matches!(session.next_batch().await, Err(ChatError::Closed)));

        assert_eq!(mock.tokens.lock().as_slice(), &["c1", "c2"]);
    }

    #[tokio::test]
    async fn test_replay_page_creates_dead_session() {
        let mock = serve_mock(
            REPLAY_PAGE,
            Arc::new(|_: &str| (StatusCode::OK, serde_json::json!({}))),
        );
        let factory = YouTubeChatFactory::new(&settings(&mock.base_url)).unwrap();

        let session = factory.create(&VideoId::new("archived")).await.unwrap();
        assert!(!session.is_alive());
        assert!(mock.tokens.lock().is_empty());
    }

    #[tokio::test]
    async fn test_consecutive_forbidden_ends_session() {
        let mock = serve_mock(
            LIVE_PAGE,
            Arc::new(|_: &str| (StatusCode::FORBIDDEN, serde_json::json!({}))),
        );
        let client = reqwest::Client::new();
        let inner_tube = fetch_live_chat_page(&VideoId::new("live"), &client, &mock.base_url)
            .await
            .unwrap();
        let mut session = InnerTubeSession::new(inner_tube);
        session.error_retry_interval = Duration::ZERO;

        for attempt in 1..=MAX_CONSECUTIVE_FORBIDDEN {
            let result = session.next_batch().await;
            assert!(matches!(
                result,
                Err(ChatError::Fetch(FetchError::Status(status)))
                    if status == reqwest::StatusCode::FORBIDDEN
            ));
            assert_eq!(session.is_alive(), attempt < MAX_CONSECUTIVE_FORBIDDEN);
        }

        // 終了後はリクエストしない
        assert!(matches!(session.next_batch().await, Err(ChatError::Closed)));
        assert_eq!(mock.tokens.lock().len(), MAX_CONSECUTIVE_FORBIDDEN as usize);
    }

    #[tokio::test]
    async fn test_successful_batch_resets_forbidden_count() {
        let calls = Arc::new(Mutex::new(0u32));
        let counter = calls.clone();
        let mock = serve_mock(
            LIVE_PAGE,
            Arc::new(move |_: &str| {
                let mut calls = counter.lock();
                *calls += 1;
                // 4回失敗、1回成功、その後4回失敗
                if *calls == 5 {
                    (StatusCode::OK, chat_response("c1", "hi"))
                } else {
                    (StatusCode::NOT_FOUND, serde_json::json!({}))
                }
            }),
        );
        let client = reqwest::Client::new();
        let inner_tube = fetch_live_chat_page(&VideoId::new("live"), &client, &mock.base_url)
            .await
            .unwrap();
        let mut session = InnerTubeSession::new(inner_tube);
        session.error_retry_interval = Duration::ZERO;

        for _ in 0..9 {
            let _ = session.next_batch().await;
        }
        assert!(session.is_alive());
        assert_eq!(*calls.lock(), 9);
    }

    #[test]
    fn test_requested_interval() {
        let data = vec![serde_json::json!({
            "timedContinuationData": {"continuation": "x", "timeoutMs": 2500}
        })];
        assert_eq!(requested_interval(&data), Duration::from_millis(2500));

        let data = vec![serde_json::json!({
            "invalidationContinuationData": {"continuation": "x", "timeoutMs": 60000}
        })];
        assert_eq!(requested_interval(&data), MAX_POLL_INTERVAL);

        assert_eq!(requested_interval(&[]), DEFAULT_POLL_INTERVAL);
    }
}
