pub mod get_live_chat;

use crate::api::innertube::get_live_chat::GetLiveChatResponse;
use crate::api::youtube::{ApiKey, ClientVersion, Continuation, VideoId};
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP request failed with status: {0}")]
    Status(reqwest::StatusCode),
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0} not found in live chat page")]
    MissingField(&'static str),
}

/// HTTP settings shared by every InnerTube request.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Scheme and host every InnerTube URL is built on
    pub base_url: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl HttpSettings {
    /// Build a client whose every request is bounded by `request_timeout`.
    pub fn build_client(&self) -> Result<reqwest::Client, FetchError> {
        Ok(reqwest::Client::builder()
            .timeout(self.request_timeout)
            .user_agent(self.user_agent.clone())
            .build()?)
    }
}

/// Connection state for one video's live chat.
#[derive(Debug, Clone)]
pub struct InnerTube {
    pub video_id: VideoId,
    pub api_key: ApiKey,
    pub is_replay: bool,
    pub client_version: ClientVersion,
    pub gl: String,
    pub hl: String,
    /// `None` when the page offered no chat to follow
    pub continuation: Option<Continuation>,
    pub base_url: String,
    pub http_client: reqwest::Client,
}

/// Fetch the popout live chat page and extract what later requests need.
///
/// A page without a continuation token still yields an `InnerTube`; callers
/// treat it as a chat that is not live.
pub async fn fetch_live_chat_page(
    video_id: &VideoId,
    http_client: &reqwest::Client,
    base_url: &str,
) -> Result<InnerTube, FetchError> {
    let base_url = base_url.trim_end_matches('/');
    let url = video_id.live_chat_url(base_url);
    tracing::info!("🌐 Fetching live chat page from URL: {}", url);

    let response = http_client.get(&url).send().await.map_err(|e| {
        tracing::error!("❌ Failed to fetch URL: {}", e);
        e
    })?;

    let status = response.status();
    tracing::debug!("📄 Received HTTP response with status: {}", status);
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let html = response.text().await?;
    tracing::debug!("📄 HTML response length: {} chars", html.len());

    let api_key =
        crate::api::youtube::extract_api_key(&html).ok_or(FetchError::MissingField("api_key"))?;
    let client_version = crate::api::youtube::extract_client_version(&html)
        .ok_or(FetchError::MissingField("client_version"))?;
    let continuation = crate::api::youtube::extract_continuation(&html);
    if continuation.is_none() {
        tracing::warn!("⚠️ No continuation token for video {}", video_id);
    }

    let inner_tube = InnerTube {
        video_id: video_id.clone(),
        api_key,
        is_replay: crate::api::youtube::extract_replay(&html),
        client_version,
        gl: crate::api::youtube::extract_gl(&html).unwrap_or_else(|| "US".to_string()),
        hl: crate::api::youtube::extract_hl(&html).unwrap_or_else(|| "en".to_string()),
        continuation,
        base_url: base_url.to_string(),
        http_client: http_client.clone(),
    };

    tracing::info!(
        "✅ Live chat page parsed (replay: {}, client_version: {})",
        inner_tube.is_replay,
        inner_tube.client_version
    );
    Ok(inner_tube)
}

/// POST the current continuation to `get_live_chat`.
pub async fn fetch_live_chat_messages(
    inner_tube: &InnerTube,
    continuation: &Continuation,
) -> Result<GetLiveChatResponse, FetchError> {
    let url = format!(
        "{}/youtubei/v1/live_chat/get_live_chat?key={}",
        inner_tube.base_url, inner_tube.api_key
    );

    let payload = serde_json::json!({
        "context": {
            "client": {
                "clientName": "WEB",
                "clientVersion": inner_tube.client_version.to_string(),
                "gl": inner_tube.gl.as_str(),
                "hl": inner_tube.hl.as_str(),
            }
        },
        "continuation": continuation.to_string(),
    });

    let response = inner_tube
        .http_client
        .post(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| {
            tracing::error!("❌ HTTP request failed: {}", e);
            e
        })?;

    let status = response.status();
    tracing::debug!("📡 API response status: {}", status);
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let response_text = response.text().await?;
    let live_chat_response: GetLiveChatResponse =
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::debug!(
                "🔍 Response text preview: {}",
                response_text.chars().take(200).collect::<String>()
            );
            e
        })?;

    Ok(live_chat_response)
}
