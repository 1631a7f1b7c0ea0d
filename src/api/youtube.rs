use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]INNERTUBE_API_KEY['"]:\s*['"](.+?)['"]"#).expect("static regex")
});
static CLIENT_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]INNERTUBE_CLIENT_VERSION['"]:\s*['"](.+?)['"]"#).expect("static regex")
});
static CONTINUATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]continuation['"]:\s*['"](.+?)['"]"#).expect("static regex")
});
static REPLAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]isReplay['"]:\s*true"#).expect("static regex"));
static HL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]hl['"]:\s*['"](.+?)['"]"#).expect("static regex"));
static GL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]gl['"]:\s*['"](.+?)['"]"#).expect("static regex"));

/// Identifier of a YouTube video, as entered by the operator.
///
/// No format validation is applied; anything non-empty is accepted.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL of the popout live chat page for this video.
    pub fn live_chat_url(&self, base_url: &str) -> String {
        format!(
            "{}/live_chat?is_popout=1&v={}",
            base_url,
            urlencoding::encode(&self.0)
        )
    }
}

impl From<&str> for VideoId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, derive_more::Display)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, derive_more::Display)]
pub struct ClientVersion(String);

impl ClientVersion {
    pub fn new(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Continuation(pub String);

fn capture(re: &Regex, html: &str) -> Option<String> {
    re.captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn extract_api_key(html: &str) -> Option<ApiKey> {
    capture(&API_KEY_RE, html).map(ApiKey::new)
}

pub fn extract_replay(html: &str) -> bool {
    REPLAY_RE.is_match(html)
}

pub fn extract_client_version(html: &str) -> Option<ClientVersion> {
    capture(&CLIENT_VERSION_RE, html).map(ClientVersion::new)
}

pub fn extract_continuation(html: &str) -> Option<Continuation> {
    capture(&CONTINUATION_RE, html).map(Continuation)
}

pub fn extract_hl(html: &str) -> Option<String> {
    capture(&HL_RE, html)
}

pub fn extract_gl(html: &str) -> Option<String> {
    capture(&GL_RE, html)
}
