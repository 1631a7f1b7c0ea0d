//! YouTube Live Chat API response types.
//!
//! Only the parts of the InnerTube `get_live_chat` response needed to read
//! plain text messages are modelled; everything else lands in `Unknown`.

use serde::{Deserialize, Serialize};

pub use crate::api::youtube::Continuation;

/// Response from the YouTube Live Chat API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetLiveChatResponse {
    /// Absent once the stream has ended or the chat was closed
    #[serde(rename = "continuationContents", default)]
    pub continuation_contents: Option<ContinuationContents>,
}

/// Container for the live chat continuation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuationContents {
    #[serde(rename = "liveChatContinuation")]
    pub live_chat_continuation: LiveChatContinuation,
}

/// Live chat continuation containing actions and tokens for the next request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveChatContinuation {
    /// Array of actions like new messages, deletions, etc.
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Continuation data for the next request
    #[serde(default)]
    pub continuations: Vec<serde_json::Value>,
}

/// A message containing a sequence of text and/or emoji runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub runs: Vec<MessageRun>,
}

impl Message {
    /// Flatten the runs into plain text.
    ///
    /// Standard emojis contribute their first shortcut; custom emojis without
    /// shortcuts contribute nothing.
    pub fn to_plain_text(&self) -> String {
        self.runs
            .iter()
            .filter_map(|run| {
                run.get_text().or_else(|| {
                    run.get_emoji()
                        .and_then(|emoji| emoji.shortcuts.first().map(String::as_str))
                })
            })
            .collect()
    }
}

/// A fragment of a message, containing either text or an emoji.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRun {
    pub text: Option<String>,
    pub emoji: Option<Emoji>,
}

impl MessageRun {
    /// Get the text content if present
    pub fn get_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Get the emoji content if present
    pub fn get_emoji(&self) -> Option<&Emoji> {
        self.emoji.as_ref()
    }
}

/// Emoji data structure for custom and standard emojis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emoji {
    #[serde(rename = "emojiId", default)]
    pub emoji_id: String,
    /// Shortcut text strings to input this emoji
    #[serde(default)]
    pub shortcuts: Vec<String>,
    #[serde(rename = "isCustomEmoji", default)]
    pub is_custom_emoji: bool,
}

/// Author name information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorName {
    #[serde(rename = "simpleText")]
    pub simple_text: String,
}

/// Renderer for a standard text message in live chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveChatTextMessageRenderer {
    pub id: String,
    #[serde(default)]
    pub message: Message,
    /// Anonymous or deleted authors have no name
    #[serde(rename = "authorName", default)]
    pub author_name: Option<AuthorName>,
    #[serde(rename = "timestampUsec", default)]
    pub timestamp_usec: Option<String>,
}

/// Wrapper for an AddChatItemAction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddChatItemActionWrapper {
    #[serde(rename = "addChatItemAction")]
    pub action: AddChatItemAction,
}

/// Action to add a chat item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddChatItemAction {
    pub item: ChatItem,
    #[serde(rename = "clientId", default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

/// Enum representing different types of chat actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Action {
    /// Action to add a new chat message
    AddChatItem(AddChatItemActionWrapper),
    /// Anything else (ticker items, removals, moderation commands, ...)
    Unknown(serde_json::Value),
}

/// Enum representing different types of chat items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatItem {
    /// Standard text message in chat
    TextMessage {
        #[serde(rename = "liveChatTextMessageRenderer")]
        renderer: LiveChatTextMessageRenderer,
    },
    /// Super chats, memberships, system messages, ...
    Unknown(serde_json::Value),
}

impl GetLiveChatResponse {
    /// Text message renderers contained in this response, in arrival order.
    pub fn text_messages(&self) -> impl Iterator<Item = &LiveChatTextMessageRenderer> {
        self.continuation_contents
            .iter()
            .flat_map(|contents| contents.live_chat_continuation.actions.iter())
            .filter_map(|action| match action {
                Action::AddChatItem(wrapper) => match &wrapper.action.item {
                    ChatItem::TextMessage { renderer } => Some(renderer),
                    ChatItem::Unknown(_) => None,
                },
                Action::Unknown(_) => None,
            })
    }
}

/// Extract the continuation token for the next request from a response.
///
/// Returns `None` when the response carries no continuation, which YouTube
/// uses to signal that the chat has ended.
pub fn get_next_continuation(response: &GetLiveChatResponse) -> Option<Continuation> {
    response
        .continuation_contents
        .as_ref()?
        .live_chat_continuation
        .continuations
        .first()
        .and_then(|v| {
            v.get("invalidationContinuationData")
                .or_else(|| v.get("timedContinuationData"))
                .or_else(|| v.get("reloadContinuationData"))
        })
        .and_then(|v| v.get("continuation"))
        .and_then(|v| v.as_str())
        .map(|s| Continuation(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "continuationContents": {
            "liveChatContinuation": {
                "continuations": [
                    {"invalidationContinuationData": {"continuation": "next_token", "timeoutMs": 5000}}
                ],
                "actions": [
                    {"addChatItemAction": {
                        "item": {"liveChatTextMessageRenderer": {
                            "id": "m1",
                            "message": {"runs": [{"text": "Bob"}]},
                            "authorName": {"simpleText": "viewer1"},
                            "timestampUsec": "1700000000000000"
                        }},
                        "clientId": "c1"
                    }},
                    {"addChatItemAction": {
                        "item": {"liveChatPaidMessageRenderer": {"id": "p1"}}
                    }},
                    {"addLiveChatTickerItemAction": {"item": {}}},
                    {"addChatItemAction": {
                        "item": {"liveChatTextMessageRenderer": {
                            "id": "m2",
                            "message": {"runs": [
                                {"text": "hi "},
                                {"emoji": {"emojiId": "e1", "shortcuts": [":wave:"], "isCustomEmoji": false}}
                            ]}
                        }}
                    }}
                ]
            }
        }
    }"#;

    #[test]
    fn test_parse_text_messages() {
        let response: GetLiveChatResponse = serde_json::from_str(SAMPLE).unwrap();
        let texts: Vec<String> = response
            .text_messages()
            .map(|r| r.message.to_plain_text())
            .collect();
        assert_eq!(texts, vec!["Bob".to_string(), "hi :wave:".to_string()]);
    }

    #[test]
    fn test_author_name_optional() {
        let response: GetLiveChatResponse = serde_json::from_str(SAMPLE).unwrap();
        let authors: Vec<Option<String>> = response
            .text_messages()
            .map(|r| r.author_name.as_ref().map(|a| a.simple_text.clone()))
            .collect();
        assert_eq!(authors, vec![Some("viewer1".to_string()), None]);
    }

    #[test]
    fn test_get_next_continuation() {
        let response: GetLiveChatResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(
            get_next_continuation(&response),
            Some(Continuation("next_token".to_string()))
        );
    }

    #[test]
    fn test_ended_chat_has_no_continuation() {
        let response: GetLiveChatResponse =
            serde_json::from_str(r#"{"responseContext": {}}"#).unwrap();
        assert!(response.continuation_contents.is_none());
        assert!(get_next_continuation(&response).is_none());
        assert_eq!(response.text_messages().count(), 0);
    }

    #[test]
    fn test_custom_emoji_without_shortcut_is_dropped() {
        let message = Message {
            runs: vec![
                MessageRun {
                    text: Some("Ann".to_string()),
                    emoji: None,
                },
                MessageRun {
                    text: None,
                    emoji: Some(Emoji {
                        emoji_id: "UC/custom".to_string(),
                        shortcuts: vec![],
                        is_custom_emoji: true,
                    }),
                },
            ],
        };
        assert_eq!(message.to_plain_text(), "Ann");
    }
}
