//! JSON shapes of the platform's chat and video listing endpoints.
//!
//! Parsing is lenient about missing fields: an absent list reads as an empty
//! page, and a profile that cannot be read resolves to the unknown nickname.

use chat_core::{ChatEntry, UNKNOWN_NICKNAME};
use chat_logging::chat_warn;
use serde::Deserialize;
use serde_json::Value;

use crate::{FailureKind, FetchError, VideoDescriptor};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    content: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatPageContent {
    #[serde(default)]
    video_chats: Option<Vec<WireChat>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireChat {
    #[serde(default)]
    profile: Value,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    player_message_time: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct VideoListContent {
    #[serde(default)]
    data: Option<Vec<VideoDescriptor>>,
}

/// Parses one chat page body into entries, in page order.
pub fn parse_chat_page(body: &[u8]) -> Result<Vec<ChatEntry>, FetchError> {
    let envelope: Envelope<ChatPageContent> = serde_json::from_slice(body)
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
    let chats = envelope
        .content
        .and_then(|content| content.video_chats)
        .unwrap_or_default();

    Ok(chats
        .into_iter()
        .map(|chat| {
            let nickname = match &chat.profile {
                Value::String(raw) => resolve_nickname(Some(raw)),
                Value::Null => resolve_nickname(None),
                other => {
                    chat_warn!("profile is not a serialized string, ignoring: {}", other);
                    UNKNOWN_NICKNAME.to_string()
                }
            };
            ChatEntry::new(
                chat.player_message_time.unwrap_or(0),
                nickname,
                chat.content.unwrap_or_default(),
            )
        })
        .collect())
}

/// Reads the nickname out of a serialized profile.
///
/// Absent, unparsable and non-object profiles all yield `"Unknown"`.
pub fn resolve_nickname(profile: Option<&str>) -> String {
    let raw = match profile {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return UNKNOWN_NICKNAME.to_string(),
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map
            .get("nickname")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_NICKNAME)
            .to_string(),
        Ok(other) => {
            chat_warn!("profile is not an object, ignoring: {}", other);
            UNKNOWN_NICKNAME.to_string()
        }
        Err(err) => {
            chat_warn!("failed to parse profile {:?}: {}", raw, err);
            UNKNOWN_NICKNAME.to_string()
        }
    }
}

/// Parses one page of a channel's video listing.
pub fn parse_video_page(body: &[u8]) -> Result<Vec<VideoDescriptor>, FetchError> {
    let envelope: Envelope<VideoListContent> = serde_json::from_slice(body)
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
    Ok(envelope
        .content
        .and_then(|content| content.data)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_entries_in_page_order() {
        let body = br#"{
            "code": 200,
            "content": {
                "nextPlayerMessageTime": 11,
                "videoChats": [
                    {"profile": "{\"nickname\":\"A\"}", "content": "hi", "playerMessageTime": 0},
                    {"profile": "{\"nickname\":\"B\",\"badge\":null}",
                     "content": "yo", "playerMessageTime": 10}
                ]
            }
        }"#;
        let entries = parse_chat_page(body).unwrap();
        assert_eq!(
            entries,
            vec![ChatEntry::new(0, "A", "hi"), ChatEntry::new(10, "B", "yo")]
        );
    }

    #[test]
    fn missing_list_is_an_empty_page() {
        assert!(parse_chat_page(br#"{"content": {}}"#).unwrap().is_empty());
        assert!(parse_chat_page(br#"{"content": null}"#).unwrap().is_empty());
        assert!(parse_chat_page(br#"{"content": {"videoChats": []}}"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let body = br#"{"content": {"videoChats": [{"profile": null}]}}"#;
        assert_eq!(
            parse_chat_page(body).unwrap(),
            vec![ChatEntry::new(0, UNKNOWN_NICKNAME, "")]
        );
    }

    #[test]
    fn malformed_profile_keeps_entry() {
        let body = br#"{"content": {"videoChats": [
            {"profile": "{not json", "content": "a", "playerMessageTime": 1},
            {"profile": "[1,2]", "content": "b", "playerMessageTime": 2},
            {"profile": {"nickname": "obj"}, "content": "c", "playerMessageTime": 3}
        ]}}"#;
        let entries = parse_chat_page(body).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.nickname == UNKNOWN_NICKNAME));
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        let err = parse_chat_page(b"<html>").unwrap_err();
        assert_eq!(err.kind, FailureKind::Decode);
    }

    #[test]
    fn resolve_nickname_cases() {
        assert_eq!(resolve_nickname(None), "Unknown");
        assert_eq!(resolve_nickname(Some("")), "Unknown");
        assert_eq!(resolve_nickname(Some("\"str\"")), "Unknown");
        assert_eq!(resolve_nickname(Some("{}")), "Unknown");
        assert_eq!(resolve_nickname(Some("{\"nickname\": 5}")), "Unknown");
        assert_eq!(resolve_nickname(Some("{\"nickname\": \"개미\"}")), "개미");
    }

    #[test]
    fn parses_video_listing() {
        let body = br#"{"content": {"page": 0, "data": [
            {"videoNo": 6200690, "videoId": "abc123", "videoTitle": "title one",
             "publishDate": "2024-03-01 20:00:00", "duration": 3600}
        ]}}"#;
        let videos = parse_video_page(body).unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].video_no, 6200690);
        assert_eq!(videos[0].video_id, "abc123");
        assert_eq!(videos[0].title, "title one");
        assert!(parse_video_page(br#"{"content": {"data": []}}"#)
            .unwrap()
            .is_empty());
    }
}
