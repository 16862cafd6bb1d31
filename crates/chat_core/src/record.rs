/// Opaque identifier of an archived video, as used by the chat endpoint.
pub type VideoId = String;

/// Nickname used when a chat entry carries no readable profile.
pub const UNKNOWN_NICKNAME: &str = "Unknown";

/// A raw chat entry after wire parsing, before dedup and filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub timestamp_ms: u64,
    pub nickname: String,
    pub content: String,
}

impl ChatEntry {
    pub fn new(timestamp_ms: u64, nickname: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            timestamp_ms,
            nickname: nickname.into(),
            content: content.into(),
        }
    }

    /// Turns a kept entry into the record handed to the caller.
    pub fn into_record(self) -> MessageRecord {
        MessageRecord {
            timestamp_ms: self.timestamp_ms,
            nickname: self.nickname,
            content: self.content,
        }
    }
}

/// One kept chat message. Content is raw text; rendering it safely is up to
/// the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub timestamp_ms: u64,
    pub nickname: String,
    pub content: String,
}

impl MessageRecord {
    /// Offset from the start of the video in whole seconds.
    pub fn offset_secs(&self) -> u64 {
        self.timestamp_ms / 1000
    }

    /// `HH:MM:SS` offset; hours keep counting past 99.
    pub fn clock(&self) -> String {
        format_clock(self.timestamp_ms)
    }

    /// Link to the video positioned at this message.
    pub fn playback_url(&self, web_base: &str, video_id: &str) -> String {
        format!(
            "{}?t={}",
            video_url(web_base, video_id),
            self.offset_secs()
        )
    }

    /// `HH:MM:SS - nickname: content`
    pub fn display_line(&self) -> String {
        format!("{} - {}: {}", self.clock(), self.nickname, self.content)
    }
}

/// Canonical page of a video on the platform's web front end.
pub fn video_url(web_base: &str, video_id: &str) -> String {
    format!("{}/video/{}", web_base.trim_end_matches('/'), video_id)
}

pub fn format_clock(milliseconds: u64) -> String {
    let total_seconds = milliseconds / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
