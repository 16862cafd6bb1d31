use std::time::Duration;

use chat_core::{video_url, ChatEntry};
use chat_logging::chat_debug;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, REFERER};
use url::Url;

use crate::wire::parse_chat_page;
use crate::{EngineEvent, FailureKind, FetchError};

pub const DEFAULT_API_BASE: &str = "https://api.chzzk.naver.com/service/v1";
pub const DEFAULT_WEB_BASE: &str = "https://chzzk.naver.com";
const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36"
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub api_base_url: String,
    pub web_base_url: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    /// `None` waits until the transport itself returns or errors.
    pub request_timeout: Option<Duration>,
    pub max_page_bytes: u64,
    pub listing_page_size: u32,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            web_base_url: DEFAULT_WEB_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_page_bytes: 8 * 1024 * 1024,
            listing_page_size: 18,
        }
    }
}

/// Receives engine events as the worker produces them.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        // The caller may have dropped its receiver; the worker keeps going
        // until it observes cancellation.
        let _ = self.tx.send(event);
    }
}

/// One request for the page of chat that starts at `cursor_ms`.
///
/// An empty page means the video has no more chat.
#[async_trait::async_trait]
pub trait ChatPageFetcher: Send + Sync {
    async fn fetch_page(&self, video_id: &str, cursor_ms: u64)
        -> Result<Vec<ChatEntry>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .user_agent(settings.user_agent.clone());
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// `{api_base}/{segments...}` with each segment percent-encoded.
    pub(crate) fn api_url(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.settings.api_base_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::new(FailureKind::InvalidUrl, "api base cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn chat_url(&self, video_id: &str, cursor_ms: u64) -> Result<Url, FetchError> {
        let mut url = self.api_url(&["videos", video_id, "chats"])?;
        url.query_pairs_mut()
            .append_pair("playerMessageTime", &cursor_ms.to_string());
        Ok(url)
    }

    /// GETs `url` and returns the whole body, bounded by `max_page_bytes`.
    pub(crate) async fn get_body(&self, url: Url, referer: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(REFERER, referer)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_page_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl ChatPageFetcher for ReqwestFetcher {
    async fn fetch_page(
        &self,
        video_id: &str,
        cursor_ms: u64,
    ) -> Result<Vec<ChatEntry>, FetchError> {
        let url = self.chat_url(video_id, cursor_ms)?;
        let referer = video_url(&self.settings.web_base_url, video_id);
        chat_debug!("GET {}", url);
        let body = self.get_body(url, &referer).await?;
        parse_chat_page(&body)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
