//! Channel video listing: a plain page-number walk, no filtering or dedup.

use chat_core::VideoRef;
use chat_logging::{chat_debug, chat_info};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::fetch::ReqwestFetcher;
use crate::wire::parse_video_page;
use crate::FetchError;

const CHANNEL_ID_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("not a channel id or channel link: {0:?}")]
    InvalidChannel(String),
    #[error("video listing page {page} failed: {source}")]
    Fetch {
        page: u32,
        #[source]
        source: FetchError,
    },
}

/// One archived video as described by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDescriptor {
    pub video_no: u64,
    #[serde(default)]
    pub video_id: String,
    #[serde(rename = "videoTitle", default)]
    pub title: String,
    #[serde(default)]
    pub publish_date: String,
}

impl VideoDescriptor {
    /// Key of the chat endpoint for this video.
    pub fn job_video_id(&self) -> String {
        self.video_no.to_string()
    }

    pub fn publish_day(&self) -> &str {
        self.publish_date
            .split_whitespace()
            .next()
            .unwrap_or_default()
    }

    pub fn display_title(&self) -> String {
        format!("{} - {}", self.publish_date, self.title)
    }

    pub fn to_video_ref(&self) -> VideoRef {
        let video = VideoRef::new(self.job_video_id()).with_title(self.display_title());
        if self.video_id.is_empty() {
            video
        } else {
            video.with_page_id(self.video_id.clone())
        }
    }
}

/// Accepts a bare channel id or a link whose last path segment is one.
pub fn parse_channel_id(input: &str) -> Result<String, ListingError> {
    let trimmed = input.trim();
    let candidate = match Url::parse(trimmed) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    };

    match candidate {
        Some(id) if is_channel_id(&id) => Ok(id),
        _ => Err(ListingError::InvalidChannel(input.to_string())),
    }
}

fn is_channel_id(candidate: &str) -> bool {
    candidate.len() == CHANNEL_ID_LEN
        && candidate
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
}

#[async_trait::async_trait]
pub trait VideoLister: Send + Sync {
    /// One page of the channel's videos, newest first. Empty past the end.
    async fn fetch_video_page(
        &self,
        channel_id: &str,
        page: u32,
    ) -> Result<Vec<VideoDescriptor>, FetchError>;
}

#[async_trait::async_trait]
impl VideoLister for ReqwestFetcher {
    async fn fetch_video_page(
        &self,
        channel_id: &str,
        page: u32,
    ) -> Result<Vec<VideoDescriptor>, FetchError> {
        let mut url = self.api_url(&["channels", channel_id, "videos"])?;
        url.query_pairs_mut()
            .append_pair("sortType", "LATEST")
            .append_pair("pagingType", "PAGE")
            .append_pair("page", &page.to_string())
            .append_pair("size", &self.settings().listing_page_size.to_string());
        let referer = format!("{}/", self.settings().web_base_url.trim_end_matches('/'));
        chat_debug!("GET {}", url);
        let body = self.get_body(url, &referer).await?;
        parse_video_page(&body)
    }
}

/// Walks listing pages from 0 until one comes back empty.
pub async fn list_channel_videos(
    lister: &dyn VideoLister,
    channel_id: &str,
) -> Result<Vec<VideoDescriptor>, ListingError> {
    let mut videos = Vec::new();
    let mut page = 0;
    loop {
        let batch = lister
            .fetch_video_page(channel_id, page)
            .await
            .map_err(|source| ListingError::Fetch { page, source })?;
        if batch.is_empty() {
            break;
        }
        videos.extend(batch);
        page += 1;
    }
    chat_info!(
        "channel {} has {} videos over {} pages",
        channel_id,
        videos.len(),
        page
    );
    Ok(videos)
}
