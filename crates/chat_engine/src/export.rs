use std::path::{Path, PathBuf};

use chat_core::{video_url, MessageRecord, VideoRef};
use chat_logging::chat_info;

use crate::persist::{write_atomic, PersistError};

/// One video's section of a text export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBlock {
    pub title: String,
    pub video_url: String,
    pub records: Vec<MessageRecord>,
}

impl ExportBlock {
    pub fn for_video(video: &VideoRef, records: &[MessageRecord], web_base: &str) -> Self {
        Self {
            title: video.display_title(),
            video_url: video_url(web_base, video.page_id()),
            records: records.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub block_count: usize,
    pub record_count: usize,
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Plain-text export: per block a title line, the video link, a count line,
/// a blank line, one `HH:MM:SS - nickname: content` line per record, then two
/// blank lines.
pub fn render_export(blocks: &[ExportBlock]) -> String {
    let mut buffer = String::new();
    for block in blocks {
        buffer.push_str(&format!("===== {} =====\n", block.title));
        buffer.push_str(&block.video_url);
        buffer.push('\n');
        buffer.push_str(&format!("Total chats: {}\n\n", block.records.len()));
        for record in &block.records {
            buffer.push_str(&record.display_line());
            buffer.push('\n');
        }
        buffer.push_str("\n\n");
    }
    buffer
}

pub fn write_export(path: &Path, blocks: &[ExportBlock]) -> Result<ExportSummary, ExportError> {
    if blocks.is_empty() {
        return Err(ExportError::Empty);
    }
    let content = render_export(blocks);
    write_atomic(path, &content)?;

    let summary = ExportSummary {
        block_count: blocks.len(),
        record_count: blocks.iter().map(|b| b.records.len()).sum(),
        path: path.to_path_buf(),
    };
    chat_info!(
        "exported {} records from {} videos to {:?}",
        summary.record_count,
        summary.block_count,
        summary.path
    );
    Ok(summary)
}
