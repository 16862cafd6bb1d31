//! Chat engine: page fetching, the collection loop, the sequential batch
//! worker, video listing and text export.
mod collect;
mod engine;
mod export;
mod fetch;
mod listing;
mod persist;
mod types;
mod wire;

pub use std::sync::mpsc::RecvTimeoutError;

pub use collect::{collect_job, next_cursor};
pub use engine::{
    dispatch, run_batch, BatchHandle, BatchObserver, Canceller, EngineError, EngineHandle,
};
pub use export::{render_export, write_export, ExportBlock, ExportError, ExportSummary};
pub use fetch::{
    ChannelProgressSink, ChatPageFetcher, FetchSettings, ProgressSink, ReqwestFetcher,
    DEFAULT_API_BASE, DEFAULT_WEB_BASE,
};
pub use listing::{
    list_channel_videos, parse_channel_id, ListingError, VideoDescriptor, VideoLister,
};
pub use persist::{ensure_parent_dir, write_atomic, PersistError};
pub use types::{BatchSummary, EngineEvent, FailureKind, FetchError, JobOutcome};
pub use wire::{parse_chat_page, parse_video_page, resolve_nickname};
