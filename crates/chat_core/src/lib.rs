//! Chat core: data model, dedup/filter policy and the caller-side state machine.
mod batch;
mod effect;
mod filter;
mod job;
mod msg;
mod record;
mod state;
mod update;
mod view_model;

pub use batch::{BatchRequest, JobSpec, SubmitError};
pub use effect::Effect;
pub use filter::{admit, Filter, SeenSet};
pub use job::{CollectionJob, JobIndex, JobStatus, StatusError};
pub use msg::Msg;
pub use record::{
    format_clock, video_url, ChatEntry, MessageRecord, VideoId, UNKNOWN_NICKNAME,
};
pub use state::{AppState, SessionState, VideoRef};
pub use update::update;
pub use view_model::{AppViewModel, JobRowView};
