use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::filter::{admit, SeenSet};
use crate::{ChatEntry, Filter, VideoId};

/// Position of a job within its batch.
pub type JobIndex = usize;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed(String),
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed(_) | JobStatus::Cancelled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed(reason) => write!(f, "failed: {reason}"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("job for video {video_id} cannot start from status {from}")]
    NotPending { video_id: VideoId, from: JobStatus },
    #[error("job for video {video_id} already finished as {from}")]
    AlreadyTerminal { video_id: VideoId, from: JobStatus },
    #[error("{to} is not a terminal status")]
    NotTerminal { to: JobStatus },
}

/// One video's collection run. Owns its dedup set; a fresh job is built for
/// every video so no state carries over between runs.
#[derive(Debug)]
pub struct CollectionJob {
    video_id: VideoId,
    filter: Arc<Filter>,
    seen: SeenSet,
    status: JobStatus,
}

impl CollectionJob {
    pub fn new(video_id: impl Into<VideoId>, filter: Arc<Filter>) -> Self {
        Self {
            video_id: video_id.into(),
            filter,
            seen: SeenSet::new(),
            status: JobStatus::Pending,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Runs the dedup and filter decision for one entry of this job.
    pub fn admit(&mut self, entry: &ChatEntry) -> bool {
        admit(entry, &self.filter, &mut self.seen)
    }

    pub fn start(&mut self) -> Result<(), StatusError> {
        if self.status != JobStatus::Pending {
            return Err(StatusError::NotPending {
                video_id: self.video_id.clone(),
                from: self.status.clone(),
            });
        }
        self.status = JobStatus::Running;
        Ok(())
    }

    /// Sets the terminal status. Only the first terminal transition sticks.
    pub fn finish(&mut self, status: JobStatus) -> Result<(), StatusError> {
        if !status.is_terminal() {
            return Err(StatusError::NotTerminal { to: status });
        }
        if self.status.is_terminal() {
            return Err(StatusError::AlreadyTerminal {
                video_id: self.video_id.clone(),
                from: self.status.clone(),
            });
        }
        self.status = status;
        Ok(())
    }
}
