use std::fmt;

use chat_core::{JobIndex, JobStatus, MessageRecord, VideoId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A kept record, delivered as soon as it is known.
    Progress {
        job_index: JobIndex,
        record: MessageRecord,
    },
    /// Exactly one per job, after all of its progress events.
    JobCompleted {
        job_index: JobIndex,
        video_id: VideoId,
        result: JobOutcome,
    },
    /// Once per batch, after the last job completed.
    BatchCompleted { summary: BatchSummary },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed(Vec<MessageRecord>),
    Failed(FetchError),
    /// Records kept before the stop was observed.
    Cancelled(Vec<MessageRecord>),
}

impl JobOutcome {
    pub fn status(&self) -> JobStatus {
        match self {
            JobOutcome::Completed(_) => JobStatus::Completed,
            JobOutcome::Failed(err) => JobStatus::Failed(err.to_string()),
            JobOutcome::Cancelled(_) => JobStatus::Cancelled,
        }
    }

    pub fn records(&self) -> &[MessageRecord] {
        match self {
            JobOutcome::Completed(records) | JobOutcome::Cancelled(records) => records,
            JobOutcome::Failed(_) => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub records: usize,
}

impl BatchSummary {
    pub(crate) fn record(&mut self, outcome: &JobOutcome) {
        match outcome {
            JobOutcome::Completed(_) => self.completed += 1,
            JobOutcome::Failed(_) => self.failed += 1,
            JobOutcome::Cancelled(_) => self.cancelled += 1,
        }
        self.records += outcome.records().len();
    }

    pub fn jobs(&self) -> usize {
        self.completed + self.failed + self.cancelled
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Network,
    /// The job was not in a state that allows collection.
    Rejected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "malformed response body"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Rejected => write!(f, "job rejected"),
        }
    }
}
