use crate::{JobIndex, JobStatus, SessionState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub jobs: Vec<JobRowView>,
    pub total_records: usize,
    pub last_error: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_index: JobIndex,
    pub video_id: String,
    pub title: String,
    pub status: JobStatus,
    pub record_count: usize,
}

impl AppViewModel {
    pub fn finished_jobs(&self) -> usize {
        self.jobs.iter().filter(|j| j.status.is_terminal()).count()
    }
}
