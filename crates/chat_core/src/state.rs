use crate::view_model::{AppViewModel, JobRowView};
use crate::{JobIndex, JobStatus, MessageRecord, VideoId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Cancelling,
    Finished,
}

/// A video picked by the user. `page_id` is the id used by the web front end
/// when it differs from the chat endpoint's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    pub video_id: VideoId,
    pub title: Option<String>,
    pub page_id: Option<String>,
}

impl VideoRef {
    pub fn new(video_id: impl Into<VideoId>) -> Self {
        Self {
            video_id: video_id.into(),
            title: None,
            page_id: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_page_id(mut self, page_id: impl Into<String>) -> Self {
        self.page_id = Some(page_id.into());
        self
    }

    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("Video {}", self.video_id),
        }
    }

    pub fn page_id(&self) -> &str {
        self.page_id.as_deref().unwrap_or(&self.video_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct JobRow {
    pub(crate) video: VideoRef,
    pub(crate) status: JobStatus,
    pub(crate) records: Vec<MessageRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    session: SessionState,
    jobs: Vec<JobRow>,
    last_error: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn view(&self) -> AppViewModel {
        let jobs: Vec<JobRowView> = self
            .jobs
            .iter()
            .enumerate()
            .map(|(job_index, row)| JobRowView {
                job_index,
                video_id: row.video.video_id.clone(),
                title: row.video.display_title(),
                status: row.status.clone(),
                record_count: row.records.len(),
            })
            .collect();
        AppViewModel {
            session: self.session,
            total_records: jobs.iter().map(|j| j.record_count).sum(),
            jobs,
            last_error: self.last_error.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Per-job results in submission order, for export.
    pub fn job_results(&self) -> impl Iterator<Item = (&VideoRef, &[MessageRecord])> {
        self.jobs
            .iter()
            .map(|row| (&row.video, row.records.as_slice()))
    }

    pub(crate) fn start_batch(&mut self, videos: Vec<VideoRef>) {
        self.session = SessionState::Running;
        self.last_error = None;
        self.jobs = videos
            .into_iter()
            .map(|video| JobRow {
                video,
                status: JobStatus::Pending,
                records: Vec::new(),
            })
            .collect();
        self.mark_dirty();
    }

    pub(crate) fn reject(&mut self, reason: String) {
        self.last_error = Some(reason);
        self.mark_dirty();
    }

    pub(crate) fn begin_cancel(&mut self) {
        self.session = SessionState::Cancelling;
        self.mark_dirty();
    }

    pub(crate) fn apply_record(&mut self, job_index: JobIndex, record: MessageRecord) {
        let Some(row) = self.jobs.get_mut(job_index) else {
            chat_logging::chat_warn!("record for unknown job index {}", job_index);
            return;
        };
        if row.status.is_terminal() {
            chat_logging::chat_warn!("record for finished job {} ignored", job_index);
            return;
        }
        row.status = JobStatus::Running;
        row.records.push(record);
        self.mark_dirty();
    }

    pub(crate) fn apply_finished(&mut self, job_index: JobIndex, status: JobStatus) {
        let Some(row) = self.jobs.get_mut(job_index) else {
            chat_logging::chat_warn!("completion for unknown job index {}", job_index);
            return;
        };
        if row.status.is_terminal() || !status.is_terminal() {
            return;
        }
        row.status = status;
        self.mark_dirty();
    }

    pub(crate) fn finish_batch(&mut self) {
        self.session = SessionState::Finished;
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
