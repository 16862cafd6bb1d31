use std::sync::Arc;

use thiserror::Error;

use crate::{CollectionJob, Filter, VideoId};

/// One video to collect, with the filter to apply to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub video_id: VideoId,
    pub filter: Filter,
}

impl JobSpec {
    pub fn new(video_id: impl Into<VideoId>, filter: Filter) -> Self {
        Self {
            video_id: video_id.into(),
            filter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("batch contains no videos")]
    EmptyBatch,
    #[error("job {index} has neither a nickname nor a message filter")]
    UnconstrainedFilter { index: usize },
    #[error("job {index} has a blank video id")]
    BlankVideoId { index: usize },
}

/// An ordered, validated set of jobs. Construction either accepts every job
/// or rejects the whole batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    jobs: Vec<JobSpec>,
}

impl BatchRequest {
    pub fn new(jobs: Vec<JobSpec>) -> Result<Self, SubmitError> {
        if jobs.is_empty() {
            return Err(SubmitError::EmptyBatch);
        }
        for (index, job) in jobs.iter().enumerate() {
            if job.video_id.trim().is_empty() {
                return Err(SubmitError::BlankVideoId { index });
            }
            if job.filter.is_unconstrained() {
                return Err(SubmitError::UnconstrainedFilter { index });
            }
        }
        Ok(Self { jobs })
    }

    /// Same filter for every video.
    pub fn uniform(
        video_ids: impl IntoIterator<Item = VideoId>,
        filter: Filter,
    ) -> Result<Self, SubmitError> {
        let jobs = video_ids
            .into_iter()
            .map(|video_id| JobSpec::new(video_id, filter.clone()))
            .collect();
        Self::new(jobs)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn specs(&self) -> &[JobSpec] {
        &self.jobs
    }

    /// Builds one fresh job per spec. Equal filters share one allocation.
    pub fn into_jobs(self) -> Vec<CollectionJob> {
        let mut shared: Option<Arc<Filter>> = None;
        self.jobs
            .into_iter()
            .map(|spec| {
                let filter = match &shared {
                    Some(existing) if **existing == spec.filter => existing.clone(),
                    _ => {
                        let filter = Arc::new(spec.filter);
                        shared = Some(filter.clone());
                        filter
                    }
                };
                CollectionJob::new(spec.video_id, filter)
            })
            .collect()
    }
}
