use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chat_core::{
    BatchRequest, CollectionJob, JobIndex, JobSpec, JobStatus, MessageRecord, SubmitError,
};
use chat_logging::{chat_info, chat_warn, clear_job_context, set_job_context};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::collect::collect_job;
use crate::fetch::{
    ChannelProgressSink, ChatPageFetcher, FetchSettings, ProgressSink, ReqwestFetcher,
};
use crate::{BatchSummary, EngineEvent, FetchError, JobOutcome};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid batch: {0}")]
    Submit(#[from] SubmitError),
    #[error("failed to start collection worker: {0}")]
    Worker(#[from] std::io::Error),
    #[error("collection worker panicked")]
    WorkerPanicked,
}

/// Entry point for chat collection. Each submitted batch gets its own worker
/// thread, which runs the batch's jobs one after another.
#[derive(Clone)]
pub struct EngineHandle {
    fetcher: Arc<dyn ChatPageFetcher>,
    settings: FetchSettings,
}

impl EngineHandle {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let fetcher = Arc::new(ReqwestFetcher::new(settings.clone())?);
        Ok(Self { fetcher, settings })
    }

    pub fn with_fetcher(fetcher: Arc<dyn ChatPageFetcher>, settings: FetchSettings) -> Self {
        Self { fetcher, settings }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Validates `jobs` and starts collecting them in order.
    pub fn submit_batch(&self, jobs: Vec<JobSpec>) -> Result<BatchHandle, EngineError> {
        let request = BatchRequest::new(jobs)?;
        self.submit(request)
    }

    pub fn submit(&self, request: BatchRequest) -> Result<BatchHandle, EngineError> {
        let job_count = request.len();
        let jobs = request.into_jobs();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let fetcher = self.fetcher.clone();
        let worker_cancel = cancel.clone();
        let worker = thread::Builder::new()
            .name("chat-collector".to_string())
            .spawn(move || {
                let sink = ChannelProgressSink::new(event_tx);
                let summary = runtime.block_on(run_batch(
                    fetcher.as_ref(),
                    jobs,
                    &worker_cancel,
                    &sink,
                ));
                sink.emit(EngineEvent::BatchCompleted { summary });
            })?;

        chat_info!("submitted batch of {} jobs", job_count);
        Ok(BatchHandle {
            event_rx,
            cancel,
            worker: Some(worker),
            job_count,
        })
    }
}

/// Runs `jobs` strictly in order. Once `cancel` trips, the remaining jobs are
/// reported as cancelled without issuing any request.
pub async fn run_batch(
    fetcher: &dyn ChatPageFetcher,
    jobs: Vec<CollectionJob>,
    cancel: &CancellationToken,
    sink: &dyn ProgressSink,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for (job_index, mut job) in jobs.into_iter().enumerate() {
        set_job_context(job_index);
        let result = if cancel.is_cancelled() {
            if let Err(err) = job.finish(JobStatus::Cancelled) {
                chat_warn!("{}", err);
            }
            chat_info!("video {} skipped, batch cancelled", job.video_id());
            JobOutcome::Cancelled(Vec::new())
        } else {
            collect_job(fetcher, &mut job, job_index, cancel, sink).await
        };
        summary.record(&result);
        sink.emit(EngineEvent::JobCompleted {
            job_index,
            video_id: job.video_id().to_string(),
            result,
        });
        clear_job_context();
    }
    chat_info!(
        "batch finished: {} completed, {} failed, {} cancelled, {} records",
        summary.completed,
        summary.failed,
        summary.cancelled,
        summary.records
    );
    summary
}

/// Trips a batch's cancellation from any thread.
#[derive(Debug, Clone)]
pub struct Canceller(CancellationToken);

impl Canceller {
    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }
}

/// Callbacks for the events of one batch.
pub trait BatchObserver {
    fn on_progress(&mut self, _job_index: JobIndex, _record: &MessageRecord) {}
    fn on_job_complete(&mut self, _job_index: JobIndex, _video_id: &str, _result: &JobOutcome) {}
    fn on_batch_complete(&mut self, _summary: &BatchSummary) {}
}

pub fn dispatch(observer: &mut dyn BatchObserver, event: &EngineEvent) {
    match event {
        EngineEvent::Progress { job_index, record } => observer.on_progress(*job_index, record),
        EngineEvent::JobCompleted {
            job_index,
            video_id,
            result,
        } => observer.on_job_complete(*job_index, video_id, result),
        EngineEvent::BatchCompleted { summary } => observer.on_batch_complete(summary),
    }
}

/// Caller side of a running batch.
///
/// Dropping the handle cancels the batch and waits for the worker to stop,
/// so no event is produced after the handle is gone.
pub struct BatchHandle {
    event_rx: mpsc::Receiver<EngineEvent>,
    cancel: CancellationToken,
    worker: Option<thread::JoinHandle<()>>,
    job_count: usize,
}

impl BatchHandle {
    pub fn job_count(&self) -> usize {
        self.job_count
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks for the next event; `None` once the worker is done and every
    /// event has been received.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits up to `timeout` for the next event. `Disconnected` is only
    /// returned once the worker is gone and every event has been received.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }

    pub fn cancellation(&self) -> Canceller {
        Canceller(self.cancel.clone())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(|worker| worker.is_finished())
    }

    /// Waits for the worker to stop on its own.
    pub fn join(mut self) -> Result<(), EngineError> {
        self.join_worker()
    }

    /// Cancels the batch and waits for the worker to stop.
    pub fn shutdown(mut self) -> Result<(), EngineError> {
        self.cancel.cancel();
        self.join_worker()
    }

    /// Feeds every remaining event to `observer`, then joins the worker.
    pub fn run_to_end(self, observer: &mut dyn BatchObserver) -> Result<(), EngineError> {
        while let Some(event) = self.recv() {
            dispatch(observer, &event);
        }
        self.join()
    }

    fn join_worker(&mut self) -> Result<(), EngineError> {
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| EngineError::WorkerPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for BatchHandle {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.cancel.cancel();
            if let Err(err) = self.join_worker() {
                chat_warn!("{}", err);
            }
        }
    }
}
