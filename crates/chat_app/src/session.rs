use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use chat_core::{update, AppState, Effect, Filter, JobStatus, Msg, VideoRef};
use chat_engine::{
    BatchHandle, BatchSummary, EngineEvent, EngineHandle, ExportBlock, JobOutcome,
    RecvTimeoutError, VideoDescriptor,
};
use chat_logging::{chat_debug, chat_info, chat_warn};
use chrono::{DateTime, TimeZone};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Drives one collection batch: feeds engine events through [`update`],
/// executes the resulting effects and prints what was kept.
pub struct Session<W: Write> {
    engine: EngineHandle,
    state: AppState,
    batch: Option<BatchHandle>,
    videos: Vec<VideoRef>,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(engine: EngineHandle, out: W) -> Self {
        Self {
            engine,
            state: AppState::new(),
            batch: None,
            videos: Vec::new(),
            out,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Collects `videos` and blocks until the worker has stopped. Anything
    /// received on `interrupts` requests cancellation.
    pub fn run(
        &mut self,
        videos: Vec<VideoRef>,
        filter: Filter,
        interrupts: &mpsc::Receiver<()>,
    ) -> anyhow::Result<BatchSummary> {
        self.videos = videos.clone();
        self.dispatch(Msg::CollectRequested { videos, filter })?;
        if self.batch.is_none() {
            let reason = self
                .state
                .view()
                .last_error
                .unwrap_or_else(|| "a batch is already running".to_string());
            return Err(anyhow!("cannot start collection: {reason}"));
        }
        self.pump(interrupts)
    }

    /// One block per video in submission order. Failed videos export no chat.
    pub fn export_blocks(&self) -> Vec<ExportBlock> {
        let web_base = &self.engine.settings().web_base_url;
        let view = self.state.view();
        self.state
            .job_results()
            .zip(view.jobs.iter())
            .map(|((video, records), row)| match row.status {
                JobStatus::Failed(_) => ExportBlock::for_video(video, &[], web_base),
                _ => ExportBlock::for_video(video, records, web_base),
            })
            .collect()
    }

    fn pump(&mut self, interrupts: &mpsc::Receiver<()>) -> anyhow::Result<BatchSummary> {
        let mut summary = None;
        loop {
            if interrupts.try_recv().is_ok() {
                self.dispatch(Msg::CancelRequested)?;
            }
            let event = match self.batch.as_ref() {
                None => break,
                Some(batch) => match batch.recv_timeout(POLL_INTERVAL) {
                    Ok(event) => event,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
            };
            self.print_event(&event)?;
            if let EngineEvent::BatchCompleted { summary: done } = &event {
                summary = Some(*done);
            }
            self.dispatch(event_to_msg(event))?;
        }

        if let Some(batch) = self.batch.take() {
            batch.join()?;
        }
        summary.ok_or_else(|| anyhow!("collection worker stopped without a summary"))
    }

    fn dispatch(&mut self, msg: Msg) -> anyhow::Result<()> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        if self.state.consume_dirty() {
            let view = self.state.view();
            chat_debug!(
                "session {:?}: {}/{} videos finished, {} chats",
                view.session,
                view.finished_jobs(),
                view.jobs.len(),
                view.total_records
            );
        }
        self.run_effects(effects)
    }

    fn run_effects(&mut self, effects: Vec<Effect>) -> anyhow::Result<()> {
        for effect in effects {
            match effect {
                Effect::SubmitBatch { request } => {
                    chat_info!("starting collection of {} videos", request.len());
                    self.batch = Some(self.engine.submit(request)?);
                }
                Effect::CancelBatch => match &self.batch {
                    Some(batch) => {
                        chat_info!("cancellation requested, stopping after the current step");
                        batch.cancel();
                    }
                    None => chat_warn!("cancel requested with no running batch"),
                },
            }
        }
        Ok(())
    }

    fn print_event(&mut self, event: &EngineEvent) -> anyhow::Result<()> {
        match event {
            EngineEvent::Progress { job_index, record } => {
                let page_id = self
                    .videos
                    .get(*job_index)
                    .map(|video| video.page_id().to_string())
                    .unwrap_or_default();
                let url = record.playback_url(&self.engine.settings().web_base_url, &page_id);
                writeln!(
                    self.out,
                    "[{}] {}  {}",
                    job_index + 1,
                    record.display_line(),
                    url
                )?;
            }
            EngineEvent::JobCompleted {
                job_index,
                video_id,
                result,
            } => {
                let title = self
                    .videos
                    .get(*job_index)
                    .map(VideoRef::display_title)
                    .unwrap_or_else(|| video_id.clone());
                let line = match result {
                    JobOutcome::Completed(records) => {
                        format!("done: {title} ({} chats)", records.len())
                    }
                    JobOutcome::Failed(err) => format!("failed: {title}: {err}"),
                    JobOutcome::Cancelled(records) => {
                        format!("cancelled: {title} ({} chats)", records.len())
                    }
                };
                writeln!(self.out, "[{}] {}", job_index + 1, line)?;
            }
            EngineEvent::BatchCompleted { summary } => {
                writeln!(
                    self.out,
                    "{} completed, {} failed, {} cancelled, {} chats in total",
                    summary.completed, summary.failed, summary.cancelled, summary.records
                )?;
            }
        }
        self.out.flush().context("failed to flush output")
    }
}

fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Progress { job_index, record } => Msg::MessageCollected { job_index, record },
        EngineEvent::JobCompleted {
            job_index, result, ..
        } => Msg::JobFinished {
            job_index,
            status: result.status(),
        },
        EngineEvent::BatchCompleted { .. } => Msg::BatchFinished,
    }
}

/// Picks the videos to collect. With a listing, requested numbers get their
/// titles from it; numbers missing from the listing are kept as bare ids.
pub fn select_videos(listing: &[VideoDescriptor], wanted: &[String], all: bool) -> Vec<VideoRef> {
    if all {
        return listing.iter().map(VideoDescriptor::to_video_ref).collect();
    }
    wanted
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(|id| {
            match listing.iter().find(|video| video.job_video_id() == id) {
                Some(video) => video.to_video_ref(),
                None => {
                    if !listing.is_empty() {
                        chat_warn!("video {} is not in the channel listing", id);
                    }
                    VideoRef::new(id)
                }
            }
        })
        .collect()
}

/// `-` stands for a timestamped file in the working directory.
pub fn export_path<Tz: TimeZone>(output: &Path, now: DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    if output == Path::new("-") {
        PathBuf::from(format!("chat_log_{}.txt", now.format("%Y%m%d_%H%M%S")))
    } else {
        output.to_path_buf()
    }
}
