use chat_core::{ChatEntry, CollectionJob, JobIndex, MessageRecord};
use chat_logging::{chat_debug, chat_info, chat_trace, chat_warn};
use tokio_util::sync::CancellationToken;

use crate::fetch::{ChatPageFetcher, ProgressSink};
use crate::{EngineEvent, FailureKind, FetchError, JobOutcome};

/// Drives one job to a terminal state: fetch pages from cursor 0 until the
/// endpoint returns an empty page, a request fails, or `cancel` trips.
///
/// Cancellation is checked before every request and before every entry.
/// Kept records are emitted through `sink` as they are found and also
/// returned with the outcome. The job's status is updated to match the
/// outcome; a job that is not pending is rejected without any request.
pub async fn collect_job(
    fetcher: &dyn ChatPageFetcher,
    job: &mut CollectionJob,
    job_index: JobIndex,
    cancel: &CancellationToken,
    sink: &dyn ProgressSink,
) -> JobOutcome {
    if let Err(err) = job.start() {
        chat_warn!("{}", err);
        return JobOutcome::Failed(FetchError::new(FailureKind::Rejected, err.to_string()));
    }

    let mut records: Vec<MessageRecord> = Vec::new();
    let mut cursor: u64 = 0;
    let mut pages: u64 = 0;

    let outcome = loop {
        if cancel.is_cancelled() {
            break JobOutcome::Cancelled(records);
        }

        chat_debug!("requesting page at cursor {}", cursor);
        let page = match fetcher.fetch_page(job.video_id(), cursor).await {
            Ok(page) => page,
            Err(err) => {
                chat_warn!("page at cursor {} failed: {}", cursor, err);
                break JobOutcome::Failed(err);
            }
        };
        pages += 1;
        chat_debug!("page at cursor {} returned {} entries", cursor, page.len());

        let Some(next) = next_cursor(&page, cursor) else {
            break JobOutcome::Completed(records);
        };

        let mut interrupted = false;
        for entry in page {
            if cancel.is_cancelled() {
                interrupted = true;
                break;
            }
            if job.admit(&entry) {
                let record = entry.into_record();
                chat_trace!("kept {}", record.display_line());
                sink.emit(EngineEvent::Progress {
                    job_index,
                    record: record.clone(),
                });
                records.push(record);
            }
        }
        if interrupted {
            break JobOutcome::Cancelled(records);
        }

        cursor = next;
    };

    if let Err(err) = job.finish(outcome.status()) {
        chat_warn!("{}", err);
    }
    chat_info!(
        "video {} {} after {} pages with {} records",
        job.video_id(),
        job.status(),
        pages,
        outcome.records().len()
    );
    outcome
}

/// Cursor for the request after `page`, or `None` when `page` ends the stream.
///
/// Advances past every raw entry, kept or not, so a page that is filtered out
/// entirely still moves forward. The result always exceeds both the page's
/// largest timestamp and the current cursor.
pub fn next_cursor(page: &[ChatEntry], cursor: u64) -> Option<u64> {
    let max_ts = page.iter().map(|entry| entry.timestamp_ms).max()?;
    Some(max_ts.saturating_add(1).max(cursor.saturating_add(1)))
}
