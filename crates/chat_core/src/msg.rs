#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User asked to collect chat from the selected videos.
    CollectRequested {
        videos: Vec<crate::VideoRef>,
        filter: crate::Filter,
    },
    /// User asked to stop the running batch.
    CancelRequested,
    /// Engine kept a message for a job.
    MessageCollected {
        job_index: crate::JobIndex,
        record: crate::MessageRecord,
    },
    /// Engine reached a terminal state for a job.
    JobFinished {
        job_index: crate::JobIndex,
        status: crate::JobStatus,
    },
    /// Engine finished the whole batch; the worker is about to exit.
    BatchFinished,
    /// Fallback for placeholder wiring.
    NoOp,
}
