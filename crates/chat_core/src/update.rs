use crate::{AppState, BatchRequest, Effect, Msg, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::CollectRequested { videos, filter } => {
            // One batch at a time; a new request waits for the current one to end.
            match state.session() {
                SessionState::Running | SessionState::Cancelling => {
                    return (state, Vec::new());
                }
                SessionState::Idle | SessionState::Finished => {}
            }

            let video_ids = videos.iter().map(|v| v.video_id.clone());
            match BatchRequest::uniform(video_ids, filter) {
                Ok(request) => {
                    state.start_batch(videos);
                    vec![Effect::SubmitBatch { request }]
                }
                Err(err) => {
                    state.reject(err.to_string());
                    Vec::new()
                }
            }
        }
        Msg::CancelRequested => {
            if state.session() == SessionState::Running {
                state.begin_cancel();
                vec![Effect::CancelBatch]
            } else {
                Vec::new()
            }
        }
        Msg::MessageCollected { job_index, record } => {
            state.apply_record(job_index, record);
            Vec::new()
        }
        Msg::JobFinished { job_index, status } => {
            state.apply_finished(job_index, status);
            Vec::new()
        }
        Msg::BatchFinished => {
            if matches!(
                state.session(),
                SessionState::Running | SessionState::Cancelling
            ) {
                state.finish_batch();
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
