use std::sync::Once;

use chat_core::{
    update, AppState, BatchRequest, Effect, Filter, JobSpec, Msg, SessionState, VideoRef,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(chat_logging::initialize_for_tests);
}

fn request(state: AppState, ids: &[&str], filter: Filter) -> (AppState, Vec<Effect>) {
    let videos = ids.iter().map(|id| VideoRef::new(*id)).collect();
    update(state, Msg::CollectRequested { videos, filter })
}

#[test]
fn collect_request_starts_batch_with_shared_filter() {
    init_logging();
    let filter = Filter::new("A", "");
    let (mut next, effects) = request(AppState::new(), &["10", "11"], filter.clone());
    let view = next.view();

    assert_eq!(view.session, SessionState::Running);
    assert_eq!(view.jobs.len(), 2);
    assert_eq!(view.jobs[0].title, "Video 10");
    assert_eq!(view.total_records, 0);
    assert!(next.consume_dirty());
    assert!(!next.consume_dirty());

    let expected = BatchRequest::new(vec![
        JobSpec::new("10", filter.clone()),
        JobSpec::new("11", filter),
    ])
    .unwrap();
    assert_eq!(effects, vec![Effect::SubmitBatch { request: expected }]);
}

#[test]
fn request_without_filter_is_rejected() {
    init_logging();
    let (next, effects) = request(AppState::new(), &["10"], Filter::default());
    let view = next.view();

    assert!(effects.is_empty());
    assert_eq!(view.session, SessionState::Idle);
    assert!(view.jobs.is_empty());
    assert!(view.last_error.unwrap().contains("neither a nickname nor a message"));
}

#[test]
fn request_without_videos_is_rejected() {
    init_logging();
    let (next, effects) = request(AppState::new(), &[], Filter::new("A", ""));
    assert!(effects.is_empty());
    assert_eq!(next.view().last_error.as_deref(), Some("batch contains no videos"));
}

#[test]
fn second_request_while_running_is_ignored() {
    init_logging();
    let (state, _) = request(AppState::new(), &["10"], Filter::new("A", ""));
    let (next, effects) = request(state.clone(), &["20"], Filter::new("B", ""));
    assert!(effects.is_empty());
    assert_eq!(next, state);
}

#[test]
fn cancel_only_applies_while_running() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::CancelRequested);
    assert!(effects.is_empty());
    assert_eq!(state.session(), SessionState::Idle);

    let (state, _) = request(state, &["10"], Filter::new("A", ""));
    let (state, effects) = update(state, Msg::CancelRequested);
    assert_eq!(effects, vec![Effect::CancelBatch]);
    assert_eq!(state.session(), SessionState::Cancelling);

    let (state, effects) = update(state, Msg::CancelRequested);
    assert!(effects.is_empty());
    assert_eq!(state.session(), SessionState::Cancelling);

    let (state, _) = update(state, Msg::BatchFinished);
    assert_eq!(state.session(), SessionState::Finished);
}

#[test]
fn finished_session_accepts_a_new_batch() {
    init_logging();
    let (state, _) = request(AppState::new(), &["10"], Filter::new("A", ""));
    let (state, _) = update(state, Msg::BatchFinished);
    let (state, effects) = request(state, &["30", "31", "32"], Filter::new("", "gg"));
    assert_eq!(effects.len(), 1);
    assert_eq!(state.view().jobs.len(), 3);
    assert_eq!(state.session(), SessionState::Running);
}
