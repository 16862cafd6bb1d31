#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{mpsc, Arc, Mutex, Once};

use chat_core::ChatEntry;
use chat_engine::{ChatPageFetcher, EngineEvent, FailureKind, FetchError, ProgressSink};
use tokio_util::sync::CancellationToken;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(chat_logging::initialize_for_tests);
}

pub fn entry(ts: u64, nick: &str, content: &str) -> ChatEntry {
    ChatEntry::new(ts, nick, content)
}

type PageResult = Result<Vec<ChatEntry>, FetchError>;

/// Serves pre-recorded pages per video, in order; an exhausted script yields
/// empty pages. Every call is recorded.
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: Mutex<HashMap<String, VecDeque<PageResult>>>,
    calls: Mutex<Vec<(String, u64)>>,
    gate: Mutex<Option<(mpsc::Sender<()>, mpsc::Receiver<()>)>>,
}

/// Test side of a gated first request.
pub struct Gate {
    entered: mpsc::Receiver<()>,
    release: mpsc::Sender<()>,
}

impl Gate {
    /// Blocks until the first request is in flight.
    pub fn wait_entered(&self) {
        self.entered.recv().unwrap();
    }

    pub fn release(&self) {
        self.release.send(()).unwrap();
    }
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, video_id: &str, entries: Vec<ChatEntry>) -> Self {
        self.push(video_id, Ok(entries))
    }

    pub fn http_error(self, video_id: &str, code: u16) -> Self {
        self.push(
            video_id,
            Err(FetchError::new(FailureKind::HttpStatus(code), "scripted")),
        )
    }

    /// The first request signals the gate and blocks until released.
    pub fn gated(self) -> (Self, Gate) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *self.gate.lock().unwrap() = Some((entered_tx, release_rx));
        (
            self,
            Gate {
                entered: entered_rx,
                release: release_tx,
            },
        )
    }

    fn push(self, video_id: &str, page: PageResult) -> Self {
        self.pages
            .lock()
            .unwrap()
            .entry(video_id.to_string())
            .or_default()
            .push_back(page);
        self
    }

    pub fn calls(&self) -> Vec<(String, u64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatPageFetcher for ScriptedFetcher {
    async fn fetch_page(&self, video_id: &str, cursor_ms: u64) -> PageResult {
        let gate = self.gate.lock().unwrap().take();
        if let Some((entered, release)) = gate {
            let _ = entered.send(());
            let _ = release.recv();
        }
        self.calls
            .lock()
            .unwrap()
            .push((video_id.to_string(), cursor_ms));
        self.pages
            .lock()
            .unwrap()
            .get_mut(video_id)
            .and_then(|pages| pages.pop_front())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Records events; optionally trips `cancel_on_progress` at the first record.
#[derive(Default, Clone)]
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<EngineEvent>>>,
    pub cancel_on_progress: Option<CancellationToken>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelling(token: CancellationToken) -> Self {
        Self {
            cancel_on_progress: Some(token),
            ..Self::default()
        }
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: EngineEvent) {
        if matches!(event, EngineEvent::Progress { .. }) {
            if let Some(token) = &self.cancel_on_progress {
                token.cancel();
            }
        }
        self.events.lock().unwrap().push(event);
    }
}

pub fn progress_count(events: &[EngineEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, EngineEvent::Progress { .. }))
        .count()
}
