//! Lifecycle of one textual-parallel search.
//!
//! ```text
//! Idle ──submit──▶ Submitting ──id──▶ Polling ──done──▶ FetchingResults ──page──▶ Ready
//!                      │                 │                    │                  │
//!                      └──────error──────┴───────error────────┴──────error───────┴──▶ Failed
//! ```
//!
//! Every transition that issues a remote call acquires a slot from the
//! [`AsyncGate`]; every `on_*` handler releases one before anything else,
//! including for responses that turn out to be stale.

use std::fmt;
use std::time::Duration;

use parallels_logging::{parallels_debug, parallels_info, parallels_warn};

use crate::{
    AsyncGate, Effect, ErrorInfo, ResultSortKey, SearchParameters, SearchResult, SessionError,
    SortDirection, DEFAULT_RESULTS_PAGE_SIZE,
};

/// Identifier the remote service assigns to a submitted search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchId(String);

impl SearchId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Local counter distinguishing successive submits, used to match submit responses.
pub type Attempt = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Submitting,
    Polling,
    FetchingResults,
    Ready,
    Failed,
}

/// Status string reported by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    Queued,
    Running,
    Done,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageProgress {
    pub stage: String,
    pub fraction: f64,
}

impl StageProgress {
    /// Fractions are clamped to `0..=1`; NaN becomes 0.
    pub fn new(stage: impl Into<String>, fraction: f64) -> Self {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        Self {
            stage: stage.into(),
            fraction,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchStatusReport {
    pub status: RemoteStatus,
    pub stages: Vec<StageProgress>,
    pub message: Option<String>,
}

/// Server-side page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
    pub sort_key: ResultSortKey,
    pub direction: SortDirection,
}

impl PageRequest {
    /// First page, best score first.
    pub fn first(page_size: usize) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
            sort_key: ResultSortKey::Score,
            direction: SortDirection::Descending,
        }
    }

    fn clamped(self, total: usize) -> Self {
        let page_size = self.page_size.max(1);
        let last_page = total.saturating_sub(1) / page_size;
        Self {
            page: self.page.min(last_page),
            page_size,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultPage {
    pub results: Vec<SearchResult>,
    pub total_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Minimum delay between the resolution of one poll and the next poll.
    pub poll_interval: Duration,
    /// Delay before retrying a call the gate refused.
    pub retry_interval: Duration,
    pub default_page_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            retry_interval: Duration::from_millis(250),
            default_page_size: DEFAULT_RESULTS_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSession {
    config: SessionConfig,
    status: SessionStatus,
    attempt: Attempt,
    search_id: Option<SearchId>,
    params: Option<SearchParameters>,
    stage_progress: Vec<StageProgress>,
    result_buffer: Vec<SearchResult>,
    total_result_count: usize,
    page_request: PageRequest,
    error: Option<ErrorInfo>,
    poll_in_flight: bool,
    fetch_in_flight: Option<PageRequest>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SearchSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            status: SessionStatus::Idle,
            attempt: 0,
            search_id: None,
            params: None,
            stage_progress: Vec::new(),
            result_buffer: Vec::new(),
            total_result_count: 0,
            page_request: PageRequest::first(config.default_page_size),
            error: None,
            poll_in_flight: false,
            fetch_in_flight: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn attempt(&self) -> Attempt {
        self.attempt
    }

    pub fn search_id(&self) -> Option<&SearchId> {
        self.search_id.as_ref()
    }

    /// Parameters of the search in flight (or last run).
    pub fn params(&self) -> Option<&SearchParameters> {
        self.params.as_ref()
    }

    pub fn stage_progress(&self) -> &[StageProgress] {
        &self.stage_progress
    }

    pub fn result_buffer(&self) -> &[SearchResult] {
        &self.result_buffer
    }

    pub fn total_result_count(&self) -> usize {
        self.total_result_count
    }

    pub fn page_request(&self) -> PageRequest {
        self.page_request
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        match self.status {
            SessionStatus::Submitting | SessionStatus::Polling | SessionStatus::FetchingResults => {
                true
            }
            SessionStatus::Ready => self.fetch_in_flight.is_some(),
            SessionStatus::Idle | SessionStatus::Failed => false,
        }
    }

    /// Starts a new attempt from any state. Responses to earlier attempts
    /// become stale.
    pub fn submit(
        &mut self,
        params: SearchParameters,
        gate: &mut AsyncGate,
    ) -> Result<Vec<Effect>, SessionError> {
        if !gate.try_acquire() {
            return Err(SessionError::Throttled);
        }

        self.reset();
        self.attempt += 1;
        self.status = SessionStatus::Submitting;
        self.params = Some(params.clone());
        parallels_info!(
            "Submitting search attempt={} source={} target={}",
            self.attempt,
            params.source(),
            params.target()
        );

        Ok(vec![Effect::Submit {
            attempt: self.attempt,
            params,
        }])
    }

    /// Back to Idle. In-flight responses will be discarded on arrival.
    pub fn clear(&mut self) {
        self.reset();
        self.attempt += 1;
        self.params = None;
    }

    pub fn on_submit_completed(
        &mut self,
        attempt: Attempt,
        result: Result<SearchId, ErrorInfo>,
        gate: &mut AsyncGate,
    ) -> Vec<Effect> {
        gate.release();
        if attempt != self.attempt || self.status != SessionStatus::Submitting {
            parallels_debug!("Discarding stale submit response attempt={}", attempt);
            return Vec::new();
        }

        match result {
            Ok(search_id) => {
                parallels_info!("Search accepted search_id={}", search_id);
                self.status = SessionStatus::Polling;
                self.search_id = Some(search_id);
                self.stage_progress.clear();
                self.result_buffer.clear();
                self.issue_poll(gate)
            }
            Err(error) => {
                self.fail(error);
                Vec::new()
            }
        }
    }

    pub fn on_status(
        &mut self,
        attempt: Attempt,
        search_id: &SearchId,
        result: Result<SearchStatusReport, ErrorInfo>,
        gate: &mut AsyncGate,
    ) -> Vec<Effect> {
        gate.release();
        let awaited = self.status == SessionStatus::Polling && self.poll_in_flight;
        if !self.is_current(attempt, search_id) || !awaited {
            parallels_debug!(
                "Discarding stale status response attempt={} search_id={}",
                attempt,
                search_id
            );
            return Vec::new();
        }
        self.poll_in_flight = false;

        let report = match result {
            Ok(report) => report,
            Err(error) => {
                self.fail(error);
                return Vec::new();
            }
        };

        self.stage_progress = report.stages;
        match report.status {
            RemoteStatus::Done => {
                parallels_info!("Search done search_id={}", search_id);
                self.status = SessionStatus::FetchingResults;
                self.issue_fetch(gate)
            }
            RemoteStatus::Error => {
                let message = report
                    .message
                    .unwrap_or_else(|| "search failed on the server".to_string());
                self.fail(ErrorInfo::remote(message));
                Vec::new()
            }
            RemoteStatus::Queued | RemoteStatus::Running => {
                vec![self.wake_after(search_id.clone(), self.config.poll_interval)]
            }
        }
    }

    /// Scheduled continuation: issues whatever call the current state is waiting on.
    pub fn on_wake(
        &mut self,
        attempt: Attempt,
        search_id: &SearchId,
        gate: &mut AsyncGate,
    ) -> Vec<Effect> {
        if !self.is_current(attempt, search_id) {
            return Vec::new();
        }
        match self.status {
            SessionStatus::Polling if !self.poll_in_flight => self.issue_poll(gate),
            SessionStatus::FetchingResults if self.fetch_in_flight.is_none() => {
                self.issue_fetch(gate)
            }
            _ => Vec::new(),
        }
    }

    pub fn on_results(
        &mut self,
        attempt: Attempt,
        search_id: &SearchId,
        request: &PageRequest,
        result: Result<ResultPage, ErrorInfo>,
        gate: &mut AsyncGate,
    ) -> Vec<Effect> {
        gate.release();
        if !self.is_current(attempt, search_id) || self.fetch_in_flight.as_ref() != Some(request) {
            parallels_debug!(
                "Discarding stale results attempt={} search_id={} page={}",
                attempt,
                search_id,
                request.page
            );
            return Vec::new();
        }
        self.fetch_in_flight = None;

        match result {
            Ok(page) => {
                parallels_info!(
                    "Results loaded search_id={} page={} rows={} total={}",
                    search_id,
                    request.page,
                    page.results.len(),
                    page.total_count
                );
                self.result_buffer = page.results;
                self.total_result_count = page.total_count;
                self.page_request = *request;
                self.status = SessionStatus::Ready;
            }
            Err(error) => self.fail(error),
        }
        Vec::new()
    }

    /// Loads another server page. Only valid once results are Ready.
    pub fn request_page(
        &mut self,
        request: PageRequest,
        gate: &mut AsyncGate,
    ) -> Result<Vec<Effect>, SessionError> {
        if self.status != SessionStatus::Ready {
            return Err(SessionError::NotReady);
        }
        let Some(search_id) = self.search_id.clone() else {
            return Err(SessionError::NotReady);
        };

        let request = request.clamped(self.total_result_count);
        let already_loaded = request == self.page_request && self.fetch_in_flight.is_none();
        if already_loaded || self.fetch_in_flight == Some(request) {
            return Ok(Vec::new());
        }
        if !gate.try_acquire() {
            return Err(SessionError::Throttled);
        }

        self.fetch_in_flight = Some(request);
        Ok(vec![Effect::FetchResults {
            attempt: self.attempt,
            search_id,
            request,
        }])
    }

    /// Both must match: a resubmit can get the same id back.
    fn is_current(&self, attempt: Attempt, search_id: &SearchId) -> bool {
        attempt == self.attempt && self.search_id.as_ref() == Some(search_id)
    }

    fn issue_poll(&mut self, gate: &mut AsyncGate) -> Vec<Effect> {
        let Some(search_id) = self.search_id.clone() else {
            return Vec::new();
        };
        if !gate.try_acquire() {
            return vec![self.wake_after(search_id, self.config.retry_interval)];
        }
        self.poll_in_flight = true;
        vec![Effect::PollStatus {
            attempt: self.attempt,
            search_id,
        }]
    }

    fn issue_fetch(&mut self, gate: &mut AsyncGate) -> Vec<Effect> {
        let Some(search_id) = self.search_id.clone() else {
            return Vec::new();
        };
        if !gate.try_acquire() {
            return vec![self.wake_after(search_id, self.config.retry_interval)];
        }
        let request = self.page_request;
        self.fetch_in_flight = Some(request);
        vec![Effect::FetchResults {
            attempt: self.attempt,
            search_id,
            request,
        }]
    }

    fn wake_after(&self, search_id: SearchId, after: Duration) -> Effect {
        Effect::ScheduleWake {
            attempt: self.attempt,
            search_id,
            after,
        }
    }

    fn fail(&mut self, error: ErrorInfo) {
        parallels_warn!("Search attempt {} failed: {}", self.attempt, error);
        self.status = SessionStatus::Failed;
        self.error = Some(error);
        self.poll_in_flight = false;
        self.fetch_in_flight = None;
    }

    fn reset(&mut self) {
        self.status = SessionStatus::Idle;
        self.search_id = None;
        self.stage_progress.clear();
        self.result_buffer.clear();
        self.total_result_count = 0;
        self.page_request = PageRequest::first(self.config.default_page_size);
        self.error = None;
        self.poll_in_flight = false;
        self.fetch_in_flight = None;
    }
}
