use crate::view_model::{AppViewModel, CorpusView, SessionView};
use crate::{
    AsyncGate, CaseSensitivity, CorpusCatalog, CorpusFilter, CorpusPager, DocumentId, ErrorInfo,
    ResultsPager, SearchOptions, SearchSession, SelectionManager, SessionConfig, SessionError,
    DEFAULT_CORPUS_PAGE_SIZE,
};

/// Tunables of the core, filled from the application configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreConfig {
    pub max_concurrent_requests: usize,
    pub session: SessionConfig,
    pub corpus_page_size: usize,
    pub case: CaseSensitivity,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 4,
            session: SessionConfig::default(),
            corpus_page_size: DEFAULT_CORPUS_PAGE_SIZE,
            case: CaseSensitivity::Insensitive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Pending,
    Succeeded(DocumentId),
    Failed(ErrorInfo),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub(crate) config: CoreConfig,
    pub(crate) gate: AsyncGate,
    pub(crate) options: SearchOptions,
    pub(crate) selection: SelectionManager,
    pub(crate) session: SearchSession,
    pub(crate) results_pager: ResultsPager,
    pub(crate) corpus: CorpusCatalog,
    pub(crate) corpus_filter: CorpusFilter,
    pub(crate) corpus_pager: CorpusPager,
    pub(crate) last_ingest: Option<IngestOutcome>,
    pub(crate) notice: Option<SessionError>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_config(CoreConfig::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CoreConfig) -> Self {
        Self {
            config,
            gate: AsyncGate::new(config.max_concurrent_requests),
            options: SearchOptions::default(),
            selection: SelectionManager::new(),
            session: SearchSession::new(config.session),
            results_pager: ResultsPager::for_results(config.session.default_page_size)
                .with_case(config.case),
            corpus: CorpusCatalog::default(),
            corpus_filter: CorpusFilter::default(),
            corpus_pager: CorpusPager::for_corpus(config.corpus_page_size).with_case(config.case),
            last_ingest: None,
            notice: None,
            dirty: false,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn gate(&self) -> &AsyncGate {
        &self.gate
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn corpus(&self) -> &CorpusCatalog {
        &self.corpus
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn notice(&self) -> Option<&SessionError> {
        self.notice.as_ref()
    }

    pub fn last_ingest(&self) -> Option<&IngestOutcome> {
        self.last_ingest.as_ref()
    }

    pub fn view(&self) -> AppViewModel {
        let session = &self.session;
        let filtered = self.corpus_filter.apply(self.corpus.documents());

        AppViewModel {
            session: SessionView {
                status: session.status(),
                search_id: session.search_id().cloned(),
                stage_progress: session.stage_progress().to_vec(),
                total_result_count: session.total_result_count(),
                page_request: session.page_request(),
                error: session.error().cloned(),
                loading: session.is_loading(),
            },
            results: self.results_pager.view(session.result_buffer()),
            corpus: CorpusView {
                language: self.corpus.language().map(ToOwned::to_owned),
                loading: self.corpus.is_loading(),
                error: self.corpus.error().cloned(),
                total_documents: self.corpus.documents().len(),
                filter: self.corpus_filter.clone(),
                page: self.corpus_pager.view(&filtered),
            },
            selection: self.selection.state().clone(),
            options: self.options.clone(),
            notice: self.notice.clone(),
            last_ingest: self.last_ingest.clone(),
            in_flight: self.gate.in_flight(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
