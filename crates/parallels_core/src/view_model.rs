use crate::{
    CorpusFilter, Document, DocumentSortKey, ErrorInfo, IngestOutcome, PageRequest, PageView,
    ResultSortKey, SearchId, SearchOptions, SearchResult, SelectionState, SessionError,
    SessionStatus, StageProgress,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub session: SessionView,
    pub results: PageView<SearchResult, ResultSortKey>,
    pub corpus: CorpusView,
    pub selection: SelectionState,
    pub options: SearchOptions,
    /// Last request the core refused (throttled, invalid, not ready).
    pub notice: Option<SessionError>,
    pub last_ingest: Option<IngestOutcome>,
    pub in_flight: usize,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub status: SessionStatus,
    pub search_id: Option<SearchId>,
    pub stage_progress: Vec<StageProgress>,
    pub total_result_count: usize,
    pub page_request: PageRequest,
    pub error: Option<ErrorInfo>,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorpusView {
    pub language: Option<String>,
    pub loading: bool,
    pub error: Option<ErrorInfo>,
    /// Size of the listing before filtering.
    pub total_documents: usize,
    pub filter: CorpusFilter,
    pub page: PageView<Document, DocumentSortKey>,
}
