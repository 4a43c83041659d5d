use crate::{
    Attempt, CorpusFetch, CorpusFilter, Document, DocumentId, DocumentSortKey, ErrorInfo,
    IngestRequest, PageRequest, ResultPage, ResultSortKey, SearchId, SearchOptions,
    SearchStatusReport, SortDirection,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited search settings. Applies to the next submit only.
    OptionsChanged(SearchOptions),
    /// User asked to run a search with the current options and selection.
    SearchSubmitted,
    /// User dismissed the current search.
    SearchCleared,
    /// Remote answer to `Effect::Submit`.
    SubmitCompleted {
        attempt: Attempt,
        result: Result<SearchId, ErrorInfo>,
    },
    /// Remote answer to `Effect::PollStatus`.
    StatusReceived {
        attempt: Attempt,
        search_id: SearchId,
        result: Result<SearchStatusReport, ErrorInfo>,
    },
    /// Remote answer to `Effect::FetchResults`.
    ResultsReceived {
        attempt: Attempt,
        search_id: SearchId,
        request: PageRequest,
        result: Result<ResultPage, ErrorInfo>,
    },
    /// A `ScheduleWake` timer fired.
    Wake {
        attempt: Attempt,
        search_id: SearchId,
    },
    /// User asked for another server page of results.
    ResultsPageRequested(PageRequest),
    /// User clicked a results column header.
    ResultsSortClicked {
        key: ResultSortKey,
        direction: Option<SortDirection>,
    },
    ResultsPageChanged(usize),
    ResultsPageSizeChanged(usize),
    /// User picked a corpus language.
    LanguageSelected(String),
    /// Remote answer to `Effect::FetchCorpus`.
    CorpusReceived {
        fetch: CorpusFetch,
        language: String,
        result: Result<Vec<Document>, ErrorInfo>,
    },
    CorpusSortClicked {
        key: DocumentSortKey,
        direction: Option<SortDirection>,
    },
    CorpusPageChanged(usize),
    CorpusPageSizeChanged(usize),
    CorpusFilterChanged(CorpusFilter),
    SourceSelected(Document),
    SourceCleared,
    TargetSelected(Document),
    TargetCleared,
    MultitextToggled { document: Document, included: bool },
    /// User submitted a completed ingest form.
    IngestRequested(IngestRequest),
    /// Remote answer to `Effect::IngestText`.
    IngestCompleted {
        result: Result<DocumentId, ErrorInfo>,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
