//! Parallels core: pure search-session state machine, selection and paging.
mod corpus;
mod document;
mod effect;
mod error;
mod gate;
mod ingest;
mod msg;
mod pager;
mod params;
mod result;
mod selection;
mod session;
mod state;
mod update;
mod view_model;

pub use corpus::{CorpusCatalog, CorpusFetch, CorpusFilter, GenreFilter};
pub use document::{Document, DocumentId, Year};
pub use effect::Effect;
pub use error::{ErrorInfo, ErrorKind, SessionError, ValidationError};
pub use gate::AsyncGate;
pub use ingest::{IngestDraft, IngestMetadata, IngestRequest};
pub use msg::Msg;
pub use pager::{
    CaseSensitivity, CorpusPager, DocumentSortKey, PageView, Pager, ResultSortKey, ResultsPager,
    SortDirection, Sortable, DEFAULT_CORPUS_PAGE_SIZE, DEFAULT_RESULTS_PAGE_SIZE,
    RESULTS_PAGE_SIZES,
};
pub use params::{
    DistanceMetric, Feature, FrequencyBasis, ScoreBasis, SearchOptions, SearchParameters,
    StoplistBasis, UnitType,
};
pub use result::{SearchResult, SearchResultFields, Side};
pub use selection::{SelectionManager, SelectionSlot, SelectionState};
pub use session::{
    Attempt, PageRequest, RemoteStatus, ResultPage, SearchId, SearchSession, SearchStatusReport,
    SessionConfig, SessionStatus, StageProgress,
};
pub use state::{AppState, CoreConfig, IngestOutcome};
pub use update::update;
pub use view_model::{AppViewModel, CorpusView, SessionView};
