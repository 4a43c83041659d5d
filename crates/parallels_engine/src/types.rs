use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Correlates a command with the event that answers it.
pub type Ticket = u64;

/// Body of `POST search/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub source: String,
    pub target: String,
    pub language: String,
    pub unit_type: String,
    pub method: SearchMethod,
    pub min_score: f64,
}

/// Matching method settings nested in a [`SearchRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMethod {
    pub name: String,
    pub feature: String,
    pub stopwords: u32,
    pub stoplist_basis: String,
    pub score_basis: String,
    pub freq_basis: String,
    pub max_distance: u32,
    pub distance_basis: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub search_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireStatus {
    Queued,
    Running,
    Done,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: String,
    #[serde(alias = "value")]
    pub fraction: f64,
}

/// Body of `GET search/{id}/status/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: WireStatus,
    #[serde(default)]
    pub stages: Vec<StageRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Query string of `GET search/{id}/results/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsQuery {
    pub page: usize,
    pub per_page: usize,
    pub sort_by: String,
    pub sort_order: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(alias = "object_id")]
    pub id: String,
    pub source_tag: String,
    pub target_tag: String,
    pub source_snippet: String,
    pub target_snippet: String,
    /// (source token, target token) pairs.
    #[serde(default)]
    pub highlight: Vec<(usize, usize)>,
    #[serde(default)]
    pub matched_features: Vec<String>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub results: Vec<ResultRecord>,
    pub total_count: usize,
}

/// One entry of `GET texts/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(alias = "object_id")]
    pub id: String,
    pub author: String,
    pub title: String,
    pub year: i32,
    pub is_prose: bool,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestMetadataBody {
    pub author: String,
    pub title: String,
    pub year: i32,
    pub is_prose: bool,
    pub language: String,
}

/// Body of `POST texts/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestBody {
    pub metadata: IngestMetadataBody,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub document_id: String,
}

/// Ingest command before the file has been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestUpload {
    pub metadata: IngestMetadataBody,
    pub file: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Submitted {
        ticket: Ticket,
        result: Result<String, RemoteError>,
    },
    StatusReceived {
        ticket: Ticket,
        result: Result<StatusResponse, RemoteError>,
    },
    ResultsReceived {
        ticket: Ticket,
        result: Result<ResultsResponse, RemoteError>,
    },
    CorpusReceived {
        ticket: Ticket,
        result: Result<Vec<DocumentRecord>, RemoteError>,
    },
    Ingested {
        ticket: Ticket,
        result: Result<String, RemoteError>,
    },
    Woke {
        ticket: Ticket,
    },
}

impl EngineEvent {
    pub fn ticket(&self) -> Ticket {
        match self {
            EngineEvent::Submitted { ticket, .. }
            | EngineEvent::StatusReceived { ticket, .. }
            | EngineEvent::ResultsReceived { ticket, .. }
            | EngineEvent::CorpusReceived { ticket, .. }
            | EngineEvent::Ingested { ticket, .. }
            | EngineEvent::Woke { ticket } => *ticket,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub kind: FailureKind,
    pub message: String,
}

impl RemoteError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RemoteError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Io,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build http client: {0}")]
    Client(RemoteError),
}
