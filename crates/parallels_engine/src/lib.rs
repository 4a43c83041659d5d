//! Parallels engine: remote search API client and effect execution.
mod client;
mod engine;
mod types;

pub use client::{ClientSettings, RemoteSearchClient, ReqwestSearchClient};
pub use engine::EngineHandle;
pub use types::{
    DocumentRecord, EngineError, EngineEvent, FailureKind, IngestBody, IngestMetadataBody,
    IngestResponse, IngestUpload, RemoteError, ResultRecord, ResultsQuery, ResultsResponse,
    SearchMethod, SearchRequest, StageRecord, StatusResponse, SubmitResponse, Ticket, WireStatus,
};
