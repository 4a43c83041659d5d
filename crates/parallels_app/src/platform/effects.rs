use std::collections::HashMap;
use std::time::Duration;

use parallels_core::{
    Attempt, CorpusFetch, DistanceMetric, Document, DocumentId, Effect, ErrorInfo, Feature,
    FrequencyBasis, IngestRequest, Msg, PageRequest, RemoteStatus, ResultPage, ResultSortKey,
    ScoreBasis, SearchId, SearchParameters, SearchResult, SearchResultFields, SearchStatusReport,
    SortDirection, StageProgress, StoplistBasis, UnitType, Year,
};
use parallels_engine::{
    DocumentRecord, EngineEvent, EngineHandle, FailureKind, IngestMetadataBody, IngestUpload,
    RemoteError, ResultsQuery, ResultsResponse, SearchMethod, SearchRequest, StatusResponse,
    Ticket, WireStatus,
};
use parallels_logging::{dispatch_seq, parallels_debug, parallels_warn};

/// What the core is waiting for on each outstanding engine ticket.
#[derive(Debug, Clone, PartialEq)]
enum Pending {
    Submit { attempt: Attempt },
    Poll {
        attempt: Attempt,
        search_id: SearchId,
    },
    Fetch {
        attempt: Attempt,
        search_id: SearchId,
        request: PageRequest,
    },
    Corpus {
        fetch: CorpusFetch,
        language: String,
    },
    Ingest,
    Wake {
        attempt: Attempt,
        search_id: SearchId,
    },
}

/// Turns core effects into engine commands and engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    next_ticket: Ticket,
    pending: HashMap<Ticket, Pending>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            next_ticket: 0,
            pending: HashMap::new(),
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.next_ticket += 1;
            let ticket = self.next_ticket;
            parallels_debug!(
                "Effect ticket={} from dispatch #{} {:?}",
                ticket,
                dispatch_seq(),
                effect
            );
            let pending = match effect {
                Effect::Submit { attempt, params } => {
                    self.engine.submit(ticket, search_request(&params));
                    Pending::Submit { attempt }
                }
                Effect::PollStatus { attempt, search_id } => {
                    self.engine.poll_status(ticket, search_id.as_str());
                    Pending::Poll { attempt, search_id }
                }
                Effect::FetchResults {
                    attempt,
                    search_id,
                    request,
                } => {
                    self.engine
                        .fetch_results(ticket, search_id.as_str(), results_query(&request));
                    Pending::Fetch {
                        attempt,
                        search_id,
                        request,
                    }
                }
                Effect::FetchCorpus { fetch, language } => {
                    self.engine.fetch_corpus(ticket, language.as_str());
                    Pending::Corpus { fetch, language }
                }
                Effect::IngestText { request } => {
                    self.engine.ingest(ticket, ingest_upload(&request));
                    Pending::Ingest
                }
                Effect::ScheduleWake {
                    attempt,
                    search_id,
                    after,
                } => {
                    self.engine.schedule_wake(ticket, after);
                    Pending::Wake { attempt, search_id }
                }
            };
            self.pending.insert(ticket, pending);
        }
    }

    /// Waits up to `timeout` for the next engine event and translates it.
    pub fn next_msg(&mut self, timeout: Duration) -> Option<Msg> {
        let event = self.engine.recv_timeout(timeout)?;
        let Some(pending) = self.pending.remove(&event.ticket()) else {
            parallels_warn!("Engine event for unknown ticket {}", event.ticket());
            return Some(Msg::NoOp);
        };
        Some(event_to_msg(pending, event))
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

fn event_to_msg(pending: Pending, event: EngineEvent) -> Msg {
    match (pending, event) {
        (Pending::Submit { attempt }, EngineEvent::Submitted { result, .. }) => {
            Msg::SubmitCompleted {
                attempt,
                result: result.map(SearchId::new).map_err(error_info),
            }
        }
        (Pending::Poll { attempt, search_id }, EngineEvent::StatusReceived { result, .. }) => {
            Msg::StatusReceived {
                attempt,
                search_id,
                result: result.map(status_report).map_err(error_info),
            }
        }
        (
            Pending::Fetch {
                attempt,
                search_id,
                request,
            },
            EngineEvent::ResultsReceived { result, .. },
        ) => Msg::ResultsReceived {
            attempt,
            search_id,
            request,
            result: result.map_err(error_info).and_then(result_page),
        },
        (Pending::Corpus { fetch, language }, EngineEvent::CorpusReceived { result, .. }) => {
            Msg::CorpusReceived {
                fetch,
                language,
                result: result.map_err(error_info).and_then(documents),
            }
        }
        (Pending::Ingest, EngineEvent::Ingested { result, .. }) => Msg::IngestCompleted {
            result: result
                .map_err(error_info)
                .and_then(|id| DocumentId::new(id).map_err(|err| malformed("document_id", err))),
        },
        (Pending::Wake { attempt, search_id }, EngineEvent::Woke { .. }) => Msg::Wake {
            attempt,
            search_id,
        },
        (pending, event) => {
            parallels_warn!("Engine event {:?} does not answer {:?}", event, pending);
            Msg::NoOp
        }
    }
}

fn error_info(err: RemoteError) -> ErrorInfo {
    match err.kind {
        FailureKind::Decode => ErrorInfo::malformed(err.message),
        _ => ErrorInfo::transport(err.to_string()),
    }
}

fn malformed(what: &str, err: impl std::fmt::Display) -> ErrorInfo {
    ErrorInfo::malformed(format!("{what}: {err}"))
}

pub(crate) fn search_request(params: &SearchParameters) -> SearchRequest {
    let options = params.options();
    SearchRequest {
        source: params.source().as_str().to_string(),
        target: params.target().as_str().to_string(),
        language: params.language().to_string(),
        unit_type: match options.unit_type {
            UnitType::Word => "word",
            UnitType::Phrase => "phrase",
            UnitType::Line => "line",
        }
        .to_string(),
        method: SearchMethod {
            name: "original".to_string(),
            feature: match options.feature {
                Feature::Form => "form",
                Feature::Lemma => "lemma",
                Feature::Semantic => "semantic",
                Feature::LemmaSemantic => "lemma+semantic",
                Feature::Sound => "sound",
            }
            .to_string(),
            stopwords: options.stoplist_size,
            stoplist_basis: match options.stoplist_basis {
                StoplistBasis::Corpus => "corpus",
                StoplistBasis::Source => "source",
                StoplistBasis::Target => "target",
                StoplistBasis::SourceTarget => "source+target",
            }
            .to_string(),
            score_basis: match options.score_basis {
                ScoreBasis::Word => "word",
                ScoreBasis::Stem => "stem",
            }
            .to_string(),
            freq_basis: match options.frequency_basis {
                FrequencyBasis::Corpus => "corpus",
                FrequencyBasis::Texts => "texts",
            }
            .to_string(),
            max_distance: options.max_distance,
            distance_basis: match options.distance_metric {
                DistanceMetric::Frequency => "frequency",
                DistanceMetric::Span => "span",
            }
            .to_string(),
        },
        min_score: options.min_score,
    }
}

pub(crate) fn results_query(request: &PageRequest) -> ResultsQuery {
    ResultsQuery {
        page: request.page,
        per_page: request.page_size,
        sort_by: match request.sort_key {
            ResultSortKey::Score => "score",
            ResultSortKey::SourceTag => "source_tag",
            ResultSortKey::TargetTag => "target_tag",
            ResultSortKey::MatchedFeatures => "matched_features",
        }
        .to_string(),
        sort_order: match request.direction {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
        .to_string(),
    }
}

fn ingest_upload(request: &IngestRequest) -> IngestUpload {
    let metadata = &request.metadata;
    IngestUpload {
        metadata: IngestMetadataBody {
            author: metadata.author.clone(),
            title: metadata.title.clone(),
            year: metadata.year.get(),
            is_prose: metadata.is_prose,
            language: metadata.language.clone(),
        },
        file: request.file.clone(),
    }
}

fn status_report(response: StatusResponse) -> SearchStatusReport {
    SearchStatusReport {
        status: match response.status {
            WireStatus::Queued => RemoteStatus::Queued,
            WireStatus::Running => RemoteStatus::Running,
            WireStatus::Done => RemoteStatus::Done,
            WireStatus::Error => RemoteStatus::Error,
        },
        stages: response
            .stages
            .into_iter()
            .map(|stage| StageProgress::new(stage.stage, stage.fraction))
            .collect(),
        message: response.message,
    }
}

/// One invalid record fails the whole page.
fn result_page(response: ResultsResponse) -> Result<ResultPage, ErrorInfo> {
    let results = response
        .results
        .into_iter()
        .map(|record| {
            let id = record.id.clone();
            SearchResult::new(SearchResultFields {
                id: record.id,
                source_tag: record.source_tag,
                target_tag: record.target_tag,
                source_snippet: record.source_snippet,
                target_snippet: record.target_snippet,
                highlight: record.highlight,
                matched_features: record.matched_features,
                score: record.score,
            })
            .map_err(|err| malformed(&format!("result {id}"), err))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ResultPage {
        results,
        total_count: response.total_count,
    })
}

fn documents(records: Vec<DocumentRecord>) -> Result<Vec<Document>, ErrorInfo> {
    records.into_iter().map(document).collect()
}

fn document(record: DocumentRecord) -> Result<Document, ErrorInfo> {
    let context = format!("text {}", record.id);
    let id = DocumentId::new(record.id).map_err(|err| malformed(&context, err))?;
    let year = Year::new(record.year).map_err(|err| malformed(&context, err))?;
    Ok(Document::new(
        id,
        record.author,
        record.title,
        year,
        record.is_prose,
        record.language,
    ))
}
