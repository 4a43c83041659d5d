use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use parallels_logging::{parallels_debug, parallels_info, parallels_warn};
use tokio_util::sync::CancellationToken;

use crate::client::{ClientSettings, RemoteSearchClient, ReqwestSearchClient};
use crate::{
    EngineError, EngineEvent, FailureKind, IngestBody, IngestUpload, RemoteError, ResultsQuery,
    SearchRequest, Ticket,
};

enum EngineCommand {
    Submit {
        ticket: Ticket,
        request: SearchRequest,
    },
    PollStatus {
        ticket: Ticket,
        search_id: String,
    },
    FetchResults {
        ticket: Ticket,
        search_id: String,
        query: ResultsQuery,
    },
    FetchCorpus {
        ticket: Ticket,
        language: String,
    },
    Ingest {
        ticket: Ticket,
        upload: IngestUpload,
    },
    Wake {
        ticket: Ticket,
        after: Duration,
    },
}

/// Runs remote calls and timers on a background runtime. Every command is
/// answered by exactly one [`EngineEvent`] carrying the same ticket, unless
/// the engine shuts down first.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    shutdown: CancellationToken,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let client = ReqwestSearchClient::new(settings).map_err(EngineError::Client)?;
        Self::with_client(Arc::new(client))
    }

    pub fn with_client(client: Arc<dyn RemoteSearchClient>) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let event_tx = event_tx.clone();
                let token = token.clone();
                runtime.spawn(async move {
                    handle_command(client.as_ref(), command, event_tx, token).await;
                });
            }
            parallels_debug!("Engine command channel closed");
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            shutdown,
        })
    }

    pub fn submit(&self, ticket: Ticket, request: SearchRequest) {
        self.send(EngineCommand::Submit { ticket, request });
    }

    pub fn poll_status(&self, ticket: Ticket, search_id: impl Into<String>) {
        self.send(EngineCommand::PollStatus {
            ticket,
            search_id: search_id.into(),
        });
    }

    pub fn fetch_results(&self, ticket: Ticket, search_id: impl Into<String>, query: ResultsQuery) {
        self.send(EngineCommand::FetchResults {
            ticket,
            search_id: search_id.into(),
            query,
        });
    }

    pub fn fetch_corpus(&self, ticket: Ticket, language: impl Into<String>) {
        self.send(EngineCommand::FetchCorpus {
            ticket,
            language: language.into(),
        });
    }

    pub fn ingest(&self, ticket: Ticket, upload: IngestUpload) {
        self.send(EngineCommand::Ingest { ticket, upload });
    }

    /// Answers with [`EngineEvent::Woke`] once `after` has elapsed.
    pub fn schedule_wake(&self, ticket: Ticket, after: Duration) {
        self.send(EngineCommand::Wake { ticket, after });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Cancels pending wakes. Calls already in flight finish, but their
    /// events may never be read.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            parallels_warn!("Engine worker is gone; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_command(
    client: &dyn RemoteSearchClient,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
    shutdown: CancellationToken,
) {
    let event = match command {
        EngineCommand::Submit { ticket, request } => {
            parallels_info!(
                "Submitting search source={} target={}",
                request.source,
                request.target
            );
            EngineEvent::Submitted {
                ticket,
                result: client.submit(&request).await,
            }
        }
        EngineCommand::PollStatus { ticket, search_id } => EngineEvent::StatusReceived {
            ticket,
            result: client.poll_status(&search_id).await,
        },
        EngineCommand::FetchResults {
            ticket,
            search_id,
            query,
        } => {
            parallels_info!(
                "Fetching results search_id={} page={} per_page={}",
                search_id,
                query.page,
                query.per_page
            );
            EngineEvent::ResultsReceived {
                ticket,
                result: client.fetch_results(&search_id, &query).await,
            }
        }
        EngineCommand::FetchCorpus { ticket, language } => {
            parallels_info!("Fetching corpus language={}", language);
            EngineEvent::CorpusReceived {
                ticket,
                result: client.fetch_corpus(&language).await,
            }
        }
        EngineCommand::Ingest { ticket, upload } => EngineEvent::Ingested {
            ticket,
            result: ingest(client, upload).await,
        },
        EngineCommand::Wake { ticket, after } => {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    parallels_debug!("Wake ticket={} cancelled by shutdown", ticket);
                    return;
                }
                _ = tokio::time::sleep(after) => EngineEvent::Woke { ticket },
            }
        }
    };

    let _ = event_tx.send(event);
}

async fn ingest(
    client: &dyn RemoteSearchClient,
    upload: IngestUpload,
) -> Result<String, RemoteError> {
    let content = tokio::fs::read_to_string(&upload.file).await.map_err(|err| {
        RemoteError::new(
            FailureKind::Io,
            format!("{}: {err}", upload.file.display()),
        )
    })?;
    parallels_info!(
        "Uploading {} ({} bytes) title={}",
        upload.file.display(),
        content.len(),
        upload.metadata.title
    );
    let body = IngestBody {
        metadata: upload.metadata,
        content,
    };
    client.ingest(&body).await
}
