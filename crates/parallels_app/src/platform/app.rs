use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use parallels_core::{
    update, AppState, CorpusFilter, Document, IngestDraft, IngestOutcome, Msg, PageRequest,
    SearchOptions, SessionStatus, SortDirection, Year,
};
use parallels_engine::EngineHandle;
use parallels_logging::{parallels_debug, parallels_info, set_dispatch_seq};

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::logging;
use super::ui::render;
use crate::cli::{Cli, Commands, CorpusArgs, IngestArgs, SearchArgs};

const CORPUS_TIMEOUT: Duration = Duration::from_secs(60);
const SEARCH_TIMEOUT: Duration = Duration::from_secs(600);
const INGEST_TIMEOUT: Duration = Duration::from_secs(300);

pub fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    logging::initialize(config.log.destination, config.log_level()?);
    parallels_info!("Using API at {}", config.api.base_url);

    let mut app = App::new(&config)?;
    let result = match cli.command {
        Commands::Corpus(args) => app.corpus(args),
        Commands::Search(args) => app.search(args),
        Commands::Ingest(args) => app.ingest(args),
    };
    app.runner.shutdown();
    result
}

/// Drives the core state machine against the live engine.
struct App {
    state: AppState,
    runner: EffectRunner,
    seq: u64,
    last_progress: String,
}

impl App {
    fn new(config: &AppConfig) -> Result<Self> {
        let engine = EngineHandle::new(config.client_settings()?)
            .context("starting the request engine")?;
        Ok(Self {
            state: AppState::with_config(config.core_config()),
            runner: EffectRunner::new(engine),
            seq: 0,
            last_progress: String::new(),
        })
    }

    fn dispatch(&mut self, msg: Msg) {
        self.seq += 1;
        set_dispatch_seq(self.seq);
        parallels_debug!("Dispatch #{} {:?}", self.seq, msg);

        let state = std::mem::take(&mut self.state);
        let (next, effects) = update(state, msg);
        self.state = next;
        self.runner.enqueue(effects);

        if self.state.consume_dirty() {
            self.report_progress();
        }
    }

    /// Fails if the last request was refused by the core.
    fn dispatch_checked(&mut self, msg: Msg) -> Result<()> {
        self.dispatch(msg);
        match self.state.notice() {
            Some(notice) => Err(anyhow!(notice.clone())),
            None => Ok(()),
        }
    }

    fn run_until(
        &mut self,
        what: &str,
        timeout: Duration,
        settled: impl Fn(&AppState) -> bool,
    ) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while !settled(&self.state) {
            if !self.runner.has_pending() {
                bail!("stalled while waiting for {what}");
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                bail!("timed out waiting for {what}");
            }
            if let Some(msg) = self.runner.next_msg(remaining) {
                self.dispatch(msg);
            }
        }
        Ok(())
    }

    fn report_progress(&mut self) {
        if !self.state.session().is_loading() {
            return;
        }
        let line = render::progress_line(&self.state.view().session);
        if line != self.last_progress {
            eprintln!("{line}");
            self.last_progress = line;
        }
    }

    fn load_corpus(&mut self, language: &str) -> Result<()> {
        self.dispatch_checked(Msg::LanguageSelected(language.to_string()))?;
        let language = language.trim().to_string();
        self.run_until("the corpus listing", CORPUS_TIMEOUT, |state| {
            let corpus = state.corpus();
            corpus.language() == Some(language.as_str()) && !corpus.is_loading()
        })?;
        if let Some(error) = self.state.corpus().error() {
            bail!("listing {language} texts failed: {error}");
        }
        Ok(())
    }

    fn find_document(&self, id: &str) -> Result<Document> {
        self.state
            .corpus()
            .documents()
            .iter()
            .find(|doc| doc.id().as_str() == id)
            .cloned()
            .ok_or_else(|| anyhow!("no text with id `{id}` in the corpus"))
    }

    fn corpus(&mut self, args: CorpusArgs) -> Result<()> {
        self.load_corpus(&args.language)?;

        self.dispatch(Msg::CorpusFilterChanged(CorpusFilter {
            author: args.author.unwrap_or_default(),
            title: args.title.unwrap_or_default(),
            genre: args.genre.into(),
            ..CorpusFilter::default()
        }));
        self.dispatch(Msg::CorpusSortClicked {
            key: args.sort.into(),
            direction: Some(direction(args.desc)),
        });
        if let Some(size) = args.page_size {
            self.dispatch(Msg::CorpusPageSizeChanged(size));
        }
        self.dispatch(Msg::CorpusPageChanged(args.page));

        print!("{}", render::corpus_report(&self.state.view().corpus));
        Ok(())
    }

    fn search(&mut self, args: SearchArgs) -> Result<()> {
        self.load_corpus(&args.language)?;
        let source = self.find_document(&args.source)?;
        let target = self.find_document(&args.target)?;

        self.dispatch(Msg::SourceSelected(source));
        self.dispatch(Msg::TargetSelected(target));
        self.dispatch(Msg::OptionsChanged(SearchOptions {
            language: args.language.trim().to_string(),
            unit_type: args.unit.into(),
            feature: args.feature.into(),
            stoplist_size: args.stoplist,
            stoplist_basis: args.stoplist_basis.into(),
            max_distance: args.max_distance,
            min_score: args.min_score,
            ..SearchOptions::default()
        }));
        self.dispatch_checked(Msg::SearchSubmitted)?;
        self.run_until("search results", SEARCH_TIMEOUT, settled_session)?;
        self.fail_if_search_failed()?;

        let default_size = self.state.config().session.default_page_size;
        let page_size = args.page_size.unwrap_or(default_size).max(1);
        if args.page != 0 || page_size != self.state.session().page_request().page_size {
            self.dispatch_checked(Msg::ResultsPageRequested(PageRequest {
                page: args.page,
                ..PageRequest::first(page_size)
            }))?;
            self.run_until("the requested page", SEARCH_TIMEOUT, settled_session)?;
            self.fail_if_search_failed()?;
        }
        self.dispatch(Msg::ResultsPageSizeChanged(page_size));

        print!("{}", render::results_report(&self.state.view()));
        Ok(())
    }

    fn fail_if_search_failed(&self) -> Result<()> {
        let session = self.state.session();
        if session.status() == SessionStatus::Failed {
            let error = session
                .error()
                .map(ToString::to_string)
                .unwrap_or_else(|| "unknown error".to_string());
            bail!("search failed: {error}");
        }
        Ok(())
    }

    fn ingest(&mut self, args: IngestArgs) -> Result<()> {
        Year::new(args.year).context("invalid --year")?;
        let mut draft = IngestDraft::new();
        draft.author = args.author;
        draft.title = args.title;
        draft.is_prose = args.prose;
        draft.language = args.language;
        draft.file = Some(args.file);
        draft.set_year(args.year);
        let request = draft.build().context("incomplete text metadata")?;

        self.dispatch_checked(Msg::IngestRequested(request))?;
        self.run_until("the upload", INGEST_TIMEOUT, |state| {
            !matches!(state.last_ingest(), Some(IngestOutcome::Pending))
        })?;

        match self.state.last_ingest() {
            Some(IngestOutcome::Failed(error)) => bail!("upload failed: {error}"),
            Some(outcome) => {
                println!("{}", render::ingest_line(outcome));
                Ok(())
            }
            None => bail!("upload was never started"),
        }
    }
}

fn settled_session(state: &AppState) -> bool {
    let session = state.session();
    matches!(
        session.status(),
        SessionStatus::Ready | SessionStatus::Failed
    ) && !session.is_loading()
}

fn direction(descending: bool) -> SortDirection {
    if descending {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    }
}
