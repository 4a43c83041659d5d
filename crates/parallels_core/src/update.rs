use parallels_logging::parallels_debug;

use crate::{AppState, Document, Effect, IngestOutcome, Msg, SessionError};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::OptionsChanged(options) => {
            // Only the next submit sees these; the running search keeps its own copy.
            state.options = options;
            state.mark_dirty();
            Vec::new()
        }
        Msg::SearchSubmitted => submit_search(&mut state),
        Msg::SearchCleared => {
            state.session.clear();
            state.results_pager.reset_page();
            state.notice = None;
            state.mark_dirty();
            Vec::new()
        }
        Msg::SubmitCompleted { attempt, result } => {
            let effects = state
                .session
                .on_submit_completed(attempt, result, &mut state.gate);
            state.mark_dirty();
            effects
        }
        Msg::StatusReceived {
            attempt,
            search_id,
            result,
        } => {
            let effects = state
                .session
                .on_status(attempt, &search_id, result, &mut state.gate);
            state.mark_dirty();
            effects
        }
        Msg::ResultsReceived {
            attempt,
            search_id,
            request,
            result,
        } => {
            let before = (state.session.status(), state.session.page_request());
            let effects = state
                .session
                .on_results(attempt, &search_id, &request, result, &mut state.gate);
            let after = (state.session.status(), state.session.page_request());
            if before != after {
                state.results_pager.reset_page();
            }
            state.mark_dirty();
            effects
        }
        Msg::Wake { attempt, search_id } => {
            state
                .session
                .on_wake(attempt, &search_id, &mut state.gate)
        }
        Msg::ResultsPageRequested(request) => {
            let effects = match state.session.request_page(request, &mut state.gate) {
                Ok(effects) => {
                    state.notice = None;
                    effects
                }
                Err(err) => {
                    state.notice = Some(err);
                    Vec::new()
                }
            };
            state.mark_dirty();
            effects
        }
        Msg::ResultsSortClicked { key, direction } => {
            state.results_pager.set_sort(key, direction);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ResultsPageChanged(index) => {
            state.results_pager.set_page(index);
            state
                .results_pager
                .clamp_to(state.session.result_buffer().len());
            state.mark_dirty();
            Vec::new()
        }
        Msg::ResultsPageSizeChanged(size) => {
            state.results_pager.set_page_size(size);
            state.mark_dirty();
            Vec::new()
        }
        Msg::LanguageSelected(language) => select_language(&mut state, &language),
        Msg::CorpusReceived {
            fetch,
            language,
            result,
        } => {
            state.gate.release();
            if state.corpus.finish_fetch(fetch, &language, result) {
                let visible = state.corpus_filter.apply(state.corpus.documents()).len();
                state.corpus_pager.clamp_to(visible);
                state.mark_dirty();
            } else {
                parallels_debug!(
                    "Discarding superseded corpus listing fetch={} language={}",
                    fetch,
                    language
                );
            }
            Vec::new()
        }
        Msg::CorpusSortClicked { key, direction } => {
            state.corpus_pager.set_sort(key, direction);
            state.mark_dirty();
            Vec::new()
        }
        Msg::CorpusPageChanged(index) => {
            state.corpus_pager.set_page(index);
            let visible = state.corpus_filter.apply(state.corpus.documents()).len();
            state.corpus_pager.clamp_to(visible);
            state.mark_dirty();
            Vec::new()
        }
        Msg::CorpusPageSizeChanged(size) => {
            state.corpus_pager.set_page_size(size);
            state.mark_dirty();
            Vec::new()
        }
        Msg::CorpusFilterChanged(filter) => {
            if filter != state.corpus_filter {
                state.corpus_filter = filter;
                state.corpus_pager.reset_page();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SourceSelected(document) => {
            state.selection.select_as_source(document);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SourceCleared => {
            state.selection.clear_source();
            state.mark_dirty();
            Vec::new()
        }
        Msg::TargetSelected(document) => {
            state.selection.select_as_target(document);
            state.mark_dirty();
            Vec::new()
        }
        Msg::TargetCleared => {
            state.selection.clear_target();
            state.mark_dirty();
            Vec::new()
        }
        Msg::MultitextToggled { document, included } => {
            state.selection.toggle_multitext(document, included);
            state.mark_dirty();
            Vec::new()
        }
        Msg::IngestRequested(request) => {
            state.mark_dirty();
            if state.gate.try_acquire() {
                state.last_ingest = Some(IngestOutcome::Pending);
                state.notice = None;
                vec![Effect::IngestText { request }]
            } else {
                state.notice = Some(SessionError::Throttled);
                Vec::new()
            }
        }
        Msg::IngestCompleted { result } => {
            state.gate.release();
            state.last_ingest = Some(match result {
                Ok(id) => IngestOutcome::Succeeded(id),
                Err(error) => IngestOutcome::Failed(error),
            });
            state.mark_dirty();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit_search(state: &mut AppState) -> Vec<Effect> {
    let built = {
        let selection = state.selection.state();
        state.options.build(
            selection.source().map(Document::id),
            selection.target().map(Document::id),
        )
    };
    state.mark_dirty();

    let params = match built {
        Ok(params) => params,
        Err(err) => {
            state.notice = Some(err.into());
            return Vec::new();
        }
    };

    match state.session.submit(params, &mut state.gate) {
        Ok(effects) => {
            state.notice = None;
            state.results_pager.reset_page();
            effects
        }
        Err(err) => {
            state.notice = Some(err);
            Vec::new()
        }
    }
}

fn select_language(state: &mut AppState, language: &str) -> Vec<Effect> {
    let language = language.trim();
    if language.is_empty() || !state.corpus.needs_fetch(language) {
        return Vec::new();
    }
    state.corpus_pager.reset_page();
    state.mark_dirty();

    if !state.gate.try_acquire() {
        state.corpus.select_without_fetch(language);
        state.notice = Some(SessionError::Throttled);
        return Vec::new();
    }
    let fetch = state.corpus.begin_fetch(language);
    state.notice = None;
    vec![Effect::FetchCorpus {
        fetch,
        language: language.to_string(),
    }]
}
