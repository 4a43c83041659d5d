use std::path::PathBuf;
use std::sync::Once;

use parallels_core::{
    update, AppState, CoreConfig, CorpusFilter, Document, DocumentId, DocumentSortKey, Effect,
    ErrorInfo, GenreFilter, IngestDraft, IngestOutcome, Msg, SelectionSlot, SessionError, Year,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(parallels_logging::initialize_for_tests);
}

fn doc(id: &str, author: &str, title: &str, year: i32, prose: bool) -> Document {
    Document::new(
        DocumentId::new(id).unwrap(),
        author,
        title,
        Year::new(year).unwrap(),
        prose,
        "latin",
    )
}

fn latin_corpus() -> Vec<Document> {
    vec![
        doc("1", "vergil", "Aeneid", -19, false),
        doc("2", "Lucan", "Bellum Civile", 65, false),
        doc("3", "Cicero", "De Officiis", -44, true),
        doc("4", "Ovid", "Metamorphoses", 8, false),
        doc("5", "Statius", "Thebaid", 92, false),
    ]
}

fn loaded(corpus: Vec<Document>) -> AppState {
    let (state, effects) = update(AppState::new(), Msg::LanguageSelected("latin".to_string()));
    assert_eq!(
        effects,
        vec![Effect::FetchCorpus {
            fetch: 1,
            language: "latin".to_string()
        }]
    );
    let (state, _) = update(
        state,
        Msg::CorpusReceived {
            fetch: 1,
            language: "latin".to_string(),
            result: Ok(corpus),
        },
    );
    state
}

fn authors(state: &AppState) -> Vec<String> {
    state
        .view()
        .corpus
        .page
        .items
        .iter()
        .map(|d| d.author().to_string())
        .collect()
}

#[test]
fn corpus_lists_by_author_case_insensitively() {
    init_logging();
    let state = loaded(latin_corpus());
    let view = state.view();

    assert_eq!(view.corpus.language.as_deref(), Some("latin"));
    assert!(!view.corpus.loading);
    assert_eq!(view.corpus.total_documents, 5);
    assert_eq!(view.in_flight, 0);
    assert_eq!(
        authors(&state),
        vec!["Cicero", "Lucan", "Ovid", "Statius", "vergil"]
    );
}

#[test]
fn reselecting_loaded_language_does_not_refetch() {
    init_logging();
    let state = loaded(latin_corpus());
    let (_, effects) = update(state, Msg::LanguageSelected(" latin ".to_string()));
    assert!(effects.is_empty());
}

#[test]
fn late_listing_for_previous_language_is_dropped() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::LanguageSelected("latin".to_string()));
    let (state, _) = update(state, Msg::LanguageSelected("greek".to_string()));
    assert_eq!(state.view().in_flight, 2);

    let (state, _) = update(
        state,
        Msg::CorpusReceived {
            fetch: 1,
            language: "latin".to_string(),
            result: Ok(latin_corpus()),
        },
    );
    let view = state.view();
    assert_eq!(view.corpus.language.as_deref(), Some("greek"));
    assert!(view.corpus.loading);
    assert_eq!(view.corpus.total_documents, 0);
    assert_eq!(view.in_flight, 1);
}

#[test]
fn returning_to_a_language_ignores_its_earlier_listing() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::LanguageSelected("latin".to_string()));
    let (state, _) = update(state, Msg::LanguageSelected("greek".to_string()));
    let (state, effects) = update(state, Msg::LanguageSelected("latin".to_string()));
    assert_eq!(
        effects,
        vec![Effect::FetchCorpus {
            fetch: 3,
            language: "latin".to_string()
        }]
    );

    let (state, effects) = update(state, Msg::LanguageSelected("latin".to_string()));
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::CorpusReceived {
            fetch: 1,
            language: "latin".to_string(),
            result: Ok(Vec::new()),
        },
    );
    assert!(state.view().corpus.loading);

    let (state, _) = update(
        state,
        Msg::CorpusReceived {
            fetch: 3,
            language: "latin".to_string(),
            result: Ok(latin_corpus()),
        },
    );
    let view = state.view();
    assert!(!view.corpus.loading);
    assert_eq!(view.corpus.total_documents, 5);
}

#[test]
fn corpus_fetch_error_is_reported() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::LanguageSelected("latin".to_string()));
    let (state, _) = update(
        state,
        Msg::CorpusReceived {
            fetch: 1,
            language: "latin".to_string(),
            result: Err(ErrorInfo::transport("HTTP 503")),
        },
    );

    let view = state.view();
    assert_eq!(view.corpus.error, Some(ErrorInfo::transport("HTTP 503")));
    assert!(!view.corpus.loading);
}

#[test]
fn corpus_sort_filter_and_paging() {
    init_logging();
    let state = loaded(latin_corpus());

    let (state, _) = update(
        state,
        Msg::CorpusSortClicked {
            key: DocumentSortKey::Year,
            direction: None,
        },
    );
    let years: Vec<i32> = state
        .view()
        .corpus
        .page
        .items
        .iter()
        .map(|d| d.year().get())
        .collect();
    assert_eq!(years, vec![-44, -19, 8, 65, 92]);

    let (state, _) = update(state, Msg::CorpusPageSizeChanged(2));
    let (state, _) = update(state, Msg::CorpusPageChanged(2));
    assert_eq!(authors(&state), vec!["Statius"]);

    let (state, _) = update(
        state,
        Msg::CorpusFilterChanged(CorpusFilter {
            genre: GenreFilter::Prose,
            ..CorpusFilter::default()
        }),
    );
    let view = state.view();
    assert_eq!(view.corpus.page.page_index, 0);
    assert_eq!(view.corpus.page.total_items, 1);
    assert_eq!(authors(&state), vec!["Cicero"]);
}

#[test]
fn selection_messages_keep_slots_exclusive() {
    init_logging();
    let aeneid = doc("1", "Vergil", "Aeneid", -19, false);
    let thebaid = doc("5", "Statius", "Thebaid", 92, false);

    let (state, _) = update(AppState::new(), Msg::SourceSelected(aeneid.clone()));
    let (state, _) = update(state, Msg::TargetSelected(aeneid.clone()));
    let selection = state.view().selection;
    assert_eq!(selection.source(), None);
    assert_eq!(selection.target(), Some(&aeneid));

    let (state, _) = update(state, Msg::SourceSelected(thebaid.clone()));
    let (state, _) = update(
        state,
        Msg::MultitextToggled {
            document: thebaid.clone(),
            included: true,
        },
    );
    let selection = state.view().selection;
    assert_eq!(selection.source(), None);
    assert_eq!(selection.slot_of(thebaid.id()), Some(SelectionSlot::Multitext));
    assert_eq!(selection.slot_of(aeneid.id()), Some(SelectionSlot::Target));

    let (state, _) = update(state, Msg::TargetCleared);
    assert_eq!(state.view().selection.target(), None);
    assert_eq!(state.view().selection.multitext(), &[thebaid][..]);
}

#[test]
fn full_gate_throttles_new_calls() {
    init_logging();
    let config = CoreConfig {
        max_concurrent_requests: 1,
        ..CoreConfig::default()
    };
    let (state, effects) = update(
        AppState::with_config(config),
        Msg::LanguageSelected("latin".to_string()),
    );
    assert_eq!(effects.len(), 1);

    let (state, _) = update(state, Msg::SourceSelected(doc("1", "Vergil", "Aeneid", -19, false)));
    let (state, _) = update(state, Msg::TargetSelected(doc("5", "Statius", "Thebaid", 92, false)));
    let (state, effects) = update(state, Msg::SearchSubmitted);

    assert!(effects.is_empty());
    assert_eq!(state.view().notice, Some(SessionError::Throttled));
    assert_eq!(state.view().in_flight, 1);
}

#[test]
fn ingest_round_trip_records_outcome() {
    init_logging();
    let mut draft = IngestDraft::new();
    draft.author = "Silius Italicus".to_string();
    draft.title = "Punica".to_string();
    draft.language = "latin".to_string();
    draft.file = Some(PathBuf::from("punica.tess"));
    draft.set_year(-26);
    let request = draft.build().unwrap();

    let (state, effects) = update(AppState::new(), Msg::IngestRequested(request.clone()));
    assert_eq!(effects, vec![Effect::IngestText { request }]);
    assert_eq!(state.view().last_ingest, Some(IngestOutcome::Pending));

    let id = DocumentId::new("punica-1").unwrap();
    let (state, _) = update(
        state,
        Msg::IngestCompleted {
            result: Ok(id.clone()),
        },
    );
    assert_eq!(state.view().last_ingest, Some(IngestOutcome::Succeeded(id)));
    assert_eq!(state.view().in_flight, 0);
}
