use std::fmt::Write;

use parallels_core::{
    AppViewModel, CorpusView, IngestOutcome, SearchResult, SessionStatus, SessionView, Side,
};

/// One-line summary of where the search is, for progress output.
pub fn progress_line(session: &SessionView) -> String {
    let status = match session.status {
        SessionStatus::Idle => "idle",
        SessionStatus::Submitting => "submitting",
        SessionStatus::Polling => "searching",
        SessionStatus::FetchingResults => "loading results",
        SessionStatus::Ready => "ready",
        SessionStatus::Failed => "failed",
    };
    let mut line = match &session.search_id {
        Some(id) => format!("{status} ({id})"),
        None => status.to_string(),
    };
    let stages: Vec<String> = session
        .stage_progress
        .iter()
        .map(|stage| format!("{} {:.0}%", stage.stage, stage.fraction * 100.0))
        .collect();
    if !stages.is_empty() {
        let _ = write!(line, ": {}", stages.join(", "));
    }
    line
}

pub fn results_report(view: &AppViewModel) -> String {
    let session = &view.session;
    let request = session.page_request;
    let server_pages = session
        .total_result_count
        .div_ceil(request.page_size.max(1))
        .max(1);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} results; server page {}/{} ({} loaded)",
        session.total_result_count,
        request.page + 1,
        server_pages,
        view.results.total_items
    );
    if view.results.items.is_empty() {
        let _ = writeln!(out, "No parallels found.");
        return out;
    }
    for (offset, result) in view.results.items.iter().enumerate() {
        let rank = request.page * request.page_size + view.results.first_offset() + offset + 1;
        let _ = writeln!(out, "{}", result_row(rank, result));
    }
    out
}

fn result_row(rank: usize, result: &SearchResult) -> String {
    format!(
        "{rank:>5}. {:>7.2}  {}  |  {}  [{}]\n         S: {}\n         T: {}",
        result.score(),
        result.source_tag(),
        result.target_tag(),
        result.matched_features_label(),
        marked_snippet(result, Side::Source),
        marked_snippet(result, Side::Target),
    )
}

/// Snippet with matched tokens wrapped in `*`.
fn marked_snippet(result: &SearchResult, side: Side) -> String {
    result
        .highlighted_tokens(side)
        .into_iter()
        .map(|(token, matched)| {
            if matched {
                format!("*{token}*")
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn corpus_report(corpus: &CorpusView) -> String {
    let page = &corpus.page;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} texts ({} shown by filter); page {}/{}",
        corpus.language.as_deref().unwrap_or("?"),
        page.total_items,
        page.page_index + 1,
        page.page_count
    );
    for doc in &page.items {
        let _ = writeln!(
            out,
            "{:<16} {:<24} {:<32} {:>9}  {}",
            doc.id(),
            doc.author(),
            doc.title(),
            doc.year().to_string(),
            doc.genre_label()
        );
    }
    out
}

pub fn ingest_line(outcome: &IngestOutcome) -> String {
    match outcome {
        IngestOutcome::Pending => "upload pending".to_string(),
        IngestOutcome::Succeeded(id) => format!("added text {id}"),
        IngestOutcome::Failed(error) => format!("upload failed: {error}"),
    }
}
