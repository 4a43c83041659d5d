use std::collections::BTreeSet;

use crate::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

impl Side {
    fn label(self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Target => "target",
        }
    }
}

/// One matched pair of passages returned by a search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    id: String,
    source_tag: String,
    target_tag: String,
    source_snippet: String,
    target_snippet: String,
    highlight: Vec<(usize, usize)>,
    matched_features: BTreeSet<String>,
    score: f64,
}

/// Raw fields of a result before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResultFields {
    pub id: String,
    pub source_tag: String,
    pub target_tag: String,
    pub source_snippet: String,
    pub target_snippet: String,
    pub highlight: Vec<(usize, usize)>,
    pub matched_features: Vec<String>,
    pub score: f64,
}

impl SearchResult {
    /// Validates raw fields. Highlight indices must address tokens of the
    /// whitespace-split snippets.
    pub fn new(fields: SearchResultFields) -> Result<Self, ValidationError> {
        if fields.id.trim().is_empty() {
            return Err(ValidationError::EmptyField("id"));
        }
        if !fields.score.is_finite() || fields.score < 0.0 {
            return Err(ValidationError::InvalidScore);
        }

        let source_tokens = token_count(&fields.source_snippet);
        let target_tokens = token_count(&fields.target_snippet);
        for &(source_idx, target_idx) in &fields.highlight {
            check_index(Side::Source, source_idx, source_tokens)?;
            check_index(Side::Target, target_idx, target_tokens)?;
        }

        Ok(Self {
            id: fields.id,
            source_tag: fields.source_tag,
            target_tag: fields.target_tag,
            source_snippet: fields.source_snippet,
            target_snippet: fields.target_snippet,
            highlight: fields.highlight,
            matched_features: fields.matched_features.into_iter().collect(),
            score: fields.score,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source_tag(&self) -> &str {
        &self.source_tag
    }

    pub fn target_tag(&self) -> &str {
        &self.target_tag
    }

    pub fn source_snippet(&self) -> &str {
        &self.source_snippet
    }

    pub fn target_snippet(&self) -> &str {
        &self.target_snippet
    }

    pub fn highlight(&self) -> &[(usize, usize)] {
        &self.highlight
    }

    pub fn matched_features(&self) -> &BTreeSet<String> {
        &self.matched_features
    }

    /// Matched features joined for display and for sorting.
    pub fn matched_features_label(&self) -> String {
        self.matched_features
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn snippet(&self, side: Side) -> &str {
        match side {
            Side::Source => &self.source_snippet,
            Side::Target => &self.target_snippet,
        }
    }

    /// Unique token indices of one side, ascending.
    pub fn highlight_indices(&self, side: Side) -> Vec<usize> {
        let indices: BTreeSet<usize> = self
            .highlight
            .iter()
            .map(|&(source, target)| match side {
                Side::Source => source,
                Side::Target => target,
            })
            .collect();
        indices.into_iter().collect()
    }

    pub fn source_highlight_indices(&self) -> Vec<usize> {
        self.highlight_indices(Side::Source)
    }

    pub fn target_highlight_indices(&self) -> Vec<usize> {
        self.highlight_indices(Side::Target)
    }

    /// Snippet tokens of one side, each paired with whether it was matched.
    pub fn highlighted_tokens(&self, side: Side) -> Vec<(&str, bool)> {
        let marked: BTreeSet<usize> = self.highlight_indices(side).into_iter().collect();
        self.snippet(side)
            .split_whitespace()
            .enumerate()
            .map(|(idx, token)| (token, marked.contains(&idx)))
            .collect()
    }
}

fn token_count(snippet: &str) -> usize {
    snippet.split_whitespace().count()
}

fn check_index(side: Side, index: usize, tokens: usize) -> Result<(), ValidationError> {
    if index >= tokens {
        return Err(ValidationError::HighlightOutOfRange {
            side: side.label(),
            index,
            tokens,
        });
    }
    Ok(())
}
