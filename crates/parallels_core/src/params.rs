use crate::{DocumentId, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitType {
    Word,
    #[default]
    Phrase,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Feature {
    Form,
    #[default]
    Lemma,
    Semantic,
    LemmaSemantic,
    Sound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoplistBasis {
    #[default]
    Corpus,
    Source,
    Target,
    SourceTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreBasis {
    #[default]
    Word,
    Stem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrequencyBasis {
    #[default]
    Corpus,
    Texts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    #[default]
    Frequency,
    Span,
}

/// Editable search settings. Source and target come from the selection,
/// everything else lives here until the next submit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub language: String,
    pub unit_type: UnitType,
    pub feature: Feature,
    pub stoplist_size: u32,
    pub stoplist_basis: StoplistBasis,
    pub score_basis: ScoreBasis,
    pub frequency_basis: FrequencyBasis,
    pub max_distance: u32,
    pub distance_metric: DistanceMetric,
    pub min_score: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            language: "latin".to_string(),
            unit_type: UnitType::Phrase,
            feature: Feature::Lemma,
            stoplist_size: 10,
            stoplist_basis: StoplistBasis::Corpus,
            score_basis: ScoreBasis::Word,
            frequency_basis: FrequencyBasis::Corpus,
            max_distance: 10,
            distance_metric: DistanceMetric::Frequency,
            min_score: 6.0,
        }
    }
}

impl SearchOptions {
    /// Combines the options with a source/target pair into submit-ready parameters.
    pub fn build(
        &self,
        source: Option<&DocumentId>,
        target: Option<&DocumentId>,
    ) -> Result<SearchParameters, ValidationError> {
        let source = source.ok_or(ValidationError::MissingSource)?;
        let target = target.ok_or(ValidationError::MissingTarget)?;
        if self.language.trim().is_empty() {
            return Err(ValidationError::EmptyField("language"));
        }
        if !self.min_score.is_finite() || self.min_score < 0.0 {
            return Err(ValidationError::InvalidScore);
        }

        Ok(SearchParameters {
            source: source.clone(),
            target: target.clone(),
            options: self.clone(),
        })
    }
}

/// Fully specified, immutable search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParameters {
    source: DocumentId,
    target: DocumentId,
    options: SearchOptions,
}

impl SearchParameters {
    pub fn source(&self) -> &DocumentId {
        &self.source
    }

    pub fn target(&self) -> &DocumentId {
        &self.target
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn language(&self) -> &str {
        &self.options.language
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> DocumentId {
        DocumentId::new(raw).unwrap()
    }

    #[test]
    fn build_requires_source_and_target() {
        let options = SearchOptions::default();
        assert_eq!(
            options.build(None, Some(&id("t"))),
            Err(ValidationError::MissingSource)
        );
        assert_eq!(
            options.build(Some(&id("s")), None),
            Err(ValidationError::MissingTarget)
        );
    }

    #[test]
    fn build_rejects_blank_language() {
        let options = SearchOptions {
            language: " ".to_string(),
            ..SearchOptions::default()
        };
        assert_eq!(
            options.build(Some(&id("s")), Some(&id("t"))),
            Err(ValidationError::EmptyField("language"))
        );
    }

    #[test]
    fn build_copies_options() {
        let options = SearchOptions {
            stoplist_basis: StoplistBasis::SourceTarget,
            ..SearchOptions::default()
        };
        let params = options.build(Some(&id("s")), Some(&id("t"))).unwrap();
        assert_eq!(params.source().as_str(), "s");
        assert_eq!(params.target().as_str(), "t");
        assert_eq!(params.options().stoplist_basis, StoplistBasis::SourceTarget);
        assert_eq!(params.language(), "latin");
    }
}
