use crate::{Document, ErrorInfo, Year};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenreFilter {
    #[default]
    All,
    Poetry,
    Prose,
}

/// Narrows the corpus listing before it is paged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CorpusFilter {
    /// Case-insensitive substring of the author.
    pub author: String,
    /// Case-insensitive substring of the title.
    pub title: String,
    pub genre: GenreFilter,
    /// Inclusive bounds; `None` leaves that side open.
    pub years: (Option<Year>, Option<Year>),
}

impl CorpusFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        contains_folded(doc.author(), &self.author)
            && contains_folded(doc.title(), &self.title)
            && match self.genre {
                GenreFilter::All => true,
                GenreFilter::Poetry => !doc.is_prose(),
                GenreFilter::Prose => doc.is_prose(),
            }
            && self.years.0.is_none_or(|from| doc.year() >= from)
            && self.years.1.is_none_or(|to| doc.year() <= to)
    }

    /// Matching documents in buffer order.
    pub fn apply(&self, docs: &[Document]) -> Vec<Document> {
        docs.iter().filter(|doc| self.matches(doc)).cloned().collect()
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Sequence number of a corpus listing request. Only the latest one is applied.
pub type CorpusFetch = u64;

/// Documents available for one language, as last fetched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CorpusCatalog {
    language: Option<String>,
    documents: Vec<Document>,
    loading: bool,
    error: Option<ErrorInfo>,
    fetch: CorpusFetch,
}

impl CorpusCatalog {
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    /// Whether selecting `language` needs a fresh listing.
    pub(crate) fn needs_fetch(&self, language: &str) -> bool {
        self.language.as_deref() != Some(language) || (self.documents.is_empty() && !self.loading)
    }

    pub(crate) fn begin_fetch(&mut self, language: &str) -> CorpusFetch {
        if self.language.as_deref() != Some(language) {
            self.documents.clear();
        }
        self.language = Some(language.to_string());
        self.loading = true;
        self.error = None;
        self.fetch += 1;
        self.fetch
    }

    /// Switches language without a fetch in flight (used when the gate is full).
    pub(crate) fn select_without_fetch(&mut self, language: &str) {
        if self.language.as_deref() != Some(language) {
            self.documents.clear();
            self.language = Some(language.to_string());
        }
        self.loading = false;
    }

    /// Applies a listing; returns false unless it answers the latest fetch.
    pub(crate) fn finish_fetch(
        &mut self,
        fetch: CorpusFetch,
        language: &str,
        result: Result<Vec<Document>, ErrorInfo>,
    ) -> bool {
        if !self.loading || fetch != self.fetch || self.language.as_deref() != Some(language) {
            return false;
        }
        self.loading = false;
        match result {
            Ok(documents) => {
                self.documents = documents;
                self.error = None;
            }
            Err(error) => self.error = Some(error),
        }
        true
    }
}
