//! Deterministic sort-and-slice projections over a read-only buffer.
//!
//! A [`Pager`] stores only the paging parameters. [`Pager::view`] stable-sorts
//! a copy of the borrowed items and slices one page out of it, so the
//! backing buffer is never reordered.

use std::cmp::Ordering;
use std::fmt;

use crate::{Document, SearchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseSensitivity {
    Sensitive,
    #[default]
    Insensitive,
}

impl CaseSensitivity {
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            CaseSensitivity::Sensitive => a.cmp(b),
            CaseSensitivity::Insensitive => a.to_lowercase().cmp(&b.to_lowercase()),
        }
    }
}

/// Element type that a [`Pager`] can order.
pub trait Sortable: Clone {
    type Key: Copy + Eq + fmt::Debug;

    fn compare_by(&self, other: &Self, key: Self::Key, case: CaseSensitivity) -> Ordering;
}

/// One projected page. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<T, K> {
    pub items: Vec<T>,
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub total_items: usize,
    pub sort_key: K,
    pub direction: SortDirection,
}

impl<T, K> PageView<T, K> {
    /// Zero-based position of the first item of this page in the sorted buffer.
    pub fn first_offset(&self) -> usize {
        self.page_index * self.page_size
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager<K> {
    sort_key: K,
    direction: SortDirection,
    page_index: usize,
    page_size: usize,
    case: CaseSensitivity,
}

impl<K: Copy + Eq + fmt::Debug> Pager<K> {
    pub fn new(sort_key: K, direction: SortDirection, page_size: usize) -> Self {
        Self {
            sort_key,
            direction,
            page_index: 0,
            page_size: page_size.max(1),
            case: CaseSensitivity::default(),
        }
    }

    pub fn with_case(mut self, case: CaseSensitivity) -> Self {
        self.case = case;
        self
    }

    pub fn sort_key(&self) -> K {
        self.sort_key
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn case(&self) -> CaseSensitivity {
        self.case
    }

    /// Same key without an explicit direction flips the direction; anything
    /// else sets the key with the given direction, ascending by default.
    /// A change of key or direction returns to the first page.
    pub fn set_sort(&mut self, key: K, direction: Option<SortDirection>) {
        let next_direction = match direction {
            Some(direction) => direction,
            None if key == self.sort_key => self.direction.flipped(),
            None => SortDirection::Ascending,
        };
        if key != self.sort_key || next_direction != self.direction {
            self.sort_key = key;
            self.direction = next_direction;
            self.page_index = 0;
        }
    }

    /// Out-of-range indices are clamped by [`Pager::view`] and [`Pager::clamp_to`].
    pub fn set_page(&mut self, index: usize) {
        self.page_index = index;
    }

    /// A page size of 0 is raised to 1. A change returns to the first page.
    pub fn set_page_size(&mut self, size: usize) {
        let size = size.max(1);
        if size != self.page_size {
            self.page_size = size;
            self.page_index = 0;
        }
    }

    pub fn reset_page(&mut self) {
        self.page_index = 0;
    }

    pub fn page_count(&self, len: usize) -> usize {
        if len == 0 {
            1
        } else {
            len.div_ceil(self.page_size)
        }
    }

    /// Last valid page for a buffer of `len` items (0 when empty).
    pub fn last_page(&self, len: usize) -> usize {
        self.page_count(len) - 1
    }

    /// Normalizes the stored page index against the current buffer length.
    pub fn clamp_to(&mut self, len: usize) {
        self.page_index = self.page_index.min(self.last_page(len));
    }

    pub fn view<T>(&self, items: &[T]) -> PageView<T, K>
    where
        T: Sortable<Key = K>,
    {
        let ordered = self.sorted(items);
        let page_index = self.page_index.min(self.last_page(items.len()));
        let start = page_index * self.page_size;
        let end = (start + self.page_size).min(ordered.len());
        let page = ordered
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|item| (*item).clone())
            .collect();

        PageView {
            items: page,
            page_index,
            page_size: self.page_size,
            page_count: self.page_count(items.len()),
            total_items: items.len(),
            sort_key: self.sort_key,
            direction: self.direction,
        }
    }

    /// Stable ordering of references; ties keep buffer order in both directions.
    fn sorted<'a, T>(&self, items: &'a [T]) -> Vec<&'a T>
    where
        T: Sortable<Key = K>,
    {
        let mut ordered: Vec<&T> = items.iter().collect();
        ordered.sort_by(|a, b| {
            let ord = a.compare_by(b, self.sort_key, self.case);
            match self.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
        ordered
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSortKey {
    Score,
    SourceTag,
    TargetTag,
    MatchedFeatures,
}

impl Sortable for SearchResult {
    type Key = ResultSortKey;

    fn compare_by(&self, other: &Self, key: ResultSortKey, case: CaseSensitivity) -> Ordering {
        match key {
            ResultSortKey::Score => self.score().total_cmp(&other.score()),
            ResultSortKey::SourceTag => case.compare(self.source_tag(), other.source_tag()),
            ResultSortKey::TargetTag => case.compare(self.target_tag(), other.target_tag()),
            ResultSortKey::MatchedFeatures => case.compare(
                &self.matched_features_label(),
                &other.matched_features_label(),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSortKey {
    Author,
    Title,
    Year,
    Genre,
}

impl Sortable for Document {
    type Key = DocumentSortKey;

    fn compare_by(&self, other: &Self, key: DocumentSortKey, case: CaseSensitivity) -> Ordering {
        match key {
            DocumentSortKey::Author => case.compare(self.author(), other.author()),
            DocumentSortKey::Title => case.compare(self.title(), other.title()),
            DocumentSortKey::Year => self.year().cmp(&other.year()),
            DocumentSortKey::Genre => self.genre_label().cmp(other.genre_label()),
        }
    }
}

pub type ResultsPager = Pager<ResultSortKey>;
pub type CorpusPager = Pager<DocumentSortKey>;

/// Page sizes offered for the results table.
pub const RESULTS_PAGE_SIZES: [usize; 4] = [50, 100, 200, 500];
pub const DEFAULT_RESULTS_PAGE_SIZE: usize = 100;
pub const DEFAULT_CORPUS_PAGE_SIZE: usize = 10;

impl Pager<ResultSortKey> {
    /// Highest score first.
    pub fn for_results(page_size: usize) -> Self {
        Self::new(ResultSortKey::Score, SortDirection::Descending, page_size)
    }
}

impl Pager<DocumentSortKey> {
    pub fn for_corpus(page_size: usize) -> Self {
        Self::new(DocumentSortKey::Author, SortDirection::Ascending, page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocumentId, SearchResultFields, Year};

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        score: f64,
        name: &'static str,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum RowKey {
        Score,
        Name,
    }

    impl Sortable for Row {
        type Key = RowKey;

        fn compare_by(&self, other: &Self, key: RowKey, case: CaseSensitivity) -> Ordering {
            match key {
                RowKey::Score => self.score.total_cmp(&other.score),
                RowKey::Name => case.compare(self.name, other.name),
            }
        }
    }

    fn row(id: u32, score: f64) -> Row {
        Row {
            id,
            score,
            name: "",
        }
    }

    fn ids<K>(view: &PageView<Row, K>) -> Vec<u32> {
        view.items.iter().map(|r| r.id).collect()
    }

    #[test]
    fn descending_sort_is_stable() {
        let rows = vec![row(1, 5.0), row(2, 5.0), row(3, 3.0)];
        let pager = Pager::new(RowKey::Score, SortDirection::Descending, 10);
        assert_eq!(ids(&pager.view(&rows)), vec![1, 2, 3]);
    }

    #[test]
    fn ascending_sort_is_stable() {
        let rows = vec![row(1, 5.0), row(2, 3.0), row(3, 5.0)];
        let pager = Pager::new(RowKey::Score, SortDirection::Ascending, 10);
        assert_eq!(ids(&pager.view(&rows)), vec![2, 1, 3]);
    }

    #[test]
    fn view_does_not_reorder_buffer() {
        let rows = vec![row(1, 1.0), row(2, 9.0)];
        let before = rows.clone();
        let pager = Pager::new(RowKey::Score, SortDirection::Descending, 10);
        let _ = pager.view(&rows);
        assert_eq!(rows, before);
    }

    #[test]
    fn toggling_same_key_twice_restores_direction() {
        let mut pager = Pager::new(RowKey::Score, SortDirection::Ascending, 4);
        pager.set_sort(RowKey::Score, None);
        assert_eq!(pager.direction(), SortDirection::Descending);
        pager.set_sort(RowKey::Score, None);
        assert_eq!(pager.direction(), SortDirection::Ascending);
    }

    #[test]
    fn new_key_resets_direction_and_page() {
        let mut pager = Pager::new(RowKey::Score, SortDirection::Descending, 4);
        pager.set_page(2);
        pager.set_sort(RowKey::Name, None);
        assert_eq!(pager.sort_key(), RowKey::Name);
        assert_eq!(pager.direction(), SortDirection::Ascending);
        assert_eq!(pager.page_index(), 0);
    }

    #[test]
    fn explicit_direction_is_respected() {
        let mut pager = Pager::new(RowKey::Score, SortDirection::Ascending, 4);
        pager.set_sort(RowKey::Name, Some(SortDirection::Descending));
        assert_eq!(pager.direction(), SortDirection::Descending);
        pager.set_sort(RowKey::Name, Some(SortDirection::Descending));
        assert_eq!(pager.direction(), SortDirection::Descending);
    }

    #[test]
    fn page_change_keeps_sort() {
        let mut pager = Pager::new(RowKey::Score, SortDirection::Descending, 4);
        pager.set_page(1);
        assert_eq!(pager.page_index(), 1);
        assert_eq!(pager.direction(), SortDirection::Descending);
        assert_eq!(pager.sort_key(), RowKey::Score);
    }

    #[test]
    fn page_size_change_resets_page() {
        let mut pager = Pager::new(RowKey::Score, SortDirection::Descending, 4);
        pager.set_page(2);
        pager.set_page_size(5);
        assert_eq!(pager.page_index(), 0);
        assert_eq!(pager.page_size(), 5);

        pager.set_page_size(0);
        assert_eq!(pager.page_size(), 1);
    }

    #[test]
    fn out_of_range_page_clamps_to_last_page() {
        let rows: Vec<Row> = (0..10).map(|i| row(i, f64::from(i))).collect();
        let mut pager = Pager::new(RowKey::Score, SortDirection::Ascending, 4);

        pager.set_page(2);
        let last = pager.view(&rows);
        pager.set_page(5);
        let clamped = pager.view(&rows);

        assert_eq!(clamped, last);
        assert_eq!(clamped.page_index, 2);
        assert_eq!(ids(&clamped), vec![8, 9]);
        assert_eq!(clamped.page_count, 3);
    }

    #[test]
    fn empty_buffer_yields_empty_first_page() {
        let rows: Vec<Row> = Vec::new();
        let mut pager = Pager::new(RowKey::Score, SortDirection::Ascending, 4);
        pager.set_page(3);
        let view = pager.view(&rows);
        assert!(view.items.is_empty());
        assert_eq!(view.page_index, 0);
        assert_eq!(view.page_count, 1);
    }

    #[test]
    fn clamp_to_normalizes_stored_index() {
        let mut pager = Pager::new(RowKey::Score, SortDirection::Ascending, 4);
        pager.set_page(9);
        pager.clamp_to(10);
        assert_eq!(pager.page_index(), 2);
    }

    #[test]
    fn case_policy_is_explicit() {
        let rows = vec![
            Row {
                id: 1,
                score: 0.0,
                name: "beta",
            },
            Row {
                id: 2,
                score: 0.0,
                name: "Alpha",
            },
            Row {
                id: 3,
                score: 0.0,
                name: "alpha",
            },
        ];
        let insensitive = Pager::new(RowKey::Name, SortDirection::Ascending, 10);
        assert_eq!(ids(&insensitive.view(&rows)), vec![2, 3, 1]);

        let sensitive = insensitive.clone().with_case(CaseSensitivity::Sensitive);
        assert_eq!(ids(&sensitive.view(&rows)), vec![2, 3, 1]);

        let rows = vec![rows[0].clone(), rows[2].clone(), rows[1].clone()];
        assert_eq!(ids(&insensitive.view(&rows)), vec![3, 2, 1]);
        assert_eq!(ids(&sensitive.view(&rows)), vec![2, 3, 1]);
    }

    #[test]
    fn documents_sort_by_year_numerically() {
        let doc = |id: &str, year: i32| {
            Document::new(
                DocumentId::new(id).unwrap(),
                "a",
                "t",
                Year::new(year).unwrap(),
                false,
                "latin",
            )
        };
        let docs = vec![doc("late", 1), doc("early", -200), doc("mid", -19)];
        let mut pager = CorpusPager::for_corpus(10);
        pager.set_sort(DocumentSortKey::Year, None);
        let order: Vec<_> = pager
            .view(&docs)
            .items
            .iter()
            .map(|d| d.id().as_str().to_string())
            .collect();
        assert_eq!(order, vec!["early", "mid", "late"]);
    }

    #[test]
    fn results_default_to_score_descending() {
        let result = |id: &str, score: f64| {
            SearchResult::new(SearchResultFields {
                id: id.to_string(),
                score,
                ..SearchResultFields::default()
            })
            .unwrap()
        };
        let results = vec![result("1", 5.0), result("2", 5.0), result("3", 9.0)];
        let pager = ResultsPager::for_results(DEFAULT_RESULTS_PAGE_SIZE);
        let order: Vec<_> = pager.view(&results).items.iter().map(|r| r.id().to_string()).collect();
        assert_eq!(order, vec!["3", "1", "2"]);
    }
}
