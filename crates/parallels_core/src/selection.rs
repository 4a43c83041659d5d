use crate::{Document, DocumentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSlot {
    Source,
    Target,
    Multitext,
}

/// Which documents are marked as source, target, or multitext comparison.
///
/// A document id occupies at most one slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    source: Option<Document>,
    target: Option<Document>,
    multitext: Vec<Document>,
}

impl SelectionState {
    pub fn source(&self) -> Option<&Document> {
        self.source.as_ref()
    }

    pub fn target(&self) -> Option<&Document> {
        self.target.as_ref()
    }

    pub fn multitext(&self) -> &[Document] {
        &self.multitext
    }

    pub fn slot_of(&self, id: &DocumentId) -> Option<SelectionSlot> {
        if self.source.as_ref().is_some_and(|doc| doc.id() == id) {
            Some(SelectionSlot::Source)
        } else if self.target.as_ref().is_some_and(|doc| doc.id() == id) {
            Some(SelectionSlot::Target)
        } else if self.multitext.iter().any(|doc| doc.id() == id) {
            Some(SelectionSlot::Multitext)
        } else {
            None
        }
    }

    pub fn is_source(&self, id: &DocumentId) -> bool {
        self.slot_of(id) == Some(SelectionSlot::Source)
    }

    pub fn is_target(&self, id: &DocumentId) -> bool {
        self.slot_of(id) == Some(SelectionSlot::Target)
    }

    pub fn is_multitext(&self, id: &DocumentId) -> bool {
        self.slot_of(id) == Some(SelectionSlot::Multitext)
    }

    /// Copy of this state with `id` removed from every slot.
    fn without(&self, id: &DocumentId) -> Self {
        Self {
            source: self.source.clone().filter(|doc| doc.id() != id),
            target: self.target.clone().filter(|doc| doc.id() != id),
            multitext: self
                .multitext
                .iter()
                .filter(|doc| doc.id() != id)
                .cloned()
                .collect(),
        }
    }
}

/// Sole writer of [`SelectionState`]. Each operation computes a complete new
/// state and swaps it in, so no caller can observe a half-applied move.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionManager {
    state: SelectionState,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn select_as_source(&mut self, doc: Document) -> &SelectionState {
        let mut next = self.state.without(doc.id());
        next.source = Some(doc);
        self.replace(next)
    }

    pub fn clear_source(&mut self) -> &SelectionState {
        let next = SelectionState {
            source: None,
            ..self.state.clone()
        };
        self.replace(next)
    }

    pub fn select_as_target(&mut self, doc: Document) -> &SelectionState {
        let mut next = self.state.without(doc.id());
        next.target = Some(doc);
        self.replace(next)
    }

    pub fn clear_target(&mut self) -> &SelectionState {
        let next = SelectionState {
            target: None,
            ..self.state.clone()
        };
        self.replace(next)
    }

    pub fn toggle_multitext(&mut self, doc: Document, included: bool) -> &SelectionState {
        let mut next = self.state.without(doc.id());
        if included {
            next.multitext.push(doc);
        }
        self.replace(next)
    }

    fn replace(&mut self, next: SelectionState) -> &SelectionState {
        self.state = next;
        &self.state
    }
}
