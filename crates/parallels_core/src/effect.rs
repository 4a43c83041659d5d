use std::time::Duration;

use crate::{Attempt, CorpusFetch, IngestRequest, PageRequest, SearchId, SearchParameters};

/// Work the update function asks the outside world to perform. Every variant
/// except `ScheduleWake` is a remote call that already holds a gate slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Submit {
        attempt: Attempt,
        params: SearchParameters,
    },
    PollStatus {
        attempt: Attempt,
        search_id: SearchId,
    },
    FetchResults {
        attempt: Attempt,
        search_id: SearchId,
        request: PageRequest,
    },
    FetchCorpus {
        fetch: CorpusFetch,
        language: String,
    },
    IngestText {
        request: IngestRequest,
    },
    /// Deliver `Msg::Wake { attempt, search_id }` once `after` has elapsed.
    ScheduleWake {
        attempt: Attempt,
        search_id: SearchId,
        after: Duration,
    },
}

impl Effect {
    pub fn is_remote_call(&self) -> bool {
        !matches!(self, Effect::ScheduleWake { .. })
    }
}
