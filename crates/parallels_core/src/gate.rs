/// Bounded counter of outstanding remote calls.
///
/// Every effect that performs a remote call acquires one slot, and the message
/// that reports its outcome releases it, stale or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncGate {
    in_flight: usize,
    max_concurrent: usize,
}

impl AsyncGate {
    /// A ceiling of 0 is raised to 1.
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            in_flight: 0,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn try_acquire(&mut self) -> bool {
        if self.in_flight < self.max_concurrent {
            self.in_flight += 1;
            true
        } else {
            false
        }
    }

    pub fn release(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn is_saturated(&self) -> bool {
        self.in_flight >= self.max_concurrent
    }
}
