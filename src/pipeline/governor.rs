use tracing::warn;

use crate::config::AdmissionBoundary;

/// Counts in-flight transfers against `max_requests`.
#[derive(Debug)]
pub struct ConcurrencyGovernor {
    max_requests: usize,
    boundary: AdmissionBoundary,
    in_flight: usize,
}

impl ConcurrencyGovernor {
    pub fn new(max_requests: usize, boundary: AdmissionBoundary) -> Self {
        Self {
            max_requests,
            boundary,
            in_flight: 0,
        }
    }

    pub fn has_capacity(&self) -> bool {
        self.boundary.admits(self.in_flight, self.max_requests)
    }

    pub fn try_acquire(&mut self) -> bool {
        if !self.has_capacity() {
            return false;
        }

        self.in_flight += 1;
        true
    }

    pub fn release(&mut self) {
        if self.in_flight == 0 {
            warn!("release() called without an in-flight transfer.");
            return;
        }

        self.in_flight -= 1;
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}
