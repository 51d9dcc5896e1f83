#![forbid(unsafe_code)]

use crate::CategoryId;
use std::collections::VecDeque;

/// Applies single-unit deltas to the total counter of a category.
pub trait CounterMutator {
    type Error: std::fmt::Display;

    fn increase(&self, category: &CategoryId) -> Result<(), Self::Error>;

    fn decrease(&self, category: &CategoryId) -> Result<(), Self::Error>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub increments: usize,
    pub decrements: usize,
    /// Entries discarded after a failed mutation.
    pub dropped: usize,
}

/// Deltas collected during one unit of work, applied once at its end.
///
/// Entries are never merged: three creations of the same category cause three
/// increments. All increases are applied before any decrease.
#[derive(Clone, Debug, Default)]
pub struct DeltaAccumulator {
    increases: VecDeque<CategoryId>,
    decreases: VecDeque<CategoryId>,
}

impl DeltaAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_increase(&mut self, category: CategoryId) {
        self.increases.push_back(category);
    }

    pub fn record_decrease(&mut self, category: CategoryId) {
        self.decreases.push_back(category);
    }

    pub fn pending_increases(&self) -> impl Iterator<Item = &CategoryId> {
        self.increases.iter()
    }

    pub fn pending_decreases(&self) -> impl Iterator<Item = &CategoryId> {
        self.decreases.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.increases.is_empty() && self.decreases.is_empty()
    }

    /// Drops every pending entry without applying it.
    pub fn reset(&mut self) {
        self.increases.clear();
        self.decreases.clear();
    }

    /// Applies and clears both queues. Never fails: a mutation error stops the
    /// queue it occurred in, is logged, and the rest of that queue is dropped.
    pub fn flush<M: CounterMutator>(&mut self, mutator: &M) -> FlushReport {
        let mut report = FlushReport::default();

        while let Some(category) = self.increases.pop_front() {
            if let Err(err) = mutator.increase(&category) {
                report.dropped += self.increases.len();
                tracing::error!(
                    category = %category,
                    dropped = self.increases.len(),
                    error = %err,
                    "counter increase flush failed"
                );
                self.increases.clear();
                break;
            }
            report.increments += 1;
        }

        while let Some(category) = self.decreases.pop_front() {
            if let Err(err) = mutator.decrease(&category) {
                report.dropped += self.decreases.len();
                tracing::error!(
                    category = %category,
                    dropped = self.decreases.len(),
                    error = %err,
                    "counter decrease flush failed"
                );
                self.decreases.clear();
                break;
            }
            report.decrements += 1;
        }

        report
    }
}
