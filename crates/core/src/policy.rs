#![forbid(unsafe_code)]

pub const DEFAULT_LARGE_DATASET_THRESHOLD: i64 = 1_000_000;

/// How a reconciliation pass settles a counter's value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Run a full count against the backing table.
    Exact,
    /// Persist this value without scanning.
    Use(i64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconcilePolicy {
    pub large_dataset_threshold: i64,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            large_dataset_threshold: DEFAULT_LARGE_DATASET_THRESHOLD,
        }
    }
}

impl ReconcilePolicy {
    pub fn new(large_dataset_threshold: i64) -> Self {
        Self {
            large_dataset_threshold,
        }
    }

    /// Picks the source of truth for one category.
    ///
    /// Once a stored value passes the threshold, a statistics estimate replaces the
    /// full count. The stored value wins over a lower estimate because table
    /// statistics lag behind recent inserts.
    pub fn decide(&self, stored: Option<i64>, estimate: Option<i64>) -> Resolution {
        let Some(stored) = stored else {
            return Resolution::Exact;
        };
        match estimate {
            Some(estimate) if stored > self.large_dataset_threshold => {
                let value = stored.max(estimate);
                if value == 0 {
                    Resolution::Exact
                } else {
                    Resolution::Use(value)
                }
            }
            _ => Resolution::Exact,
        }
    }
}
