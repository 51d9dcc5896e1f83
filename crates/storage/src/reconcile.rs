#![forbid(unsafe_code)]

use crate::{
    COUNTERS_TABLE, CounterProvider, EstimateSource, SqliteStatEstimates, SqliteStore, StoreError,
    TableEstimates,
};
use tally_core::{Category, CategoryEnumerator, Counter, ReconcilePolicy, Resolution};

pub const ENTITY_TOTAL_PROVIDER: &str = "entity_total";

/// Keeps one `"<category>::total"` counter per tracked category.
pub struct EntityTotalCountProvider<'a, C> {
    store: &'a SqliteStore,
    categories: C,
    estimates: Box<dyn EstimateSource + 'a>,
    policy: ReconcilePolicy,
}

impl<'a, C: CategoryEnumerator> EntityTotalCountProvider<'a, C> {
    /// Provider backed by the store's own `sqlite_stat1` statistics.
    pub fn new(store: &'a SqliteStore, categories: C) -> Self {
        Self::with_estimates(store, categories, SqliteStatEstimates::new(store))
    }

    pub fn with_estimates(
        store: &'a SqliteStore,
        categories: C,
        estimates: impl EstimateSource + 'a,
    ) -> Self {
        Self {
            store,
            categories,
            estimates: Box::new(estimates),
            policy: store.config().policy(),
        }
    }

    /// Recomputes every tracked category's counter, one category per `next()`.
    ///
    /// Each yielded counter is already persisted. Table statistics are read once,
    /// when the pass starts.
    pub fn reconcile_all(&self) -> ReconcileAll<'_> {
        let (pending, failure) = match self.categories.categories() {
            Ok(categories) => (categories, None),
            Err(err) => (
                Vec::new(),
                Some(StoreError::Enumeration(err.to_string())),
            ),
        };
        let estimates = if failure.is_some() {
            TableEstimates::new()
        } else {
            self.estimates.estimates()
        };

        ReconcileAll {
            store: self.store,
            policy: self.policy,
            estimates,
            pending: pending.into_iter(),
            failure,
        }
    }
}

impl<C: CategoryEnumerator> CounterProvider for EntityTotalCountProvider<'_, C> {
    fn name(&self) -> &str {
        ENTITY_TOTAL_PROVIDER
    }

    fn counters(&self) -> Box<dyn Iterator<Item = Result<Counter, StoreError>> + '_> {
        Box::new(self.reconcile_all())
    }
}

pub struct ReconcileAll<'a> {
    store: &'a SqliteStore,
    policy: ReconcilePolicy,
    estimates: TableEstimates,
    pending: std::vec::IntoIter<Category>,
    failure: Option<StoreError>,
}

impl ReconcileAll<'_> {
    fn reconcile(&self, category: &Category) -> Result<Counter, StoreError> {
        let name = category.id.total_counter_name();
        let stored = self.store.stored_value(&name)?;
        let estimate = self.estimates.get(&category.table).copied();

        let value = match self.policy.decide(stored, estimate) {
            Resolution::Use(value) => value,
            Resolution::Exact => self.store.exact_count(&category.table),
        };

        tracing::debug!(
            counter = %name,
            ?stored,
            ?estimate,
            value,
            "reconciled counter"
        );
        self.store.persist_reconciled(&name, value)
    }
}

impl Iterator for ReconcileAll<'_> {
    type Item = Result<Counter, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.failure.take() {
            return Some(Err(err));
        }
        loop {
            let category = self.pending.next()?;
            if self.store.is_excluded(&category.id) || category.table == COUNTERS_TABLE {
                tracing::debug!(
                    category = %category.id,
                    table = %category.table,
                    "skipping counter entity"
                );
                continue;
            }
            return Some(self.reconcile(&category));
        }
    }
}
