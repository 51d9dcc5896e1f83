#![forbid(unsafe_code)]

use tally_core::{CounterContext, CounterName};

#[derive(Clone, Debug, PartialEq)]
pub struct CreateCounterRequest {
    pub name: CounterName,
    pub value: i64,
    pub context: Option<CounterContext>,
}

/// Manual correction of a counter. `None` leaves a field untouched;
/// `context: Some(None)` clears the context.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateCounterRequest {
    pub value: Option<i64>,
    pub context: Option<Option<CounterContext>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListCountersRequest {
    pub name_contains: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for ListCountersRequest {
    fn default() -> Self {
        Self {
            name_contains: None,
            limit: 100,
            offset: 0,
        }
    }
}
