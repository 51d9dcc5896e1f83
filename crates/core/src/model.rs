#![forbid(unsafe_code)]

use crate::CounterName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Free-form diagnostic data attached to a counter. Never read by the engine.
pub type CounterContext = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub id: i64,
    pub name: CounterName,
    pub value: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<CounterContext>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.value)
    }
}
