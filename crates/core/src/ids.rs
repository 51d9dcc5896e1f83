#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

pub const COUNTER_NAME_MAX_CHARS: usize = 100;
pub const TOTAL_COUNTER_SUFFIX: &str = "::total";
pub const CATEGORY_ID_MAX_CHARS: usize = COUNTER_NAME_MAX_CHARS - TOTAL_COUNTER_SUFFIX.len();
/// Category (and table) of the counters themselves.
pub const COUNTER_ENTITY: &str = "counters";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CounterName(String);

impl CounterName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, CounterNameError> {
        let value = value.into();
        validate_counter_name(&value)?;
        Ok(Self(value))
    }
}

impl fmt::Display for CounterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CounterName {
    type Error = CounterNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<CounterName> for String {
    fn from(value: CounterName) -> Self {
        value.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterNameError {
    Empty,
    TooLong,
    ContainsControl,
}

impl CounterNameError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "counter name must not be blank",
            Self::TooLong => "counter name must be at most 100 characters",
            Self::ContainsControl => "counter name contains control characters",
        }
    }
}

impl fmt::Display for CounterNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for CounterNameError {}

fn validate_counter_name(value: &str) -> Result<(), CounterNameError> {
    if value.trim().is_empty() {
        return Err(CounterNameError::Empty);
    }
    if value.chars().count() > COUNTER_NAME_MAX_CHARS {
        return Err(CounterNameError::TooLong);
    }
    if value.chars().any(|c| c.is_control()) {
        return Err(CounterNameError::ContainsControl);
    }
    Ok(())
}

/// Stable identifier of a trackable category.
///
/// Every category owns exactly one total counter, named `"<id>::total"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryId(String);

impl CategoryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, CategoryIdError> {
        let value = value.into();
        validate_category_id(&value)?;
        Ok(Self(value))
    }

    /// The counters' own category; reconciliation never counts it.
    pub fn counter_entity() -> Self {
        Self(COUNTER_ENTITY.to_string())
    }

    pub fn total_counter_name(&self) -> CounterName {
        // Length and charset are already bounded by validate_category_id.
        CounterName(format!("{}{TOTAL_COUNTER_SUFFIX}", self.0))
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CategoryId {
    type Error = CategoryIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<CategoryId> for String {
    fn from(value: CategoryId) -> Self {
        value.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryIdError {
    Empty,
    TooLong,
    ContainsControl,
}

impl CategoryIdError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "category id must not be blank",
            Self::TooLong => "category id is too long",
            Self::ContainsControl => "category id contains control characters",
        }
    }
}

impl fmt::Display for CategoryIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for CategoryIdError {}

fn validate_category_id(value: &str) -> Result<(), CategoryIdError> {
    if value.trim().is_empty() {
        return Err(CategoryIdError::Empty);
    }
    if value.chars().count() > CATEGORY_ID_MAX_CHARS {
        return Err(CategoryIdError::TooLong);
    }
    if value.chars().any(|c| c.is_control()) {
        return Err(CategoryIdError::ContainsControl);
    }
    Ok(())
}
