#![forbid(unsafe_code)]

use tally_core::{CategoryId, DEFAULT_LARGE_DATASET_THRESHOLD, ReconcilePolicy};
use std::time::Duration;

pub const ENV_LARGE_THRESHOLD: &str = "TALLY_LARGE_THRESHOLD";
pub const ENV_EXCLUDED_CATEGORY: &str = "TALLY_EXCLUDED_CATEGORY";
pub const ENV_EPHEMERAL: &str = "TALLY_EPHEMERAL";
pub const ENV_ENVIRONMENT: &str = "TALLY_ENV";

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub large_dataset_threshold: i64,
    /// Category of the counters table itself; never counted.
    pub excluded_category: CategoryId,
    /// Test and throwaway databases: estimate failures are expected there.
    pub ephemeral: bool,
    pub busy_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            large_dataset_threshold: DEFAULT_LARGE_DATASET_THRESHOLD,
            excluded_category: CategoryId::counter_entity(),
            ephemeral: false,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `TALLY_*` environment variables. Unparseable values
    /// are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(raw) = var(ENV_LARGE_THRESHOLD) {
            match raw.parse::<i64>() {
                Ok(value) => config.large_dataset_threshold = value,
                Err(_) => tracing::warn!(
                    variable = ENV_LARGE_THRESHOLD,
                    value = %raw,
                    "ignoring non-integer threshold"
                ),
            }
        }

        if let Some(raw) = var(ENV_EXCLUDED_CATEGORY) {
            match CategoryId::try_new(raw.clone()) {
                Ok(category) => config.excluded_category = category,
                Err(err) => tracing::warn!(
                    variable = ENV_EXCLUDED_CATEGORY,
                    value = %raw,
                    error = %err,
                    "ignoring invalid excluded category"
                ),
            }
        }

        if let Some(raw) = var(ENV_EPHEMERAL) {
            config.ephemeral = parse_flag(&raw);
        }
        if var(ENV_ENVIRONMENT).is_some_and(|env| env.eq_ignore_ascii_case("test")) {
            config.ephemeral = true;
        }

        config
    }

    pub fn policy(&self) -> ReconcilePolicy {
        ReconcilePolicy::new(self.large_dataset_threshold)
    }

    pub fn is_excluded(&self, category: &CategoryId) -> bool {
        &self.excluded_category == category
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
