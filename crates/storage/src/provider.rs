#![forbid(unsafe_code)]

use crate::StoreError;
use tally_core::Counter;

/// A source of counters refreshed by the periodic pass.
pub trait CounterProvider {
    fn name(&self) -> &str;

    fn counters(&self) -> Box<dyn Iterator<Item = Result<Counter, StoreError>> + '_>;
}

/// Providers run by a refresh pass, in registration order.
#[derive(Default)]
pub struct ProviderRegistry<'a> {
    providers: Vec<Box<dyn CounterProvider + 'a>>,
}

impl<'a> ProviderRegistry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: impl CounterProvider + 'a) -> Self {
        self.register(provider);
        self
    }

    pub fn register(&mut self, provider: impl CounterProvider + 'a) {
        self.providers.push(Box::new(provider));
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn CounterProvider> {
        self.providers.iter().map(|provider| provider.as_ref() as &dyn CounterProvider)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
