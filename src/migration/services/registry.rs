//! Constructor-built lookup from backend names to integration providers.

use crate::migration::{domain::BackendName, ports::IntegrationProvider};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Backend name to provider mapping handed to the migration service.
///
/// The registry is assembled once at start-up and never mutated afterwards.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<BackendName, Arc<dyn IntegrationProvider>>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            providers: BTreeMap::new(),
        }
    }

    /// Registers `provider` under `name`, replacing any previous entry.
    #[must_use]
    pub fn with_provider(mut self, name: BackendName, provider: Arc<dyn IntegrationProvider>) -> Self {
        self.providers.insert(name, provider);
        self
    }

    /// Returns the provider registered under `name`.
    #[must_use]
    pub fn get(&self, name: &BackendName) -> Option<Arc<dyn IntegrationProvider>> {
        self.providers.get(name).cloned()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.providers.keys()).finish()
    }
}
