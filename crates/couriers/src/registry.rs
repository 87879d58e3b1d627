//! String-keyed courier provider registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::provider::CourierProvider;

/// Maps shipping-method keys to courier providers.
///
/// Populated once at startup. Lookup is pure and side-effect free; an
/// unmapped key (e.g. `"home_delivery"`) resolves to `None`, which is a
/// valid outcome, not an error: the order simply proceeds without a
/// courier consignment.
#[derive(Default)]
pub struct CourierRegistry {
    providers: HashMap<String, Arc<dyn CourierProvider>>,
}

impl CourierRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider under a shipping-method key.
    ///
    /// Registering the same key twice replaces the earlier provider.
    pub fn register(&mut self, key: impl Into<String>, provider: Arc<dyn CourierProvider>) {
        self.providers.insert(key.into(), provider);
    }

    /// Resolves a shipping-method key to its provider, if one is registered.
    pub fn resolve(&self, key: &str) -> Option<Arc<dyn CourierProvider>> {
        self.providers.get(key).cloned()
    }

    /// Returns the registered shipping-method keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubCourier;

    #[test]
    fn resolve_returns_registered_provider() {
        let mut registry = CourierRegistry::new();
        registry.register("tcs", Arc::new(StubCourier::returning("tcs", "TCS123")));

        let provider = registry.resolve("tcs").unwrap();
        assert_eq!(provider.name(), "tcs");
    }

    #[test]
    fn unknown_key_resolves_to_none() {
        let registry = CourierRegistry::new();
        assert!(registry.resolve("home_delivery").is_none());
    }

    #[test]
    fn reregistering_replaces_provider() {
        let mut registry = CourierRegistry::new();
        registry.register("tcs", Arc::new(StubCourier::returning("tcs", "A")));
        registry.register("tcs", Arc::new(StubCourier::returning("tcs", "B")));

        assert_eq!(registry.keys().count(), 1);
    }
}
