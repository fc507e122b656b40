//! Per-store rendition rule registry.

use crate::RenditionRule;
use std::collections::HashMap;
use vellum_core::MediaType;

/// Collects rules during startup.
#[derive(Debug, Clone, Default)]
pub struct RenditionRegistryBuilder {
    rules: HashMap<String, Vec<RenditionRule>>,
}

impl RenditionRegistryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule for `store`. Rules are consulted in registration order.
    #[tracing::instrument(skip(self, store, rule), fields(consumes = %rule.consumes()))]
    pub fn register(mut self, store: impl Into<String>, rule: RenditionRule) -> Self {
        let store = store.into();
        tracing::debug!(store = %store, "Registering rendition rule");
        self.rules.entry(store).or_default().push(rule);
        self
    }

    /// Freeze the rules.
    pub fn build(self) -> RenditionRegistry {
        let registry = RenditionRegistry { rules: self.rules };
        tracing::info!(
            stores = registry.rules.len(),
            rules = registry.len(),
            "Rendition registry ready"
        );
        registry
    }
}

/// Immutable rendition rules keyed by store name.
#[derive(Debug, Clone, Default)]
pub struct RenditionRegistry {
    rules: HashMap<String, Vec<RenditionRule>>,
}

impl RenditionRegistry {
    /// Registry with no rules.
    pub fn empty() -> Self {
        Self::default()
    }

    /// First rule registered for `store` that turns `source` into `target`.
    pub fn find_rule(
        &self,
        store: &str,
        source: &MediaType,
        target: &MediaType,
    ) -> Option<&RenditionRule> {
        let rule = self
            .rules_for(store)
            .iter()
            .find(|rule| rule.matches(source, target));
        tracing::debug!(
            store,
            source = %source,
            target = %target,
            found = rule.is_some(),
            "Rendition rule lookup"
        );
        rule
    }

    /// Rules registered for `store`, in registration order.
    pub fn rules_for(&self, store: &str) -> &[RenditionRule] {
        self.rules.get(store).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of rules.
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// No rules registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
