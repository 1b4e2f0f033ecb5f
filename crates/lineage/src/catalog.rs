//! The metric catalog.
//!
//! A catalog is the immutable set of metric definitions loaded at startup.
//! It enforces name uniqueness when built; dependency references are left
//! unresolved until the dependency graph is validated.

use crate::domain::{MetricDefinition, MetricKind, MetricName};
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Immutable, name-indexed collection of metric definitions.
///
/// Definitions keep their load order, which makes iteration (and therefore
/// graph construction and error reporting) deterministic.
#[derive(Debug, Clone, Default)]
pub struct MetricCatalog {
    definitions: Vec<MetricDefinition>,
    by_name: HashMap<MetricName, usize>,
}

impl MetricCatalog {
    /// Build a catalog from definitions in load order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateMetric`] if two definitions share a name.
    pub fn new(definitions: Vec<MetricDefinition>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(definitions.len());

        for (index, definition) in definitions.iter().enumerate() {
            if by_name.insert(definition.name.clone(), index).is_some() {
                return Err(Error::DuplicateMetric(definition.name.clone()));
            }
        }

        tracing::debug!(count = definitions.len(), "Built metric catalog");

        Ok(Self {
            definitions,
            by_name,
        })
    }

    /// Look up a definition by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetricDefinition> {
        self.by_name.get(name).map(|&index| &self.definitions[index])
    }

    /// Returns `true` if a metric with this name is defined
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Iterate over definitions in load order
    pub fn iter(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.definitions.iter()
    }

    /// Definitions matching an optional kind and owner
    pub fn filter<'a>(
        &'a self,
        kind: Option<MetricKind>,
        owner: Option<&'a str>,
    ) -> impl Iterator<Item = &'a MetricDefinition> + 'a {
        self.definitions
            .iter()
            .filter(move |def| def.matches(kind, owner))
    }

    /// Number of definitions
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` if the catalog has no definitions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl<'a> IntoIterator for &'a MetricCatalog {
    type Item = &'a MetricDefinition;
    type IntoIter = std::slice::Iter<'a, MetricDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.definitions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, kind: MetricKind, owner: &str) -> MetricDefinition {
        MetricDefinition::new(name, kind, owner)
    }

    #[test]
    fn lookup_by_name() {
        let catalog = MetricCatalog::new(vec![
            def("clicks", MetricKind::Counter, "ads"),
            def("revenue", MetricKind::Gauge, "finance"),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("clicks"));
        assert_eq!(catalog.get("revenue").unwrap().owner, "finance");
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = MetricCatalog::new(vec![
            def("clicks", MetricKind::Counter, "ads"),
            def("clicks", MetricKind::Gauge, "other"),
        ]);

        match result {
            Err(Error::DuplicateMetric(name)) => assert_eq!(name.as_str(), "clicks"),
            other => panic!("expected DuplicateMetric, got {other:?}"),
        }
    }

    #[test]
    fn iteration_preserves_load_order() {
        let catalog = MetricCatalog::new(vec![
            def("z", MetricKind::Counter, "a"),
            def("a", MetricKind::Counter, "a"),
            def("m", MetricKind::Counter, "a"),
        ])
        .unwrap();

        let names: Vec<&str> = catalog.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn filter_by_kind_and_owner() {
        let catalog = MetricCatalog::new(vec![
            def("clicks", MetricKind::Counter, "ads"),
            def("views", MetricKind::Counter, "content"),
            def("ctr", MetricKind::Ratio, "ads"),
        ])
        .unwrap();

        let counters: Vec<_> = catalog.filter(Some(MetricKind::Counter), None).collect();
        assert_eq!(counters.len(), 2);

        let ads_counters: Vec<_> = catalog
            .filter(Some(MetricKind::Counter), Some("ads"))
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(ads_counters, vec!["clicks"]);
    }

    #[test]
    fn empty_catalog() {
        let catalog = MetricCatalog::new(Vec::new()).unwrap();
        assert!(catalog.is_empty());
    }
}
