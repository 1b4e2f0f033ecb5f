//! Metric dependency graph.
//!
//! The graph is built in two phases:
//!
//! 1. [`DependencyGraph`] collects definitions via [`DependencyGraph::add_metric`].
//!    Nothing is checked here; dependencies may name metrics that have not
//!    been registered yet.
//! 2. [`DependencyGraph::validate`] consumes the builder and either returns a
//!    queryable [`LineageGraph`] or a structural error. Lineage queries only
//!    exist on `LineageGraph`, so an unvalidated or invalid graph cannot be
//!    queried.
//!
//! ## Edge Direction Convention
//!
//! Edges point from **dependency -> dependent**. If `ctr` is derived from
//! `clicks`, the edge is `clicks -> ctr`:
//!
//! - following edges forward from a metric yields its downstream impact
//! - following edges backward yields its upstream lineage
//!
//! ## Representation
//!
//! Nodes are stable `usize` indices assigned in registration order, with a
//! name -> index map. Each node keeps two adjacency lists (dependents and
//! dependencies) so both query directions are a plain BFS.

mod export;
mod lineage;
mod traversal;

pub use export::{NodeLinkGraph, NodeLinkLink, NodeLinkNode};
pub use lineage::LineageGraph;

use crate::catalog::MetricCatalog;
use crate::domain::{MetricDefinition, MetricName};
use crate::error::{Error, Result};
use std::collections::HashMap;
use traversal::TopoOrder;

/// Unvalidated dependency graph under construction.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Metric name per node index.
    names: Vec<MetricName>,

    /// Mapping from metric name to node index.
    index: HashMap<MetricName, usize>,

    /// Definition per node; `None` for names only seen as a dependency.
    definitions: Vec<Option<MetricDefinition>>,

    /// Forward edges: node -> metrics that depend on it.
    dependents: Vec<Vec<usize>>,

    /// Reverse edges: node -> metrics it depends on, in declaration order.
    dependencies: Vec<Vec<usize>>,

    /// Node indices of registered definitions, in registration order.
    registration_order: Vec<usize>,
}

impl DependencyGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph containing every definition of a catalog
    #[must_use]
    pub fn from_catalog(catalog: &MetricCatalog) -> Self {
        let mut graph = Self::new();
        graph.load_metrics(catalog.iter().cloned());
        graph
    }

    /// Register a batch of definitions in order
    pub fn load_metrics<I>(&mut self, definitions: I)
    where
        I: IntoIterator<Item = MetricDefinition>,
    {
        for definition in definitions {
            self.add_metric(definition);
        }
    }

    /// Register a metric and an edge from each of its dependencies to it.
    ///
    /// Dependencies that are not registered yet get a placeholder node;
    /// whether they resolve is only checked by [`validate`](Self::validate).
    /// Registering the same name twice keeps the latest definition and the
    /// union of both edge sets.
    pub fn add_metric(&mut self, definition: MetricDefinition) {
        let node = self.node_for(&definition.name);

        for dependency in &definition.dependencies {
            let dep_node = self.node_for(dependency);
            if !self.dependents[dep_node].contains(&node) {
                self.dependents[dep_node].push(node);
                self.dependencies[node].push(dep_node);
            }
        }

        if self.definitions[node].replace(definition).is_some() {
            tracing::warn!(metric = %self.names[node], "Metric registered twice, keeping latest definition");
        } else {
            self.registration_order.push(node);
        }
    }

    /// Number of nodes, including unresolved dependency placeholders
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    /// Check the graph and turn it into a queryable [`LineageGraph`].
    ///
    /// # Errors
    ///
    /// - [`Error::Cycle`] if any directed cycle exists. The error lists every
    ///   metric on or downstream of a cycle.
    /// - [`Error::DanglingDependency`] if a declared dependency was never
    ///   registered. The first offending declaration in registration order
    ///   is reported.
    pub fn validate(self) -> Result<LineageGraph> {
        let order = match traversal::topological_order(&self.dependents) {
            TopoOrder::Complete(order) => order,
            TopoOrder::Cyclic(stuck) => {
                let mut participants: Vec<MetricName> =
                    stuck.into_iter().map(|node| self.names[node].clone()).collect();
                participants.sort();
                tracing::debug!(count = participants.len(), "Dependency cycle detected");
                return Err(Error::Cycle { participants });
            }
        };

        for &node in &self.registration_order {
            for &dep_node in &self.dependencies[node] {
                if self.definitions[dep_node].is_none() {
                    return Err(Error::DanglingDependency {
                        metric: self.names[node].clone(),
                        dependency: self.names[dep_node].clone(),
                    });
                }
            }
        }

        // Placeholders only exist for dangling names, which were rejected above.
        let definitions: Vec<MetricDefinition> = self.definitions.into_iter().flatten().collect();
        debug_assert_eq!(definitions.len(), self.names.len());

        tracing::debug!(
            metrics = definitions.len(),
            "Validated metric dependency graph"
        );

        Ok(LineageGraph::new(
            definitions,
            self.index,
            self.dependents,
            self.dependencies,
            order,
        ))
    }

    fn node_for(&mut self, name: &MetricName) -> usize {
        if let Some(&node) = self.index.get(name) {
            return node;
        }

        let node = self.names.len();
        self.names.push(name.clone());
        self.index.insert(name.clone(), node);
        self.definitions.push(None);
        self.dependents.push(Vec::new());
        self.dependencies.push(Vec::new());
        node
    }
}
