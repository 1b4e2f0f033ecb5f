//! Queries over a validated dependency graph.

use super::export::{NodeLinkGraph, NodeLinkLink, NodeLinkNode};
use super::traversal;
use crate::domain::{MetricDefinition, MetricName};
use std::collections::{BTreeSet, HashMap};

/// A validated, acyclic, fully resolved dependency graph.
///
/// Only [`DependencyGraph::validate`](super::DependencyGraph::validate) can
/// produce one. It has no mutating methods, so it can be shared across
/// threads (`Arc<LineageGraph>`) and queried concurrently without locking.
///
/// Unknown metric names are not errors: every query answers them with an
/// empty result, which keeps speculative lookups cheap for callers.
#[derive(Debug, Clone)]
pub struct LineageGraph {
    /// Definition per node index.
    definitions: Vec<MetricDefinition>,

    /// Mapping from metric name to node index.
    index: HashMap<MetricName, usize>,

    /// Forward edges: node -> metrics that depend on it.
    dependents: Vec<Vec<usize>>,

    /// Reverse edges: node -> metrics it depends on.
    dependencies: Vec<Vec<usize>>,

    /// Node indices with every dependency before its dependents.
    topological: Vec<usize>,
}

impl LineageGraph {
    pub(super) fn new(
        definitions: Vec<MetricDefinition>,
        index: HashMap<MetricName, usize>,
        dependents: Vec<Vec<usize>>,
        dependencies: Vec<Vec<usize>>,
        topological: Vec<usize>,
    ) -> Self {
        Self {
            definitions,
            index,
            dependents,
            dependencies,
            topological,
        }
    }

    /// All metrics the given metric transitively depends on.
    ///
    /// Returns an empty set for unknown names.
    #[must_use]
    pub fn upstream_lineage(&self, metric: &str) -> BTreeSet<MetricName> {
        self.collect(&self.dependencies, metric)
    }

    /// All metrics that transitively depend on the given metric.
    ///
    /// Returns an empty set for unknown names.
    #[must_use]
    pub fn downstream_impact(&self, metric: &str) -> BTreeSet<MetricName> {
        self.collect(&self.dependents, metric)
    }

    /// Upstream metrics with their shortest distance, nearest first.
    ///
    /// Direct dependencies are at depth 1. `max_depth` stops the traversal
    /// after that many levels.
    #[must_use]
    pub fn upstream_levels(&self, metric: &str, max_depth: Option<usize>) -> Vec<(&MetricName, usize)> {
        self.levels(&self.dependencies, metric, max_depth)
    }

    /// Downstream metrics with their shortest distance, nearest first.
    #[must_use]
    pub fn downstream_levels(
        &self,
        metric: &str,
        max_depth: Option<usize>,
    ) -> Vec<(&MetricName, usize)> {
        self.levels(&self.dependents, metric, max_depth)
    }

    /// Metrics the given metric directly depends on, in declaration order
    #[must_use]
    pub fn direct_dependencies(&self, metric: &str) -> Vec<&MetricName> {
        self.neighbours(&self.dependencies, metric)
    }

    /// Metrics that directly depend on the given metric
    #[must_use]
    pub fn direct_dependents(&self, metric: &str) -> Vec<&MetricName> {
        self.neighbours(&self.dependents, metric)
    }

    /// Look up a definition by name
    #[must_use]
    pub fn definition(&self, metric: &str) -> Option<&MetricDefinition> {
        self.index.get(metric).map(|&node| &self.definitions[node])
    }

    /// Returns `true` if the metric is part of the graph
    #[must_use]
    pub fn contains(&self, metric: &str) -> bool {
        self.index.contains_key(metric)
    }

    /// Definitions ordered so that every metric follows its dependencies
    pub fn topological_order(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.topological.iter().map(|&node| &self.definitions[node])
    }

    /// Metrics with no dependencies
    pub fn roots(&self) -> impl Iterator<Item = &MetricName> {
        self.definitions
            .iter()
            .enumerate()
            .filter(|(node, _)| self.dependencies[*node].is_empty())
            .map(|(_, def)| &def.name)
    }

    /// Number of metrics
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` if the graph has no metrics
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Number of dependency edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.dependents.iter().map(Vec::len).sum()
    }

    /// Export the graph in node-link form for visualization clients.
    ///
    /// Nodes follow registration order and carry each metric's kind and
    /// owner; links point from dependency to dependent.
    #[must_use]
    pub fn export(&self) -> NodeLinkGraph {
        let nodes = self
            .definitions
            .iter()
            .map(|def| NodeLinkNode {
                id: def.name.clone(),
                kind: def.kind,
                owner: def.owner.clone(),
            })
            .collect();

        let links = self
            .dependents
            .iter()
            .enumerate()
            .flat_map(|(source, targets)| {
                targets.iter().map(move |&target| NodeLinkLink {
                    source: self.definitions[source].name.clone(),
                    target: self.definitions[target].name.clone(),
                })
            })
            .collect();

        NodeLinkGraph {
            directed: true,
            multigraph: false,
            nodes,
            links,
        }
    }

    fn collect(&self, adjacency: &[Vec<usize>], metric: &str) -> BTreeSet<MetricName> {
        let Some(&start) = self.index.get(metric) else {
            tracing::debug!(metric, "Lineage query for unknown metric");
            return BTreeSet::new();
        };

        traversal::reachable_with_depth(adjacency, start, None)
            .into_iter()
            .map(|(node, _)| self.definitions[node].name.clone())
            .collect()
    }

    fn levels(
        &self,
        adjacency: &[Vec<usize>],
        metric: &str,
        max_depth: Option<usize>,
    ) -> Vec<(&MetricName, usize)> {
        let Some(&start) = self.index.get(metric) else {
            return Vec::new();
        };

        traversal::reachable_with_depth(adjacency, start, max_depth)
            .into_iter()
            .map(|(node, depth)| (&self.definitions[node].name, depth))
            .collect()
    }

    fn neighbours(&self, adjacency: &[Vec<usize>], metric: &str) -> Vec<&MetricName> {
        self.index
            .get(metric)
            .map(|&node| {
                adjacency[node]
                    .iter()
                    .map(|&other| &self.definitions[other].name)
                    .collect()
            })
            .unwrap_or_default()
    }
}
