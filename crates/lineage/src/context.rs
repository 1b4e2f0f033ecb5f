//! Loaded lineage state shared by the CLI and the MCP server.
//!
//! A [`LineageContext`] is built once from a definition source: the catalog
//! is checked for duplicate names, the dependency graph is validated, and
//! from then on everything is read-only. Wrap it in an `Arc` to share it
//! across tasks.

use crate::anomaly::ZScoreDetector;
use crate::catalog::MetricCatalog;
use crate::config::AnomalyConfig;
use crate::domain::{ChangeEvent, ImpactReport, Lineage, MetricDefinition, MetricName};
use crate::error::Result;
use crate::graph::{DependencyGraph, LineageGraph};
use crate::impact::ImpactAnalyzer;
use crate::source::DefinitionSource;

/// A validated catalog together with its lineage graph.
#[derive(Debug)]
pub struct LineageContext {
    catalog: MetricCatalog,
    graph: LineageGraph,
    anomaly: AnomalyConfig,
}

impl LineageContext {
    /// Build a context from definitions already in memory.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateMetric`, `Error::Cycle` or
    /// `Error::DanglingDependency` if the definitions do not form a valid
    /// catalog.
    pub fn from_definitions(definitions: Vec<MetricDefinition>) -> Result<Self> {
        let catalog = MetricCatalog::new(definitions)?;
        let graph = DependencyGraph::from_catalog(&catalog).validate()?;

        Ok(Self {
            catalog,
            graph,
            anomaly: AnomalyConfig::default(),
        })
    }

    /// Load and validate definitions from a source.
    ///
    /// # Errors
    ///
    /// Returns any error from the source, or a validation error.
    pub async fn load(source: &dyn DefinitionSource) -> Result<Self> {
        let definitions = source.load().await?;
        let context = Self::from_definitions(definitions)?;

        tracing::info!(
            source = %source.describe(),
            metrics = context.catalog.len(),
            edges = context.graph.edge_count(),
            "Loaded metric catalog"
        );

        Ok(context)
    }

    /// Replace the anomaly settings used by [`detector`](Self::detector)
    #[must_use]
    pub fn with_anomaly_config(mut self, anomaly: AnomalyConfig) -> Self {
        self.anomaly = anomaly;
        self
    }

    /// The metric catalog
    #[must_use]
    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    /// The validated dependency graph
    #[must_use]
    pub fn graph(&self) -> &LineageGraph {
        &self.graph
    }

    /// Anomaly settings
    #[must_use]
    pub fn anomaly_config(&self) -> AnomalyConfig {
        self.anomaly
    }

    /// Upstream and downstream closures of one metric.
    ///
    /// Unknown names produce empty sets.
    #[must_use]
    pub fn lineage(&self, metric: &str) -> Lineage {
        Lineage {
            metric: MetricName::new(metric),
            upstream: self.graph.upstream_lineage(metric),
            downstream: self.graph.downstream_impact(metric),
        }
    }

    /// Impact report for a change event
    #[must_use]
    pub fn analyze(&self, event: &ChangeEvent) -> ImpactReport {
        ImpactAnalyzer::new(&self.graph).analyze(event)
    }

    /// A fresh, unfitted detector with the configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the anomaly settings are out of range.
    pub fn detector(&self) -> Result<ZScoreDetector> {
        self.anomaly.detector()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChangeKind, EventId, MetricKind};
    use crate::error::Error;
    use crate::source::StaticSource;
    use std::sync::Arc;

    fn definitions() -> Vec<MetricDefinition> {
        vec![
            MetricDefinition::new("a", MetricKind::Counter, "t"),
            MetricDefinition::new("b", MetricKind::Composite, "t").with_dependencies(["a"]),
            MetricDefinition::new("c", MetricKind::Composite, "t").with_dependencies(["b"]),
        ]
    }

    #[tokio::test]
    async fn loads_from_source() {
        let context = LineageContext::load(&StaticSource::new(definitions()))
            .await
            .unwrap();

        assert_eq!(context.catalog().len(), 3);
        assert_eq!(context.graph().edge_count(), 2);
    }

    #[test]
    fn lineage_of_middle_metric() {
        let context = LineageContext::from_definitions(definitions()).unwrap();
        let lineage = context.lineage("b");

        assert_eq!(lineage.metric.as_str(), "b");
        assert!(lineage.upstream.contains("a"));
        assert!(lineage.downstream.contains("c"));
        assert_eq!(lineage.upstream.len(), 1);
        assert_eq!(lineage.downstream.len(), 1);
    }

    #[test]
    fn lineage_of_unknown_metric_is_empty() {
        let context = LineageContext::from_definitions(definitions()).unwrap();
        let lineage = context.lineage("nope");

        assert!(lineage.upstream.is_empty());
        assert!(lineage.downstream.is_empty());
    }

    #[test]
    fn analyze_delegates_to_impact_analyzer() {
        let context = LineageContext::from_definitions(definitions()).unwrap();
        let event = ChangeEvent::new(
            EventId::new("e1"),
            ChangeKind::Deployment,
            "svc",
            "ship",
            ["a"],
        );

        assert_eq!(context.analyze(&event).severity_score, 3);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut defs = definitions();
        defs.push(MetricDefinition::new("a", MetricKind::Gauge, "other"));

        assert!(matches!(
            LineageContext::from_definitions(defs),
            Err(Error::DuplicateMetric(_))
        ));
    }

    #[test]
    fn context_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LineageContext>();

        let context = Arc::new(LineageContext::from_definitions(definitions()).unwrap());
        let handle = {
            let context = Arc::clone(&context);
            std::thread::spawn(move || context.lineage("a").downstream.len())
        };
        assert_eq!(handle.join().unwrap(), 2);
    }
}
