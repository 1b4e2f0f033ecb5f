//! Change impact analysis.
//!
//! Given a change event naming the metrics it directly touches, the analyzer
//! computes every metric structurally affected: the touched metrics
//! themselves plus their full downstream closure. The severity score is the
//! size of that set.

use crate::domain::{ChangeEvent, ImpactReport, MetricName};
use crate::graph::LineageGraph;
use std::collections::BTreeSet;

/// Computes impact reports against a validated graph.
#[derive(Debug, Clone, Copy)]
pub struct ImpactAnalyzer<'g> {
    graph: &'g LineageGraph,
}

impl<'g> ImpactAnalyzer<'g> {
    /// Create an analyzer over a validated graph
    #[must_use]
    pub fn new(graph: &'g LineageGraph) -> Self {
        Self { graph }
    }

    /// Compute the impact of a change event.
    ///
    /// Related metrics that are not in the graph are skipped; events may
    /// reference metrics owned by other systems. The result depends only on
    /// the set of related metrics, not their order or repetition.
    #[must_use]
    pub fn analyze(&self, event: &ChangeEvent) -> ImpactReport {
        let mut impacted: BTreeSet<MetricName> = BTreeSet::new();

        for metric in &event.related_metrics {
            if !self.graph.contains(metric.as_str()) {
                tracing::debug!(event = %event.id, %metric, "Skipping metric outside the catalog");
                continue;
            }

            // Already inside an earlier closure, so its dependents are too.
            if !impacted.insert(metric.clone()) {
                continue;
            }

            impacted.extend(self.graph.downstream_impact(metric.as_str()));
        }

        let report = ImpactReport::new(event.id.clone(), impacted);

        tracing::debug!(
            event = %event.id,
            kind = %event.kind,
            severity = report.severity_score,
            "Computed change impact"
        );

        report
    }
}
