//! MCP tool implementations.
//!
//! Each method backs one tool exposed by the server. Query tools are lenient
//! about unknown metric names the same way the library is: they answer with
//! empty results instead of errors.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::models::{
    AnomalyResponse, BaselineResponse, ImpactResponse, LineageResponse, McpMetric,
    parse_change_kind, parse_metric_kind,
};
use lineage::domain::{ChangeEvent, ChangeKind};
use lineage::graph::NodeLinkGraph;
use std::sync::Arc;

const DEFAULT_SERVICE: &str = "unknown";

/// Tool implementations for the lineage MCP server.
pub struct Tools {
    context: Arc<Context>,
}

impl Tools {
    /// Create a new Tools instance with the given context.
    pub fn new(context: Arc<Context>) -> Self {
        Self { context }
    }

    /// List metric definitions, optionally filtered by kind and owner.
    ///
    /// # Errors
    ///
    /// Returns an error if `kind` is not a known metric kind.
    pub fn list_metrics(&self, kind: Option<&str>, owner: Option<&str>) -> Result<Vec<McpMetric>> {
        let kind = kind
            .map(|k| {
                parse_metric_kind(k).ok_or_else(|| Error::InvalidArgument {
                    field: "kind",
                    value: k.to_string(),
                    valid_values: "counter, gauge, ratio, composite",
                })
            })
            .transpose()?;

        Ok(self
            .context
            .lineage()
            .catalog()
            .filter(kind, owner)
            .map(McpMetric::from)
            .collect())
    }

    /// Upstream and downstream lineage of a metric.
    #[must_use]
    pub fn lineage(&self, metric: &str) -> LineageResponse {
        let lineage = self.context.lineage();
        LineageResponse::new(lineage.lineage(metric), lineage.catalog().contains(metric))
    }

    /// Estimate the impact of a change.
    ///
    /// # Errors
    ///
    /// Returns an error if `kind` is not a known change kind or ID
    /// generation fails.
    pub async fn impact(
        &self,
        description: String,
        related_metrics: Vec<String>,
        kind: Option<&str>,
        service: Option<String>,
        event_id: Option<&str>,
    ) -> Result<ImpactResponse> {
        let kind = match kind {
            Some(k) => parse_change_kind(k).ok_or_else(|| Error::InvalidArgument {
                field: "kind",
                value: k.to_string(),
                valid_values: "deployment, config, data_schema",
            })?,
            None => ChangeKind::Deployment,
        };
        let service = service.unwrap_or_else(|| DEFAULT_SERVICE.to_string());

        let id = self
            .context
            .event_id(event_id, kind, &service, &description)
            .await?;

        let lineage = self.context.lineage();
        let mut unknown: Vec<String> = related_metrics
            .iter()
            .filter(|m| !lineage.catalog().contains(m))
            .cloned()
            .collect();
        unknown.sort_unstable();
        unknown.dedup();

        let event = ChangeEvent::new(id, kind, service.clone(), description, related_metrics);
        let report = lineage.analyze(&event);

        tracing::debug!(
            event_id = %report.event_id,
            severity = report.severity_score,
            "Computed impact"
        );

        Ok(ImpactResponse::new(report, kind, service, unknown))
    }

    /// Fit or replace a metric's baseline.
    ///
    /// # Errors
    ///
    /// Returns an error for metrics outside the catalog or an invalid
    /// threshold.
    pub async fn fit_baseline(
        &self,
        metric: &str,
        samples: &[f64],
        threshold: Option<f64>,
    ) -> Result<BaselineResponse> {
        let (baseline, threshold) = self
            .context
            .fit_baseline(metric, samples, threshold)
            .await?;
        Ok(BaselineResponse::new(metric, baseline, threshold, samples.len()))
    }

    /// Score a value against a metric's baseline.
    pub async fn check_anomaly(&self, metric: &str, value: f64) -> AnomalyResponse {
        let (fitted, result) = self.context.check_anomaly(metric, value).await;
        AnomalyResponse::new(metric, value, fitted, result)
    }

    /// The whole graph in node-link form.
    #[must_use]
    pub fn export_graph(&self) -> NodeLinkGraph {
        self.context.lineage().graph().export()
    }
}
