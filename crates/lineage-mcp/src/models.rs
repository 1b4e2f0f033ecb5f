//! MCP request and response models.
//!
//! Parameter types derive `JsonSchema` so the tool router can publish an
//! input schema for each tool. Response types flatten lineage domain values
//! into plain strings and numbers for transport.

use lineage::anomaly::{AnomalyResult, Baseline};
use lineage::domain::{ChangeKind, ImpactReport, Lineage, MetricDefinition, MetricKind};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Tool parameters
// ============================================================================

/// Parameters for the `list_metrics` tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListMetricsParams {
    /// Only metrics of this kind (counter, gauge, ratio, composite).
    #[serde(default)]
    pub kind: Option<String>,

    /// Only metrics owned by this team.
    #[serde(default)]
    pub owner: Option<String>,
}

/// Parameters for the `lineage` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LineageParams {
    /// Metric name to trace.
    pub metric: String,
}

/// Parameters for the `impact` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ImpactParams {
    /// What changed.
    pub description: String,

    /// Metrics the change touches directly.
    pub related_metrics: Vec<String>,

    /// Kind of change: deployment (default), config, or data_schema.
    #[serde(default)]
    pub kind: Option<String>,

    /// Service that made the change.
    #[serde(default)]
    pub service: Option<String>,

    /// Event ID to report under. A new `evt-` ID is generated when omitted.
    #[serde(default)]
    pub event_id: Option<String>,
}

/// Parameters for the `fit_baseline` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FitBaselineParams {
    /// Metric the baseline belongs to.
    pub metric: String,

    /// Historical values.
    pub samples: Vec<f64>,

    /// Z-score threshold. Defaults to the configured threshold.
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Parameters for the `check_anomaly` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CheckAnomalyParams {
    /// Metric whose baseline to score against.
    pub metric: String,

    /// Observed value.
    pub value: f64,
}

// ============================================================================
// Tool responses
// ============================================================================

/// Metric representation for MCP responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpMetric {
    /// Metric name.
    pub name: String,

    /// Metric kind.
    pub kind: String,

    /// Owning team.
    pub owner: String,

    /// Description, if any.
    pub description: Option<String>,

    /// Direct dependencies in declaration order.
    pub dependencies: Vec<String>,

    /// Free-form tags.
    pub tags: BTreeMap<String, String>,
}

impl From<&MetricDefinition> for McpMetric {
    fn from(def: &MetricDefinition) -> Self {
        Self {
            name: def.name.to_string(),
            kind: def.kind.to_string(),
            owner: def.owner.clone(),
            description: def.description.clone(),
            dependencies: def.dependencies.iter().map(ToString::to_string).collect(),
            tags: def.tags.clone(),
        }
    }
}

/// Response from the `lineage` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LineageResponse {
    /// The metric traced.
    pub metric: String,

    /// Whether the catalog defines the metric.
    pub known: bool,

    /// Transitive dependencies, sorted.
    pub upstream: Vec<String>,

    /// Transitive dependents, sorted.
    pub downstream: Vec<String>,
}

impl LineageResponse {
    /// Build a response from a lineage query.
    #[must_use]
    pub fn new(lineage: Lineage, known: bool) -> Self {
        Self {
            metric: lineage.metric.to_string(),
            known,
            upstream: lineage.upstream.iter().map(ToString::to_string).collect(),
            downstream: lineage.downstream.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Response from the `impact` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImpactResponse {
    /// Event the report was computed for.
    pub event_id: String,

    /// Kind of change.
    pub kind: String,

    /// Originating service.
    pub service: String,

    /// Related metrics plus everything downstream of them, sorted.
    pub impacted_metrics: Vec<String>,

    /// Number of impacted metrics.
    pub severity_score: usize,

    /// Related metrics that are not in the catalog.
    pub unknown_metrics: Vec<String>,
}

impl ImpactResponse {
    /// Build a response from a report.
    #[must_use]
    pub fn new(
        report: ImpactReport,
        kind: ChangeKind,
        service: String,
        unknown_metrics: Vec<String>,
    ) -> Self {
        Self {
            event_id: report.event_id.to_string(),
            kind: kind.to_string(),
            service,
            impacted_metrics: report
                .impacted_metrics
                .iter()
                .map(ToString::to_string)
                .collect(),
            severity_score: report.severity_score,
            unknown_metrics,
        }
    }
}

/// Response from the `fit_baseline` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BaselineResponse {
    /// Metric the baseline belongs to.
    pub metric: String,

    /// Whether a baseline is registered after the fit.
    pub fitted: bool,

    /// Baseline mean, if fitted.
    pub mean: Option<f64>,

    /// Baseline standard deviation, if fitted.
    pub stddev: Option<f64>,

    /// Threshold the detector uses.
    pub threshold: f64,

    /// Number of samples supplied.
    pub samples: usize,
}

impl BaselineResponse {
    /// Build a response from a fitted (or still empty) baseline.
    #[must_use]
    pub fn new(metric: &str, baseline: Option<Baseline>, threshold: f64, samples: usize) -> Self {
        Self {
            metric: metric.to_string(),
            fitted: baseline.is_some(),
            mean: baseline.map(|b| b.mean),
            stddev: baseline.map(|b| b.stddev),
            threshold,
            samples,
        }
    }
}

/// Response from the `check_anomaly` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnomalyResponse {
    /// Metric scored.
    pub metric: String,

    /// Value scored.
    pub value: f64,

    /// Whether a baseline was available.
    pub fitted: bool,

    /// Whether the value is outside the threshold.
    pub is_anomaly: bool,

    /// Standardized score.
    pub score: f64,

    /// Lower bound of the normal range.
    pub lower: f64,

    /// Upper bound of the normal range.
    pub upper: f64,
}

impl AnomalyResponse {
    /// Build a response from a detector result.
    #[must_use]
    pub fn new(metric: &str, value: f64, fitted: bool, result: AnomalyResult) -> Self {
        Self {
            metric: metric.to_string(),
            value,
            fitted,
            is_anomaly: result.is_anomaly,
            score: result.score,
            lower: result.expected_range.lower,
            upper: result.expected_range.upper,
        }
    }
}

// ============================================================================
// Parsing helpers
// ============================================================================

/// Parse a change kind string into a `ChangeKind`.
#[must_use]
pub fn parse_change_kind(s: &str) -> Option<ChangeKind> {
    match s.to_lowercase().as_str() {
        "deployment" | "deploy" => Some(ChangeKind::Deployment),
        "config" | "config_update" | "config-update" => Some(ChangeKind::ConfigUpdate),
        "data_schema" | "data-schema" | "schema" => Some(ChangeKind::DataSchema),
        _ => None,
    }
}

/// Parse a metric kind string into a `MetricKind`.
#[must_use]
pub fn parse_metric_kind(s: &str) -> Option<MetricKind> {
    match s.to_lowercase().as_str() {
        "counter" => Some(MetricKind::Counter),
        "gauge" => Some(MetricKind::Gauge),
        "ratio" => Some(MetricKind::Ratio),
        "composite" => Some(MetricKind::Composite),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage::anomaly::ExpectedRange;
    use rstest::rstest;

    #[rstest]
    #[case::deployment("deployment", Some(ChangeKind::Deployment))]
    #[case::deploy_short("deploy", Some(ChangeKind::Deployment))]
    #[case::config("config", Some(ChangeKind::ConfigUpdate))]
    #[case::config_update_hyphen("config-update", Some(ChangeKind::ConfigUpdate))]
    #[case::data_schema("data_schema", Some(ChangeKind::DataSchema))]
    #[case::data_schema_hyphen("data-schema", Some(ChangeKind::DataSchema))]
    #[case::uppercase("DEPLOYMENT", Some(ChangeKind::Deployment))]
    #[case::invalid("rollback", None)]
    #[case::empty("", None)]
    fn test_parse_change_kind(#[case] input: &str, #[case] expected: Option<ChangeKind>) {
        assert_eq!(parse_change_kind(input), expected);
    }

    #[rstest]
    #[case::counter("counter", Some(MetricKind::Counter))]
    #[case::gauge("gauge", Some(MetricKind::Gauge))]
    #[case::ratio("Ratio", Some(MetricKind::Ratio))]
    #[case::composite("composite", Some(MetricKind::Composite))]
    #[case::invalid("histogram", None)]
    fn test_parse_metric_kind(#[case] input: &str, #[case] expected: Option<MetricKind>) {
        assert_eq!(parse_metric_kind(input), expected);
    }

    #[test]
    fn test_mcp_metric_from_definition() {
        let def = MetricDefinition::new("ctr", MetricKind::Ratio, "ads-team")
            .with_dependencies(["ad_clicks", "ad_impressions"])
            .with_description("Click-through rate");

        let metric = McpMetric::from(&def);

        assert_eq!(metric.name, "ctr");
        assert_eq!(metric.kind, "ratio");
        assert_eq!(metric.dependencies, vec!["ad_clicks", "ad_impressions"]);
        assert_eq!(metric.description.as_deref(), Some("Click-through rate"));
    }

    #[test]
    fn test_unfitted_anomaly_response() {
        let response = AnomalyResponse::new("ctr", 42.0, false, AnomalyResult::unfitted());

        assert!(!response.fitted);
        assert!(!response.is_anomaly);
        assert!(response.score.abs() < f64::EPSILON);
        assert!((response.upper - ExpectedRange::EMPTY.upper).abs() < f64::EPSILON);
    }

    #[test]
    fn test_baseline_response_without_fit() {
        let response = BaselineResponse::new("ctr", None, 3.0, 0);

        assert!(!response.fitted);
        assert!(response.mean.is_none());
        assert!(response.stddev.is_none());
    }
}
