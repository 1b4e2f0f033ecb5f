//! Domain types for metric lineage.
//!
//! This module contains the core domain types: metric definitions, change
//! events, and the impact reports produced from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Unique name of a metric
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricName(String);

impl MetricName {
    /// Create a new metric name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MetricName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MetricName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// Lets `BTreeSet<MetricName>` and `HashMap<MetricName, _>` be probed with `&str`.
impl Borrow<str> for MetricName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Kind of metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Monotonic count of events
    Counter,

    /// Point-in-time measurement
    Gauge,

    /// Quotient of two other metrics
    Ratio,

    /// Arbitrary expression over other metrics
    Composite,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Counter => write!(f, "counter"),
            Self::Gauge => write!(f, "gauge"),
            Self::Ratio => write!(f, "ratio"),
            Self::Composite => write!(f, "composite"),
        }
    }
}

/// A declared metric.
///
/// Definitions are created once when the catalog is loaded and never mutated
/// afterwards. Dependency names are not resolved here; that happens when the
/// dependency graph is validated, since definitions may arrive in any order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDefinition {
    /// Unique metric name
    pub name: MetricName,

    /// Metric kind
    #[serde(rename = "type", alias = "kind")]
    pub kind: MetricKind,

    /// Owning team or person
    pub owner: String,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Event stream a primitive metric is computed from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_event: Option<String>,

    /// Field of the source event that is aggregated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_field: Option<String>,

    /// Expression text for derived metrics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Metrics this one is derived from, in declaration order
    #[serde(default)]
    pub dependencies: Vec<MetricName>,

    /// Free-form tags
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl MetricDefinition {
    /// Create a primitive definition with no dependencies or optional fields
    pub fn new(name: impl Into<MetricName>, kind: MetricKind, owner: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            owner: owner.into(),
            description: None,
            source_event: None,
            aggregation_field: None,
            expression: None,
            dependencies: Vec::new(),
            tags: BTreeMap::new(),
        }
    }

    /// Replace the declared dependencies
    #[must_use]
    pub fn with_dependencies<I, N>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<MetricName>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns `true` if the metric is not derived from any other metric
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Returns `true` if the metric has the given kind and owner.
    ///
    /// `None` matches anything.
    #[must_use]
    pub fn matches(&self, kind: Option<MetricKind>, owner: Option<&str>) -> bool {
        kind.is_none_or(|k| self.kind == k) && owner.is_none_or(|o| self.owner == o)
    }
}

/// Identifier of a change event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Create a new event ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of operational change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A service deployment
    Deployment,

    /// A configuration change
    #[serde(rename = "config")]
    ConfigUpdate,

    /// A change to an upstream data schema
    DataSchema,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deployment => write!(f, "deployment"),
            Self::ConfigUpdate => write!(f, "config"),
            Self::DataSchema => write!(f, "data_schema"),
        }
    }
}

/// An operational change whose impact should be estimated.
///
/// Events are constructed per analysis request and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Event identifier
    pub id: EventId,

    /// Kind of change
    #[serde(rename = "type")]
    pub kind: ChangeKind,

    /// When the change happened
    pub timestamp: DateTime<Utc>,

    /// Service that originated the change
    pub service: String,

    /// Free-text description
    pub description: String,

    /// Metrics the caller believes are directly touched by the change
    #[serde(default)]
    pub related_metrics: Vec<MetricName>,
}

impl ChangeEvent {
    /// Create an event stamped with the current time
    pub fn new<I, N>(
        id: EventId,
        kind: ChangeKind,
        service: impl Into<String>,
        description: impl Into<String>,
        related_metrics: I,
    ) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<MetricName>,
    {
        Self {
            id,
            kind,
            timestamp: Utc::now(),
            service: service.into(),
            description: description.into(),
            related_metrics: related_metrics.into_iter().map(Into::into).collect(),
        }
    }
}

/// Structural impact of a change event.
///
/// The severity score is the number of impacted metrics. It is a structural
/// count, not weighted by metric kind, owner, or distance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactReport {
    /// Event the report was computed for
    pub event_id: EventId,

    /// Directly related metrics plus everything downstream of them
    pub impacted_metrics: BTreeSet<MetricName>,

    /// Cardinality of `impacted_metrics`
    pub severity_score: usize,
}

impl ImpactReport {
    /// Build a report; the severity score is derived from the impacted set
    #[must_use]
    pub fn new(event_id: EventId, impacted_metrics: BTreeSet<MetricName>) -> Self {
        let severity_score = impacted_metrics.len();
        Self {
            event_id,
            impacted_metrics,
            severity_score,
        }
    }
}

/// Upstream and downstream lineage of a single metric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineage {
    /// The metric queried
    pub metric: MetricName,

    /// Transitive dependencies
    pub upstream: BTreeSet<MetricName>,

    /// Transitive dependents
    pub downstream: BTreeSet<MetricName>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::no_filter(None, None, true)]
    #[case::kind_only(Some(MetricKind::Ratio), None, true)]
    #[case::owner_only(None, Some("ads-team"), true)]
    #[case::both(Some(MetricKind::Ratio), Some("ads-team"), true)]
    #[case::wrong_kind(Some(MetricKind::Counter), None, false)]
    #[case::wrong_owner(None, Some("finance"), false)]
    #[case::one_of_two(Some(MetricKind::Ratio), Some("finance"), false)]
    fn definition_matches_kind_and_owner(
        #[case] kind: Option<MetricKind>,
        #[case] owner: Option<&str>,
        #[case] expected: bool,
    ) {
        let def = MetricDefinition::new("ctr", MetricKind::Ratio, "ads-team");
        assert_eq!(def.matches(kind, owner), expected);
    }

    #[test]
    fn definition_parses_from_yaml_with_type_key() {
        let yaml = r"
name: ctr
type: ratio
owner: ads-team
expression: clicks / impressions
dependencies: [clicks, impressions]
tags:
  tier: gold
";
        let def: MetricDefinition = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(def.name.as_str(), "ctr");
        assert_eq!(def.kind, MetricKind::Ratio);
        assert_eq!(
            def.dependencies,
            vec![MetricName::new("clicks"), MetricName::new("impressions")]
        );
        assert_eq!(def.tags.get("tier").map(String::as_str), Some("gold"));
        assert!(def.description.is_none());
        assert!(!def.is_primitive());
    }

    #[test]
    fn definition_accepts_kind_alias() {
        let yaml = "name: clicks\nkind: counter\nowner: ads-team\n";
        let def: MetricDefinition = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(def.kind, MetricKind::Counter);
        assert!(def.is_primitive());
    }

    #[test]
    fn unknown_metric_kind_is_rejected() {
        let yaml = "name: clicks\ntype: histogram\nowner: ads-team\n";
        assert!(serde_yaml::from_str::<MetricDefinition>(yaml).is_err());
    }

    #[test]
    fn change_kind_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&ChangeKind::ConfigUpdate).unwrap(),
            "\"config\""
        );
        assert_eq!(
            serde_json::to_string(&ChangeKind::DataSchema).unwrap(),
            "\"data_schema\""
        );
        assert_eq!(ChangeKind::Deployment.to_string(), "deployment");
    }

    #[test]
    fn impact_report_severity_is_set_size() {
        let impacted: BTreeSet<MetricName> = ["a", "b", "c"].into_iter().map(Into::into).collect();
        let report = ImpactReport::new(EventId::new("evt-1"), impacted);

        assert_eq!(report.severity_score, 3);
    }

    #[test]
    fn metric_name_sets_can_be_probed_with_str() {
        let names: BTreeSet<MetricName> = ["clicks"].into_iter().map(Into::into).collect();
        assert!(names.contains("clicks"));
    }
}
