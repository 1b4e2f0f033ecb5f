//! Node-link export format.
//!
//! The layout matches what D3 and Cytoscape style force-directed views
//! consume: a flat node list plus a flat list of `source -> target` links.

use crate::domain::{MetricKind, MetricName};
use serde::{Deserialize, Serialize};

/// A whole graph in node-link form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLinkGraph {
    /// Always `true`; edges point from dependency to dependent
    pub directed: bool,

    /// Always `false`; at most one edge per pair
    pub multigraph: bool,

    /// One entry per metric
    pub nodes: Vec<NodeLinkNode>,

    /// One entry per dependency edge
    pub links: Vec<NodeLinkLink>,
}

/// A metric node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLinkNode {
    /// Metric name
    pub id: MetricName,

    /// Metric kind
    #[serde(rename = "type")]
    pub kind: MetricKind,

    /// Metric owner
    pub owner: String,
}

/// A dependency edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLinkLink {
    /// The dependency
    pub source: MetricName,

    /// The dependent metric
    pub target: MetricName,
}
