//! Lineage tree rendering for `lineage tree` output.

use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

use serde::Serialize;

use super::color::{bold, colorize_name, dimmed, kind_icon};
use super::{OutputConfig, OutputMode};
use crate::domain::{MetricKind, MetricName};
use crate::graph::LineageGraph;

/// Which way a tree walks from its root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeDirection {
    /// Children are the metrics the parent depends on
    Upstream,
    /// Children are the metrics derived from the parent
    Downstream,
}

/// A node in a lineage tree.
///
/// Every metric is expanded exactly once, at its shortest distance from the
/// root, so a depth-limited tree shows the same metrics as the matching
/// `upstream`/`downstream` query. Other occurrences are marked `repeated`
/// and carry no children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineageTreeNode {
    /// Metric name
    pub metric: MetricName,
    /// Metric kind, if the metric is in the catalog
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<MetricKind>,
    /// Expanded elsewhere in the tree
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub repeated: bool,
    /// Child nodes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LineageTreeNode>,
}

impl LineageTreeNode {
    /// Build the tree rooted at `metric`, stopping below `max_depth` levels
    #[must_use]
    pub fn build(
        graph: &LineageGraph,
        metric: &str,
        direction: TreeDirection,
        max_depth: Option<usize>,
    ) -> Self {
        let levels = match direction {
            TreeDirection::Upstream => graph.upstream_levels(metric, max_depth),
            TreeDirection::Downstream => graph.downstream_levels(metric, max_depth),
        };
        let mut shortest: HashMap<&str, usize> = levels
            .into_iter()
            .map(|(name, depth)| (name.as_str(), depth))
            .collect();
        shortest.insert(metric, 0);

        let mut walk = TreeWalk {
            graph,
            direction,
            max_depth,
            shortest,
            expanded: HashSet::new(),
        };
        walk.node(metric, 0)
    }
}

struct TreeWalk<'g> {
    graph: &'g LineageGraph,
    direction: TreeDirection,
    max_depth: Option<usize>,
    shortest: HashMap<&'g str, usize>,
    expanded: HashSet<String>,
}

impl TreeWalk<'_> {
    fn node(&mut self, metric: &str, depth: usize) -> LineageTreeNode {
        let graph = self.graph;
        let kind = graph.definition(metric).map(|d| d.kind);
        let within_depth = self.max_depth.is_none_or(|max| depth < max);
        let at_shortest = self.shortest.get(metric) == Some(&depth);

        // Only the shortest-depth occurrence may claim the metric; a deeper
        // one reached first would cut its subtree short.
        let expand = at_shortest && self.expanded.insert(metric.to_string());

        let children = if expand && within_depth {
            let mut neighbours = match self.direction {
                TreeDirection::Upstream => graph.direct_dependencies(metric),
                TreeDirection::Downstream => graph.direct_dependents(metric),
            };
            neighbours.sort();
            neighbours
                .into_iter()
                .map(|child| self.node(child.as_str(), depth + 1))
                .collect()
        } else {
            Vec::new()
        };

        LineageTreeNode {
            metric: MetricName::new(metric),
            kind,
            repeated: !expand,
            children,
        }
    }
}

/// Print a lineage tree with ASCII/Unicode connectors.
///
/// ```text
/// ◆ revenue_per_click
/// ├── ∑ ad_clicks
/// └── ◆ revenue
///     └── ∑ ad_clicks (repeated)
/// ```
pub fn print_lineage_tree(root: &LineageTreeNode, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_tree_text(&mut handle, root, &config),
        OutputMode::Json => super::write_json(&mut handle, root),
    }
}

pub(crate) fn print_tree_text<W: Write>(
    w: &mut W,
    root: &LineageTreeNode,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}",
        node_icon(root, config),
        bold(&colorize_name(root.metric.as_str(), config), config)
    )?;
    print_children(w, &root.children, &[], config)
}

fn node_icon(node: &LineageTreeNode, config: &OutputConfig) -> String {
    match node.kind {
        Some(kind) => kind_icon(kind, config),
        None => dimmed("?", config),
    }
}

/// `prefix_segments` records, per ancestor level, whether siblings follow
/// below it (drawn as a vertical continuation line).
fn print_children<W: Write>(
    w: &mut W,
    children: &[LineageTreeNode],
    prefix_segments: &[bool],
    config: &OutputConfig,
) -> io::Result<()> {
    let (branch, corner, pipe, space) = if config.use_ascii {
        ("|-- ", "`-- ", "|   ", "    ")
    } else {
        ("├── ", "└── ", "│   ", "    ")
    };

    for (i, child) in children.iter().enumerate() {
        let is_last = i + 1 == children.len();

        let mut prefix = String::new();
        for &has_more in prefix_segments {
            prefix.push_str(&dimmed(if has_more { pipe } else { space }, config));
        }
        let connector = dimmed(if is_last { corner } else { branch }, config);
        let marker = if child.repeated {
            format!(" {}", dimmed("(repeated)", config))
        } else {
            String::new()
        };

        writeln!(
            w,
            "{prefix}{connector}{} {}{marker}",
            node_icon(child, config),
            colorize_name(child.metric.as_str(), config)
        )?;

        if !child.children.is_empty() {
            let mut next_segments = prefix_segments.to_vec();
            next_segments.push(!is_last);
            print_children(w, &child.children, &next_segments, config)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MetricCatalog;
    use crate::domain::MetricDefinition;
    use crate::graph::DependencyGraph;

    fn diamond() -> LineageGraph {
        let catalog = MetricCatalog::new(vec![
            MetricDefinition::new("a", MetricKind::Counter, "t"),
            MetricDefinition::new("b", MetricKind::Composite, "t").with_dependencies(["a"]),
            MetricDefinition::new("c", MetricKind::Composite, "t").with_dependencies(["a"]),
            MetricDefinition::new("d", MetricKind::Composite, "t").with_dependencies(["b", "c"]),
        ])
        .unwrap();
        DependencyGraph::from_catalog(&catalog).validate().unwrap()
    }

    fn render(root: &LineageTreeNode, ascii: bool) -> String {
        let mut buffer = Vec::new();
        print_tree_text(&mut buffer, root, &OutputConfig::new(80, ascii, false)).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn downstream_tree_expands_shared_node_once() {
        let tree = LineageTreeNode::build(&diamond(), "a", TreeDirection::Downstream, None);

        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].metric.as_str(), "b");
        assert_eq!(tree.children[0].children[0].metric.as_str(), "d");
        assert!(!tree.children[0].children[0].repeated);
        assert!(tree.children[1].children[0].repeated);
        assert!(tree.children[1].children[0].children.is_empty());
    }

    #[test]
    fn upstream_tree_respects_depth() {
        let tree = LineageTreeNode::build(&diamond(), "d", TreeDirection::Upstream, Some(1));

        assert_eq!(tree.children.len(), 2);
        assert!(tree.children.iter().all(|c| c.children.is_empty()));
    }

    /// `w` sits below `z`, which is one hop from `r` directly and two hops
    /// through `a`; the deeper path is visited first.
    fn shortcut() -> LineageGraph {
        let catalog = MetricCatalog::new(vec![
            MetricDefinition::new("r", MetricKind::Counter, "t"),
            MetricDefinition::new("a", MetricKind::Composite, "t").with_dependencies(["r"]),
            MetricDefinition::new("z", MetricKind::Composite, "t").with_dependencies(["r", "a"]),
            MetricDefinition::new("w", MetricKind::Composite, "t").with_dependencies(["z"]),
        ])
        .unwrap();
        DependencyGraph::from_catalog(&catalog).validate().unwrap()
    }

    fn expanded_names(node: &LineageTreeNode, out: &mut Vec<String>) {
        if !node.repeated {
            out.push(node.metric.to_string());
        }
        for child in &node.children {
            expanded_names(child, out);
        }
    }

    #[test]
    fn shared_metric_expands_at_shortest_depth() {
        let graph = shortcut();
        let tree = LineageTreeNode::build(&graph, "r", TreeDirection::Downstream, Some(2));

        let a = &tree.children[0];
        assert_eq!(a.metric.as_str(), "a");
        assert!(a.children[0].repeated);

        let z = &tree.children[1];
        assert_eq!(z.metric.as_str(), "z");
        assert!(!z.repeated);
        assert_eq!(z.children[0].metric.as_str(), "w");
    }

    #[test]
    fn depth_limited_tree_matches_downstream_levels() {
        let graph = shortcut();
        for depth in 1..=3 {
            let tree = LineageTreeNode::build(&graph, "r", TreeDirection::Downstream, Some(depth));
            let mut shown = Vec::new();
            expanded_names(&tree, &mut shown);
            shown.sort();

            let mut expected: Vec<String> = graph
                .downstream_levels("r", Some(depth))
                .into_iter()
                .map(|(name, _)| name.to_string())
                .collect();
            expected.push("r".to_string());
            expected.sort();

            assert_eq!(shown, expected, "depth {depth}");
        }
    }

    #[test]
    fn unknown_root_is_a_bare_node() {
        let tree = LineageTreeNode::build(&diamond(), "zzz", TreeDirection::Downstream, None);

        assert_eq!(tree.kind, None);
        assert!(tree.children.is_empty());
    }

    #[test]
    fn ascii_rendering() {
        let tree = LineageTreeNode::build(&diamond(), "a", TreeDirection::Downstream, None);
        let output = render(&tree, true);

        let expected = "\
# a
|-- * b
|   `-- * d
`-- * c
    `-- * d (repeated)
";
        assert_eq!(output, expected);
    }

    #[test]
    fn json_omits_empty_fields() {
        let tree = LineageTreeNode::build(&diamond(), "d", TreeDirection::Downstream, None);
        let json = serde_json::to_value(&tree).unwrap();

        assert_eq!(json["metric"], "d");
        assert_eq!(json["type"], "composite");
        assert!(json.get("children").is_none());
        assert!(json.get("repeated").is_none());
    }
}
