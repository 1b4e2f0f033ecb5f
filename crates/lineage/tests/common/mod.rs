//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use lineage::domain::{MetricDefinition, MetricKind};
use std::path::Path;
use std::process::{Command, Output};

/// A metric of the given kind with dependencies, owned by `test`
pub fn metric(name: &str, deps: &[&str]) -> MetricDefinition {
    let kind = if deps.is_empty() {
        MetricKind::Counter
    } else {
        MetricKind::Composite
    };
    MetricDefinition::new(name, kind, "test").with_dependencies(deps.iter().copied())
}

/// The four-metric catalog used throughout: a, b(a), c(b), d(a)
pub fn chain_catalog() -> Vec<MetricDefinition> {
    vec![
        metric("a", &[]),
        metric("b", &["a"]),
        metric("c", &["b"]),
        metric("d", &["a"]),
    ]
}

/// Starter ads catalog as YAML
pub const ADS_YAML: &str = r"
metrics:
  - name: ad_impressions
    type: counter
    owner: ads-team
  - name: ad_clicks
    type: counter
    owner: ads-team
  - name: ad_revenue
    type: counter
    owner: monetization
  - name: ctr
    type: ratio
    owner: ads-team
    dependencies: [ad_clicks, ad_impressions]
  - name: rpm
    type: ratio
    owner: monetization
    dependencies: [ad_revenue, ad_impressions]
  - name: revenue_per_click
    type: ratio
    owner: monetization
    dependencies: [ad_revenue, ad_clicks]
  - name: ads_health
    type: composite
    owner: ads-team
    dependencies: [ctr, rpm]
";

/// Run the lineage binary in `dir` with colors disabled
pub fn run_lineage_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lineage"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("LINEAGE_CONFIG")
        .env_remove("LINEAGE_DEFINITIONS")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute lineage binary")
}

/// Stdout of a successful run; panics with stderr otherwise
pub fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}
