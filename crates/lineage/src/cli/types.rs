//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::{ChangeKind, MetricKind};

/// Metric kind for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKindArg {
    /// Monotonic count of events
    Counter,
    /// Point-in-time measurement
    Gauge,
    /// Quotient of two metrics
    Ratio,
    /// Arbitrary expression over other metrics
    Composite,
}

impl std::fmt::Display for MetricKindArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", MetricKind::from(*self))
    }
}

impl From<MetricKindArg> for MetricKind {
    fn from(arg: MetricKindArg) -> Self {
        match arg {
            MetricKindArg::Counter => Self::Counter,
            MetricKindArg::Gauge => Self::Gauge,
            MetricKindArg::Ratio => Self::Ratio,
            MetricKindArg::Composite => Self::Composite,
        }
    }
}

/// Change kind for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKindArg {
    /// A service deployment
    Deployment,
    /// A configuration change
    #[value(name = "config", alias = "config-update")]
    ConfigUpdate,
    /// A change to an upstream data schema
    #[value(name = "data_schema", alias = "data-schema")]
    DataSchema,
}

impl std::fmt::Display for ChangeKindArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", ChangeKind::from(*self))
    }
}

impl From<ChangeKindArg> for ChangeKind {
    fn from(arg: ChangeKindArg) -> Self {
        match arg {
            ChangeKindArg::Deployment => Self::Deployment,
            ChangeKindArg::ConfigUpdate => Self::ConfigUpdate,
            ChangeKindArg::DataSchema => Self::DataSchema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(MetricKindArg::Counter, "counter")]
    #[case(MetricKindArg::Gauge, "gauge")]
    #[case(MetricKindArg::Ratio, "ratio")]
    #[case(MetricKindArg::Composite, "composite")]
    fn metric_kind_display_matches_wire_name(#[case] arg: MetricKindArg, #[case] expected: &str) {
        assert_eq!(arg.to_string(), expected);
    }

    #[rstest]
    #[case("deployment", ChangeKind::Deployment)]
    #[case("config", ChangeKind::ConfigUpdate)]
    #[case("config-update", ChangeKind::ConfigUpdate)]
    #[case("data_schema", ChangeKind::DataSchema)]
    #[case("data-schema", ChangeKind::DataSchema)]
    fn change_kind_parses_names_and_aliases(#[case] input: &str, #[case] expected: ChangeKind) {
        let arg = ChangeKindArg::from_str(input, false).unwrap();
        assert_eq!(ChangeKind::from(arg), expected);
    }
}
