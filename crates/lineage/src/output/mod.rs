//! Output formatting for CLI commands.
//!
//! Every command prints either human-readable text or pretty JSON for
//! programmatic use. Text renderers write to any `io::Write` so they can be
//! tested against a buffer.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers
//! - [`tree`]: Lineage tree rendering with ASCII/Unicode connectors

pub mod color;
pub mod tree;

use crate::anomaly::{AnomalyResult, Baseline};
use crate::domain::{ChangeEvent, ImpactReport, MetricDefinition, MetricName};
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, info, success, warning};
pub use tree::{LineageTreeNode, TreeDirection, print_lineage_tree};

use color::{
    bold, colorize_kind, colorize_name, colorize_owner, colorize_severity, dimmed, kind_icon,
};

// ============================================================================
// Output Configuration
// ============================================================================

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 80;

/// Settings that control text rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(max_width: usize, use_ascii: bool, use_colors: bool) -> Self {
        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` from environment variables.
    ///
    /// Reads:
    /// - `LINEAGE_MAX_WIDTH`: Maximum content width (default: 80)
    /// - `LINEAGE_ASCII`: "1" or "true" for ASCII-only icons (default: false)
    /// - `NO_COLOR`: any value disables colors
    /// - `LINEAGE_COLOR`: "0" or "false" disables colors (default: true)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_width = match lookup("LINEAGE_MAX_WIDTH") {
            Some(s) if !s.is_empty() => s.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    env_var = "LINEAGE_MAX_WIDTH",
                    value = %s,
                    default = DEFAULT_MAX_CONTENT_WIDTH,
                    "Invalid value, using default"
                );
                DEFAULT_MAX_CONTENT_WIDTH
            }),
            _ => DEFAULT_MAX_CONTENT_WIDTH,
        };

        let use_ascii = match lookup("LINEAGE_ASCII") {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Some(v) => {
                tracing::warn!(
                    env_var = "LINEAGE_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            None => false,
        };

        // https://no-color.org/
        let use_colors = lookup("NO_COLOR").is_none()
            && lookup("LINEAGE_COLOR").is_none_or(|v| v != "0" && !v.eq_ignore_ascii_case("false"));

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }

    fn content_width(&self) -> usize {
        get_terminal_width().min(self.max_width)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

fn get_terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| usize::from(w.0))
        .unwrap_or(usize::from(DEFAULT_TERMINAL_WIDTH))
}

/// Wrap text to fit within a given width, preserving existing line breaks.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| {
            if line.trim().is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, max_width)
                    .into_iter()
                    .map(std::borrow::Cow::into_owned)
                    .collect()
            }
        })
        .collect()
}

fn print_text_section<W: Write>(
    w: &mut W,
    title: &str,
    content: Option<&str>,
    config: &OutputConfig,
) -> io::Result<()> {
    let Some(content) = content.filter(|c| !c.is_empty()) else {
        return Ok(());
    };
    writeln!(w)?;
    writeln!(w, "{}:", bold(title, config))?;
    for line in wrap_text(content, config.content_width().saturating_sub(2)) {
        writeln!(w, "  {line}")?;
    }
    Ok(())
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Direction label for level listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Dependencies of the metric
    Upstream,
    /// Dependents of the metric
    Downstream,
}

#[derive(Serialize)]
struct LevelEntry<'a> {
    metric: &'a MetricName,
    depth: usize,
}

#[derive(Serialize)]
struct LevelsJson<'a> {
    metric: &'a str,
    direction: Direction,
    metrics: Vec<LevelEntry<'a>>,
}

#[derive(Serialize)]
struct MetricDetailsJson<'a> {
    #[serde(flatten)]
    definition: &'a MetricDefinition,
    dependents: &'a [&'a MetricName],
}

#[derive(Serialize)]
struct ScoredValue<'a> {
    value: f64,
    #[serde(flatten)]
    result: &'a AnomalyResult,
}

#[derive(Serialize)]
struct AnomalyJson<'a> {
    metric: &'a str,
    threshold: f64,
    baseline: Option<Baseline>,
    results: Vec<ScoredValue<'a>>,
}

/// Print a list of metric definitions
pub fn print_metrics(metrics: &[&MetricDefinition], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => print_metrics_text(&mut handle, metrics, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, &metrics),
    }
}

/// Print one metric with its direct dependencies and dependents
pub fn print_metric_details(
    definition: &MetricDefinition,
    dependents: &[&MetricName],
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => print_metric_details_text(
            &mut handle,
            definition,
            dependents,
            &OutputConfig::from_env(),
        ),
        OutputMode::Json => write_json(
            &mut handle,
            &MetricDetailsJson {
                definition,
                dependents,
            },
        ),
    }
}

/// Print the transitive lineage of a metric with the depth of each entry
pub fn print_levels(
    metric: &str,
    direction: Direction,
    levels: &[(&MetricName, usize)],
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => {
            print_levels_text(&mut handle, metric, direction, levels, &OutputConfig::from_env())
        }
        OutputMode::Json => write_json(
            &mut handle,
            &LevelsJson {
                metric,
                direction,
                metrics: levels
                    .iter()
                    .map(|&(metric, depth)| LevelEntry { metric, depth })
                    .collect(),
            },
        ),
    }
}

/// Print an impact report for a change event
pub fn print_impact(event: &ChangeEvent, report: &ImpactReport, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => print_impact_text(&mut handle, event, report, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, report),
    }
}

/// Print anomaly verdicts for a batch of values scored against one baseline
pub fn print_anomalies(
    metric: &str,
    threshold: f64,
    baseline: Option<Baseline>,
    scored: &[(f64, AnomalyResult)],
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => print_anomalies_text(
            &mut handle,
            metric,
            baseline,
            scored,
            &OutputConfig::from_env(),
        ),
        OutputMode::Json => write_json(
            &mut handle,
            &AnomalyJson {
                metric,
                threshold,
                baseline,
                results: scored
                    .iter()
                    .map(|(value, result)| ScoredValue {
                        value: *value,
                        result,
                    })
                    .collect(),
            },
        ),
    }
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

pub(crate) fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(w, "{json}")
}

// ============================================================================
// Text Formatting
// ============================================================================

fn print_metrics_text<W: Write>(
    w: &mut W,
    metrics: &[&MetricDefinition],
    config: &OutputConfig,
) -> io::Result<()> {
    if metrics.is_empty() {
        writeln!(w, "No metrics found.")?;
        return Ok(());
    }

    writeln!(w, "Found {} metric(s):", metrics.len())?;
    writeln!(w)?;

    let name_width = metrics.iter().map(|m| m.name.as_str().len()).max().unwrap_or(0);

    for metric in metrics {
        // Pad before coloring so escape codes do not skew the columns.
        let padded = format!("{:<name_width$}", metric.name.as_str());
        writeln!(
            w,
            "{} {}  {}  {}",
            kind_icon(metric.kind, config),
            colorize_name(&padded, config),
            colorize_kind(metric.kind, config),
            colorize_owner(&metric.owner, config)
        )?;
    }

    Ok(())
}

fn print_metric_details_text<W: Write>(
    w: &mut W,
    definition: &MetricDefinition,
    dependents: &[&MetricName],
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}",
        kind_icon(definition.kind, config),
        bold(&colorize_name(definition.name.as_str(), config), config)
    )?;
    writeln!(
        w,
        "{}  {}    {}  {}",
        dimmed("Type:", config),
        definition.kind,
        dimmed("Owner:", config),
        colorize_owner(&definition.owner, config)
    )?;

    if let Some(ref event) = definition.source_event {
        writeln!(w, "{} {}", dimmed("Source event:", config), event)?;
    }
    if let Some(ref field) = definition.aggregation_field {
        writeln!(w, "{} {}", dimmed("Aggregates:", config), field)?;
    }
    if let Some(ref expression) = definition.expression {
        writeln!(w, "{} {}", dimmed("Expression:", config), expression)?;
    }
    if !definition.tags.is_empty() {
        let tags: Vec<String> = definition
            .tags
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        writeln!(w, "{} {}", dimmed("Tags:", config), tags.join(", "))?;
    }

    print_text_section(w, "Description", definition.description.as_deref(), config)?;

    print_name_section(w, "Depends on", &definition.dependencies.iter().collect::<Vec<_>>(), "→", config)?;
    print_name_section(w, "Used by", dependents, "←", config)?;

    Ok(())
}

fn print_name_section<W: Write>(
    w: &mut W,
    title: &str,
    names: &[&MetricName],
    arrow: &str,
    config: &OutputConfig,
) -> io::Result<()> {
    if names.is_empty() {
        return Ok(());
    }
    let arrow = if config.use_ascii {
        if arrow == "→" { "->" } else { "<-" }
    } else {
        arrow
    };

    writeln!(w)?;
    writeln!(w, "{} ({}):", bold(title, config), names.len())?;
    for name in names {
        writeln!(
            w,
            "  {} {}",
            info(arrow, config),
            colorize_name(name.as_str(), config)
        )?;
    }
    Ok(())
}

fn print_levels_text<W: Write>(
    w: &mut W,
    metric: &str,
    direction: Direction,
    levels: &[(&MetricName, usize)],
    config: &OutputConfig,
) -> io::Result<()> {
    let noun = match direction {
        Direction::Upstream => "dependencies",
        Direction::Downstream => "dependents",
    };

    if levels.is_empty() {
        writeln!(w, "{} has no {noun}.", colorize_name(metric, config))?;
        return Ok(());
    }

    writeln!(
        w,
        "{} {} of {}:",
        levels.len(),
        noun,
        colorize_name(metric, config)
    )?;
    for (name, depth) in levels {
        let indent = "  ".repeat(*depth);
        writeln!(
            w,
            "{indent}{} {}",
            colorize_name(name.as_str(), config),
            dimmed(&format!("(depth {depth})"), config)
        )?;
    }
    Ok(())
}

fn print_impact_text<W: Write>(
    w: &mut W,
    event: &ChangeEvent,
    report: &ImpactReport,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {} {}",
        bold("Impact of", config),
        event.kind,
        info(report.event_id.as_str(), config)
    )?;
    writeln!(
        w,
        "{} {}    {} {}",
        dimmed("Service:", config),
        event.service,
        dimmed("Severity:", config),
        colorize_severity(report.severity_score, config)
    )?;

    print_text_section(w, "Description", Some(&event.description), config)?;

    writeln!(w)?;
    if report.impacted_metrics.is_empty() {
        writeln!(w, "No catalog metrics impacted.")?;
        return Ok(());
    }

    writeln!(
        w,
        "{} ({}):",
        bold("Impacted metrics", config),
        report.impacted_metrics.len()
    )?;
    for metric in &report.impacted_metrics {
        let marker = if event.related_metrics.contains(metric) {
            warning("*", config)
        } else {
            " ".to_string()
        };
        writeln!(w, "  {marker} {}", colorize_name(metric.as_str(), config))?;
    }
    Ok(())
}

fn print_anomalies_text<W: Write>(
    w: &mut W,
    metric: &str,
    baseline: Option<Baseline>,
    scored: &[(f64, AnomalyResult)],
    config: &OutputConfig,
) -> io::Result<()> {
    match baseline {
        Some(b) => writeln!(
            w,
            "{} {}  {} {:.3}  {} {:.3}",
            bold("Baseline for", config),
            colorize_name(metric, config),
            dimmed("mean", config),
            b.mean,
            dimmed("stddev", config),
            b.stddev
        )?,
        None => writeln!(
            w,
            "{} {}",
            warning("No usable baseline for", config),
            colorize_name(metric, config)
        )?,
    }
    writeln!(w)?;
    writeln!(
        w,
        "{:<12} {:<8} {:>9}  {}",
        "Value", "Anomaly", "Z-score", "Expected"
    )?;

    for (value, result) in scored {
        let verdict = format!("{:<8}", if result.is_anomaly { "YES" } else { "no" });
        let verdict = if result.is_anomaly {
            error(&verdict, config)
        } else {
            success(&verdict, config)
        };
        writeln!(
            w,
            "{:<12} {verdict} {:>9.3}  [{:.3}, {:.3}]",
            value, result.score, result.expected_range.lower, result.expected_range.upper
        )?;
    }
    Ok(())
}
