//! Command execution logic.

use std::path::Path;

use anyhow::{Context as _, Result, bail};

use super::args::{
    AnomalyArgs, ExportArgs, ImpactArgs, InitArgs, LineageArgs, ListArgs, ShowArgs, TreeArgs,
    ValidateArgs,
};
use crate::anomaly::{Detector, ZScoreDetector};
use crate::app::App;
use crate::domain::{ChangeEvent, ChangeKind, EventId, MetricDefinition, MetricKind};
use crate::id_generation::EventIdGenerator;
use crate::output::{self, Direction, LineageTreeNode, OutputMode, TreeDirection};

/// Execute the init command
pub async fn execute_init(cwd: &Path, args: &InitArgs, output_mode: OutputMode) -> Result<()> {
    use crate::commands::init;

    let target = args
        .path
        .as_ref()
        .map_or_else(|| cwd.to_path_buf(), |p| cwd.join(p));

    let result = init::init(&target).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "config_file": result.config_file.display().to_string(),
            "definitions_file": result.definitions_file.display().to_string(),
            "created_definitions": result.created_definitions,
        }))?,
        OutputMode::Text if !args.quiet => {
            println!("Initialized lineage in {}", target.display());
            println!("  Config:      {}", result.config_file.display());
            println!(
                "  Definitions: {}{}",
                result.definitions_file.display(),
                if result.created_definitions {
                    " (starter catalog)"
                } else {
                    " (existing)"
                }
            );
        }
        OutputMode::Text => {}
    }

    Ok(())
}

/// Execute the validate command.
///
/// Loading the app already rejects an invalid catalog, so reaching this
/// point means the catalog is valid.
pub fn execute_validate(app: &App, args: &ValidateArgs, output_mode: OutputMode) -> Result<()> {
    let graph = app.context().graph();
    let roots: Vec<&str> = graph.roots().map(|n| n.as_str()).collect();

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "valid": true,
            "definitions": app.definitions_path().display().to_string(),
            "metrics": graph.len(),
            "edges": graph.edge_count(),
            "roots": roots,
        }))?,
        OutputMode::Text if !args.quiet => {
            let config = output::OutputConfig::from_env();
            println!(
                "{} {} ({} metrics, {} dependencies, {} primitive)",
                output::success("Valid:", &config),
                app.definitions_path().display(),
                graph.len(),
                graph.edge_count(),
                roots.len()
            );
        }
        OutputMode::Text => {}
    }

    Ok(())
}

/// Execute the list command
pub fn execute_list(app: &App, args: &ListArgs, output_mode: OutputMode) -> Result<()> {
    let kind = args.kind.map(MetricKind::from);
    let owner = args.owner.as_deref();

    let metrics: Vec<&MetricDefinition> = if args.topological {
        app.context()
            .graph()
            .topological_order()
            .filter(|d| d.matches(kind, owner))
            .collect()
    } else {
        app.context().catalog().filter(kind, owner).collect()
    };

    output::print_metrics(&metrics, output_mode)?;
    Ok(())
}

/// Execute the show command
pub fn execute_show(app: &App, args: &ShowArgs, output_mode: OutputMode) -> Result<()> {
    let Some(definition) = app.context().catalog().get(&args.metric) else {
        bail!("Metric not found: {}", args.metric);
    };

    let dependents = app.context().graph().direct_dependents(&args.metric);
    output::print_metric_details(definition, &dependents, output_mode)?;
    Ok(())
}

/// Execute the upstream and downstream commands
pub fn execute_lineage(
    app: &App,
    args: &LineageArgs,
    direction: Direction,
    output_mode: OutputMode,
) -> Result<()> {
    let graph = app.context().graph();

    if !graph.contains(&args.metric) {
        tracing::warn!(metric = %args.metric, "Metric is not in the catalog");
    }

    let levels = match direction {
        Direction::Upstream => graph.upstream_levels(&args.metric, args.depth),
        Direction::Downstream => graph.downstream_levels(&args.metric, args.depth),
    };

    output::print_levels(&args.metric, direction, &levels, output_mode)?;
    Ok(())
}

/// Execute the tree command
pub fn execute_tree(app: &App, args: &TreeArgs, output_mode: OutputMode) -> Result<()> {
    let direction = if args.upstream {
        TreeDirection::Upstream
    } else {
        TreeDirection::Downstream
    };

    let tree = LineageTreeNode::build(app.context().graph(), &args.metric, direction, args.depth);
    output::print_lineage_tree(&tree, output_mode)?;
    Ok(())
}

/// Execute the impact command
pub fn execute_impact(app: &App, args: &ImpactArgs, output_mode: OutputMode) -> Result<()> {
    let kind = ChangeKind::from(args.kind);

    let id = match &args.id {
        Some(id) => EventId::new(id.clone()),
        None => EventIdGenerator::new().generate(kind, &args.service, &args.description)?,
    };

    let event = ChangeEvent::new(
        id,
        kind,
        args.service.clone(),
        args.description.clone(),
        args.metrics.iter().map(String::as_str),
    );

    let report = app.context().analyze(&event);
    output::print_impact(&event, &report, output_mode)?;
    Ok(())
}

/// Execute the anomaly command
pub async fn execute_anomaly(app: &App, args: &AnomalyArgs, output_mode: OutputMode) -> Result<()> {
    let mut history = args.history.clone();
    if let Some(path) = &args.history_file {
        history.extend(read_samples(path).await?);
    }

    let mut detector = match args.threshold {
        Some(threshold) => {
            ZScoreDetector::with_epsilon(threshold, app.context().anomaly_config().stddev_epsilon)?
        }
        None => app.context().detector()?,
    };

    if !app.context().catalog().contains(&args.metric) {
        tracing::warn!(metric = %args.metric, "Scoring a metric that is not in the catalog");
    }

    detector.fit(&history);

    let scored: Vec<_> = args
        .values
        .iter()
        .map(|&value| (value, detector.predict(value)))
        .collect();

    output::print_anomalies(
        &args.metric,
        detector.threshold(),
        detector.baseline(),
        &scored,
        output_mode,
    )?;
    Ok(())
}

/// Execute the export command
pub async fn execute_export(app: &App, args: &ExportArgs) -> Result<()> {
    let export = app.context().graph().export();

    match &args.output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&export)?;
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), nodes = export.nodes.len(), "Exported graph");
        }
        None => output::print_json(&export)?,
    }

    Ok(())
}

/// Read numbers separated by whitespace or commas
async fn read_samples(path: &Path) -> Result<Vec<f64>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    parse_samples(&content).with_context(|| format!("Invalid sample in {}", path.display()))
}

fn parse_samples(content: &str) -> Result<Vec<f64>> {
    content
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| super::validators::validate_sample(token).map_err(anyhow::Error::msg))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_samples_accepts_mixed_separators() {
        let samples = parse_samples("90, 110\n95\t105,\n\n-2.5").unwrap();
        assert_eq!(samples, vec![90.0, 110.0, 95.0, 105.0, -2.5]);
    }

    #[test]
    fn parse_samples_rejects_garbage() {
        let err = parse_samples("1 2 three").unwrap_err();
        assert!(err.to_string().contains("three"));
    }

    #[test]
    fn parse_samples_empty() {
        assert!(parse_samples("  \n").unwrap().is_empty());
    }
}
