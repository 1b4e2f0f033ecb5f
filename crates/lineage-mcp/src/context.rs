//! Shared state for the MCP server.
//!
//! The metric catalog is loaded and validated once before the server starts
//! and is read-only afterwards, so it lives behind a plain `Arc`. The only
//! mutable state is the per-metric baseline registry and the event ID
//! generator.
//!
//! # Lock Ordering
//!
//! Tools never hold the baseline lock and the ID generator lock at the same
//! time.

use crate::error::{Error, Result};
use lineage::anomaly::{AnomalyResult, Baseline, Detector, ZScoreDetector};
use lineage::app::App;
use lineage::context::LineageContext;
use lineage::domain::{ChangeKind, EventId, MetricName};
use lineage::id_generation::EventIdGenerator;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Global context state for the MCP server.
pub struct Context {
    /// The validated catalog and graph.
    lineage: Arc<LineageContext>,

    /// One detector per metric that has been fitted.
    baselines: RwLock<HashMap<MetricName, ZScoreDetector>>,

    /// Generator for event IDs the caller did not supply.
    ids: Mutex<EventIdGenerator>,
}

impl Context {
    /// Create a context around an already loaded catalog.
    #[must_use]
    pub fn new(lineage: LineageContext) -> Self {
        Self::from_shared(Arc::new(lineage))
    }

    /// Create a context sharing a catalog with other owners.
    #[must_use]
    pub fn from_shared(lineage: Arc<LineageContext>) -> Self {
        Self {
            lineage,
            baselines: RwLock::new(HashMap::new()),
            ids: Mutex::new(EventIdGenerator::new()),
        }
    }

    /// Resolve configuration the same way the CLI does and load the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the definitions cannot be read or fail validation.
    pub async fn load(
        working_dir: &Path,
        config: Option<&Path>,
        definitions: Option<&Path>,
    ) -> Result<Self> {
        let app = App::open(working_dir, config, definitions).await?;
        debug!(definitions = %app.definitions_path().display(), "Loaded catalog for MCP server");
        Ok(Self::new(app.into_context()))
    }

    /// The shared catalog.
    #[must_use]
    pub fn lineage(&self) -> &Arc<LineageContext> {
        &self.lineage
    }

    /// Fit (or replace) the baseline for a metric.
    ///
    /// A fresh detector is built on every call, so refitting with a new
    /// threshold takes effect immediately. An empty or all non-finite sample
    /// series leaves any existing baseline in place.
    ///
    /// # Errors
    ///
    /// Returns `Error::MetricNotFound` for metrics outside the catalog and a
    /// lineage error for an invalid threshold.
    pub async fn fit_baseline(
        &self,
        metric: &str,
        samples: &[f64],
        threshold: Option<f64>,
    ) -> Result<(Option<Baseline>, f64)> {
        if !self.lineage.catalog().contains(metric) {
            return Err(Error::MetricNotFound(metric.to_string()));
        }

        let config = self.lineage.anomaly_config();
        let mut detector = match threshold {
            Some(threshold) => ZScoreDetector::with_epsilon(threshold, config.stddev_epsilon)?,
            None => config.detector()?,
        };
        detector.fit(samples);

        let mut baselines = self.baselines.write().await;
        if detector.is_fitted() {
            let summary = (detector.baseline(), detector.threshold());
            baselines.insert(MetricName::new(metric), detector);
            debug!(metric, samples = samples.len(), "Registered baseline");
            return Ok(summary);
        }

        debug!(metric, "No usable samples, keeping existing baseline");
        Ok(match baselines.get(metric) {
            Some(existing) => (existing.baseline(), existing.threshold()),
            None => (None, detector.threshold()),
        })
    }

    /// Score a value against a metric's registered baseline.
    ///
    /// Returns whether a baseline existed, and the unfitted sentinel
    /// result when it did not.
    pub async fn check_anomaly(&self, metric: &str, value: f64) -> (bool, AnomalyResult) {
        let baselines = self.baselines.read().await;
        match baselines.get(metric) {
            Some(detector) => (true, detector.predict(value)),
            None => (false, AnomalyResult::unfitted()),
        }
    }

    /// Number of metrics with a registered baseline.
    pub async fn baseline_count(&self) -> usize {
        self.baselines.read().await.len()
    }

    /// Use the caller's event ID, or generate one.
    ///
    /// Events are not stored; the generator only remembers IDs issued in
    /// the current clock tick.
    ///
    /// # Errors
    ///
    /// Returns an error if ID generation exhausts its retries.
    pub async fn event_id(
        &self,
        requested: Option<&str>,
        kind: ChangeKind,
        service: &str,
        description: &str,
    ) -> Result<EventId> {
        if let Some(id) = requested {
            return Ok(EventId::new(id));
        }

        self.ids
            .lock()
            .await
            .generate(kind, service, description)
            .map_err(|e| Error::Lineage(e.into()))
    }

    /// Number of event IDs the generator currently remembers.
    pub async fn tracked_event_ids(&self) -> usize {
        self.ids.lock().await.tracked()
    }
}
