//! Baseline anomaly detection.
//!
//! A detector is fitted once on a historical series and then asked, value by
//! value, whether new observations are anomalous. The z-score detector keeps
//! exactly two numbers of state (mean and standard deviation); re-fitting
//! replaces them wholesale.
//!
//! # States
//!
//! - **Unfitted** (initial): `predict` returns [`AnomalyResult::unfitted`]
//!   (not anomalous, score 0, empty range) so callers can query before
//!   training completes.
//! - **Fitted**: after a `fit` with at least one finite sample.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

/// Standard deviation substituted when every sample is identical.
///
/// A zero-variance baseline would otherwise divide by zero when scoring.
/// Override per detector with [`ZScoreDetector::with_epsilon`] or the
/// `anomaly.stddev-epsilon` configuration key.
pub const DEFAULT_STDDEV_EPSILON: f64 = 1e-6;

/// Inclusive range of values considered normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedRange {
    /// Lower bound
    pub lower: f64,

    /// Upper bound
    pub upper: f64,
}

impl ExpectedRange {
    /// Zero-width range reported before a detector is fitted
    pub const EMPTY: Self = Self {
        lower: 0.0,
        upper: 0.0,
    };

    /// Returns `true` if `value` lies within the range, bounds included
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Distance between the bounds
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Returns `true` for a zero-width range
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() == 0.0
    }
}

/// Outcome of scoring one value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    /// Whether the value is outside the threshold
    pub is_anomaly: bool,

    /// Standardized score `(value - mean) / stddev`
    pub score: f64,

    /// Values that would not be flagged
    pub expected_range: ExpectedRange,
}

impl AnomalyResult {
    /// The result every unfitted detector returns
    #[must_use]
    pub fn unfitted() -> Self {
        Self {
            is_anomaly: false,
            score: 0.0,
            expected_range: ExpectedRange::EMPTY,
        }
    }
}

/// A fitted mean/standard-deviation pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Sample mean
    pub mean: f64,

    /// Population standard deviation (never zero)
    pub stddev: f64,
}

/// Fit-once, predict-many anomaly detector.
pub trait Detector {
    /// Learn a baseline from historical samples.
    ///
    /// An empty series leaves the detector unchanged.
    fn fit(&mut self, samples: &[f64]);

    /// Score a single value against the current baseline
    fn predict(&self, value: f64) -> AnomalyResult;

    /// Returns `true` once a baseline has been learned
    fn is_fitted(&self) -> bool;
}

/// Flags values whose z-score magnitude exceeds a threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ZScoreDetector {
    threshold: f64,
    epsilon: f64,
    baseline: Option<Baseline>,
}

impl ZScoreDetector {
    /// Create an unfitted detector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidThreshold`] unless `threshold` is finite and
    /// greater than zero.
    pub fn new(threshold: f64) -> Result<Self> {
        Self::with_epsilon(threshold, DEFAULT_STDDEV_EPSILON)
    }

    /// Create an unfitted detector with a custom zero-variance substitute.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidThreshold`] for a bad threshold and
    /// [`Error::Config`] unless `epsilon` is finite and greater than zero.
    pub fn with_epsilon(threshold: f64, epsilon: f64) -> Result<Self> {
        validate_threshold(threshold)?;
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(Error::Config(format!(
                "stddev epsilon must be a finite number greater than 0, got {epsilon}"
            )));
        }

        Ok(Self {
            threshold,
            epsilon,
            baseline: None,
        })
    }

    /// Configured threshold
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Current baseline, if fitted
    #[must_use]
    pub fn baseline(&self) -> Option<Baseline> {
        self.baseline
    }
}

impl Detector for ZScoreDetector {
    fn fit(&mut self, samples: &[f64]) {
        let finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.len() != samples.len() {
            tracing::warn!(
                skipped = samples.len() - finite.len(),
                "Ignoring non-finite samples while fitting baseline"
            );
        }
        if finite.is_empty() {
            tracing::debug!("Empty sample series, keeping previous baseline");
            return;
        }

        let (mean, mut stddev) = mean_and_stddev(&finite);
        if stddev == 0.0 {
            stddev = self.epsilon;
        }

        tracing::debug!(samples = finite.len(), mean, stddev, "Fitted anomaly baseline");
        self.baseline = Some(Baseline { mean, stddev });
    }

    fn predict(&self, value: f64) -> AnomalyResult {
        let Some(Baseline { mean, stddev }) = self.baseline else {
            return AnomalyResult::unfitted();
        };

        let score = (value - mean) / stddev;
        let spread = self.threshold * stddev;

        AnomalyResult {
            is_anomaly: score.abs() > self.threshold,
            score,
            expected_range: ExpectedRange {
                lower: mean - spread,
                upper: mean + spread,
            },
        }
    }

    fn is_fitted(&self) -> bool {
        self.baseline.is_some()
    }
}

/// Population mean and standard deviation of finite, non-empty samples.
///
/// Samples are divided by a power of two near the largest magnitude before
/// summing, so values close to `f64::MAX` cannot overflow the sums. Power of
/// two scaling is exact, which keeps results bit-identical to the plain
/// formula for ordinary inputs.
fn mean_and_stddev(samples: &[f64]) -> (f64, f64) {
    let largest = samples.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if largest == 0.0 {
        return (0.0, 0.0);
    }

    #[allow(clippy::cast_possible_truncation)]
    let exponent = (largest.log2().floor() as i32).clamp(f64::MIN_EXP - 1, f64::MAX_EXP - 1);
    let scale = 2.0_f64.powi(exponent);

    #[allow(clippy::cast_precision_loss)]
    let n = samples.len() as f64;
    let mean = samples.iter().map(|v| v / scale).sum::<f64>() / n;
    let variance = samples
        .iter()
        .map(|v| (v / scale - mean).powi(2))
        .sum::<f64>()
        / n;

    (mean * scale, variance.sqrt() * scale)
}

/// Check that a threshold is usable.
///
/// # Errors
///
/// Returns [`Error::InvalidThreshold`] unless `threshold` is finite and
/// greater than zero.
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if threshold.is_finite() && threshold > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidThreshold(threshold))
    }
}

/// A detector shared between threads.
///
/// Fitting takes the write lock and predicting the read lock, so a
/// prediction never sees the mean of one baseline paired with the standard
/// deviation of another.
#[derive(Debug)]
pub struct SharedDetector<D> {
    inner: RwLock<D>,
}

impl<D: Detector> SharedDetector<D> {
    /// Wrap a detector
    pub fn new(detector: D) -> Self {
        Self {
            inner: RwLock::new(detector),
        }
    }

    /// Re-fit the wrapped detector
    pub fn fit(&self, samples: &[f64]) {
        // A fit stores its baseline in a single assignment, so the data
        // behind a poisoned lock is still consistent.
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fit(samples);
    }

    /// Score a value against the current baseline
    pub fn predict(&self, value: f64) -> AnomalyResult {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .predict(value)
    }

    /// Returns `true` once the wrapped detector has been fitted
    pub fn is_fitted(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_fitted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TOLERANCE: f64 = 1e-9;

    /// 50 samples with mean exactly 100 and population stddev exactly 10.
    fn normal_history() -> Vec<f64> {
        std::iter::repeat_n([90.0, 110.0], 25).flatten().collect()
    }

    fn fitted(threshold: f64) -> ZScoreDetector {
        let mut detector = ZScoreDetector::new(threshold).unwrap();
        detector.fit(&normal_history());
        detector
    }

    #[test]
    fn unfitted_detector_returns_sentinel() {
        let detector = ZScoreDetector::new(2.0).unwrap();
        let result = detector.predict(1_000_000.0);

        assert!(!detector.is_fitted());
        assert_eq!(result, AnomalyResult::unfitted());
        assert!(result.expected_range.is_empty());
    }

    #[test]
    fn fit_computes_population_statistics() {
        let detector = fitted(2.0);
        let baseline = detector.baseline().unwrap();

        assert!((baseline.mean - 100.0).abs() < TOLERANCE);
        assert!((baseline.stddev - 10.0).abs() < TOLERANCE);
    }

    #[rstest]
    #[case::far_above(150.0, true, 5.0)]
    #[case::near_mean(105.0, false, 0.5)]
    #[case::far_below(60.0, true, -4.0)]
    #[case::on_upper_bound(120.0, false, 2.0)]
    fn predict_against_threshold_two(
        #[case] value: f64,
        #[case] anomalous: bool,
        #[case] expected_score: f64,
    ) {
        let result = fitted(2.0).predict(value);

        assert_eq!(result.is_anomaly, anomalous);
        assert!((result.score - expected_score).abs() < TOLERANCE);
        assert!((result.expected_range.lower - 80.0).abs() < TOLERANCE);
        assert!((result.expected_range.upper - 120.0).abs() < TOLERANCE);
    }

    #[test]
    fn empty_fit_is_a_no_op() {
        let mut detector = ZScoreDetector::new(3.0).unwrap();
        detector.fit(&[]);
        assert!(!detector.is_fitted());

        let mut detector = fitted(3.0);
        let before = detector.baseline();
        detector.fit(&[]);
        assert_eq!(detector.baseline(), before);
    }

    #[test]
    fn zero_variance_uses_epsilon() {
        let mut detector = ZScoreDetector::new(3.0).unwrap();
        detector.fit(&[5.0, 5.0, 5.0]);

        let baseline = detector.baseline().unwrap();
        assert!((baseline.stddev - DEFAULT_STDDEV_EPSILON).abs() < f64::EPSILON);
        assert!(!detector.predict(5.0).is_anomaly);
        assert!(detector.predict(5.1).is_anomaly);
    }

    #[test]
    fn custom_epsilon_is_applied() {
        let mut detector = ZScoreDetector::with_epsilon(3.0, 0.5).unwrap();
        detector.fit(&[5.0, 5.0]);

        assert!((detector.baseline().unwrap().stddev - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn refit_replaces_baseline() {
        let mut detector = fitted(2.0);
        detector.fit(&[0.0, 2.0]);

        let baseline = detector.baseline().unwrap();
        assert!((baseline.mean - 1.0).abs() < TOLERANCE);
        assert!((baseline.stddev - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn non_finite_samples_are_skipped() {
        let mut detector = ZScoreDetector::new(2.0).unwrap();
        detector.fit(&[f64::NAN, 4.0, f64::INFINITY, 6.0]);

        let baseline = detector.baseline().unwrap();
        assert!((baseline.mean - 5.0).abs() < TOLERANCE);
    }

    #[test]
    fn huge_samples_do_not_overflow() {
        let mut detector = ZScoreDetector::new(3.0).unwrap();
        detector.fit(&[1e308, 1e308, 1e308]);

        let baseline = detector.baseline().unwrap();
        assert!(baseline.mean.is_finite());
        assert!(baseline.stddev.is_finite());
        assert!((baseline.mean - 1e308).abs() <= 1e308 * 1e-12);

        let result = detector.predict(0.0);
        assert!(!result.score.is_nan());
        assert!(result.is_anomaly);
    }

    #[test]
    fn huge_identical_pair_falls_back_to_epsilon() {
        let mut detector = ZScoreDetector::new(3.0).unwrap();
        detector.fit(&[1e308, 1e308]);

        let baseline = detector.baseline().unwrap();
        assert!((baseline.mean - 1e308).abs() < f64::EPSILON);
        assert!((baseline.stddev - DEFAULT_STDDEV_EPSILON).abs() < f64::EPSILON);
        assert!(detector.predict(1e308).score.abs() < TOLERANCE);
    }

    #[test]
    fn opposite_extremes_stay_finite() {
        let mut detector = ZScoreDetector::new(3.0).unwrap();
        detector.fit(&[f64::MAX, -f64::MAX]);

        let baseline = detector.baseline().unwrap();
        assert!(baseline.mean.abs() < f64::EPSILON);
        assert!(baseline.stddev.is_finite());
        assert!(!detector.predict(0.0).is_anomaly);
    }

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-1.0)]
    #[case::nan(f64::NAN)]
    #[case::infinite(f64::INFINITY)]
    fn invalid_thresholds_are_rejected(#[case] threshold: f64) {
        assert!(matches!(
            ZScoreDetector::new(threshold),
            Err(Error::InvalidThreshold(_))
        ));
    }

    #[test]
    fn invalid_epsilon_is_rejected() {
        assert!(matches!(
            ZScoreDetector::with_epsilon(2.0, 0.0),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn shared_detector_fits_and_predicts_across_threads() {
        let shared = std::sync::Arc::new(SharedDetector::new(ZScoreDetector::new(2.0).unwrap()));
        assert!(!shared.is_fitted());

        let writer = {
            let shared = std::sync::Arc::clone(&shared);
            std::thread::spawn(move || shared.fit(&normal_history()))
        };
        writer.join().unwrap();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = std::sync::Arc::clone(&shared);
                std::thread::spawn(move || shared.predict(150.0))
            })
            .collect();

        for reader in readers {
            assert!(reader.join().unwrap().is_anomaly);
        }
    }
}
