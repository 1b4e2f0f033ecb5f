//! CLI input validation functions.
//!
//! Used by clap's `value_parser` attribute so bad input is rejected at parse
//! time with a specific message.

/// Maximum length of a metric name accepted on the command line
pub const MAX_METRIC_NAME_LENGTH: usize = 128;

/// Validate a metric name.
///
/// Names are matched exactly against the catalog, so this only rejects
/// input that could never match: empty names, surrounding whitespace and
/// control characters.
pub fn validate_metric_name(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("Metric name cannot be empty".to_string());
    }

    if s.trim() != s {
        return Err(format!(
            "Metric name '{s}' has leading or trailing whitespace"
        ));
    }

    if s.chars().count() > MAX_METRIC_NAME_LENGTH {
        return Err(format!(
            "Metric name cannot exceed {MAX_METRIC_NAME_LENGTH} characters"
        ));
    }

    if s.chars().any(char::is_control) {
        return Err("Metric name cannot contain control characters".to_string());
    }

    Ok(s.to_string())
}

/// Validate an anomaly threshold (finite, greater than zero).
pub fn validate_threshold(s: &str) -> Result<f64, String> {
    let threshold: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid threshold '{s}': expected a number"))?;

    crate::anomaly::validate_threshold(threshold).map_err(|e| e.to_string())?;
    Ok(threshold)
}

/// Validate a single observation (finite number).
pub fn validate_sample(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid value '{s}': expected a number"))?;

    if !value.is_finite() {
        return Err(format!("Invalid value '{s}': must be finite"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ctr")]
    #[case("ad_clicks")]
    #[case("revenue.per.click")]
    #[case("ünïcödé")]
    fn valid_metric_names(#[case] name: &str) {
        assert_eq!(validate_metric_name(name).unwrap(), name);
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    #[case::padded(" ctr ")]
    #[case::control("ct\tr")]
    fn invalid_metric_names(#[case] name: &str) {
        assert!(validate_metric_name(name).is_err());
    }

    #[test]
    fn metric_name_length_limit() {
        assert!(validate_metric_name(&"a".repeat(MAX_METRIC_NAME_LENGTH)).is_ok());
        assert!(validate_metric_name(&"a".repeat(MAX_METRIC_NAME_LENGTH + 1)).is_err());
    }

    #[rstest]
    #[case("3", 3.0)]
    #[case("2.5", 2.5)]
    #[case(" 0.1 ", 0.1)]
    fn valid_thresholds(#[case] input: &str, #[case] expected: f64) {
        assert!((validate_threshold(input).unwrap() - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case("0")]
    #[case("-1")]
    #[case("inf")]
    #[case("NaN")]
    #[case("three")]
    fn invalid_thresholds(#[case] input: &str) {
        assert!(validate_threshold(input).is_err());
    }

    #[rstest]
    #[case("150", true)]
    #[case("-3.5", true)]
    #[case("nan", false)]
    #[case("abc", false)]
    fn samples(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(validate_sample(input).is_ok(), ok);
    }
}
