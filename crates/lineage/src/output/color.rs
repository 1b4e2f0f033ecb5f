//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success:   green   (valid catalog, normal values)
//!   - Warning:   yellow  (moderate severity)
//!   - Error:     red     (anomalies, high severity, validation failures)
//!   - Info:      cyan    (metric names, tree roots)
//!   - Accent:    magenta (owners)
//!   - Muted:     dimmed  (field labels, connectors)
//!   - Emphasis:  bold    (section headers)

use crate::domain::MetricKind;
use colored::Colorize;

use super::OutputConfig;

/// Severity at or above which an impact is shown as an error
const HIGH_SEVERITY: usize = 10;

/// Severity at or above which an impact is shown as a warning
const MODERATE_SEVERITY: usize = 4;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

pub(crate) fn colorize_name(name: &str, config: &OutputConfig) -> String {
    info(name, config)
}

pub(crate) fn colorize_owner(owner: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return owner.to_string();
    }
    owner.magenta().to_string()
}

/// Kind label, padded so list columns line up.
pub(crate) fn colorize_kind(kind: MetricKind, config: &OutputConfig) -> String {
    let text = format!("{:<9}", kind.to_string());
    if !config.use_colors {
        return text;
    }
    match kind {
        MetricKind::Counter => text.green().to_string(),
        MetricKind::Gauge => text.blue().to_string(),
        MetricKind::Ratio => text.yellow().to_string(),
        MetricKind::Composite => text.magenta().to_string(),
    }
}

/// Single-character marker for a metric kind, with ASCII fallback.
pub(crate) fn kind_icon(kind: MetricKind, config: &OutputConfig) -> String {
    let icon = match (kind, config.use_ascii) {
        (MetricKind::Counter, true) => "#",
        (MetricKind::Gauge, true) => "~",
        (MetricKind::Ratio, true) => "%",
        (MetricKind::Composite, true) => "*",
        (MetricKind::Counter, false) => "∑",
        (MetricKind::Gauge, false) => "◔",
        (MetricKind::Ratio, false) => "÷",
        (MetricKind::Composite, false) => "◆",
    };

    if !config.use_colors {
        return icon.to_string();
    }
    icon.dimmed().to_string()
}

/// Severity score colored by magnitude.
pub(crate) fn colorize_severity(severity: usize, config: &OutputConfig) -> String {
    let text = severity.to_string();
    if severity >= HIGH_SEVERITY {
        error(&text, config)
    } else if severity >= MODERATE_SEVERITY {
        warning(&text, config)
    } else {
        success(&text, config)
    }
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}
