//! Lineage - metric dependency tracking and change impact analysis.
//!
//! This crate provides both a CLI application and a library for answering
//! lineage questions about a catalog of metric definitions:
//!
//! - which metrics a metric is derived from (upstream lineage)
//! - which metrics are derived from it (downstream impact)
//! - how far a change event propagates through the catalog
//!
//! It also ships a small z-score anomaly detector that flags values far from
//! a fitted baseline.
//!
//! # Example
//!
//! ```
//! use lineage::catalog::MetricCatalog;
//! use lineage::domain::{MetricDefinition, MetricKind};
//! use lineage::graph::DependencyGraph;
//!
//! let catalog = MetricCatalog::new(vec![
//!     MetricDefinition::new("clicks", MetricKind::Counter, "ads"),
//!     MetricDefinition::new("ctr", MetricKind::Ratio, "ads").with_dependencies(["clicks"]),
//! ])
//! .unwrap();
//!
//! let graph = DependencyGraph::from_catalog(&catalog).validate().unwrap();
//! assert!(graph.downstream_impact("clicks").contains("ctr"));
//! ```

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod anomaly;
pub mod app;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod graph;
pub mod id_generation;
pub mod impact;
pub mod source;

// Public CLI module (needed by binary)
pub mod cli;

// Output formatting for the CLI
pub mod output;
