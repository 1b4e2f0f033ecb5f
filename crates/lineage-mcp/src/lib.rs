//! MCP server for metric lineage.
//!
//! This crate provides an MCP (Model Context Protocol) server that exposes a
//! validated lineage catalog to AI assistants and other MCP clients.
//!
//! # Architecture
//!
//! The catalog is loaded once at startup with the same resolution rules as
//! the `lineage` CLI and shared read-only between tool calls. Anomaly
//! baselines are fitted through the server and kept in memory per metric.
//!
//! # Tools
//!
//! ## Catalog Queries
//! - `list_metrics` - List definitions, filtered by kind or owner
//! - `lineage` - Upstream and downstream closure of a metric
//! - `export_graph` - Node-link JSON of the whole graph
//!
//! ## Change Analysis
//! - `impact` - Metrics affected by a change and its severity score
//!
//! ## Anomaly Detection
//! - `fit_baseline` - Fit or replace a metric's z-score baseline
//! - `check_anomaly` - Score a value against that baseline

pub mod context;
pub mod error;
pub mod models;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
pub use server::LineageMcpServer;
