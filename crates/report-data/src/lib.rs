//! Data layer of the KovaaK's trend report.
//!
//! Discovers and parses session logs, merges them into play sessions,
//! aggregates per-scenario trends and assembles the per-rank reports.

pub mod aggregator;
pub mod analysis;
pub mod merger;
pub mod reader;

pub use report_core as core;
