//! Core types and statistics for the KovaaK's trend report.
//!
//! Holds the session record model, the trend calculator, the trend curve
//! generator with its quadratic spline, the playlist catalog, settings and
//! the shared error type. Nothing here touches the stats folder.

pub mod curve;
pub mod error;
pub mod formatting;
pub mod models;
pub mod playlists;
pub mod settings;
pub mod spline;
pub mod trends;
