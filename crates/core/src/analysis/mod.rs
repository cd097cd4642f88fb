//! Post-processing analyzer
//!
//! Turns a table of tracked-particle events into a convex capture area and
//! travel-time statistics over the particles' terminal events.

pub mod capture;
pub mod config;
pub mod hull;
pub mod stats;

pub use capture::{analyze, analyze_by_group, analyze_runs, CaptureAnalysis, Endpoint};
pub use config::{AnalysisConfig, AnalysisReport};
pub use hull::{convex_hull, polygon_area, CaptureArea};
pub use stats::TravelTimeSummary;
