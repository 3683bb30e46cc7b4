//! Analysis modules.
//!
//! Normalization of categorical fields and the aggregates the dashboard
//! is built from.

pub mod aggregator;
pub mod insights;
pub mod normalizer;

pub use insights::compute_insights;
pub use normalizer::Normalizer;
