//! Dashboard rendering.
//!
//! Formatting helpers, SVG charts and the HTML/JSON page generators.

pub mod charts;
pub mod format;
pub mod generator;

pub use generator::{
    generate_empty_page, generate_error_page, generate_html_report, generate_json_report,
};
