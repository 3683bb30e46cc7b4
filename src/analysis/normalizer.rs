//! Categorical field normalization.
//!
//! Long category names such as `"College of Engineering (COE)"` are reduced
//! to the text inside their first pair of parentheses.

use crate::error::PipelineError;
use crate::models::{CellValue, RecordTable};
use regex::Regex;
use tracing::debug;

/// Rewrites cells to the first capture group of a pattern.
#[derive(Debug, Clone)]
pub struct Normalizer {
    pattern: Regex,
}

impl Normalizer {
    /// Compile `pattern`. It must contain at least one capture group.
    pub fn new(pattern: &str) -> Result<Self, PipelineError> {
        let regex = Regex::new(pattern).map_err(|e| PipelineError::InvalidPattern(e.to_string()))?;

        if regex.captures_len() < 2 {
            return Err(PipelineError::InvalidPattern(format!(
                "pattern '{}' has no capture group",
                pattern
            )));
        }

        Ok(Self { pattern: regex })
    }

    /// Normalize one cell.
    ///
    /// Returns `None` when the cell should stay as it is: it is missing, or
    /// its text has no match. A match whose group did not participate yields
    /// `Missing`.
    pub fn normalize_cell(&self, cell: &CellValue) -> Option<CellValue> {
        if cell.is_missing() {
            return None;
        }

        let text = cell.to_string();
        let caps = self.pattern.captures(&text)?;

        Some(match caps.get(1) {
            Some(group) => CellValue::Text(group.as_str().to_string()),
            None => CellValue::Missing,
        })
    }

    /// Normalize every cell of `column` in place.
    ///
    /// Returns the number of rewritten cells, or `None` if the column is absent.
    pub fn apply(&self, table: &mut RecordTable, column: &str) -> Option<usize> {
        let replaced = table.map_column(column, |cell| self.normalize_cell(cell))?;
        debug!("Normalized {} cells in '{}'", replaced, column);
        Some(replaced)
    }
}
