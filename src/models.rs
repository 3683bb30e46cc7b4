//! Data models for the dashboard pipeline.
//!
//! This module contains the core data structures used throughout
//! the application: the record table loaded from the spreadsheet,
//! the aggregates derived from it, and the final report.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Cell texts treated as missing, matching the spreadsheet export's
/// conventional NA markers.
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A single cell of the record table.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Free text, kept verbatim.
    Text(String),
    /// A finite number.
    Number(f64),
    /// Empty or NA marker.
    Missing,
}

impl CellValue {
    /// Interpret a raw CSV field.
    pub fn parse(raw: &str) -> Self {
        if NA_VALUES.contains(&raw) {
            return CellValue::Missing;
        }

        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(raw.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Missing => write!(f, "nan"),
        }
    }
}

/// In-memory tabular dataset: named columns × rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RecordTable {
    /// Create an empty table. Duplicate column names get `.1`, `.2`, ... suffixes.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();

        for name in columns {
            let name = name.into();
            let mut candidate = name.clone();
            let mut suffix = 1;
            while unique.contains(&candidate) {
                candidate = format!("{}.{}", name, suffix);
                suffix += 1;
            }
            unique.push(candidate);
        }

        Self {
            columns: unique,
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with `Missing`.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Missing);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of a column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&CellValue>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Rewrite every cell of a column in place.
    ///
    /// `f` returns `Some(new)` to replace a cell and `None` to keep it.
    /// Returns the number of replaced cells, or `None` if the column is absent.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> Option<usize>
    where
        F: FnMut(&CellValue) -> Option<CellValue>,
    {
        let idx = self.column_index(name)?;
        let mut replaced = 0;

        for row in &mut self.rows {
            if let Some(new) = f(&row[idx]) {
                row[idx] = new;
                replaced += 1;
            }
        }

        Some(replaced)
    }
}

/// One label and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    pub label: String,
    pub count: usize,
}

impl Count {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Ordered label → count table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrequencyTable(pub Vec<Count>);

impl FrequencyTable {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Count> {
        self.0.iter()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.0.iter().map(|c| c.count).sum()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.0.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.0.iter().find(|c| c.label == label).map(|c| c.count)
    }
}

/// One histogram bucket `[start, end)`; the last bucket is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

/// One metric or chart of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    TotalStudents,
    AverageAllowance,
    YearLevels,
    Residence,
    AllowanceDistribution,
    TopCourses,
    TopColleges,
    YearLevelSplit,
}

impl Section {
    /// Heading shown above the metric or chart.
    pub fn title(&self, top_courses: usize) -> String {
        match self {
            Section::TotalStudents => "Total Students".to_string(),
            Section::AverageAllowance => "Avg. Monthly Allowance".to_string(),
            Section::YearLevels => "Unique Year Levels".to_string(),
            Section::Residence => "Where Do Our Students Live?".to_string(),
            Section::AllowanceDistribution => "How Much Allowance Do They Receive?".to_string(),
            Section::TopCourses => format!("What Are the Top {} Courses?", top_courses),
            Section::TopColleges => "Which Colleges Lead?".to_string(),
            Section::YearLevelSplit => "Which Year Dominates?".to_string(),
        }
    }
}

/// Every aggregate the dashboard shows.
///
/// Optional fields are `None` when their source column is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Insights {
    /// Number of data rows.
    pub total_students: usize,
    /// Mean of the allowance column.
    pub average_allowance: Option<f64>,
    /// Distinct non-missing year levels.
    pub year_levels: Option<usize>,
    /// Residence counts, ascending.
    pub residence: Option<FrequencyTable>,
    /// Allowance distribution.
    pub allowance_histogram: Option<Histogram>,
    /// Most common courses, ascending.
    pub top_courses: Option<FrequencyTable>,
    /// Most common colleges after normalization, ascending.
    pub top_colleges: Option<FrequencyTable>,
    /// Year level counts, descending.
    pub year_level_split: Option<FrequencyTable>,
    /// Sections left out because their column was missing.
    pub skipped: Vec<Section>,
}

/// Metadata about a generated dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Where the data came from (URL or file path).
    pub source: String,
    /// When the dashboard was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of data rows loaded.
    pub rows: usize,
    /// Column names found in the export.
    pub columns: Vec<String>,
    /// Wall time of the whole run in seconds.
    pub duration_seconds: f64,
}

/// The complete dashboard report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub insights: Insights,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_parse() {
        assert_eq!(CellValue::parse("Dorm"), CellValue::Text("Dorm".to_string()));
        assert_eq!(CellValue::parse("4500"), CellValue::Number(4500.0));
        assert_eq!(CellValue::parse(" 12.5 "), CellValue::Number(12.5));
        assert_eq!(CellValue::parse(""), CellValue::Missing);
        assert_eq!(CellValue::parse("N/A"), CellValue::Missing);
        assert_eq!(CellValue::parse("nan"), CellValue::Missing);
        // Non-finite numbers stay text
        assert_eq!(CellValue::parse("inf"), CellValue::Text("inf".to_string()));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Number(3.0).to_string(), "3");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Text("COE".to_string()).to_string(), "COE");
        assert_eq!(CellValue::Missing.to_string(), "nan");
    }

    #[test]
    fn test_duplicate_columns() {
        let table = RecordTable::new(["Name", "Name", "Age", "Name"]);
        assert_eq!(table.columns(), &["Name", "Name.1", "Age", "Name.2"]);
    }

    #[test]
    fn test_push_row_pads() {
        let mut table = RecordTable::new(["A", "B", "C"]);
        table.push_row(vec![CellValue::Number(1.0)]);

        assert_eq!(table.len(), 1);
        let c = table.column("C").unwrap();
        assert!(c[0].is_missing());
    }

    #[test]
    fn test_map_column() {
        let mut table = RecordTable::new(["A"]);
        table.push_row(vec![CellValue::Text("x".to_string())]);
        table.push_row(vec![CellValue::Text("y".to_string())]);

        let replaced = table.map_column("A", |cell| match cell {
            CellValue::Text(s) if s == "x" => Some(CellValue::Text("z".to_string())),
            _ => None,
        });

        assert_eq!(replaced, Some(1));
        assert_eq!(table.map_column("missing", |_| None), None);
        let a = table.column("A").unwrap();
        assert_eq!(a[0], &CellValue::Text("z".to_string()));
        assert_eq!(a[1], &CellValue::Text("y".to_string()));
    }

    #[test]
    fn test_section_titles() {
        assert_eq!(Section::TopCourses.title(10), "What Are the Top 10 Courses?");
        assert_eq!(Section::TopColleges.title(10), "Which Colleges Lead?");
    }

    #[test]
    fn test_frequency_table_helpers() {
        let table = FrequencyTable(vec![Count::new("A", 3), Count::new("B", 2)]);
        assert_eq!(table.total(), 5);
        assert_eq!(table.labels(), vec!["A", "B"]);
        assert_eq!(table.get("B"), Some(2));
        assert_eq!(table.get("Z"), None);
    }
}
