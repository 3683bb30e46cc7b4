//! Column aggregation and statistics.
//!
//! This module provides the building blocks for the dashboard: value
//! counts, top-N selection, means, distinct counts and histograms.
//! Frequency ordering is always stable, so ties keep the order in which
//! their labels were first seen.

use crate::models::{CellValue, Count, FrequencyTable, Histogram, HistogramBin};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Count every distinct non-missing value, most frequent first.
pub fn value_counts<'a, I>(cells: I) -> FrequencyTable
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<Count> = Vec::new();

    for cell in cells {
        if cell.is_missing() {
            continue;
        }

        let label = cell.to_string();
        match index.get(&label) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(label.clone(), counts.len());
                counts.push(Count::new(label, 1));
            }
        }
    }

    counts.sort_by_key(|c| std::cmp::Reverse(c.count));
    FrequencyTable(counts)
}

/// The `n` most frequent entries, most frequent first.
pub fn top_n(table: &FrequencyTable, n: usize) -> FrequencyTable {
    let mut sorted = table.0.clone();
    sorted.sort_by_key(|c| std::cmp::Reverse(c.count));
    sorted.truncate(n);
    FrequencyTable(sorted)
}

/// Re-sort ascending by count, for horizontal bar charts whose last
/// entry is drawn on top.
pub fn sort_ascending(table: &FrequencyTable) -> FrequencyTable {
    let mut sorted = table.0.clone();
    sorted.sort_by_key(|c| c.count);
    FrequencyTable(sorted)
}

/// Numeric cells of a column, plus how many non-missing cells were not numeric.
pub fn numeric_values<'a, I>(cells: I) -> (Vec<f64>, usize)
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let mut values = Vec::new();
    let mut ignored = 0;

    for cell in cells {
        match cell {
            CellValue::Number(n) => values.push(*n),
            CellValue::Text(_) => ignored += 1,
            CellValue::Missing => {}
        }
    }

    (values, ignored)
}

/// Arithmetic mean of the numeric cells, `None` if there are none.
pub fn mean<'a, I>(cells: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let (values, ignored) = numeric_values(cells);

    if ignored > 0 {
        warn!("Ignoring {} non-numeric values when averaging", ignored);
    }

    if values.is_empty() {
        return None;
    }

    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Number of distinct non-missing values.
pub fn distinct_count<'a, I>(cells: I) -> usize
where
    I: IntoIterator<Item = &'a CellValue>,
{
    cells
        .into_iter()
        .filter(|c| !c.is_missing())
        .map(|c| c.to_string())
        .collect::<HashSet<_>>()
        .len()
}

/// Split `values` into `bins` equal-width buckets from min to max.
///
/// The maximum lands in the last bucket. A zero-width range is widened to 1.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    if values.is_empty() || bins == 0 {
        return Histogram::default();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = if max > min { max - min } else { 1.0 };
    let width = span / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Histogram {
        bins: counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                start: min + width * i as f64,
                end: min + width * (i + 1) as f64,
                count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::Text(v.to_string())).collect()
    }

    fn numbers(values: &[f64]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::Number(*v)).collect()
    }

    fn table(entries: &[(&str, usize)]) -> FrequencyTable {
        FrequencyTable(entries.iter().map(|(l, c)| Count::new(*l, *c)).collect())
    }

    #[test]
    fn test_value_counts() {
        let cells = texts(&["A", "B", "A", "C", "B", "A"]);
        let counts = value_counts(&cells);

        assert_eq!(counts, table(&[("A", 3), ("B", 2), ("C", 1)]));
    }

    #[test]
    fn test_value_counts_skips_missing() {
        let mut cells = texts(&["Dorm", "Home"]);
        cells.push(CellValue::Missing);
        cells.push(CellValue::Text("Dorm".to_string()));

        let counts = value_counts(&cells);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.get("Dorm"), Some(2));
        assert_eq!(counts.get("nan"), None);
    }

    #[test]
    fn test_value_counts_ties_keep_first_seen_order() {
        let cells = texts(&["X", "Y", "Z", "Y", "X", "Z"]);
        let counts = value_counts(&cells);
        assert_eq!(counts.labels(), vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_value_counts_numeric_labels() {
        let cells = numbers(&[1.0, 2.0, 1.0]);
        let counts = value_counts(&cells);
        assert_eq!(counts, table(&[("1", 2), ("2", 1)]));
    }

    #[test]
    fn test_top_n() {
        let counts = table(&[("A", 3), ("B", 2), ("C", 1)]);
        let top = top_n(&counts, 2);
        assert_eq!(top.labels(), vec!["A", "B"]);

        // Asking for more than exists returns everything
        assert_eq!(top_n(&counts, 10).len(), 3);
    }

    #[test]
    fn test_top_n_ties() {
        let counts = table(&[("C", 1), ("A", 2), ("B", 2)]);
        assert_eq!(top_n(&counts, 2).labels(), vec!["A", "B"]);
    }

    #[test]
    fn test_sort_ascending() {
        let counts = table(&[("A", 3), ("B", 2), ("C", 2), ("D", 1)]);
        let sorted = sort_ascending(&counts);
        assert_eq!(sorted.labels(), vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&numbers(&[100.0, 200.0, 300.0])), Some(200.0));
        assert_eq!(mean(&Vec::<CellValue>::new()), None);

        let mut cells = numbers(&[10.0, 20.0]);
        cells.push(CellValue::Missing);
        cells.push(CellValue::Text("ask me".to_string()));
        assert_eq!(mean(&cells), Some(15.0));
    }

    #[test]
    fn test_distinct_count() {
        let mut cells = texts(&["1st Year", "2nd Year", "1st Year"]);
        cells.push(CellValue::Missing);
        assert_eq!(distinct_count(&cells), 2);
    }

    #[test]
    fn test_histogram() {
        let values: Vec<f64> = (0..=100).map(|v| v as f64).collect();
        let hist = histogram(&values, 20);

        assert_eq!(hist.bins.len(), 20);
        assert_eq!(hist.total(), values.len());
        assert_eq!(hist.bins[0].start, 0.0);
        assert_eq!(hist.bins[0].end, 5.0);
        assert_eq!(hist.bins[0].count, 5);
        // The maximum is folded into the last bucket
        assert_eq!(hist.bins[19].count, 6);
    }

    #[test]
    fn test_histogram_constant_values() {
        let hist = histogram(&[500.0, 500.0, 500.0], 4);
        assert_eq!(hist.bins.len(), 4);
        assert_eq!(hist.bins[0].count, 3);
        assert_eq!(hist.bins[3].end, 501.0);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(histogram(&[], 20).bins.is_empty());
        assert!(histogram(&[1.0], 0).bins.is_empty());
    }
}
