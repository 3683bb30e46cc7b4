//! Dashboard aggregate assembly.
//!
//! Each metric and chart depends on one column. A missing column skips
//! only its own sections; nothing here fails on schema drift.

use crate::analysis::aggregator::{
    distinct_count, histogram, mean, numeric_values, sort_ascending, top_n, value_counts,
};
use crate::config::{ColumnsConfig, DashboardConfig};
use crate::models::{Insights, RecordTable, Section};
use tracing::{debug, info};

/// Compute every dashboard aggregate from an already-normalized table.
pub fn compute_insights(
    table: &RecordTable,
    columns: &ColumnsConfig,
    dashboard: &DashboardConfig,
) -> Insights {
    let mut insights = Insights {
        total_students: table.len(),
        ..Insights::default()
    };

    match table.column(&columns.allowance) {
        Some(cells) => {
            insights.average_allowance = mean(cells.iter().copied());
            let (values, _) = numeric_values(cells.iter().copied());
            insights.allowance_histogram = Some(histogram(&values, dashboard.histogram_bins));
        }
        None => skip(
            &mut insights,
            &columns.allowance,
            &[Section::AverageAllowance, Section::AllowanceDistribution],
        ),
    }

    match table.column(&columns.year_level) {
        Some(cells) => {
            insights.year_levels = Some(distinct_count(cells.iter().copied()));
            insights.year_level_split = Some(value_counts(cells.iter().copied()));
        }
        None => skip(
            &mut insights,
            &columns.year_level,
            &[Section::YearLevels, Section::YearLevelSplit],
        ),
    }

    match table.column(&columns.residence) {
        Some(cells) => {
            insights.residence = Some(sort_ascending(&value_counts(cells)));
        }
        None => skip(&mut insights, &columns.residence, &[Section::Residence]),
    }

    match table.column(&columns.course) {
        Some(cells) => {
            let counts = value_counts(cells);
            insights.top_courses = Some(sort_ascending(&top_n(&counts, dashboard.top_courses)));
        }
        None => skip(&mut insights, &columns.course, &[Section::TopCourses]),
    }

    match table.column(&columns.college) {
        Some(cells) => {
            let counts = value_counts(cells);
            insights.top_colleges = Some(sort_ascending(&top_n(&counts, dashboard.top_colleges)));
        }
        None => skip(&mut insights, &columns.college, &[Section::TopColleges]),
    }

    debug!("Computed insights: {:?}", insights);
    insights
}

fn skip(insights: &mut Insights, column: &str, sections: &[Section]) {
    info!(
        "Column '{}' not found, skipping {} section(s)",
        column,
        sections.len()
    );
    insights.skipped.extend_from_slice(sections);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::parse_csv;

    const FULL: &str = "\
Residence,Course,College,Year Level,Monthly Allowance
Dorm,BSCS,Engineering (COE),1st Year,4000
Home,BSCS,Engineering (COE),2nd Year,5000
Dorm,BSIT,Arts (CAS),1st Year,6000
Boarding,BSN,Nursing (CON),3rd Year,
";

    fn defaults() -> (ColumnsConfig, DashboardConfig) {
        (ColumnsConfig::default(), DashboardConfig::default())
    }

    #[test]
    fn test_full_table() {
        let table = parse_csv(FULL).unwrap();
        let (columns, dashboard) = defaults();

        let insights = compute_insights(&table, &columns, &dashboard);

        assert_eq!(insights.total_students, 4);
        assert_eq!(insights.average_allowance, Some(5000.0));
        assert_eq!(insights.year_levels, Some(3));
        assert!(insights.skipped.is_empty());

        let residence = insights.residence.unwrap();
        assert_eq!(residence.labels(), vec!["Home", "Boarding", "Dorm"]);

        let courses = insights.top_courses.unwrap();
        assert_eq!(courses.labels(), vec!["BSIT", "BSN", "BSCS"]);

        let split = insights.year_level_split.unwrap();
        assert_eq!(split.labels(), vec!["1st Year", "2nd Year", "3rd Year"]);

        let hist = insights.allowance_histogram.unwrap();
        assert_eq!(hist.bins.len(), 20);
        assert_eq!(hist.total(), 3);
    }

    #[test]
    fn test_top_n_limits() {
        let table = parse_csv(FULL).unwrap();
        let (columns, mut dashboard) = defaults();
        dashboard.top_courses = 1;
        dashboard.top_colleges = 2;

        let insights = compute_insights(&table, &columns, &dashboard);
        assert_eq!(insights.top_courses.unwrap().labels(), vec!["BSCS"]);
        assert_eq!(insights.top_colleges.unwrap().len(), 2);
    }

    #[test]
    fn test_missing_column_skips_only_its_sections() {
        let table = parse_csv(
            "Residence,Course,College,Year Level\nDorm,BSCS,COE,1st Year\nHome,BSIT,CAS,2nd Year\n",
        )
        .unwrap();
        let (columns, dashboard) = defaults();

        let insights = compute_insights(&table, &columns, &dashboard);

        assert_eq!(insights.average_allowance, None);
        assert_eq!(insights.allowance_histogram, None);
        assert_eq!(
            insights.skipped,
            vec![Section::AverageAllowance, Section::AllowanceDistribution]
        );

        assert_eq!(insights.total_students, 2);
        assert!(insights.residence.is_some());
        assert!(insights.top_courses.is_some());
        assert!(insights.top_colleges.is_some());
        assert!(insights.year_levels.is_some());
        assert!(insights.year_level_split.is_some());
    }

    #[test]
    fn test_no_expected_columns() {
        let table = parse_csv("Name\nAna\n").unwrap();
        let (columns, dashboard) = defaults();

        let insights = compute_insights(&table, &columns, &dashboard);

        assert_eq!(insights.total_students, 1);
        assert_eq!(insights.skipped.len(), 7);
        assert!(insights.residence.is_none());
        assert!(insights.top_colleges.is_none());
    }

    #[test]
    fn test_custom_column_names() {
        let table = parse_csv("Stipend\n100\n200\n300\n").unwrap();
        let (mut columns, dashboard) = defaults();
        columns.allowance = "Stipend".to_string();

        let insights = compute_insights(&table, &columns, &dashboard);
        assert_eq!(insights.average_allowance, Some(200.0));
    }

    #[test]
    fn test_allowance_without_numbers() {
        let table = parse_csv("Monthly Allowance\nvaries\n\n").unwrap();
        let (columns, dashboard) = defaults();

        let insights = compute_insights(&table, &columns, &dashboard);
        assert_eq!(insights.average_allowance, None);
        assert!(insights.allowance_histogram.unwrap().bins.is_empty());
        // Present but non-numeric is not a skip
        assert!(!insights.skipped.contains(&Section::AverageAllowance));
        assert!(!insights.skipped.contains(&Section::AllowanceDistribution));
    }

    /// `FULL` without the column named `name`.
    fn without_column(name: &str) -> String {
        let header: Vec<&str> = FULL.lines().next().unwrap().split(',').collect();
        let idx = header.iter().position(|h| *h == name).unwrap();

        FULL.lines()
            .map(|line| {
                let mut fields: Vec<&str> = line.split(',').collect();
                fields.remove(idx);
                fields.join(",")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn is_rendered(insights: &Insights, section: Section) -> bool {
        match section {
            Section::TotalStudents => true,
            Section::AverageAllowance => insights.average_allowance.is_some(),
            Section::YearLevels => insights.year_levels.is_some(),
            Section::Residence => insights.residence.is_some(),
            Section::AllowanceDistribution => insights.allowance_histogram.is_some(),
            Section::TopCourses => insights.top_courses.is_some(),
            Section::TopColleges => insights.top_colleges.is_some(),
            Section::YearLevelSplit => insights.year_level_split.is_some(),
        }
    }

    #[test]
    fn test_each_missing_column_skips_only_its_sections() {
        let all = [
            Section::TotalStudents,
            Section::AverageAllowance,
            Section::YearLevels,
            Section::Residence,
            Section::AllowanceDistribution,
            Section::TopCourses,
            Section::TopColleges,
            Section::YearLevelSplit,
        ];
        let cases: [(&str, &[Section]); 5] = [
            ("Residence", &[Section::Residence]),
            ("Course", &[Section::TopCourses]),
            ("College", &[Section::TopColleges]),
            ("Year Level", &[Section::YearLevels, Section::YearLevelSplit]),
            (
                "Monthly Allowance",
                &[Section::AverageAllowance, Section::AllowanceDistribution],
            ),
        ];
        let (columns, dashboard) = defaults();

        for (dropped, expected) in cases {
            let table = parse_csv(&without_column(dropped)).unwrap();
            assert!(!table.has_column(dropped));

            let insights = compute_insights(&table, &columns, &dashboard);
            assert_eq!(insights.skipped, expected.to_vec(), "dropped {}", dropped);
            assert_eq!(insights.total_students, 4, "dropped {}", dropped);

            for section in all {
                assert_eq!(
                    is_rendered(&insights, section),
                    !expected.contains(&section),
                    "dropped {}, section {:?}",
                    dropped,
                    section
                );
            }
        }
    }
}
