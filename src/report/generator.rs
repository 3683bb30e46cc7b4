//! Dashboard page generation.
//!
//! This module renders the computed insights as a self-contained HTML page
//! (inline CSS and SVG) or as JSON, and builds the notice pages shown when
//! a run fails or finds no data.

use crate::config::Config;
use crate::error::{PipelineError, EMPTY_RESULT_MESSAGE};
use crate::models::{Insights, Report, ReportMetadata, Section};
use crate::report::charts::{bar_chart, donut_chart, histogram_chart, Theme};
use crate::report::format::{escape_xml, format_currency, format_thousands};

const STYLE: &str = r#"
body { margin: 0; background: #ffffff; color: #262730; font-family: "Source Sans Pro", Arial, sans-serif; }
main { max-width: 1280px; margin: 0 auto; padding: 2rem 1.5rem; }
h1 { font-size: 2.5rem; margin: 0 0 1.5rem; }
h2 { font-size: 1.6rem; margin: 1rem 0; }
.row { display: flex; gap: 1.5rem; margin-bottom: 1.5rem; }
.col { flex: 1 1 0; min-width: 0; }
.metric-label { font-size: 0.9rem; color: #555867; }
.metric-value { font-size: 2.25rem; line-height: 1.3; }
.notice { padding: 1rem; border-radius: 0.5rem; margin-bottom: 1rem; }
.notice.error { background: #ffe4e4; color: #7d1a1a; }
.notice.warning { background: #fffbe6; color: #6b5400; }
.notice.info { background: #e8f1fc; color: #1c4f8a; }
footer { margin-top: 2rem; font-size: 0.8rem; color: #808495; }
"#;

/// Generate the complete dashboard page.
pub fn generate_html_report(report: &Report, config: &Config) -> String {
    let dashboard = &config.dashboard;
    let theme = Theme::default();
    let mut output = String::new();

    output.push_str(&page_open(&dashboard.page_title));
    output.push_str(&format!("<h1>{}</h1>\n", escape_xml(&dashboard.title)));

    // Key figures
    output.push_str(&generate_metrics_section(&report.insights, config));

    // Residence and allowance
    output.push_str("<div class=\"row\">\n");
    output.push_str(&column(report.insights.residence.as_ref().map(|data| {
        bar_chart(&Section::Residence.title(dashboard.top_courses), data, &theme)
    })));
    output.push_str(&column(report.insights.allowance_histogram.as_ref().map(
        |hist| {
            histogram_chart(
                &Section::AllowanceDistribution.title(dashboard.top_courses),
                &config.columns.allowance,
                hist,
                &theme,
            )
        },
    )));
    output.push_str("</div>\n");

    // Courses, colleges and year levels
    output.push_str("<div class=\"row\">\n");
    output.push_str(&column(report.insights.top_courses.as_ref().map(|data| {
        bar_chart(&Section::TopCourses.title(dashboard.top_courses), data, &theme)
    })));
    output.push_str(&column(report.insights.top_colleges.as_ref().map(|data| {
        bar_chart(&Section::TopColleges.title(dashboard.top_courses), data, &theme)
    })));
    output.push_str(&column(report.insights.year_level_split.as_ref().map(
        |data| donut_chart(&Section::YearLevelSplit.title(dashboard.top_courses), data, &theme),
    )));
    output.push_str("</div>\n");

    output.push_str(&generate_footer(&report.metadata));
    output.push_str(&page_close());

    output
}

/// Generate the "Key Figures" row.
fn generate_metrics_section(insights: &Insights, config: &Config) -> String {
    let dashboard = &config.dashboard;
    let mut section = String::new();

    section.push_str("<h2>Key Figures</h2>\n");
    section.push_str("<div class=\"row\">\n");

    section.push_str(&metric(
        &Section::TotalStudents.title(dashboard.top_courses),
        Some(format_thousands(insights.total_students)),
    ));

    // A present column with no numbers still gets its card
    let average = if insights.skipped.contains(&Section::AverageAllowance) {
        None
    } else {
        Some(
            insights
                .average_allowance
                .map(|v| format_currency(&dashboard.currency_symbol, v))
                .unwrap_or_else(|| "n/a".to_string()),
        )
    };
    section.push_str(&metric(
        &Section::AverageAllowance.title(dashboard.top_courses),
        average,
    ));

    section.push_str(&metric(
        &Section::YearLevels.title(dashboard.top_courses),
        insights.year_levels.map(|n| n.to_string()),
    ));

    section.push_str("</div>\n");
    section
}

/// A metric card, or an empty slot when the metric was skipped.
fn metric(label: &str, value: Option<String>) -> String {
    match value {
        Some(value) => format!(
            "<div class=\"col metric\"><div class=\"metric-label\">{}</div><div class=\"metric-value\">{}</div></div>\n",
            escape_xml(label),
            escape_xml(&value)
        ),
        None => "<div class=\"col\"></div>\n".to_string(),
    }
}

fn column(content: Option<String>) -> String {
    match content {
        Some(svg) => format!("<div class=\"col chart\">\n{}</div>\n", svg),
        None => "<div class=\"col\"></div>\n".to_string(),
    }
}

fn generate_footer(metadata: &ReportMetadata) -> String {
    format!(
        "<footer>Source: {} &middot; {} rows &middot; Generated {}</footer>\n",
        escape_xml(&metadata.source),
        format_thousands(metadata.rows),
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

fn page_open(page_title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n<main>\n",
        escape_xml(page_title),
        STYLE
    )
}

fn page_close() -> String {
    "</main>\n</body>\n</html>\n".to_string()
}

/// Page shown when the run failed: the error message and the remediation hint.
pub fn generate_error_page(config: &Config, error: &PipelineError) -> String {
    let mut output = page_open(&config.dashboard.page_title);
    output.push_str(&format!("<h1>{}</h1>\n", escape_xml(&config.dashboard.title)));
    output.push_str(&format!(
        "<div class=\"notice error\">Error: {}</div>\n",
        escape_xml(&error.to_string())
    ));
    output.push_str(&format!(
        "<div class=\"notice info\">{}</div>\n",
        escape_xml(error.hint())
    ));
    output.push_str(&page_close());
    output
}

/// Page shown when the export had no data rows. Carries no charts.
pub fn generate_empty_page(config: &Config) -> String {
    let mut output = page_open(&config.dashboard.page_title);
    output.push_str(&format!("<h1>{}</h1>\n", escape_xml(&config.dashboard.title)));
    output.push_str(&format!(
        "<div class=\"notice warning\">{}</div>\n",
        EMPTY_RESULT_MESSAGE
    ));
    output.push_str(&page_close());
    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String, PipelineError> {
    serde_json::to_string_pretty(report).map_err(|e| PipelineError::Render(e.to_string()))
}
