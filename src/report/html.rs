// HTML emitter - renders the cumulative snapshot into one static document

use super::{Emitter, format_duration};
use crate::model::{RunSnapshot, Spec, Suite, SuiteStatus, Test, TestOutcome};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Matrix row labels are cut off past this many characters
const SUITE_TITLE_MAX: usize = 75;

const STYLE: &str = "<style>
body { font-family: sans-serif; margin: 2em; color: #222; }
section.suite { border: 1px solid #ddd; border-radius: 4px; margin: 1em 0; padding: 0.5em 1em; }
.suite-pass h2 { color: #2e7d32; }
.suite-fail h2 { color: #c62828; }
.suite-pending h2 { color: #f9a825; }
.suite-unknown h2 { color: #757575; }
li.test-pass { color: #2e7d32; }
li.test-fail { color: #c62828; }
li.test-pending { color: #f9a825; }
pre.suite-error, pre.test-error { background: #fbe9e7; padding: 0.5em; }
pre.test-log { background: #f5f5f5; padding: 0.5em; }
table.log-times { border-collapse: collapse; margin: 1em 0; }
table.log-times td, table.log-times th { border: 1px solid #ccc; padding: 0.3em 0.6em; }
td.test-unknown { color: #757575; text-align: center; }
img.screenshot { max-width: 480px; display: block; margin: 0.5em 0; }
</style>
";

/// Writes the final report document to `<base>.html`
pub struct HtmlEmitter {
    output_path: PathBuf,
}

impl HtmlEmitter {
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }

    /// Render the snapshot to a full HTML document
    pub fn render(stats: &RunSnapshot) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<title>Test Report</title>\n");
        html.push_str(STYLE);
        html.push_str("</head>\n<body>\n");

        render_summary(&mut html, stats);
        for runner in stats.runners.values() {
            for spec in runner.specs.values() {
                render_spec(&mut html, spec);
            }
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

impl Emitter for HtmlEmitter {
    fn emit(&self, stats: &RunSnapshot) -> Result<()> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create report directory: {}", parent.display())
                })?;
            }
        }

        fs::write(&self.output_path, Self::render(stats)).with_context(|| {
            format!(
                "Failed to write HTML report: {}",
                self.output_path.display()
            )
        })?;

        Ok(())
    }
}

/// A suite is rendered only when it has a title, at least one test, and a
/// uid that embeds the title (uids are `<title><seq>` shaped).
fn is_valid_suite(suite: &Suite) -> bool {
    !suite.title.is_empty() && suite.is_reportable() && suite.uid.contains(&suite.title)
}

fn render_summary(html: &mut String, stats: &RunSnapshot) {
    html.push_str("<section class=\"summary\">\n<h1>Test Report</h1>\n");
    if let Some(start) = stats.start {
        html.push_str(&format!("<p>Started: {}</p>\n", start.to_rfc3339()));
    }
    html.push_str(&format!(
        "<p>Duration: {}</p>\n",
        format_duration(stats.duration_ms)
    ));
    html.push_str(&format!(
        "<p>Tests: {} passed, {} pending, {} failed</p>\n",
        stats.counts.passes, stats.counts.pending, stats.counts.failures
    ));
    html.push_str(&format!(
        "<p>Suites: {} passed, {} pending, {} failed</p>\n",
        stats.suite_results.passing, stats.suite_results.pending, stats.suite_results.failing
    ));
    html.push_str("</section>\n");
}

fn render_spec(html: &mut String, spec: &Spec) {
    let mut counter = 0usize;
    for suite in spec.suites.values() {
        if !is_valid_suite(suite) {
            continue;
        }
        counter += 1;
        render_suite(html, counter, suite);
    }
    render_time_matrix(html, spec);
}

fn render_suite(html: &mut String, number: usize, suite: &Suite) {
    html.push_str(&format!(
        "<section class=\"suite {}\">\n",
        suite_class(suite.status)
    ));
    html.push_str(&format!(
        "<h2>{}: {}</h2>\n",
        number,
        escape_html(&suite.title)
    ));

    if let Some(error) = &suite.log_error {
        html.push_str(&format!(
            "<pre class=\"suite-error\">{}</pre>\n",
            escape_html(error)
        ));
    }
    if let Some(accounts) = &suite.accounts {
        html.push_str(&format!(
            "<pre class=\"suite-accounts\">{}</pre>\n",
            escape_html(&accounts.to_string())
        ));
    }

    html.push_str("<ul class=\"tests\">\n");
    for test in suite.tests.values() {
        render_test(html, test);
    }
    html.push_str("</ul>\n</section>\n");
}

fn render_test(html: &mut String, test: &Test) {
    html.push_str(&format!(
        "<li class=\"{}\">{}\n",
        test_class(test.state),
        escape_html(&test.title)
    ));
    if let Some(lines) = &test.log_lines {
        html.push_str(&format!(
            "<pre class=\"test-log\">{}</pre>\n",
            escape_html(&lines.join("\n"))
        ));
    }
    if let Some(error) = &test.error {
        html.push_str(&format!(
            "<pre class=\"test-error\">{}</pre>\n",
            escape_html(&error.to_string())
        ));
    }
    for screenshot in &test.screenshots {
        html.push_str(&format!(
            "<img class=\"screenshot\" src=\"{}\" alt=\"screenshot\">\n",
            escape_html(screenshot)
        ));
    }
    html.push_str("</li>\n");
}

/// Rows are suites in execution order; columns are the environments seen.
/// Cells without a recorded duration render as `-`.
fn render_time_matrix(html: &mut String, spec: &Spec) {
    if spec.log_times.is_empty() || spec.log_time_header.is_empty() {
        return;
    }

    let titles: Vec<String> = spec
        .suites
        .values()
        .filter(|suite| suite.is_reportable())
        .map(|suite| truncate_title(&suite.title))
        .collect();
    let labels: Vec<&String> = spec
        .log_time_header
        .iter()
        .filter(|label| !label.is_empty())
        .collect();

    html.push_str("<table class=\"log-times\">\n<tr>");
    for label in &labels {
        html.push_str(&format!("<th>{}</th>", escape_html(label)));
    }
    html.push_str("</tr>\n");

    for (index, row) in spec.log_times.iter().enumerate() {
        html.push_str("<tr>");
        for (position, label) in labels.iter().enumerate() {
            if position == 0 {
                let title = titles.get(index).map(String::as_str).unwrap_or("");
                html.push_str(&format!(
                    "<td>{}: {}</td>",
                    index + 1,
                    escape_html(title)
                ));
                continue;
            }
            match row.get(label.as_str()) {
                Some(cell) if !cell.log_time.is_empty() => {
                    html.push_str(&format!(
                        "<td style=\"background-color:{}\">{}</td>",
                        escape_html(&cell.color),
                        escape_html(&cell.log_time)
                    ));
                }
                _ => html.push_str("<td class=\"test-unknown\">-</td>"),
            }
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
}

fn test_class(state: TestOutcome) -> &'static str {
    match state {
        TestOutcome::Pass => "test-pass",
        TestOutcome::Fail => "test-fail",
        TestOutcome::Pending => "test-pending",
    }
}

fn suite_class(status: SuiteStatus) -> &'static str {
    match status {
        SuiteStatus::Pass => "suite-pass",
        SuiteStatus::Fail => "suite-fail",
        SuiteStatus::Pending => "suite-pending",
        SuiteStatus::Unknown => "suite-unknown",
    }
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() <= SUITE_TITLE_MAX {
        return title.to_string();
    }
    let cut: String = title.chars().take(SUITE_TITLE_MAX - 4).collect();
    format!("{cut} ...")
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
