use crate::errors::Result;
use crate::report::ChangeReport;
use tera::{Context, Tera};

const TPL_CHANGE_REPORT: &str = include_str!("templates/change_report.html");
const CHANGE_REPORT: &str = "change_report.html";

/// Render a change report as a standalone HTML page
///
/// Generates a page with:
/// - The report label as title and heading
/// - The tracked target as a link
/// - One table row per change pair, removal and addition side by side
///
/// The template is autoescaped, so document-derived text cannot inject markup.
///
/// # Errors
///
/// `Render` if the template fails to compile or render.
pub fn render_change_report(report: &ChangeReport) -> Result<String> {
    let mut tera = Tera::default();
    tera.add_raw_template(CHANGE_REPORT, TPL_CHANGE_REPORT)?;

    let mut context = Context::new();
    context.insert("label", report.label().as_str());
    context.insert("target", report.target());
    context.insert("changes", report.changes());
    Ok(tera.render(CHANGE_REPORT, &context)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::compute_changes;
    use crate::report::TimestampLabel;
    use crate::snapshot::Snapshot;
    use chrono::{TimeZone, Utc};

    fn report(old: &str, new: &str, target: &str) -> ChangeReport {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 14, 5, 9).unwrap();
        ChangeReport::new(
            TimestampLabel::from_datetime(&at),
            target,
            compute_changes(old, new).unwrap(),
            Snapshot::from_text(old),
            Snapshot::from_text(new),
        )
    }

    #[test]
    fn test_render_change_report_basic() {
        let html = render_change_report(&report(
            "The price is $10.",
            "The price is $15.",
            "https://example.com/item",
        ))
        .unwrap();
        assert!(html.contains("<title>2024_03_07 [14_05_09]</title>"));
        assert!(html.contains("<h1>2024_03_07 [14_05_09]</h1>"));
        assert!(html.contains(&format!(
            "href=\"{}\"",
            tera::escape_html("https://example.com/item")
        )));
        assert!(html.contains("<td>1</td><td class=\"removed\">0</td><td class=\"added\">5</td>"));
        assert_eq!(html.matches("<tr><td>").count(), 1);
    }

    #[test]
    fn test_render_numbers_rows_in_diff_order() {
        let html = render_change_report(&report("a1 b2", "a3 b4", "t")).unwrap();
        let first = html.find("<tr><td>1</td>").unwrap();
        let second = html.find("<tr><td>2</td>").unwrap();
        assert!(first < second);
        assert!(html.contains("<td class=\"removed\">1</td><td class=\"added\">3</td>"));
        assert!(html.contains("<td class=\"removed\">2</td><td class=\"added\">4</td>"));
    }

    #[test]
    fn test_render_escapes_fragments_and_target() {
        let html = render_change_report(&report(
            "a<b",
            "c>d",
            "https://example.com/?a=1&b=\"2\"",
        ))
        .unwrap();
        assert!(html.contains("<td class=\"removed\">a&lt;b</td><td class=\"added\">c&gt;d</td>"));
        assert!(html.contains("&amp;b=&quot;2&quot;"));
        assert!(!html.contains("a<b"));
    }
}
