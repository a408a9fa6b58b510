//! Formatted terminal output for `localboost analyze`.
//!
//! We keep formatting code in one place so the aggregation code stays free of
//! presentation concerns and output changes are localized.

use rust_decimal::Decimal;

use crate::aggregate::LedgerSummary;
use crate::domain::Bucket;
use crate::io::ingest::RowIssue;
use crate::report::ReportOutput;

/// How many dropped rows are listed individually before summarizing.
const MAX_LISTED_ISSUES: usize = 10;

/// Format the full run summary (ingest stats, aggregates, chart locations).
pub fn format_run_summary(summary: &LedgerSummary, dropped: &[RowIssue], report: &ReportOutput) -> String {
    let mut out = String::new();

    out.push_str("=== localboost - sales summary ===\n");
    out.push_str(&format!(
        "Rows: read={} | used={} | dropped={}\n",
        summary.rows_read, summary.rows_used, summary.rows_dropped
    ));
    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        out.push_str(&format!("Dates: {first} .. {last}\n"));
    }
    out.push_str(&format!("Total revenue: {}\n", fmt_money(summary.total_revenue)));

    if !dropped.is_empty() {
        out.push_str("\nDropped rows:\n");
        for issue in dropped.iter().take(MAX_LISTED_ISSUES) {
            out.push_str(&format!("  line {:>5}: {}\n", issue.line, issue.reason));
        }
        if dropped.len() > MAX_LISTED_ISSUES {
            out.push_str(&format!("  ... and {} more\n", dropped.len() - MAX_LISTED_ISSUES));
        }
    }

    out.push_str("\nMonthly revenue:\n");
    out.push_str(&format_buckets(&summary.monthly, "month"));

    out.push_str("\nWeekly revenue:\n");
    out.push_str(&format_buckets(&summary.weekly, "week"));

    out.push_str("\nTop products:\n");
    out.push_str(&format_buckets(&summary.top_products, "product"));

    if !report.charts.is_empty() {
        out.push_str("\nCharts:\n");
        for (name, url) in &report.charts {
            out.push_str(&format!("  {name:<28} {url}\n"));
        }
    }

    out
}

/// Two-column bucket table.
pub fn format_buckets(rows: &[Bucket], key_header: &str) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<24} {:>16}\n", key_header, "revenue").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<24} {:-<16}\n", "", "").trim_end());
    out.push('\n');

    for b in rows {
        out.push_str(format!("{:<24} {:>16}\n", truncate(&b.label, 24), fmt_money(b.revenue)).trim_end());
        out.push('\n');
    }

    out
}

fn fmt_money(v: Decimal) -> String {
    format!("{:.2}", v.round_dp(2))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BucketKey;
    use std::collections::BTreeMap;

    fn bucket(name: &str, cents: i64) -> Bucket {
        Bucket::new(BucketKey::Product(name.to_string()), Decimal::new(cents, 2))
    }

    #[test]
    fn bucket_table_layout() {
        let table = format_buckets(&[bucket("Widget", 15000), bucket("Gadget", 3050)], "product");
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("product"));
        assert!(lines[0].ends_with("revenue"));
        assert!(lines[2].starts_with("Widget"));
        assert!(lines[2].ends_with("150.00"));
        assert!(lines[3].ends_with("30.50"));
    }

    #[test]
    fn long_labels_are_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }

    #[test]
    fn run_summary_lists_dropped_rows_and_charts() {
        let summary = LedgerSummary {
            rows_read: 3,
            rows_used: 2,
            rows_dropped: 1,
            first_date: None,
            last_date: None,
            total_revenue: Decimal::new(12345, 2),
            weekly: vec![],
            monthly: vec![],
            top_products: vec![bucket("Widget", 12345)],
        };
        let dropped = vec![RowIssue {
            line: 3,
            reason: "Invalid date 'x'.".to_string(),
        }];
        let mut charts = BTreeMap::new();
        charts.insert("top_products_plot".to_string(), "/static/plots/top_products_plot.png".to_string());

        let text = format_run_summary(&summary, &dropped, &ReportOutput { charts });

        assert!(text.contains("Rows: read=3 | used=2 | dropped=1"));
        assert!(text.contains("Total revenue: 123.45"));
        assert!(text.contains("line     3: Invalid date 'x'."));
        assert!(text.contains("/static/plots/top_products_plot.png"));
    }
}
