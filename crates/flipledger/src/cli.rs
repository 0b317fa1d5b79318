//! Output formatting for CLI commands
//!
//! Human-readable tables via comfy-table, or pretty JSON.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use flipledger_core::calendar::{ActivityAggregate, Granularity, Series};
use flipledger_core::error::ErrorSeverity;
use flipledger_core::milestones::{Metric, MilestoneBoard, TodaysMilestones};
use flipledger_core::{AnalyticsConfig, ChartSeries, LoadReport, TripReport};

// ============================================================================
// Parsing
// ============================================================================

/// Parse a `YYYY-MM-DD` day
pub fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Expected YYYY-MM-DD, got '{}'", s))
}

// ============================================================================
// Load report
// ============================================================================

/// Print load problems to stderr, one line each
pub fn print_load_report(report: &LoadReport) {
    for error in &report.errors {
        let level = match error.severity {
            ErrorSeverity::Warning => "warning",
            ErrorSeverity::Error => "error",
            ErrorSeverity::Fatal => "fatal",
        };
        eprintln!("{}: [{}] {}", level, error.source, error.message);
        if let Some(suggestion) = &error.suggestion {
            eprintln!("  hint: {}", suggestion);
        }
    }
    if report.records_with_bad_dates > 0 {
        eprintln!(
            "warning: {} records have malformed dates and were skipped where needed",
            report.records_with_bad_dates
        );
    }
}

// ============================================================================
// Tables
// ============================================================================

fn new_table(headers: &[&str], no_color: bool) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    // Apply colors only if enabled
    if no_color {
        table.set_header(headers.to_vec());
    } else {
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
    table
}

/// Bucketed activity with a total and average footer
pub fn format_series_table(
    series: &Series<ActivityAggregate>,
    metrics: &[Metric],
    json: bool,
    no_color: bool,
) -> String {
    if json {
        return serde_json::to_string_pretty(series).unwrap_or_else(|_| "{}".to_string());
    }

    if series.is_empty() {
        return "No periods in range.".to_string();
    }

    let mut headers = vec![period_header(series.granularity)];
    headers.extend(metrics.iter().map(|m| m.label()));
    let mut table = new_table(&headers, no_color);

    for bucket in series {
        let mut row = vec![bucket.label.clone()];
        row.extend(metrics.iter().map(|m| m.format_value(m.value(&bucket.value))));
        table.add_row(Row::from(row));
    }

    let mut total = vec!["Total".to_string()];
    total.extend(
        metrics
            .iter()
            .map(|m| m.format_value(series.total(|a| m.value(a)))),
    );
    table.add_row(Row::from(total));

    let mut average = vec!["Average".to_string()];
    average.extend(
        metrics
            .iter()
            .map(|m| format_average(*m, series.average(|a| m.value(a)))),
    );
    table.add_row(Row::from(average));

    let mut out = table.to_string();
    if series.skipped_records > 0 {
        out.push_str(&format!(
            "\n{} records skipped (malformed dates)",
            series.skipped_records
        ));
    }
    out
}

/// Best period per chart, one line each; charts with no activity are left out
pub fn format_peaks(charts: &[ChartSeries]) -> String {
    charts
        .iter()
        .filter_map(|chart| {
            chart.peak().map(|point| {
                let value = if chart.currency {
                    format_money(point.y)
                } else {
                    format!("{}", point.y)
                };
                format!("Peak {}: {} ({})", chart.metric, value, point.x)
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn period_header(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Day => "Day",
        Granularity::Week => "Week",
        Granularity::Month => "Month",
        Granularity::Year => "Year",
    }
}

fn format_average(metric: Metric, value: f64) -> String {
    if metric.is_currency() {
        format_money(value)
    } else {
        format!("{:.1}", value)
    }
}

/// Record holders per granularity, today's records first
pub fn format_milestones(
    board: &MilestoneBoard,
    todays: &TodaysMilestones,
    only: Option<Granularity>,
    json: bool,
    no_color: bool,
) -> String {
    if json {
        let value = serde_json::json!({
            "milestones": board,
            "today": todays,
        });
        return serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string());
    }

    if board.is_empty() {
        return "No milestones yet.".to_string();
    }

    let mut sections = Vec::new();
    if !todays.is_empty() {
        let mut lines = vec![format!("New records today ({}):", todays.date)];
        for milestone in &todays.milestones {
            let metrics: Vec<&str> = milestone.competition.iter().map(|m| m.label()).collect();
            lines.push(format!("  {}", metrics.join(", ")));
        }
        sections.push(lines.join("\n"));
    }

    let granularities = [Granularity::Day, Granularity::Week, Granularity::Month];
    for granularity in granularities
        .into_iter()
        .filter(|g| only.is_none_or(|o| o == *g))
    {
        let by_metric = board.by_metric(granularity);
        if by_metric.is_empty() {
            continue;
        }

        let mut table = new_table(&["Metric", "Record", "Period"], no_color);
        for (metric, winners) in &by_metric {
            let record = winners
                .first()
                .map(|m| metric.format_value(m.value(*metric)))
                .unwrap_or_default();
            let periods: Vec<String> = winners
                .iter()
                .map(|m| period_display(granularity, &m.label, m.start))
                .collect();
            table.add_row(Row::from(vec![
                metric.label().to_string(),
                record,
                periods.join(", "),
            ]));
        }
        sections.push(format!("Best {}\n{}", period_noun(granularity), table));
    }

    sections.join("\n\n")
}

fn period_noun(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Day => "day",
        Granularity::Week => "week",
        Granularity::Month => "month",
        Granularity::Year => "year",
    }
}

/// Week and month labels omit the year, which matters on an all-time board
fn period_display(granularity: Granularity, label: &str, start: NaiveDate) -> String {
    match granularity {
        Granularity::Week | Granularity::Month => {
            format!("{} {}", label, start.format("%Y"))
        }
        Granularity::Day | Granularity::Year => label.to_string(),
    }
}

/// Trip history, one row per trip
pub fn format_trip_table(reports: &[TripReport], json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string());
    }

    if reports.is_empty() {
        return "No trips found.".to_string();
    }

    let mut table = new_table(
        &[
            "#", "Trip", "Locations", "Items", "Invested", "Revenue", "ROI", "Payoff",
        ],
        no_color,
    );

    for (idx, report) in reports.iter().enumerate() {
        table.add_row(Row::from(vec![
            idx.to_string(),
            report.label.clone(),
            truncate(&report.locations.join(", "), 30),
            report.item_count.to_string(),
            format_money(report.total_investment),
            format_money(report.revenue_received),
            format_percent(report.roi_now),
            report.payoff.describe(),
        ]));
    }

    table.to_string()
}

/// Single trip report (human or JSON)
pub fn format_trip_report(report: &TripReport, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
    }

    let mut lines = vec![];
    lines.push(format!("Trip:             {}", report.label));
    lines.push(format!("Locations:        {}", report.locations.join(", ")));
    if let Some(filter) = &report.location_filter {
        lines.push(format!("Filtered to:      {}", filter.join(", ")));
    }
    lines.push(format!(
        "Items:            {} ({} finalized, {} remaining)",
        report.item_count, report.items_finalized, report.items_remaining
    ));
    lines.push(format!("Items cost:       {}", format_money(report.items_cost)));
    lines.push(format!("Expenses:         {}", format_money(report.expenses)));
    lines.push(format!(
        "Investment:       {}",
        format_money(report.total_investment)
    ));
    lines.push(format!(
        "Revenue:          {}",
        format_money(report.revenue_received)
    ));
    lines.push(format!(
        "Potential:        {}",
        format_money(report.potential_revenue)
    ));
    lines.push(format!("Profit:           {}", format_money(report.profit)));
    lines.push(format!(
        "Potential profit: {}",
        format_money(report.potential_profit)
    ));
    lines.push(format!("ROI:              {}", format_percent(report.roi_now)));
    lines.push(format!(
        "Potential ROI:    {}",
        format_percent(report.roi_potential)
    ));
    lines.push(format!("Payoff:           {}", report.payoff.describe()));

    lines.join("\n")
}

/// Effective configuration as TOML or JSON
pub fn format_config(config: &AnalyticsConfig, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(config).context("Failed to serialize config");
    }
    toml::to_string_pretty(config).context("Failed to serialize config")
}

// ============================================================================
// Helpers
// ============================================================================

fn format_money(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount)
    }
}

fn format_percent(pct: f64) -> String {
    format!("{:.1}%", pct)
}

/// Truncate to `max` chars (not bytes), appending an ellipsis
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let prefix: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", prefix)
    }
}
