//! Export of activity series and trip reports
//!
//! CSV for spreadsheets, pretty JSON for everything else.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::calendar::{ActivityAggregate, Series};
use crate::trips::TripReport;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Quote a CSV field, doubling embedded quotes
fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Export an activity series to CSV, one row per bucket in chronological order
///
/// CSV columns: Period, Key, Start, End, Listed, Sold, Sales, Pulled, Spent
///
/// # Errors
/// Returns error if file creation or write operations fail
///
/// # Examples
///
/// ```no_run
/// use chrono::NaiveDate;
/// use flipledger_core::calendar::{activity_series, Bucketer, Granularity, YearScope};
/// use flipledger_core::export::export_series_to_csv;
/// use std::path::Path;
///
/// let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// let bucketer = Bucketer::new(Granularity::Month, YearScope::Single(2024), today);
/// let series = activity_series(&[], &bucketer);
/// export_series_to_csv(&series, Path::new("activity.csv")).unwrap();
/// ```
pub fn export_series_to_csv(series: &Series<ActivityAggregate>, path: &Path) -> Result<()> {
    ensure_parent(path)?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "Period,Key,Start,End,Listed,Sold,Sales,Pulled,Spent")
        .context("Failed to write CSV header")?;

    for bucket in series {
        let agg = &bucket.value;
        writeln!(
            writer,
            "{},{},{},{},{},{},{:.2},{},{:.2}",
            csv_field(&bucket.label),
            bucket.key.id(),
            bucket.start.format("%Y-%m-%d"),
            bucket.end.format("%Y-%m-%d"),
            agg.listed,
            agg.sold,
            agg.sales,
            agg.pulled,
            agg.spent
        )
        .with_context(|| format!("Failed to write row for bucket {}", bucket.key.id()))?;
    }

    writer.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

/// Export an activity series to pretty JSON
pub fn export_series_to_json(series: &Series<ActivityAggregate>, path: &Path) -> Result<()> {
    ensure_parent(path)?;

    let json = serde_json::to_string_pretty(series).context("Failed to serialize series to JSON")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))?;

    Ok(())
}

/// Export trip reports to CSV, in the order given (most recent first)
///
/// CSV columns: Start, End, Locations, Items, Cost, Expenses, Investment,
/// Revenue, ROI %, Potential ROI %, Finalized, Remaining, Payoff Days, Payoff Date
pub fn export_trips_to_csv(reports: &[TripReport], path: &Path) -> Result<()> {
    ensure_parent(path)?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(
        writer,
        "Start,End,Locations,Items,Cost,Expenses,Investment,Revenue,ROI %,Potential ROI %,Finalized,Remaining,Payoff Days,Payoff Date"
    )
    .context("Failed to write CSV header")?;

    for report in reports {
        writeln!(
            writer,
            "{},{},{},{},{:.2},{:.2},{:.2},{:.2},{:.1},{:.1},{},{},{},{}",
            report.start.format("%Y-%m-%d"),
            report.end.format("%Y-%m-%d"),
            csv_field(&report.locations.join("; ")),
            report.item_count,
            report.items_cost,
            report.expenses,
            report.total_investment,
            report.revenue_received,
            report.roi_now,
            report.roi_potential,
            report.items_finalized,
            report.items_remaining,
            report
                .payoff
                .days()
                .map(|d| d.to_string())
                .unwrap_or_default(),
            report
                .payoff
                .date()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        )
        .with_context(|| format!("Failed to write row for trip {}", report.label))?;
    }

    writer.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

/// Export trip reports to pretty JSON
pub fn export_trips_to_json(reports: &[TripReport], path: &Path) -> Result<()> {
    ensure_parent(path)?;

    let json =
        serde_json::to_string_pretty(reports).context("Failed to serialize trips to JSON")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))?;

    Ok(())
}
