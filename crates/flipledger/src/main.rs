//! flipledger - reseller inventory analytics

mod cli;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use flipledger_core::calendar::Granularity;
use flipledger_core::milestones::Metric;
use flipledger_core::trips::LocationFilter;
use flipledger_core::{
    export_series_to_csv, export_series_to_json, export_trips_to_csv, export_trips_to_json,
    AnalyticsConfig, DashboardData, DataStore, ReportPeriod,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "flipledger",
    version,
    about = "Reseller inventory analytics",
    long_about = "Reports over exported inventory records: activity per day/week/month/year,\n\
                  all-time record days, sourcing trips and when each trip pays for itself.\n\
                  \n\
                  The data directory holds items.json and expenses.json (JSON arrays).\n\
                  \n\
                  Examples:\n\
                    flipledger series                        # Monthly activity, current year\n\
                    flipledger series -g week --year 2023    # Weekly activity for 2023\n\
                    flipledger series -g day --all-years     # Yearly totals across all years\n\
                    flipledger milestones                    # Best day/week/month ever\n\
                    flipledger trips                         # Trip history\n\
                    flipledger trip --location Goodwill      # Latest trip, one store only\n\
                    flipledger config                        # Print effective configuration\n\
                  \n\
                  Environment Variables:\n\
                    FLIPLEDGER_DATA_DIR              # Directory with items.json/expenses.json\n\
                    FLIPLEDGER_CONFIG                # Config file path\n\
                    FLIPLEDGER_FORMAT                # Force output format: json|table\n\
                    FLIPLEDGER_LOG                   # Log filter (default: warn)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding items.json and expenses.json
    #[arg(long, env = "FLIPLEDGER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Config file (default: <config dir>/flipledger/config.toml)
    #[arg(long, env = "FLIPLEDGER_CONFIG")]
    config: Option<PathBuf>,

    /// Force output format (json|table)
    #[arg(long, env = "FLIPLEDGER_FORMAT", value_parser = ["json", "table"])]
    format: Option<String>,

    /// Report as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    today: Option<String>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, env = "FLIPLEDGER_NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Bucketed activity series
    Series {
        /// Bucket size: day, week, month, year
        #[arg(long, short = 'g', default_value = "month")]
        granularity: Granularity,
        /// Calendar year (default: current year)
        #[arg(long, short = 'y', conflicts_with = "all_years")]
        year: Option<i32>,
        /// Every year with activity (day/week collapse to years)
        #[arg(long)]
        all_years: bool,
        /// Only these metrics (repeatable)
        #[arg(long, short = 'm')]
        metric: Vec<Metric>,
        /// Write the series to a .csv or .json file
        #[arg(long)]
        export: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// All-time record days, weeks and months
    Milestones {
        /// Only this granularity
        #[arg(long, short = 'g')]
        granularity: Option<Granularity>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Trip history, most recent first
    Trips {
        /// Write the reports to a .csv or .json file
        #[arg(long)]
        export: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Detailed report for one trip
    Trip {
        /// Trip from the history (0 = most recent); default is the latest trip view
        #[arg(long, short = 'i')]
        index: Option<usize>,
        /// Restrict to these purchase locations (repeatable)
        #[arg(long, short = 'l')]
        location: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("FLIPLEDGER_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let today = match cli.today.as_deref() {
        Some(s) => cli::parse_day(s).context("Invalid --today")?,
        None => Local::now().date_naive(),
    };

    let config_path = cli.config.clone().or_else(AnalyticsConfig::default_path);
    let config = config_path
        .as_deref()
        .map(AnalyticsConfig::load)
        .unwrap_or_default();

    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| dirs::data_dir().map(|d: PathBuf| d.join("flipledger")))
        .context("Could not determine data directory")?;

    let force_json = cli.format.as_deref() == Some("json");
    let no_color = cli.no_color;

    match cli.command {
        Command::Series {
            granularity,
            year,
            all_years,
            metric,
            export,
            json,
        } => {
            let store = load_store(data_dir, config, today, json || force_json).await;
            let dashboard = if all_years {
                store.dashboard_all_years(granularity, today)
            } else {
                let period = ReportPeriod::year(granularity, year.unwrap_or_else(|| today.year()));
                store.dashboard(period, today)
            };
            run_series(&dashboard, &metric, export.as_deref(), json || force_json, no_color)?;
        }
        Command::Milestones { granularity, json } => {
            let store = load_store(data_dir, config, today, json || force_json).await;
            let board = store.milestones(today);
            let todays = store.todays_milestones(today);
            println!(
                "{}",
                cli::format_milestones(&board, &todays, granularity, json || force_json, no_color)
            );
        }
        Command::Trips { export, json } => {
            let store = load_store(data_dir, config, today, json || force_json).await;
            let reports = store.trip_reports(today);
            if let Some(path) = export.as_deref() {
                if is_json_path(path) {
                    export_trips_to_json(&reports, path)?;
                } else {
                    export_trips_to_csv(&reports, path)?;
                }
                eprintln!("Exported {} trips to {}", reports.len(), path.display());
            }
            println!("{}", cli::format_trip_table(&reports, json || force_json, no_color));
        }
        Command::Trip {
            index,
            location,
            json,
        } => {
            let store = load_store(data_dir, config, today, json || force_json).await;
            let filter = LocationFilter::new(&location);
            let filter = (!filter.is_empty()).then_some(&filter);

            let report = match index {
                Some(idx) => store
                    .trip_report_at(idx, filter, today)
                    .with_context(|| format!("No trip at index {}", idx))?,
                None => store
                    .latest_trip_report(filter, today)
                    .context("No trips found")?,
            };
            println!("{}", cli::format_trip_report(&report, json || force_json));
        }
        Command::Config { save, json } => {
            if save {
                let path = config_path.context("Could not determine config path")?;
                config.save(&path)?;
                eprintln!("Saved config to {}", path.display());
            }
            println!("{}", cli::format_config(&config, json || force_json)?);
        }
    }

    Ok(())
}

async fn load_store(
    data_dir: PathBuf,
    config: AnalyticsConfig,
    today: NaiveDate,
    quiet: bool,
) -> DataStore {
    info!(data_dir = %data_dir.display(), "Loading records");
    let store = DataStore::new(data_dir, config, Default::default());

    if !quiet {
        eprint!("Loading records... ");
    }
    let report = store.initial_load(today).await;
    if !quiet {
        eprintln!(
            "{} items, {} expenses",
            report.items_loaded, report.expenses_loaded
        );
    }
    cli::print_load_report(&report);

    store
}

fn run_series(
    dashboard: &DashboardData,
    metrics: &[Metric],
    export: Option<&Path>,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let metrics: Vec<Metric> = if metrics.is_empty() {
        Metric::ALL.to_vec()
    } else {
        metrics.to_vec()
    };

    if let Some(path) = export {
        if is_json_path(path) {
            export_series_to_json(&dashboard.activity, path)?;
        } else {
            export_series_to_csv(&dashboard.activity, path)?;
        }
        eprintln!(
            "Exported {} buckets to {}",
            dashboard.activity.len(),
            path.display()
        );
    }

    println!(
        "{}",
        cli::format_series_table(&dashboard.activity, &metrics, json, no_color)
    );
    let peaks = cli::format_peaks(&dashboard.charts);
    if !json && !peaks.is_empty() {
        println!("\n{}", peaks);
    }
    Ok(())
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
