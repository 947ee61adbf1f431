//! CLI entry point for the subway delay reports.
//!
//! Provides subcommands that read alerts from the store (or a JSON snapshot),
//! aggregate them into metrics, cause breakdowns and incident listings, and
//! publish the result as JSON to stdout, a file or S3.

use anyhow::{Context, Result};
use chrono::Utc;
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use subway_delays::analyzers::analyzer::{
    Destination, analyze_causes, analyze_incidents, analyze_metrics, live_alerts, publish,
};
use subway_delays::classify::{CauseCategory, classify};
use subway_delays::config::ReportConfig;
use subway_delays::infra::{FileStore, SupabaseClient};
use subway_delays::output::{write_daily_csv, write_hourly_csv};
use subway_delays::services::alert_store::AlertStore;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "subway_delays")]
#[command(about = "Aggregate subway delay alerts into reports", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// `supabase` to read the live store, or a path to a JSON snapshot
    #[arg(short, long, global = true, default_value = "supabase")]
    source: String,

    /// JSON file with report settings
    #[arg(long, global = true)]
    config: Option<String>,

    /// Civil timezone for day and hour buckets (overrides the config file)
    #[arg(long, global = true)]
    timezone: Option<Tz>,
}

#[derive(Args)]
struct PublishArgs {
    /// `-` for stdout, `s3://bucket/key`, or a file path
    #[arg(short, long, default_value = "-")]
    output: Destination,

    /// Gzip the JSON body (files and S3 only)
    #[arg(long, default_value_t = false)]
    gzip: bool,

    /// Collapse alerts that share a route set before aggregating
    #[arg(long, default_value_t = false)]
    dedupe: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Totals, route ranking, daily trend and time-of-day distribution
    Metrics {
        #[arg(short, long, default_value_t = 32)]
        lookback_days: i64,

        /// Number of most recent days kept in the daily series (0 = all)
        #[arg(long)]
        trailing_days: Option<usize>,

        /// Also export the daily series as CSV
        #[arg(long)]
        daily_csv: Option<String>,

        /// Also export the hour-of-day distribution as CSV
        #[arg(long)]
        hourly_csv: Option<String>,

        #[command(flatten)]
        publish: PublishArgs,
    },
    /// Alerts per cause category and the matching incidents
    Causes {
        #[arg(short, long, default_value_t = 7)]
        lookback_days: i64,

        /// Only list incidents in this category (e.g. Signal, NYPD)
        #[arg(long)]
        category: Option<CauseCategory>,

        #[command(flatten)]
        publish: PublishArgs,
    },
    /// Active delays and past incidents grouped by day
    Incidents {
        #[arg(short, long, default_value_t = 4)]
        lookback_days: i64,

        /// Keep the oldest, partially covered day
        #[arg(long, default_value_t = false)]
        keep_oldest_day: bool,

        #[command(flatten)]
        publish: PublishArgs,
    },
    /// Alerts seen in the last few minutes, one per incident
    Live {
        #[arg(short, long, default_value_t = 15)]
        minutes: i64,

        #[arg(short, long, default_value = "-")]
        output: Destination,
    },
    /// Print the cause category for a description
    Classify { description: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/subway_delays.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("subway_delays.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.global.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    if let Some(tz) = cli.global.timezone {
        config.timezone = tz;
    }

    let now = Utc::now();

    match cli.command {
        Commands::Classify { description } => {
            println!("{}", classify(&description));
        }
        Commands::Metrics {
            lookback_days,
            trailing_days,
            daily_csv,
            hourly_csv,
            publish: args,
        } => {
            if let Some(days) = trailing_days {
                config.trailing_days = (days > 0).then_some(days);
            }
            let store = open_store(&cli.global.source, &config)?;
            let report =
                analyze_metrics(store.as_ref(), &config, lookback_days, args.dedupe, now).await;

            if let Some(path) = daily_csv {
                match &report.daily {
                    Some(series) => write_daily_csv(&path, series)?,
                    None => info!("No alerts in window, skipping daily CSV"),
                }
            }
            if let Some(path) = hourly_csv {
                write_hourly_csv(&path, &report.hourly.all)?;
            }

            publish(&report, &args.output, args.gzip).await?;
        }
        Commands::Causes {
            lookback_days,
            category,
            publish: args,
        } => {
            let store = open_store(&cli.global.source, &config)?;
            let report =
                analyze_causes(store.as_ref(), category, lookback_days, args.dedupe, now).await;
            publish(&report, &args.output, args.gzip).await?;
        }
        Commands::Incidents {
            lookback_days,
            keep_oldest_day,
            publish: args,
        } => {
            let store = open_store(&cli.global.source, &config)?;
            let report = analyze_incidents(
                store.as_ref(),
                &config,
                lookback_days,
                !keep_oldest_day,
                args.dedupe,
                now,
            )
            .await;
            info!(
                active = report.partition.active.len(),
                past = report.partition.past_len(),
                "Incidents ready"
            );
            publish(&report, &args.output, args.gzip).await?;
        }
        Commands::Live { minutes, output } => {
            let store = open_store(&cli.global.source, &config)?;
            let alerts = live_alerts(store.as_ref(), minutes, now).await;
            info!(alerts = alerts.len(), "Live alerts ready");
            publish(&alerts, &output, false).await?;
        }
    }

    Ok(())
}

/// Opens the live Supabase store or a JSON snapshot on disk.
fn open_store(source: &str, config: &ReportConfig) -> Result<Box<dyn AlertStore>> {
    if source == "supabase" {
        let url = std::env::var("SUPABASE_URL").context("SUPABASE_URL must be set")?;
        let key = std::env::var("SUPABASE_API_KEY").context("SUPABASE_API_KEY must be set")?;
        info!(url = %url, page_size = config.page_size, "Reading alerts from Supabase");
        Ok(Box::new(SupabaseClient::new(&url, &key, config.page_size)?))
    } else {
        Ok(Box::new(FileStore::load(source)?))
    }
}
