//! CLI entry point for the infrastructure review tool.
//!
//! Provides one-shot subcommands for listing, exporting and deciding on
//! detection records, a trip view over a schedule's GPS track, and an
//! interactive review loop driven from stdin.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use infra_review::config::ReviewConfig;
use infra_review::infra::backend::RestBackend;
use infra_review::models::{EventStatus, InfraStatus, ProcessStatus};
use infra_review::output::{print_json, print_pretty, write_records};
use infra_review::review::{
    LoadState, LoggedMap, LoggedVideo, RecordFilter, ReviewSession, TripReview, view,
};
use infra_review::services::ReviewApi;
use infra_review::stats::ReviewStats;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "infra_review")]
#[command(about = "Review detected roadside infrastructure against video and GPS", long_about = None)]
struct Cli {
    /// Backend base URL (overrides REVIEW_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token (overrides REVIEW_API_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Frame rate for schedules that do not carry one (overrides REVIEW_FRAME_RATE)
    #[arg(long, global = true)]
    frame_rate: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the detection records of a schedule
    Records {
        #[arg(value_name = "SCHEDULE_ID")]
        schedule_id: String,

        /// Detector status (OK, NOT OK)
        #[arg(long)]
        status: Option<InfraStatus>,

        /// Review state (PENDING, APPROVED, REJECTED)
        #[arg(long)]
        process_status: Option<ProcessStatus>,

        /// Event classification (NEW, UPDATED)
        #[arg(long)]
        event_status: Option<EventStatus>,

        /// CSV file to export the listed records to
        #[arg(long)]
        csv: Option<String>,

        /// Log the records as JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Review progress over all records of a schedule
    Stats {
        #[arg(value_name = "SCHEDULE_ID")]
        schedule_id: String,
    },
    /// Approve a pending record
    Accept {
        #[arg(value_name = "RECORD_ID")]
        record_id: String,
    },
    /// Reject a pending record
    Reject {
        #[arg(value_name = "RECORD_ID")]
        record_id: String,
    },
    /// Approve every record of a schedule that is still pending
    ProcessAll {
        #[arg(value_name = "SCHEDULE_ID")]
        schedule_id: String,
    },
    /// Show a schedule's GPS track with video offsets
    Trip {
        #[arg(value_name = "SCHEDULE_ID")]
        schedule_id: String,

        /// Seek the video to this sample index
        #[arg(long)]
        goto: Option<usize>,
    },
    /// Interactive review of a schedule over stdin
    Review {
        #[arg(value_name = "SCHEDULE_ID")]
        schedule_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/infra_review.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("infra_review.log"));

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
    let config = ReviewConfig::from_env()?.with_overrides(cli.base_url, cli.token, cli.frame_rate)?;
    let api: Arc<dyn ReviewApi> = Arc::new(RestBackend::from_config(&config)?);
    info!(base_url = config.api_root(), frame_rate = config.frame_rate, "Backend configured");

    match cli.command {
        Commands::Records {
            schedule_id,
            status,
            process_status,
            event_status,
            csv,
            json,
        } => {
            let filter = RecordFilter {
                status,
                process_status,
                event_status,
            };
            let records = api.list_records(&schedule_id, &filter).await?;
            info!(schedule_id, %filter, count = records.len(), "Records fetched");

            if json {
                print_json(&records)?;
            } else {
                for (i, record) in records.iter().enumerate() {
                    println!("{}", view::record_row(i + 1, record, false));
                }
            }
            if let Some(path) = csv {
                write_records(&path, &records)?;
            }
        }
        Commands::Stats { schedule_id } => {
            let records = api.list_records(&schedule_id, &RecordFilter::all()).await?;
            let stats = ReviewStats::from_records(&records).with_schedule(&schedule_id);
            print_pretty(&stats);
            println!("{}", view::stats_summary(&stats));
        }
        Commands::Accept { record_id } => {
            if let Err(e) = api.approve(&record_id).await {
                error!(record_id, error = %e, "Approve failed");
                bail!("could not accept {record_id}: {}", e.user_message());
            }
            info!(record_id, "Record approved");
        }
        Commands::Reject { record_id } => {
            if let Err(e) = api.reject(&record_id).await {
                error!(record_id, error = %e, "Reject failed");
                bail!("could not reject {record_id}: {}", e.user_message());
            }
            info!(record_id, "Record rejected");
        }
        Commands::ProcessAll { schedule_id } => {
            if let Err(e) = api.process_remaining(&schedule_id).await {
                error!(schedule_id, error = %e, "Process all failed");
                bail!("could not process {schedule_id}: {}", e.user_message());
            }
            info!(schedule_id, "Remaining records processed");
        }
        Commands::Trip { schedule_id, goto } => {
            trip(api, &schedule_id, goto).await?;
        }
        Commands::Review { schedule_id } => {
            let session = ReviewSession::new(
                api,
                Box::new(LoggedVideo::new()),
                Box::new(LoggedMap::new()),
                config,
            );
            review_loop(&session, &schedule_id).await?;
        }
    }

    Ok(())
}

/// Loads a schedule's track, lists the samples and optionally seeks to one.
#[tracing::instrument(skip(api))]
async fn trip(api: Arc<dyn ReviewApi>, schedule_id: &str, goto: Option<usize>) -> Result<()> {
    let mut trip = TripReview::new(api, Box::new(LoggedVideo::new()), Box::new(LoggedMap::new()));
    trip.open(schedule_id).await;

    if let LoadState::Failed(message) = trip.schedule() {
        bail!("{message}");
    }
    if trip.samples().is_empty() {
        warn!(schedule_id, "No GPS samples for schedule");
    }
    for (i, (sample, offset)) in trip.samples_with_offsets().into_iter().enumerate() {
        println!("{}", view::gps_row(i, sample, offset));
    }

    if let Some(index) = goto {
        match trip.go_to_sample(index) {
            Some(offset) => println!("video at {offset:.1}s"),
            None => warn!(index, "Sample out of range or before track start"),
        }
    }
    Ok(())
}

const REVIEW_HELP: &str = "commands: <n> select | j/k next/previous | a accept | s reject | d go to time | c close | f field=value|* | p process all | r refresh | l list | q quit";

/// Line-oriented review front end over a [`ReviewSession`].
async fn review_loop(session: &ReviewSession, schedule_id: &str) -> Result<()> {
    session.open(schedule_id).await;
    if let LoadState::Failed(message) = session.schedule_state() {
        println!("{message}");
    }
    render(session);
    println!("{REVIEW_HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => continue,
            "q" => break,
            "h" | "?" => println!("{REVIEW_HELP}"),
            "l" => render(session),
            "j" => {
                session.select_next();
            }
            "k" => {
                session.select_previous();
            }
            "c" => session.close_detail(),
            "r" => {
                session.refresh().await;
            }
            "p" => {
                session.process_all(schedule_id).await;
            }
            "a" | "s" | "d" => {
                let key = line.chars().next().unwrap_or_default();
                match session.handle_key(key).await {
                    Some(action) => debug!(record_id = action.record_id(), ?action, "Shortcut handled"),
                    None => println!("no record open"),
                }
            }
            cmd if cmd.starts_with("f ") => {
                let mut filter = session.filter();
                match filter.assign(&cmd[2..]) {
                    Ok(()) => {
                        session.set_filter(filter).await;
                    }
                    Err(e) => println!("{e}"),
                }
            }
            cmd => match cmd.parse::<usize>() {
                Ok(n) if n >= 1 => {
                    let id = session.records().get(n - 1).map(|r| r.id.clone());
                    match id {
                        Some(id) => {
                            session.select_record(&id);
                        }
                        None => println!("no record #{n}"),
                    }
                }
                _ => println!("unknown command '{cmd}' (h for help)"),
            },
        }

        for notice in session.take_notices() {
            println!("{notice}");
        }
        render(session);
    }
    Ok(())
}

fn render(session: &ReviewSession) {
    let selected = session.selected().map(|r| r.id);
    println!();
    if let Some(schedule_id) = session.schedule_id() {
        println!("schedule {schedule_id}");
    }
    println!("{}", view::stats_summary(&session.stats()));
    println!(
        "{}",
        view::record_list(&session.record_state(), &session.filter(), selected.as_deref())
    );
    if let Some(record) = session.detail() {
        println!("{}", view::record_detail(&record));
        println!("video {:.1}s, map {}", session.video_position(), session.map_view().center);
    }
}
