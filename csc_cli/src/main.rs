use std::{
    env::current_dir,
    fs::{read_to_string, write},
    path::PathBuf,
};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use csc_core::{
    academic_calendar, cart_client,
    calendar_client::CalendarClient,
    ical::generator::Emitter,
    ics,
    location::LocationTable,
    reconcile::{reconcile, ReconcileStatus, SnapshotStore},
    recurrence,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command()]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Push the extracted schedule to Google Calendar
    Sync {
        #[command(flatten)]
        args: SyncArgs,
    },
    /// Write the extracted schedule to calendar.ics
    Export {
        /// path to the saved course-cart page
        schedule: PathBuf,
    },
    /// List the dates the university is closed
    ClosedDates,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// path to the saved course-cart page
    pub schedule: PathBuf,
    /// id of the target calendar
    #[arg(long)]
    pub calendar_id: String,
    /// OAuth access token for the calendar API
    #[arg(long)]
    pub access_token: String,
    /// directory holding the editable snapshot and its digest
    #[arg(long, default_value = ".")]
    pub snapshot_dir: PathBuf,
    /// push without reconciling user edits from the snapshot
    #[arg(long)]
    pub skip_reconcile: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| ["csc_cli=info", "csc_core=debug"].join(",").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    let arguments = Arguments::parse();
    match arguments.command {
        Command::Sync { args } => run_sync(args).await?,
        Command::Export { schedule } => run_export(schedule)?,
        Command::ClosedDates => run_closed_dates().await?,
    }
    Ok(())
}

async fn run_sync(args: SyncArgs) -> Result<()> {
    let html = read_to_string(&args.schedule)?;
    let mut courses = cart_client::parse_course_cart(&html, &LocationTable::default())?;
    if !args.skip_reconcile {
        let store = SnapshotStore::new(&args.snapshot_dir);
        match reconcile(&mut courses, &store)? {
            ReconcileStatus::BaselineWritten(path) => {
                info!(
                    path = %path.display(),
                    "snapshot baseline written, edit it and run again to sync"
                );
                return Ok(());
            }
            ReconcileStatus::Unchanged => {
                info!("snapshot is unchanged, edit it or pass --skip-reconcile to sync");
                return Ok(());
            }
            ReconcileStatus::Merged(applied) => {
                info!(applied, "applied user overrides");
            }
        }
    }
    recurrence::shift_start_dates(&mut courses);
    let client = CalendarClient::new(args.calendar_id, args.access_token);
    let mut failures = 0;
    for outcome in client.push(&courses).await {
        match outcome.result {
            Ok(link) => {
                info!(course = %outcome.course, component = %outcome.component, %link, "event created");
            }
            Err(error) => {
                failures += 1;
                warn!(course = %outcome.course, component = %outcome.component, %error, "event rejected");
            }
        }
    }
    if failures > 0 {
        warn!(failures, "some events were not created");
    }
    Ok(())
}

fn run_export(schedule: PathBuf) -> Result<()> {
    let html = read_to_string(&schedule)?;
    let mut courses = cart_client::parse_course_cart(&html, &LocationTable::default())?;
    recurrence::shift_start_dates(&mut courses);
    let calendar = ics::to_ical(&courses);
    let mut path = current_dir()?;
    path.push("calendar.ics");
    write(&path, calendar.generate())?;
    info!(path = %path.display(), "wrote calendar");
    Ok(())
}

async fn run_closed_dates() -> Result<()> {
    for date in academic_calendar::closed_dates().await? {
        println!("{date}");
    }
    Ok(())
}
