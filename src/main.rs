use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::info;
use ulid::Ulid;

use seatwise::model::{AutoAssignQuery, AvailabilityQuery, TableSearchQuery, TimeOfDay};
use seatwise::{Config, Engine, InMemoryStore, Snapshot};

#[derive(Parser)]
#[command(name = "seatwise", about = "Table availability and auto-assignment over a reservation snapshot")]
struct Cli {
    /// JSON file with `tables` and `reservations`.
    #[arg(long, env = "SEATWISE_SNAPSHOT")]
    snapshot: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check one table for a window.
    Check {
        #[arg(long)]
        table: Ulid,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        time: String,
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        exclude: Option<Ulid>,
    },
    /// List free tables that seat the party.
    Search {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        time: String,
        #[arg(long)]
        party: u32,
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        floor: Option<i32>,
        #[arg(long)]
        exclude: Option<Ulid>,
    },
    /// Pick the best free table.
    Assign {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        time: String,
        #[arg(long)]
        party: u32,
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        floor: Option<i32>,
        #[arg(long)]
        prefer: Option<Ulid>,
    },
    /// Bookable start times for one table on a day.
    Slots {
        #[arg(long)]
        table: Ulid,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        duration: Option<u32>,
    },
    /// Unreserved stretches of a table's operating day.
    Windows {
        #[arg(long)]
        table: Ulid,
        #[arg(long)]
        date: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let metrics_port: Option<u16> = std::env::var("SEATWISE_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok());
    seatwise::observability::init(metrics_port)?;

    let cli = Cli::parse();
    let config = Config::from_env();
    let default_duration = config.default_duration;

    let raw = std::fs::read_to_string(&cli.snapshot)?;
    let snapshot: Snapshot = serde_json::from_str(&raw)?;
    info!(
        "loaded {} tables, {} reservations from {}",
        snapshot.tables.len(),
        snapshot.reservations.len(),
        cli.snapshot.display()
    );
    let engine = Engine::new(Arc::new(InMemoryStore::from_snapshot(snapshot)), config);

    let output = match cli.command {
        Command::Check { table, date, time, duration, exclude } => {
            let query = AvailabilityQuery {
                reservation_date: date,
                reservation_time: TimeOfDay::Text(time),
                duration: duration.unwrap_or(default_duration),
                table_id: table,
                exclude_reservation_id: exclude,
            };
            serde_json::to_value(engine.check_table_availability(&query).await?)?
        }
        Command::Search { date, time, party, duration, floor, exclude } => {
            let query = TableSearchQuery {
                reservation_date: date,
                reservation_time: TimeOfDay::Text(time),
                duration: duration.unwrap_or(default_duration),
                party_size: party,
                floor,
                exclude_reservation_id: exclude,
            };
            serde_json::to_value(engine.get_available_tables(&query).await?)?
        }
        Command::Assign { date, time, party, duration, floor, prefer } => {
            let query = AutoAssignQuery {
                search: TableSearchQuery {
                    reservation_date: date,
                    reservation_time: TimeOfDay::Text(time),
                    duration: duration.unwrap_or(default_duration),
                    party_size: party,
                    floor,
                    exclude_reservation_id: None,
                },
                preferred_table_id: prefer,
            };
            serde_json::to_value(engine.auto_assign_table(&query).await?)?
        }
        Command::Slots { table, date, duration } => {
            let slots = engine
                .available_slots(table, date, duration.unwrap_or(default_duration))
                .await?;
            let slots: Vec<String> = slots.iter().map(|t| t.format("%H:%M").to_string()).collect();
            serde_json::to_value(slots)?
        }
        Command::Windows { table, date } => {
            let clock = |ms: i64| {
                DateTime::from_timestamp_millis(ms)
                    .map(|dt| dt.naive_utc().format("%H:%M").to_string())
                    .unwrap_or_default()
            };
            let windows: Vec<serde_json::Value> = engine
                .free_windows(table, date)
                .await?
                .iter()
                .map(|s| serde_json::json!({ "start": clock(s.start), "end": clock(s.end) }))
                .collect();
            serde_json::Value::Array(windows)
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
