use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Days, NaiveTime};
use ulid::Ulid;

use seatwise::model::*;
use seatwise::time::today;
use seatwise::{Config, Engine, InMemoryStore};

const TABLES: u32 = 200;
const RESERVATIONS_PER_TABLE: u32 = 4;
const ROUNDS: usize = 500;
const CONCURRENCY: usize = 16;

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    if latencies.is_empty() {
        return;
    }
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.2}ms, p50={:.2}ms, p95={:.2}ms, p99={:.2}ms, max={:.2}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 95.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        latencies[latencies.len() - 1].as_secs_f64() * 1000.0,
    );
}

fn setup() -> InMemoryStore {
    let store = InMemoryStore::new();
    let day = today().checked_add_days(Days::new(1)).unwrap_or(today());
    let capacities = [2, 2, 4, 4, 4, 6, 6, 8, 10, 12];

    for i in 0..TABLES {
        let mut table = Table::new(Ulid::new(), capacities[i as usize % capacities.len()], (i % 3) as i32);
        if i % 7 == 0 {
            table.section = Some("window".into());
        }
        let table_id = table.id;
        store.insert_table(table);

        for k in 0..RESERVATIONS_PER_TABLE {
            // Stagger seatings so every table has a different free pattern.
            let hour = 11 + (k * 3 + i % 3);
            let Some(time) = NaiveTime::from_hms_opt(hour.min(21), if i % 2 == 0 { 0 } else { 30 }, 0) else {
                continue;
            };
            store.insert_reservation(Reservation {
                id: Ulid::new(),
                table_id,
                reservation_date: day,
                reservation_time: time,
                duration: 90,
                party_size: 2,
                status: ReservationStatus::Confirmed,
            });
        }
    }
    println!("  created {TABLES} tables, {} reservations", TABLES * RESERVATIONS_PER_TABLE);
    store
}

fn query(round: usize) -> AutoAssignQuery {
    let slot = 10 * 60 + (round % 24) as u32 * 30;
    AutoAssignQuery {
        search: TableSearchQuery {
            reservation_date: today().checked_add_days(Days::new(1)).unwrap_or(today()),
            reservation_time: TimeOfDay::Text(format!("{:02}:{:02}", slot / 60, slot % 60)),
            duration: 90,
            party_size: 1 + (round % 8) as u32,
            floor: if round % 4 == 0 { Some((round % 3) as i32) } else { None },
            exclude_reservation_id: None,
        },
        preferred_table_id: None,
    }
}

#[tokio::main]
async fn main() {
    println!("seatwise stress");
    let engine = Engine::new(Arc::new(setup()), Config::default());

    let started = Instant::now();
    let mut handles = Vec::new();
    for worker in 0..CONCURRENCY {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let mut search = Vec::new();
            let mut assign = Vec::new();
            let mut assigned = 0usize;
            for round in (worker..ROUNDS).step_by(CONCURRENCY) {
                let q = query(round);

                let t = Instant::now();
                if engine.get_available_tables(&q.search).await.is_ok() {
                    search.push(t.elapsed());
                }

                let t = Instant::now();
                if let Ok(picked) = engine.auto_assign_table(&q).await {
                    assign.push(t.elapsed());
                    assigned += picked.is_some() as usize;
                }
            }
            (search, assign, assigned)
        }));
    }

    let mut search = Vec::new();
    let mut assign = Vec::new();
    let mut assigned = 0;
    for h in handles {
        if let Ok((s, a, n)) = h.await {
            search.extend(s);
            assign.extend(a);
            assigned += n;
        }
    }
    let elapsed = started.elapsed();

    print_latency("get_available_tables", &mut search);
    print_latency("auto_assign_table", &mut assign);
    println!(
        "  {} requests in {:.2}s ({:.0} req/s), {assigned} assigned",
        search.len() + assign.len(),
        elapsed.as_secs_f64(),
        (search.len() + assign.len()) as f64 / elapsed.as_secs_f64(),
    );
}
