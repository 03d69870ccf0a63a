use std::time::Instant;

use chrono::{NaiveDate, NaiveTime};
use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::observability::{CANDIDATE_POOL_SIZE, CHECKS_TOTAL, SEARCH_DURATION_SECONDS};
use crate::rules::{
    validate_date_within_window, validate_duration, validate_party_size, validate_request,
};
use crate::time::{add_minutes, combine_naive, today};

use super::availability::free_spans;
use super::conflict::find_conflicts;
use super::store::{ReservationStore, TableStore};
use super::{Engine, EngineError};

impl<S> Engine<S>
where
    S: TableStore + ReservationStore + 'static,
{
    async fn load_table(&self, table_id: Ulid) -> Result<Table, EngineError> {
        self.read("table by id", self.store.find_by_id(table_id))
            .await?
            .ok_or(EngineError::NotFound(table_id))
    }

    async fn load_reservations(
        &self,
        table_id: Ulid,
        date: NaiveDate,
        exclude: Option<Ulid>,
    ) -> Result<Vec<Reservation>, EngineError> {
        let filter = ReservationFilter {
            table_ids: Some(vec![table_id]),
            exclude_reservation_id: exclude,
        };
        let mut rows = self
            .read("reservations by date", self.store.find_active_by_date(date, &filter))
            .await?;
        rows.retain(|r| {
            let usable = r.window().is_some();
            if !usable {
                warn!(reservation = %r.id, table = %r.table_id, "skipping reservation with zero duration");
            }
            usable
        });
        Ok(rows)
    }

    fn window(&self, date: NaiveDate, time: NaiveTime, duration: u32) -> Span {
        let start = combine_naive(date, time);
        Span::new(start, add_minutes(start, duration as i64))
    }

    /// Conflict check for a table that is already loaded.
    async fn check_loaded(
        &self,
        table: &Table,
        date: NaiveDate,
        window: Span,
        exclude: Option<Ulid>,
    ) -> Result<AvailabilityResult, EngineError> {
        if table.is_occupied() {
            debug!(table = %table.id, "table has an active order");
            metrics::counter!(CHECKS_TOTAL, "result" => "occupied").increment(1);
            return Ok(AvailabilityResult::occupied());
        }

        let existing = self.load_reservations(table.id, date, exclude).await?;
        let conflicts = find_conflicts(table.id, &existing, &window, self.config.padding_ms(), exclude);
        let result = if conflicts.is_empty() { "available" } else { "conflict" };
        metrics::counter!(CHECKS_TOTAL, "result" => result).increment(1);
        debug!(table = %table.id, conflicts = conflicts.len(), "checked table");

        Ok(AvailabilityResult {
            available: conflicts.is_empty(),
            conflicts,
        })
    }

    /// Is the table free for the requested window? Conflicts are returned in full.
    pub async fn check_table_availability(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<AvailabilityResult, EngineError> {
        let time = validate_request(
            query.reservation_date,
            &query.reservation_time,
            query.duration,
            &self.config,
            today(),
        )?;
        let table = self.load_table(query.table_id).await?;
        let window = self.window(query.reservation_date, time, query.duration);
        self.check_loaded(&table, query.reservation_date, window, query.exclude_reservation_id)
            .await
    }

    /// Every free table that seats the party, in the store's candidate order.
    pub async fn get_available_tables(&self, query: &TableSearchQuery) -> Result<Vec<Table>, EngineError> {
        let started = Instant::now();
        let time = validate_request(
            query.reservation_date,
            &query.reservation_time,
            query.duration,
            &self.config,
            today(),
        )?;
        validate_party_size(query.party_size)?;

        let filter = TableFilter {
            min_capacity: Some(query.party_size),
            floor: query.floor,
        };
        let mut pool = self.read("candidate tables", self.store.find_available(&filter)).await?;
        pool.retain(|t| t.capacity >= query.party_size && query.floor.is_none_or(|f| t.floor == f));
        metrics::histogram!(CANDIDATE_POOL_SIZE).record(pool.len() as f64);

        let window = self.window(query.reservation_date, time, query.duration);
        let date = query.reservation_date;
        let exclude = query.exclude_reservation_id;
        let limit = pool.len().clamp(1, MAX_CONCURRENT_CHECKS);

        // `buffered` yields in input order, so the result keeps the pool's order.
        let free: Vec<Table> = stream::iter(pool)
            .map(|table| async move {
                let result = self.check_loaded(&table, date, window, exclude).await?;
                Ok::<_, EngineError>(result.available.then_some(table))
            })
            .buffered(limit)
            .try_filter_map(|t| async move { Ok(t) })
            .try_collect()
            .await?;

        metrics::histogram!(SEARCH_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        info!(
            party = query.party_size,
            floor = ?query.floor,
            free = free.len(),
            "searched available tables"
        );
        Ok(free)
    }

    /// Slot-grid start times within operating hours at which the table is free
    /// for `duration` minutes. An occupied table has no slots.
    pub async fn available_slots(
        &self,
        table_id: Ulid,
        date: NaiveDate,
        duration: u32,
    ) -> Result<Vec<NaiveTime>, EngineError> {
        validate_date_within_window(date, today(), self.config.max_advance_days)?;
        validate_duration(duration)?;
        let table = self.load_table(table_id).await?;
        if table.is_occupied() {
            return Ok(Vec::new());
        }
        let existing = self.load_reservations(table_id, date, None).await?;
        let pad = self.config.padding_ms();

        let step = self.config.slot_interval_minutes.max(1);
        let mut slots = Vec::new();
        let mut minute = self.config.opening_hour * 60;
        while minute < self.config.closing_hour * 60 {
            let Some(time) = NaiveTime::from_hms_opt(minute / 60, minute % 60, 0) else {
                break;
            };
            let window = self.window(date, time, duration);
            if find_conflicts(table_id, &existing, &window, pad, None).is_empty() {
                slots.push(time);
            }
            minute += step;
        }
        Ok(slots)
    }

    /// Parts of the day's operating window not covered by any padded reservation.
    pub async fn free_windows(&self, table_id: Ulid, date: NaiveDate) -> Result<Vec<Span>, EngineError> {
        self.load_table(table_id).await?;
        let existing = self.load_reservations(table_id, date, None).await?;
        let open_at = |hour: u32| combine_naive(date, NaiveTime::MIN) + hour as Ms * 60 * MINUTE_MS;
        let open = Span::new(open_at(self.config.opening_hour), open_at(self.config.closing_hour));
        Ok(free_spans(open, &existing, self.config.padding_ms()))
    }
}
