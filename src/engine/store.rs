use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::model::*;
use crate::time::{end_of_day, overlaps_ms, start_of_day};

use super::EngineError;

/// Failure reported by a backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError(pub String);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for StoreError {}

#[async_trait]
pub trait TableStore: Send + Sync {
    async fn find_by_id(&self, id: Ulid) -> Result<Option<Table>, StoreError>;

    /// Active tables matching the filter, in the store's own order.
    async fn find_available(&self, filter: &TableFilter) -> Result<Vec<Table>, StoreError>;
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Pending/confirmed reservations on `date`.
    async fn find_active_by_date(
        &self,
        date: NaiveDate,
        filter: &ReservationFilter,
    ) -> Result<Vec<Reservation>, StoreError>;
}

/// Bulk-load format for [`InMemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub reservations: Vec<Reservation>,
}

/// Reference store. Reservations are kept per table, sorted by window start.
pub struct InMemoryStore {
    tables: DashMap<Ulid, Table>,
    reservations: DashMap<Ulid, Vec<Reservation>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
            reservations: DashMap::new(),
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::new();
        for t in snapshot.tables {
            store.insert_table(t);
        }
        for r in snapshot.reservations {
            store.insert_reservation(r);
        }
        store
    }

    // ── Tables ───────────────────────────────────────────────

    pub fn insert_table(&self, table: Table) {
        self.tables.insert(table.id, table);
    }

    pub fn set_table_orders(&self, table_id: &Ulid, orders: Vec<TableOrder>) -> Result<(), EngineError> {
        let mut table = self
            .tables
            .get_mut(table_id)
            .ok_or(EngineError::NotFound(*table_id))?;
        table.orders = orders;
        Ok(())
    }

    // ── Reservations ─────────────────────────────────────────

    /// Insert without a conflict check.
    pub fn insert_reservation(&self, reservation: Reservation) {
        let mut list = self.reservations.entry(reservation.table_id).or_default();
        insert_sorted(&mut list, reservation);
    }

    /// Re-check for overlap and insert under the table's entry lock, so two
    /// concurrent commits for the same table cannot both succeed.
    pub fn commit_reservation(&self, reservation: Reservation, pad: Ms) -> Result<(), EngineError> {
        if !self.tables.contains_key(&reservation.table_id) {
            return Err(EngineError::NotFound(reservation.table_id));
        }
        let Some(window) = reservation.window() else {
            return Err(EngineError::BadRequest(format!(
                "reservation {} has no duration",
                reservation.id
            )));
        };
        let (id, table_id) = (reservation.id, reservation.table_id);
        {
            let mut list = self.reservations.entry(table_id).or_default();
            if let Some(existing) = list.iter().find(|r| {
                r.id != id
                    && r.status.blocks_slot()
                    && r.window()
                        .is_some_and(|w| overlaps_ms(w.start, w.end, window.start, window.end, pad))
            }) {
                return Err(EngineError::Conflict(existing.id));
            }
            list.retain(|r| r.id != id);
            insert_sorted(&mut list, reservation);
        }
        // A moved reservation must stop holding its previous table. The entry
        // guard above is dropped first; iterating while holding it can deadlock.
        for mut entry in self.reservations.iter_mut() {
            if *entry.key() != table_id {
                entry.value_mut().retain(|r| r.id != id);
            }
        }
        Ok(())
    }

    pub fn set_reservation_status(&self, id: &Ulid, status: ReservationStatus) -> Result<(), EngineError> {
        for mut entry in self.reservations.iter_mut() {
            if let Some(r) = entry.value_mut().iter_mut().find(|r| r.id == *id) {
                r.status = status;
                return Ok(());
            }
        }
        Err(EngineError::NotFound(*id))
    }

    pub fn reservations_for(&self, table_id: &Ulid) -> Vec<Reservation> {
        self.reservations
            .get(table_id)
            .map(|e| e.value().clone())
            .unwrap_or_default()
    }
}

fn insert_sorted(list: &mut Vec<Reservation>, reservation: Reservation) {
    let start = reservation.start_ms();
    let pos = list.partition_point(|r| r.start_ms() <= start);
    list.insert(pos, reservation);
}

#[async_trait]
impl TableStore for InMemoryStore {
    async fn find_by_id(&self, id: Ulid) -> Result<Option<Table>, StoreError> {
        Ok(self.tables.get(&id).map(|e| e.value().clone()))
    }

    /// Sorted by `(capacity, id)` so callers see a stable order.
    async fn find_available(&self, filter: &TableFilter) -> Result<Vec<Table>, StoreError> {
        let mut tables: Vec<Table> = self
            .tables
            .iter()
            .map(|e| e.value().clone())
            .filter(|t| t.is_active)
            .filter(|t| filter.min_capacity.is_none_or(|c| t.capacity >= c))
            .filter(|t| filter.floor.is_none_or(|f| t.floor == f))
            .collect();
        tables.sort_by_key(|t| (t.capacity, t.id));
        Ok(tables)
    }
}

#[async_trait]
impl ReservationStore for InMemoryStore {
    async fn find_active_by_date(
        &self,
        date: NaiveDate,
        filter: &ReservationFilter,
    ) -> Result<Vec<Reservation>, StoreError> {
        let (day_start, day_end) = (start_of_day(date), end_of_day(date));
        let on_day = |r: &Reservation| {
            let start = r.start_ms();
            day_start <= start && start <= day_end
        };
        let keep = |r: &Reservation| {
            r.status.blocks_slot() && Some(r.id) != filter.exclude_reservation_id && on_day(r)
        };

        let mut out = Vec::new();
        match &filter.table_ids {
            Some(ids) => {
                for id in ids {
                    if let Some(list) = self.reservations.get(id) {
                        out.extend(list.iter().filter(|&r| keep(r)).cloned());
                    }
                }
            }
            None => {
                for entry in self.reservations.iter() {
                    out.extend(entry.value().iter().filter(|&r| keep(r)).cloned());
                }
            }
        }
        Ok(out)
    }
}
