use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds. All time comparisons happen on this type.
pub type Ms = i64;

pub const MINUTE_MS: Ms = 60_000;

/// Half-open interval `[start, end)`. A reservation window is a `Span`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Overlap test after widening both spans by `pad` on each side.
    pub fn overlaps_padded(&self, other: &Span, pad: Ms) -> bool {
        crate::time::overlaps_ms(self.start, self.end, other.start, other.end, pad)
    }

    /// Widen by `pad` on both ends.
    pub fn padded(&self, pad: Ms) -> Span {
        Span::new(self.start - pad, self.end + pad)
    }
}

// ── Reservations ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Seated,
    Completed,
    Cancelled,
    NoShow,
}

impl ReservationStatus {
    /// Only pending and confirmed reservations hold a table.
    pub fn blocks_slot(self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Confirmed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Ulid,
    pub table_id: Ulid,
    pub reservation_date: NaiveDate,
    pub reservation_time: NaiveTime,
    /// Minutes.
    pub duration: u32,
    #[serde(default)]
    pub party_size: u32,
    pub status: ReservationStatus,
}

impl Reservation {
    pub fn start_ms(&self) -> Ms {
        crate::time::combine_naive(self.reservation_date, self.reservation_time)
    }

    /// The window this reservation occupies on its table, or `None` for a
    /// zero-length row, which holds nothing.
    pub fn window(&self) -> Option<Span> {
        if self.duration == 0 {
            return None;
        }
        let start = self.start_ms();
        Some(Span::new(start, crate::time::add_minutes(start, self.duration as i64)))
    }
}

// ── Tables ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Served,
    Cancelled,
}

impl OrderStatus {
    pub fn is_active(self) -> bool {
        !matches!(self, OrderStatus::Served | OrderStatus::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOrder {
    pub id: Ulid,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: Ulid,
    #[serde(default)]
    pub name: Option<String>,
    pub capacity: u32,
    #[serde(default = "default_min_capacity")]
    pub min_capacity: u32,
    pub floor: i32,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub orders: Vec<TableOrder>,
}

fn default_min_capacity() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl Table {
    pub fn new(id: Ulid, capacity: u32, floor: i32) -> Self {
        Self {
            id,
            name: None,
            capacity,
            min_capacity: 1,
            floor,
            section: None,
            is_active: true,
            orders: Vec::new(),
        }
    }

    /// A table with any order still in flight is physically in use.
    pub fn is_occupied(&self) -> bool {
        self.orders.iter().any(|o| o.status.is_active())
    }
}

// ── Queries ──────────────────────────────────────────────────────

/// A requested time of day: structured, embedded in a timestamp, or `HH:mm[:ss]` text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeOfDay {
    Embedded(NaiveDateTime),
    Clock(NaiveTime),
    Text(String),
}

impl From<NaiveTime> for TimeOfDay {
    fn from(t: NaiveTime) -> Self {
        TimeOfDay::Clock(t)
    }
}

impl From<NaiveDateTime> for TimeOfDay {
    fn from(ts: NaiveDateTime) -> Self {
        TimeOfDay::Embedded(ts)
    }
}

impl From<&str> for TimeOfDay {
    fn from(s: &str) -> Self {
        TimeOfDay::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub reservation_date: NaiveDate,
    pub reservation_time: TimeOfDay,
    /// Minutes.
    pub duration: u32,
    pub table_id: Ulid,
    #[serde(default)]
    pub exclude_reservation_id: Option<Ulid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSearchQuery {
    pub reservation_date: NaiveDate,
    pub reservation_time: TimeOfDay,
    pub duration: u32,
    pub party_size: u32,
    #[serde(default)]
    pub floor: Option<i32>,
    #[serde(default)]
    pub exclude_reservation_id: Option<Ulid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoAssignQuery {
    #[serde(flatten)]
    pub search: TableSearchQuery,
    #[serde(default)]
    pub preferred_table_id: Option<Ulid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResult {
    pub available: bool,
    pub conflicts: Vec<Reservation>,
}

impl AvailabilityResult {
    pub fn occupied() -> Self {
        Self {
            available: false,
            conflicts: Vec::new(),
        }
    }
}

// ── Store read arguments ─────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFilter {
    pub min_capacity: Option<u32>,
    pub floor: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationFilter {
    pub table_ids: Option<Vec<Ulid>>,
    pub exclude_reservation_id: Option<Ulid>,
}
