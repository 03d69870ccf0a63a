/// Reservation length bounds, minutes.
pub const MIN_DURATION_MINUTES: u32 = 30;
pub const MAX_DURATION_MINUTES: u32 = 360;

/// Upper bound on per-table checks in flight during one search.
pub const MAX_CONCURRENT_CHECKS: usize = 32;
