use ulid::Ulid;

use crate::model::*;

/// Every reservation on `table_id` whose padded window meets the padded candidate.
///
/// The store already filters by table, status and exclusion; those checks are
/// repeated here so a looser store cannot leak a non-blocking row into the result.
pub(crate) fn find_conflicts(
    table_id: Ulid,
    existing: &[Reservation],
    candidate: &Span,
    pad: Ms,
    exclude: Option<Ulid>,
) -> Vec<Reservation> {
    existing
        .iter()
        .filter(|r| r.table_id == table_id)
        .filter(|r| r.status.blocks_slot())
        .filter(|r| Some(r.id) != exclude)
        .filter(|r| r.window().is_some_and(|w| w.overlaps_padded(candidate, pad)))
        .cloned()
        .collect()
}
