use tracing::{debug, info};

use crate::config::ScoringWeights;
use crate::model::*;
use crate::observability::AUTO_ASSIGN_TOTAL;

use super::store::{ReservationStore, TableStore};
use super::{Engine, EngineError};

/// Seating-quality score used to rank free tables against one request.
/// Only meaningful relative to other tables scored for the same query.
pub fn score_table(table: &Table, query: &AutoAssignQuery, w: &ScoringWeights) -> u32 {
    let party = query.search.party_size;
    let mut score = 0;

    if query.preferred_table_id == Some(table.id) {
        score += w.preferred;
    }

    if table.capacity == party {
        score += w.exact_fit;
    } else {
        let diff = table.capacity.abs_diff(party);
        score += w.near_fit_base.saturating_sub(w.near_fit_step.saturating_mul(diff));
    }

    if query.search.floor == Some(table.floor) {
        score += w.same_floor;
    }

    if table.section.is_some() && party >= table.min_capacity {
        score += w.section_min_capacity;
    }

    score
}

/// Highest score wins; on a tie the earlier table is kept.
pub(crate) fn pick_best(
    pool: Vec<Table>,
    query: &AutoAssignQuery,
    w: &ScoringWeights,
) -> Option<(Table, u32)> {
    let mut best: Option<(Table, u32)> = None;
    for table in pool {
        let score = score_table(&table, query, w);
        debug!(table = %table.id, capacity = table.capacity, score, "scored table");
        if best.as_ref().is_none_or(|(_, top)| score > *top) {
            best = Some((table, score));
        }
    }
    best
}

impl<S> Engine<S>
where
    S: TableStore + ReservationStore + 'static,
{
    /// Pick the best free table for the request, or `None` when nothing fits.
    pub async fn auto_assign_table(&self, query: &AutoAssignQuery) -> Result<Option<Table>, EngineError> {
        let pool = self.get_available_tables(&query.search).await?;
        match pick_best(pool, query, &self.config.weights) {
            Some((table, score)) => {
                info!(table = %table.id, score, party = query.search.party_size, "auto-assigned table");
                metrics::counter!(AUTO_ASSIGN_TOTAL, "outcome" => "assigned").increment(1);
                Ok(Some(table))
            }
            None => {
                info!(party = query.search.party_size, "no table available for auto-assignment");
                metrics::counter!(AUTO_ASSIGN_TOTAL, "outcome" => "none").increment(1);
                Ok(None)
            }
        }
    }
}
