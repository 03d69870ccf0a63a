mod assign;
mod availability;
mod conflict;
mod error;
mod queries;
pub mod store;

pub use assign::score_table;
pub use availability::{free_spans, merge_overlapping, subtract_intervals};
pub use error::EngineError;

use std::future::Future;
use std::sync::Arc;

use tracing::warn;

use crate::config::Config;
use crate::observability::STORE_TIMEOUTS_TOTAL;

use self::store::StoreError;

/// Read-only availability engine over a table/reservation store.
///
/// Holds no mutable state of its own: every call loads what it needs from the
/// store, so one `Engine` can serve any number of concurrent requests.
pub struct Engine<S> {
    pub(super) store: Arc<S>,
    pub(super) config: Config,
}

impl<S> Clone for Engine<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S> Engine<S> {
    pub fn new(store: Arc<S>, config: Config) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one store read under the configured deadline.
    pub(super) async fn read<T, F>(&self, what: &'static str, fut: F) -> Result<T, EngineError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.config.store_timeout, fut).await {
            Ok(result) => result.map_err(EngineError::from),
            Err(_) => {
                warn!("store read timed out after {:?}: {what}", self.config.store_timeout);
                metrics::counter!(STORE_TIMEOUTS_TOTAL).increment(1);
                Err(EngineError::Timeout(what))
            }
        }
    }
}
