pub mod config;
pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;
pub mod rules;
pub mod time;

pub use config::{BufferPolicy, Config, ScoringWeights};
pub use engine::store::{InMemoryStore, ReservationStore, Snapshot, StoreError, TableStore};
pub use engine::{Engine, EngineError};
