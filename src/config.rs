use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::{MINUTE_MS, Ms};

/// How `buffer_minutes` turns into padding around each window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferPolicy {
    /// Pad both the existing and the candidate window by the full buffer,
    /// so consecutive seatings end up `2 × buffer` apart.
    #[default]
    Doubled,
    /// Pad each window by half, so exactly `buffer` separates seatings.
    SingleGap,
}

impl std::str::FromStr for BufferPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "doubled" => Ok(BufferPolicy::Doubled),
            "single_gap" | "single" => Ok(BufferPolicy::SingleGap),
            other => Err(format!("unknown buffer policy: {other}")),
        }
    }
}

/// Additive weights for auto-assignment. Ordering intent: explicit preference >
/// exact fit > near fit > same floor > section/min-capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub preferred: u32,
    pub exact_fit: u32,
    pub near_fit_base: u32,
    /// Subtracted from `near_fit_base` per seat of mismatch.
    pub near_fit_step: u32,
    pub same_floor: u32,
    pub section_min_capacity: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            preferred: 30,
            exact_fit: 20,
            near_fit_base: 15,
            near_fit_step: 2,
            same_floor: 5,
            section_min_capacity: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub buffer_minutes: u32,
    pub buffer_policy: BufferPolicy,
    pub max_advance_days: u32,
    pub opening_hour: u32,
    pub closing_hour: u32,
    pub slot_interval_minutes: u32,
    pub default_duration: u32,
    /// Deadline applied to every store read.
    pub store_timeout: Duration,
    pub weights: ScoringWeights,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_minutes: 15,
            buffer_policy: BufferPolicy::Doubled,
            max_advance_days: 90,
            opening_hour: 10,
            closing_hour: 22,
            slot_interval_minutes: 30,
            default_duration: 120,
            store_timeout: Duration::from_secs(5),
            weights: ScoringWeights::default(),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Defaults overridden by `SEATWISE_*` environment variables.
    pub fn from_env() -> Self {
        let d = Config::default();
        let w = d.weights;
        let cfg = Self {
            buffer_minutes: env_or("SEATWISE_BUFFER_MINUTES", d.buffer_minutes),
            buffer_policy: env_or("SEATWISE_BUFFER_POLICY", d.buffer_policy),
            max_advance_days: env_or("SEATWISE_MAX_ADVANCE_DAYS", d.max_advance_days),
            opening_hour: env_or("SEATWISE_OPENING_HOUR", d.opening_hour),
            closing_hour: env_or("SEATWISE_CLOSING_HOUR", d.closing_hour),
            slot_interval_minutes: env_or("SEATWISE_SLOT_INTERVAL", d.slot_interval_minutes),
            default_duration: env_or("SEATWISE_DEFAULT_DURATION", d.default_duration),
            store_timeout: Duration::from_millis(env_or(
                "SEATWISE_STORE_TIMEOUT_MS",
                d.store_timeout.as_millis() as u64,
            )),
            weights: ScoringWeights {
                preferred: env_or("SEATWISE_WEIGHT_PREFERRED", w.preferred),
                exact_fit: env_or("SEATWISE_WEIGHT_EXACT_FIT", w.exact_fit),
                near_fit_base: env_or("SEATWISE_WEIGHT_NEAR_FIT_BASE", w.near_fit_base),
                near_fit_step: env_or("SEATWISE_WEIGHT_NEAR_FIT_STEP", w.near_fit_step),
                same_floor: env_or("SEATWISE_WEIGHT_SAME_FLOOR", w.same_floor),
                section_min_capacity: env_or(
                    "SEATWISE_WEIGHT_SECTION_MIN_CAPACITY",
                    w.section_min_capacity,
                ),
            },
        };
        if cfg.closing_hour <= cfg.opening_hour || cfg.closing_hour > 24 {
            tracing::warn!(
                "ignoring operating hours {}..{}, using defaults",
                cfg.opening_hour,
                cfg.closing_hour
            );
            return Self {
                opening_hour: d.opening_hour,
                closing_hour: d.closing_hour,
                ..cfg
            };
        }
        cfg
    }

    /// Padding applied to each side of every window before overlap testing.
    pub fn padding_ms(&self) -> Ms {
        let buffer = self.buffer_minutes as Ms * MINUTE_MS;
        match self.buffer_policy {
            BufferPolicy::Doubled => buffer,
            BufferPolicy::SingleGap => buffer / 2,
        }
    }
}
