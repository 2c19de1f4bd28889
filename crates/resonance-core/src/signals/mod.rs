//! Signals Module
//!
//! Pass-2 diagnostics: rolling 30-day window split and the topic, narrative,
//! and entity signal engines. Aggregates are computed from the full input
//! snapshot before any per-row attribution, so no row's signals depend on
//! processing order.

mod entity;
mod narrative;
mod stats;
mod topic;
mod window;

pub use entity::{compute_entity_signals, signal_weight, EntitySignal};
pub use narrative::compute_narrative_signals;
pub use stats::{iqr, mean, median, population_std, share};
pub use topic::compute_topic_signals;
pub use window::{parse_date, parse_dates, split_windows, WindowBounds, WindowSplit};

use chrono::NaiveDate;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Length of each rolling window, in days
pub const WINDOW_DAYS: i64 = 30;

/// Maximum number of signals attached per (entity, row)
pub const ENTITY_SIGNAL_CAP: usize = 3;

/// Volume ratio at or above which a window reads as growing
pub const GROWTH_RATIO: f64 = 1.30;

/// Volume ratio at or below which a window reads as fading
pub const FADE_RATIO: f64 = 0.70;

/// Low outlet tiers (trade/local)
#[inline]
pub fn is_low_tier(tier: f64) -> bool {
    tier == 1.0 || tier == 2.0
}

/// Mid and high outlet tiers (regional through top national)
#[inline]
pub fn is_mid_high_tier(tier: f64) -> bool {
    tier == 3.0 || tier == 4.0 || tier == 5.0
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Signal-engine configuration. Immutable; passed explicitly to Pass 2.
#[derive(Debug, Clone)]
pub struct SignalConfig {
    /// Rolling window length in days
    pub window_days: i64,
    /// Cap on signals per (entity, row)
    pub entity_signal_cap: usize,
    /// Window anchor; defaults to the maximum parseable date in the input
    pub as_of: Option<NaiveDate>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            window_days: WINDOW_DAYS,
            entity_signal_cap: ENTITY_SIGNAL_CAP,
            as_of: None,
        }
    }
}
