//! Topic signals: one article-level tag and five window-level tags that are
//! broadcast to every row.

use chrono::NaiveDate;

use super::stats::{mean, population_std, share};
use super::window::WindowSplit;
use super::{is_low_tier, is_mid_high_tier, FADE_RATIO, GROWTH_RATIO};
use crate::schema::SchemaMap;
use crate::table::Table;

/// Article-level: prominent and strongly positive
pub const HOT: &str = "Hot";
/// Window volume grew by the growth ratio
pub const GROWING: &str = "Growing";
/// Window volume fell to the fade ratio
pub const FADING: &str = "Fading";
/// Prominent in trade/local tiers while invisible upmarket
pub const TRADE_LOCKED: &str = "Trade-Locked";
/// Wide spread in prominence or sentiment this window
pub const FRAGMENTED_FRAMING: &str = "Fragmented Framing";
/// Prominent coverage that is narrative-free and low-tier
pub const COVERAGE_SPLIT: &str = "Coverage Split";

/// Compute the topic signal list for every row.
pub fn compute_topic_signals(
    table: &Table,
    schema: &SchemaMap,
    dates: &[Option<NaiveDate>],
    split: Option<&WindowSplit>,
) -> Vec<Vec<String>> {
    let mut signals: Vec<Vec<String>> = vec![Vec::new(); table.len()];

    // Article-level Hot
    for (row, list) in signals.iter_mut().enumerate() {
        let prominence = table.number(row, &schema.topic_prominence);
        let sentiment = table.number(row, &schema.topic_sentiment);
        if prominence >= 3.5 && sentiment >= 3.0 {
            list.push(HOT.to_string());
        }
    }

    let Some(split) = split else {
        return signals;
    };

    let current = split.current_rows(dates);
    let prior = split.prior_rows(dates);
    let vol_current = current.len();
    let vol_prior = prior.len();

    let mut window_signals: Vec<&str> = Vec::new();

    if vol_prior > 0 && vol_current as f64 >= GROWTH_RATIO * vol_prior as f64 {
        window_signals.push(GROWING);
    }
    if vol_prior > 0 && vol_current as f64 <= FADE_RATIO * vol_prior as f64 {
        window_signals.push(FADING);
    }

    let prominence_low: Vec<f64> = current
        .iter()
        .filter(|&&row| is_low_tier(table.number(row, &schema.outlet_tier)))
        .filter_map(|&row| table.number_opt(row, &schema.topic_prominence))
        .collect();
    let prominence_mid_high: Vec<f64> = current
        .iter()
        .filter(|&&row| is_mid_high_tier(table.number(row, &schema.outlet_tier)))
        .filter_map(|&row| table.number_opt(row, &schema.topic_prominence))
        .collect();
    if let (Some(low), Some(mid_high)) = (mean(&prominence_low), mean(&prominence_mid_high)) {
        if low >= 2.5 && mid_high < 1.5 {
            window_signals.push(TRADE_LOCKED);
        }
    }

    let prominences: Vec<f64> = current
        .iter()
        .filter_map(|&row| table.number_opt(row, &schema.topic_prominence))
        .collect();
    let sentiments: Vec<f64> = current
        .iter()
        .filter_map(|&row| table.number_opt(row, &schema.topic_sentiment))
        .collect();
    if population_std(&prominences) >= 1.0 || population_std(&sentiments) >= 1.5 {
        window_signals.push(FRAGMENTED_FRAMING);
    }

    if !schema.narratives.is_empty() {
        let no_narrative_rows = current
            .iter()
            .filter(|&&row| {
                schema
                    .narratives
                    .iter()
                    .all(|n| table.number(row, &n.prominence) <= 0.0)
            })
            .count();
        let low_tier_rows = current
            .iter()
            .filter(|&&row| is_low_tier(table.number(row, &schema.outlet_tier)))
            .count();
        let avg_prominence = mean(&prominences);
        if avg_prominence.is_some_and(|p| p >= 2.5)
            && share(no_narrative_rows, vol_current) >= 0.30
            && share(low_tier_rows, vol_current) >= 0.60
        {
            window_signals.push(COVERAGE_SPLIT);
        }
    }

    if !window_signals.is_empty() {
        for list in signals.iter_mut() {
            list.extend(window_signals.iter().map(|s| s.to_string()));
        }
    }
    signals
}

// ============================================================================
// TESTS
// ============================================================================
