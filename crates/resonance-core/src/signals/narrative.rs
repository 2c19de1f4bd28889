//! Narrative signals: article-level `Hot` plus window-level structure and
//! trend tags, attached only to rows where the narrative is present.

use chrono::NaiveDate;

use super::stats::{mean, population_std, share};
use super::window::WindowSplit;
use super::{is_low_tier, is_mid_high_tier, FADE_RATIO, GROWTH_RATIO};
use crate::schema::{NarrativeBinding, SchemaMap};
use crate::table::Table;

/// Article-level: prominent and strongly positive
pub const HOT: &str = "Hot";
/// Present in most coverage, or central in half of it
pub const DOMINANT: &str = "Dominant";
/// One entity owns the narrative's central coverage
pub const CAPTURED: &str = "Captured";
/// Central coverage with no prominent entity
pub const UNOWNED: &str = "Unowned";
/// Narrative coverage mostly runs without prominent entities
pub const MEDIA_LED: &str = "Media-Led";
/// Wide spread in prominence or sentiment this window
pub const FRAGMENTED: &str = "Fragmented";
/// Routinely co-occurs with other central narratives
pub const OVERLAPPING: &str = "Overlapping";
/// Prominent in trade/local tiers while invisible upmarket
pub const TRADE_LOCKED: &str = "Trade-Locked";
/// Prominent, companion-free, low-tier coverage
pub const COVERAGE_SPLIT: &str = "Coverage Split";
/// Window volume grew by the growth ratio
pub const GROWING: &str = "Growing";
/// Window volume fell to the fade ratio
pub const FATIGUE: &str = "Fatigue";
/// No measurable rows in the current window
pub const DEAD: &str = "Dead";
/// Sentiment or prominence improved sharply
pub const STRENGTHENING: &str = "Strengthening";
/// Sentiment dropped sharply
pub const DETERIORATING: &str = "Deteriorating";
/// Mean prominence grew by the growth ratio
pub const GAINING_PROMINENCE: &str = "Gaining Prominence";

/// Compute per-row signal lists for every narrative, in binding order.
pub fn compute_narrative_signals(
    table: &Table,
    schema: &SchemaMap,
    dates: &[Option<NaiveDate>],
    split: Option<&WindowSplit>,
) -> Vec<Vec<Vec<String>>> {
    schema
        .narratives
        .iter()
        .map(|narrative| narrative_signals(table, schema, narrative, dates, split))
        .collect()
}

fn narrative_signals(
    table: &Table,
    schema: &SchemaMap,
    narrative: &NarrativeBinding,
    dates: &[Option<NaiveDate>],
    split: Option<&WindowSplit>,
) -> Vec<Vec<String>> {
    let mut signals: Vec<Vec<String>> = vec![Vec::new(); table.len()];

    // Article-level Hot
    for (row, list) in signals.iter_mut().enumerate() {
        let prominence = table.number(row, &narrative.prominence);
        let sentiment = table.number(row, &narrative.sentiment);
        if prominence >= 3.5 && sentiment >= 3.0 {
            list.push(HOT.to_string());
        }
    }

    let Some(split) = split else {
        return signals;
    };

    // Measurable rows: date in window and a parseable narrative cell
    let current: Vec<usize> = split
        .current_rows(dates)
        .into_iter()
        .filter(|&row| table.number_opt(row, &narrative.prominence).is_some())
        .collect();
    let prior: Vec<usize> = split
        .prior_rows(dates)
        .into_iter()
        .filter(|&row| table.number_opt(row, &narrative.prominence).is_some())
        .collect();
    let vol_current = current.len();
    let vol_prior = prior.len();

    let mut window_signals: Vec<&str> = Vec::new();

    let present_rows = current
        .iter()
        .filter(|&&row| table.number(row, &narrative.prominence) > 0.0)
        .count();
    let central_rows: Vec<usize> = current
        .iter()
        .copied()
        .filter(|&row| table.number(row, &narrative.prominence) >= 2.5)
        .collect();
    if share(present_rows, vol_current) >= 0.66 || share(central_rows.len(), vol_current) >= 0.50 {
        window_signals.push(DOMINANT);
    }

    if !schema.entities.is_empty() && vol_current > 0 {
        if !central_rows.is_empty() {
            let max_owner_share = schema
                .entities
                .iter()
                .map(|entity| {
                    let owned = central_rows
                        .iter()
                        .filter(|&&row| table.number(row, &entity.prominence) >= 2.5)
                        .count();
                    share(owned, central_rows.len())
                })
                .fold(0.0, f64::max);
            if max_owner_share >= 0.50 {
                window_signals.push(CAPTURED);
            }

            let ownerless = central_rows
                .iter()
                .filter(|&&row| {
                    schema
                        .entities
                        .iter()
                        .all(|entity| table.number(row, &entity.prominence) < 2.5)
                })
                .count();
            if share(ownerless, central_rows.len()) >= 0.50 {
                window_signals.push(UNOWNED);
            }
        }

        let narrative_rows: Vec<usize> = current
            .iter()
            .copied()
            .filter(|&row| table.number(row, &narrative.prominence) > 0.0)
            .collect();
        if !narrative_rows.is_empty() {
            let ownerless = narrative_rows
                .iter()
                .filter(|&&row| {
                    schema
                        .entities
                        .iter()
                        .all(|entity| table.number(row, &entity.prominence) < 2.5)
                })
                .count();
            if share(ownerless, narrative_rows.len()) >= 0.50 {
                window_signals.push(MEDIA_LED);
            }
        }
    }

    if vol_current > 0 {
        let prominences: Vec<f64> = current
            .iter()
            .filter_map(|&row| table.number_opt(row, &narrative.prominence))
            .collect();
        let sentiments: Vec<f64> = current
            .iter()
            .filter_map(|&row| table.number_opt(row, &narrative.sentiment))
            .collect();
        if population_std(&prominences) >= 1.0 || population_std(&sentiments) >= 1.5 {
            window_signals.push(FRAGMENTED);
        }

        let overlapping_rows = current
            .iter()
            .filter(|&&row| {
                schema
                    .narratives
                    .iter()
                    .filter(|n| table.number(row, &n.prominence) >= 2.0)
                    .count()
                    >= 2
            })
            .count();
        if share(overlapping_rows, vol_current) >= 0.30 {
            window_signals.push(OVERLAPPING);
        }

        let prominence_low: Vec<f64> = current
            .iter()
            .filter(|&&row| is_low_tier(table.number(row, &schema.outlet_tier)))
            .filter_map(|&row| table.number_opt(row, &narrative.prominence))
            .collect();
        let prominence_mid_high: Vec<f64> = current
            .iter()
            .filter(|&&row| is_mid_high_tier(table.number(row, &schema.outlet_tier)))
            .filter_map(|&row| table.number_opt(row, &narrative.prominence))
            .collect();
        if let (Some(low), Some(mid_high)) = (mean(&prominence_low), mean(&prominence_mid_high)) {
            if low >= 2.5 && mid_high < 1.5 {
                window_signals.push(TRADE_LOCKED);
            }
        }

        let companionless = current
            .iter()
            .filter(|&&row| {
                schema
                    .narratives
                    .iter()
                    .filter(|other| other.key != narrative.key)
                    .all(|other| table.number(row, &other.prominence) <= 0.0)
            })
            .count();
        let low_tier_rows = current
            .iter()
            .filter(|&&row| is_low_tier(table.number(row, &schema.outlet_tier)))
            .count();
        if mean(&prominences).is_some_and(|p| p >= 2.5)
            && share(companionless, vol_current) >= 0.30
            && share(low_tier_rows, vol_current) >= 0.60
        {
            window_signals.push(COVERAGE_SPLIT);
        }
    }

    if vol_prior > 0 && vol_current as f64 >= GROWTH_RATIO * vol_prior as f64 {
        window_signals.push(GROWING);
    }
    if vol_prior > 0 && vol_current as f64 <= FADE_RATIO * vol_prior as f64 {
        window_signals.push(FATIGUE);
    }
    if vol_current == 0 {
        window_signals.push(DEAD);
    }

    if vol_current > 0 && vol_prior > 0 {
        let sent_current = mean(
            &current
                .iter()
                .filter_map(|&row| table.number_opt(row, &narrative.sentiment))
                .collect::<Vec<_>>(),
        );
        let sent_prior = mean(
            &prior
                .iter()
                .filter_map(|&row| table.number_opt(row, &narrative.sentiment))
                .collect::<Vec<_>>(),
        );
        let prom_current = mean(
            &current
                .iter()
                .filter_map(|&row| table.number_opt(row, &narrative.prominence))
                .collect::<Vec<_>>(),
        );
        let prom_prior = mean(
            &prior
                .iter()
                .filter_map(|&row| table.number_opt(row, &narrative.prominence))
                .collect::<Vec<_>>(),
        );

        let sentiment_jump = matches!((sent_current, sent_prior), (Some(c), Some(p)) if c - p >= 1.5);
        let prominence_ratio_grown =
            matches!((prom_current, prom_prior), (Some(c), Some(p)) if c >= GROWTH_RATIO * p);
        if sentiment_jump || prominence_ratio_grown {
            window_signals.push(STRENGTHENING);
        }
        if matches!((sent_current, sent_prior), (Some(c), Some(p)) if p - c >= 1.5) {
            window_signals.push(DETERIORATING);
        }
        if matches!((prom_current, prom_prior), (Some(c), Some(p)) if p > 0.0 && c >= GROWTH_RATIO * p)
        {
            window_signals.push(GAINING_PROMINENCE);
        }
    }

    // Window-level tags attach only where the narrative is present
    if !window_signals.is_empty() {
        for (row, list) in signals.iter_mut().enumerate() {
            if table.number(row, &narrative.prominence) > 0.0 {
                list.extend(window_signals.iter().map(|s| s.to_string()));
            }
        }
    }
    signals
}

// ============================================================================
// TESTS
// ============================================================================
