//! Entity signals: article-level peer structure plus window-level deltas.
//!
//! Every candidate carries a `(severity, structural, outlet, prominence,
//! recency)` tuple; after accumulation the candidates are stable-sorted
//! descending and capped. Peer aggregates exclude the subject entity.

use chrono::{Datelike, NaiveDate};

use super::stats::{iqr, mean, median, population_std, share};
use super::window::WindowSplit;
use super::GROWTH_RATIO;
use crate::schema::{EntityBinding, SchemaMap};
use crate::table::Table;

// ============================================================================
// SIGNAL CATALOGUE
// ============================================================================

/// The entity signal catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntitySignal {
    /// Shaping coverage outright, by modifier or sheer prominence
    NarrativeShaping,
    /// Sentiment gap over a peer inside a live narrative
    WedgePotential,
    /// Outshone by a more prominent peer
    SecondFiddle,
    /// Neutral while a peer runs hot
    PeerPressure,
    /// Large sentiment distance from a peer
    ContrastFraming,
    /// Extreme sentiment distance in the peer's favor
    PolarizedFraming,
    /// A peer took a heavy hit in the same article
    RicochetRisk,
    /// Clean standing while a peer takes the hit
    CautiousSchadenfreude,
    /// Owns the article while every peer stays quiet
    CapturedNarrative,
    /// Present with no narrative live on the row
    NarrativeVacuum,
    /// Quality slid after a prior-window takedown
    StrategicFallout,
    /// Quality rose after a prior-window breakthrough
    StrategicUplift,
    /// Sentiment tightly echoed across publications
    EchoTight,
    /// The leading narrative is gaining while sentiment is negative
    RisingThreat,
    /// The leading narrative is gaining while sentiment is positive
    RisingOpportunity,
    /// Sentiment fell sharply window over window
    DeepeningExposure,
    /// Sentiment rose sharply window over window
    StrengtheningPosition,
    /// Prominence and sentiment both declined
    LostMomentum,
    /// Prominence jumped window over window
    ProminenceSpike,
    /// Peers accelerated while the entity stalled
    MomentumGap,
    /// Consistently boxed out of the leading narrative
    FramingCage,
    /// Volatile prominence or sentiment this window
    TurbulentFrame,
    /// Positive footprint across several narratives
    NarrativeExpansion,
    /// Sentiment splits widely across narratives
    NarrativeFragmentation,
}

impl EntitySignal {
    /// Published string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntitySignal::NarrativeShaping => "Narrative Shaping",
            EntitySignal::WedgePotential => "Wedge Potential",
            EntitySignal::SecondFiddle => "Second Fiddle",
            EntitySignal::PeerPressure => "Peer Pressure",
            EntitySignal::ContrastFraming => "Contrast Framing",
            EntitySignal::PolarizedFraming => "Polarized Framing",
            EntitySignal::RicochetRisk => "Ricochet Risk",
            EntitySignal::CautiousSchadenfreude => "Cautious Schadenfreude",
            EntitySignal::CapturedNarrative => "Captured Narrative (article)",
            EntitySignal::NarrativeVacuum => "Narrative Vacuum",
            EntitySignal::StrategicFallout => "Strategic Fallout",
            EntitySignal::StrategicUplift => "Strategic Uplift",
            EntitySignal::EchoTight => "Echo (tight)",
            EntitySignal::RisingThreat => "Rising Threat",
            EntitySignal::RisingOpportunity => "Rising Opportunity",
            EntitySignal::DeepeningExposure => "Deepening Exposure",
            EntitySignal::StrengtheningPosition => "Strengthening Position",
            EntitySignal::LostMomentum => "Lost Momentum",
            EntitySignal::ProminenceSpike => "Prominence Spike",
            EntitySignal::MomentumGap => "Momentum Gap",
            EntitySignal::FramingCage => "Framing Cage (tight)",
            EntitySignal::TurbulentFrame => "Turbulent Frame (tight)",
            EntitySignal::NarrativeExpansion => "Narrative Expansion",
            EntitySignal::NarrativeFragmentation => "Narrative Fragmentation",
        }
    }
}

impl std::fmt::Display for EntitySignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fixed `(severity, structural)` weights for ranking.
pub fn signal_weight(signal: EntitySignal) -> (u8, u8) {
    match signal {
        EntitySignal::NarrativeShaping => (9, 3),
        EntitySignal::StrategicFallout => (8, 2),
        EntitySignal::StrategicUplift => (7, 2),
        EntitySignal::EchoTight => (6, 2),
        EntitySignal::RisingThreat => (7, 2),
        EntitySignal::RisingOpportunity => (7, 2),
        EntitySignal::DeepeningExposure => (6, 1),
        EntitySignal::StrengtheningPosition => (6, 1),
        EntitySignal::LostMomentum => (5, 1),
        EntitySignal::ProminenceSpike => (5, 1),
        EntitySignal::MomentumGap => (5, 1),
        EntitySignal::FramingCage => (8, 3),
        EntitySignal::TurbulentFrame => (6, 2),
        EntitySignal::WedgePotential => (5, 2),
        EntitySignal::NarrativeVacuum => (4, 1),
        EntitySignal::CapturedNarrative => (6, 2),
        EntitySignal::NarrativeExpansion => (6, 2),
        EntitySignal::NarrativeFragmentation => (5, 2),
        EntitySignal::SecondFiddle => (4, 1),
        EntitySignal::PeerPressure => (4, 1),
        EntitySignal::RicochetRisk => (5, 2),
        EntitySignal::ContrastFraming => (5, 1),
        EntitySignal::PolarizedFraming => (6, 2),
        EntitySignal::CautiousSchadenfreude => (5, 2),
    }
}

/// Peer modifiers that count as a heavy hit for ricochet purposes.
const HEAVY_HIT_MODIFIERS: [&str; 5] = [
    "Narrative Shaper",
    "Takedown",
    "Body Blow",
    "Stinger",
    "Collateral Damage",
];

// ============================================================================
// RANKING
// ============================================================================

#[derive(Debug, Clone)]
struct Candidate {
    signal: EntitySignal,
    severity: u8,
    structural: u8,
    outlet: f64,
    prominence: f64,
    recency: i64,
}

impl Candidate {
    fn new(signal: EntitySignal, outlet: f64, prominence: f64, recency: i64) -> Self {
        let (severity, structural) = signal_weight(signal);
        Self {
            signal,
            severity,
            structural,
            outlet,
            prominence,
            recency,
        }
    }
}

fn rank_and_cap(mut candidates: Vec<Candidate>, cap: usize) -> Vec<String> {
    use std::cmp::Ordering;
    candidates.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then(b.structural.cmp(&a.structural))
            .then(b.outlet.partial_cmp(&a.outlet).unwrap_or(Ordering::Equal))
            .then(
                b.prominence
                    .partial_cmp(&a.prominence)
                    .unwrap_or(Ordering::Equal),
            )
            .then(b.recency.cmp(&a.recency))
    });
    candidates.truncate(cap);
    candidates
        .into_iter()
        .map(|c| c.signal.as_str().to_string())
        .collect()
}

// ============================================================================
// WINDOW STATS
// ============================================================================

#[derive(Debug, Clone, Default)]
struct WindowStats {
    prom_current: Option<f64>,
    prom_prior: Option<f64>,
    sent_current: Option<f64>,
    sent_prior: Option<f64>,
    quality_current: Option<f64>,
    quality_prior: Option<f64>,
    had_takedown_prior: bool,
    had_breakthrough_prior: bool,
}

fn measurable_rows(table: &Table, rows: &[usize], column: &str) -> Vec<usize> {
    rows.iter()
        .copied()
        .filter(|&row| table.number_opt(row, column).is_some())
        .collect()
}

fn column_mean(table: &Table, rows: &[usize], column: &str) -> Option<f64> {
    let values: Vec<f64> = rows
        .iter()
        .filter_map(|&row| table.number_opt(row, column))
        .collect();
    mean(&values)
}

fn window_stats(
    table: &Table,
    entity: &EntityBinding,
    current: &[usize],
    prior: &[usize],
) -> WindowStats {
    let current_rows = measurable_rows(table, current, &entity.prominence);
    let prior_rows = measurable_rows(table, prior, &entity.prominence);

    let quality = entity.quality_score.as_deref();
    let modifier = entity.modifier.as_deref();

    let had_modifier = |label: &str| {
        modifier.is_some_and(|column| {
            prior_rows
                .iter()
                .any(|&row| table.value(row, column).map(str::trim) == Some(label))
        })
    };

    WindowStats {
        prom_current: column_mean(table, &current_rows, &entity.prominence),
        prom_prior: column_mean(table, &prior_rows, &entity.prominence),
        sent_current: column_mean(table, &current_rows, &entity.sentiment),
        sent_prior: column_mean(table, &prior_rows, &entity.sentiment),
        quality_current: quality.and_then(|column| column_mean(table, &current_rows, column)),
        quality_prior: quality.and_then(|column| column_mean(table, &prior_rows, column)),
        had_takedown_prior: had_modifier("Takedown"),
        had_breakthrough_prior: had_modifier("Breakthrough"),
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Compute per-row signal lists for every entity, in binding order, capped at
/// `cap` signals per (entity, row).
pub fn compute_entity_signals(
    table: &Table,
    schema: &SchemaMap,
    dates: &[Option<NaiveDate>],
    split: Option<&WindowSplit>,
    cap: usize,
) -> Vec<Vec<Vec<String>>> {
    let current: Vec<usize> = split.map(|s| s.current_rows(dates)).unwrap_or_default();
    let prior: Vec<usize> = split.map(|s| s.prior_rows(dates)).unwrap_or_default();

    // Per-narrative window gain flags
    let narrative_gain: Vec<bool> = schema
        .narratives
        .iter()
        .map(|narrative| {
            let cur = column_mean(
                table,
                &measurable_rows(table, &current, &narrative.prominence),
                &narrative.prominence,
            );
            let prev = column_mean(
                table,
                &measurable_rows(table, &prior, &narrative.prominence),
                &narrative.prominence,
            );
            matches!((cur, prev), (Some(c), Some(p)) if p > 0.0 && c >= GROWTH_RATIO * p)
        })
        .collect();

    // Per-entity window stats
    let stats: Vec<WindowStats> = schema
        .entities
        .iter()
        .map(|entity| window_stats(table, entity, &current, &prior))
        .collect();

    // Window-level structure per entity (row-independent pieces)
    let turbulent: Vec<bool> = schema
        .entities
        .iter()
        .map(|entity| {
            let rows = measurable_rows(table, &current, &entity.prominence);
            let prominences: Vec<f64> = rows
                .iter()
                .filter_map(|&row| table.number_opt(row, &entity.prominence))
                .collect();
            let sentiments: Vec<f64> = rows
                .iter()
                .filter_map(|&row| table.number_opt(row, &entity.sentiment))
                .collect();
            population_std(&prominences) >= 1.0
                || population_std(&sentiments) >= 1.5
                || iqr(&sentiments) >= 2.0
        })
        .collect();

    let expansion_fragmentation: Vec<(bool, bool)> = schema
        .entities
        .iter()
        .map(|entity| expansion_state(table, schema, entity, &current))
        .collect();

    // Echo and framing cage per (narrative, entity)
    let echo: Vec<Vec<bool>> = schema
        .narratives
        .iter()
        .map(|narrative| {
            schema
                .entities
                .iter()
                .map(|entity| echo_tight(table, schema, narrative, entity, &current))
                .collect()
        })
        .collect();
    let cage: Vec<Vec<bool>> = schema
        .narratives
        .iter()
        .map(|narrative| {
            schema
                .entities
                .iter()
                .map(|entity| framing_cage(table, schema, narrative, entity, &current))
                .collect()
        })
        .collect();

    let mut all_signals: Vec<Vec<Vec<String>>> =
        vec![vec![Vec::new(); table.len()]; schema.entities.len()];

    for row in 0..table.len() {
        let outlet = table.number(row, &schema.outlet_tier);
        let recency = dates[row]
            .map(|d| i64::from(d.num_days_from_ce()))
            .unwrap_or(0);

        let narrative_proms: Vec<f64> = schema
            .narratives
            .iter()
            .map(|n| table.number(row, &n.prominence))
            .collect();
        let any_narrative_present = narrative_proms.iter().any(|&p| p > 0.0);
        // Leading narrative on the row: strictly greater prominence wins,
        // earlier narrative keeps ties
        let mut top_narrative: Option<(usize, f64)> = None;
        for (idx, &prom) in narrative_proms.iter().enumerate() {
            if top_narrative.is_none_or(|(_, best)| prom > best) {
                top_narrative = Some((idx, prom));
            }
        }

        let features: Vec<(f64, f64, String)> = schema
            .entities
            .iter()
            .map(|entity| {
                let modifier = entity
                    .modifier
                    .as_deref()
                    .and_then(|column| table.value(row, column))
                    .map(|v| v.trim().to_string())
                    .unwrap_or_default();
                (
                    table.number(row, &entity.prominence),
                    table.number(row, &entity.sentiment),
                    modifier,
                )
            })
            .collect();

        for (e, _entity) in schema.entities.iter().enumerate() {
            let (prominence, sentiment, ref modifier) = features[e];
            let present = prominence > 0.0;
            let peers: Vec<&(f64, f64, String)> = features
                .iter()
                .enumerate()
                .filter(|(p, _)| *p != e)
                .map(|(_, f)| f)
                .collect();
            let peer_max_prom = peers.iter().map(|p| p.0).fold(0.0, f64::max);
            let peer_max_sent = peers.iter().map(|p| p.1).fold(0.0, f64::max);

            let mut candidates: Vec<Candidate> = Vec::new();
            let mut add = |signal: EntitySignal| {
                candidates.push(Candidate::new(signal, outlet, prominence, recency));
            };

            if modifier == "Takedown"
                || modifier == "Breakthrough"
                || (prominence >= 4.0 && outlet >= 4.0)
            {
                add(EntitySignal::NarrativeShaping);
            }

            if present
                && any_narrative_present
                && peers.iter().any(|p| sentiment - p.1 >= 1.5)
            {
                add(EntitySignal::WedgePotential);
            }

            if present && prominence < 3.0 && peer_max_prom >= 3.0 {
                add(EntitySignal::SecondFiddle);
            }

            if present && peer_max_sent >= 2.5 && (0.0..=1.0).contains(&sentiment) {
                add(EntitySignal::PeerPressure);
            }

            if present && peers.iter().any(|p| (sentiment - p.1).abs() >= 2.0) {
                add(EntitySignal::ContrastFraming);
            }
            if present && peers.iter().any(|p| p.1 - sentiment >= 4.0) {
                add(EntitySignal::PolarizedFraming);
            }

            if present
                && peers
                    .iter()
                    .any(|p| HEAVY_HIT_MODIFIERS.contains(&p.2.as_str()))
            {
                add(EntitySignal::RicochetRisk);
                if sentiment >= 0.0 {
                    add(EntitySignal::CautiousSchadenfreude);
                }
            }

            if present && prominence >= 2.5 && peer_max_prom < 2.5 {
                add(EntitySignal::CapturedNarrative);
            }

            if present
                && !schema.narratives.is_empty()
                && narrative_proms.iter().all(|&p| p == 0.0)
            {
                add(EntitySignal::NarrativeVacuum);
            }

            let st = &stats[e];
            if st.had_takedown_prior
                && matches!(
                    (st.quality_current, st.quality_prior),
                    (Some(cur), Some(prev)) if cur - prev <= -0.5
                )
            {
                add(EntitySignal::StrategicFallout);
            }
            if st.had_breakthrough_prior
                && matches!(
                    (st.quality_current, st.quality_prior),
                    (Some(cur), Some(prev)) if cur - prev >= 0.5
                )
            {
                add(EntitySignal::StrategicUplift);
            }

            if let Some((top, top_prom)) = top_narrative {
                if top_prom >= 2.0 && echo[top][e] {
                    add(EntitySignal::EchoTight);
                }
                if top_prom >= 2.0 && narrative_gain[top] {
                    if let Some(sent_cur) = st.sent_current {
                        if sent_cur < 0.0 {
                            add(EntitySignal::RisingThreat);
                        }
                        if sent_cur > 1.0 {
                            add(EntitySignal::RisingOpportunity);
                        }
                    }
                }
            }

            if let (Some(sent_cur), Some(sent_prev)) = (st.sent_current, st.sent_prior) {
                if sent_prev - sent_cur >= 1.5 {
                    add(EntitySignal::DeepeningExposure);
                }
                if sent_cur - sent_prev >= 1.5 {
                    add(EntitySignal::StrengtheningPosition);
                }
            }

            if let (Some(prom_cur), Some(prom_prev)) = (st.prom_current, st.prom_prior) {
                if matches!(
                    (st.sent_current, st.sent_prior),
                    (Some(sc), Some(sp)) if prom_cur < prom_prev && sc < sp
                ) {
                    add(EntitySignal::LostMomentum);
                }
                if prom_cur - prom_prev >= 2.0 {
                    add(EntitySignal::ProminenceSpike);
                }

                let peer_cur: Vec<f64> = stats
                    .iter()
                    .enumerate()
                    .filter(|(p, _)| *p != e)
                    .filter_map(|(_, s)| s.prom_current)
                    .collect();
                let peer_prev: Vec<f64> = stats
                    .iter()
                    .enumerate()
                    .filter(|(p, _)| *p != e)
                    .filter_map(|(_, s)| s.prom_prior)
                    .collect();
                if let (Some(peer_avg_cur), Some(peer_avg_prev)) =
                    (mean(&peer_cur), mean(&peer_prev))
                {
                    if peer_avg_cur > prom_cur
                        && peer_avg_cur - peer_avg_prev >= 0.5
                        && prom_cur - prom_prev <= 0.0
                    {
                        add(EntitySignal::MomentumGap);
                    }
                }
            }

            if let Some((top, top_prom)) = top_narrative {
                if top_prom > 0.0 && cage[top][e] {
                    add(EntitySignal::FramingCage);
                }
            }

            if turbulent[e] {
                add(EntitySignal::TurbulentFrame);
            }

            let (expansion, fragmentation) = expansion_fragmentation[e];
            if expansion {
                add(EntitySignal::NarrativeExpansion);
            }
            if fragmentation {
                add(EntitySignal::NarrativeFragmentation);
            }

            all_signals[e][row] = rank_and_cap(candidates, cap);
        }
    }

    all_signals
}

/// Echo (tight): across the current window, on articles where the narrative
/// is central, the narrative's and the entity's sentiments both sit within
/// half a point of their medians in at least three distinct publications.
fn echo_tight(
    table: &Table,
    schema: &SchemaMap,
    narrative: &crate::schema::NarrativeBinding,
    entity: &EntityBinding,
    current: &[usize],
) -> bool {
    let rows: Vec<usize> = current
        .iter()
        .copied()
        .filter(|&row| table.number(row, &narrative.prominence) >= 2.0)
        .collect();
    if rows.len() < 3 {
        return false;
    }

    let entity_sents: Vec<f64> = rows
        .iter()
        .filter_map(|&row| table.number_opt(row, &entity.sentiment))
        .collect();
    let narrative_sents: Vec<f64> = rows
        .iter()
        .filter_map(|&row| table.number_opt(row, &narrative.sentiment))
        .collect();
    let (Some(entity_median), Some(narrative_median)) =
        (median(&entity_sents), median(&narrative_sents))
    else {
        return false;
    };

    let Some(publication) = schema.publication.as_deref() else {
        return false;
    };
    let mut publications: Vec<String> = rows
        .iter()
        .filter(|&&row| {
            let entity_sent = table.number_opt(row, &entity.sentiment);
            let narrative_sent = table.number_opt(row, &narrative.sentiment);
            matches!(
                (entity_sent, narrative_sent),
                (Some(es), Some(ns))
                    if (es - entity_median).abs() <= 0.5 && (ns - narrative_median).abs() <= 0.5
            )
        })
        .filter_map(|&row| table.value(row, publication))
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    publications.sort();
    publications.dedup();
    publications.len() >= 3
}

/// Framing Cage (tight): on current-window articles where the narrative is
/// live, peers run prominent while the entity stays boxed out.
fn framing_cage(
    table: &Table,
    schema: &SchemaMap,
    narrative: &crate::schema::NarrativeBinding,
    entity: &EntityBinding,
    current: &[usize],
) -> bool {
    let rows: Vec<usize> = current
        .iter()
        .copied()
        .filter(|&row| table.number(row, &narrative.prominence) > 0.0)
        .collect();
    if rows.is_empty() {
        return false;
    }

    let mut caged = 0usize;
    let mut entity_prominent = 0usize;
    for &row in &rows {
        let own = table.number(row, &entity.prominence);
        let peer_prominent = schema
            .entities
            .iter()
            .filter(|other| other.key != entity.key)
            .any(|other| table.number(row, &other.prominence) >= 3.0);
        if peer_prominent && own < 3.0 {
            caged += 1;
        }
        if own >= 3.0 {
            entity_prominent += 1;
        }
    }
    share(caged, rows.len()) >= 0.60 && share(entity_prominent, rows.len()) <= 0.10
}

/// Narrative Expansion / Fragmentation over the current window.
fn expansion_state(
    table: &Table,
    schema: &SchemaMap,
    entity: &EntityBinding,
    current: &[usize],
) -> (bool, bool) {
    if schema.narratives.is_empty() {
        return (false, false);
    }

    let mut positive_narratives = 0usize;
    let mut footprint: Vec<(Option<f64>, Option<f64>)> = Vec::new();
    for narrative in &schema.narratives {
        let rows: Vec<usize> = current
            .iter()
            .copied()
            .filter(|&row| table.number(row, &narrative.prominence) > 0.0)
            .collect();
        if rows.is_empty() {
            continue;
        }
        let prom_avg = column_mean(table, &rows, &entity.prominence);
        let sent_avg = column_mean(table, &rows, &entity.sentiment);
        footprint.push((prom_avg, sent_avg));
        if matches!((prom_avg, sent_avg), (Some(p), Some(s)) if p >= 2.5 && s > 1.0) {
            positive_narratives += 1;
        }
    }

    let expansion = positive_narratives >= 2;

    let fragmentation = if footprint.len() >= 2 {
        let sents: Vec<f64> = footprint.iter().filter_map(|(_, s)| *s).collect();
        let spread = match (
            sents.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            sents.iter().cloned().fold(f64::INFINITY, f64::min),
        ) {
            (max, min) if !sents.is_empty() => max - min,
            _ => 0.0,
        };
        !sents.is_empty()
            && spread > 3.0
            && footprint
                .iter()
                .any(|(p, _)| p.is_some_and(|p| p >= 2.0))
    } else {
        false
    };

    (expansion, fragmentation)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaResolver;
    use crate::signals::{parse_dates, split_windows, ENTITY_SIGNAL_CAP};

    const HEADER: &str = "Date,Publication,Outlet score,Topic_Prominence,Topic_Sentiment,\
        Narrative_Momentum_Prominence,Narrative_Momentum_Sentiment,\
        Entity_Acme_Prominence,Entity_Acme_Sentiment,Entity_Acme_Quality_Score,Entity_Acme_Modifier,\
        Entity_Borealis_Prominence,Entity_Borealis_Sentiment\n";

    fn build(rows: &[String]) -> (Table, SchemaMap) {
        let mut csv = String::from(HEADER);
        for row in rows {
            csv.push_str(row);
            csv.push('\n');
        }
        let table = Table::from_reader(csv.as_bytes()).unwrap();
        let schema = SchemaResolver::new()
            .resolve(&table.columns().to_vec())
            .unwrap();
        (table, schema)
    }

    fn signals(table: &Table, schema: &SchemaMap) -> Vec<Vec<Vec<String>>> {
        let dates = parse_dates(table, schema);
        let split = split_windows(&dates, None, 30);
        compute_entity_signals(table, schema, &dates, split.as_ref(), ENTITY_SIGNAL_CAP)
    }

    #[test]
    fn test_narrative_shaping_by_prominence_and_outlet() {
        let (table, schema) = build(&[
            // date,pub,tier,topic p/s,narr p/s,acme p/s/q/mod,borealis p/s
            "2025-03-01,Herald,4,3.0,1.0,0,0,4.0,1.0,4.0,,0,0".to_string(),
        ]);
        let out = signals(&table, &schema);
        assert!(out[0][0].contains(&"Narrative Shaping".to_string()));
    }

    #[test]
    fn test_second_fiddle_and_captured_exclude_self() {
        let (table, schema) = build(&[
            "2025-03-01,Herald,3,3.0,1.0,2.0,1.0,2.0,1.0,3.0,,3.5,2.0".to_string(),
        ]);
        let out = signals(&table, &schema);
        // Acme is outshone by Borealis
        assert!(out[0][0].contains(&"Second Fiddle".to_string()));
        // Borealis owns the article: peers (Acme only) all below 2.5
        assert!(out[1][0].contains(&"Captured Narrative (article)".to_string()));
    }

    #[test]
    fn test_ricochet_and_schadenfreude_from_peer_modifier() {
        let (table, schema) = build(&[
            "2025-03-01,Herald,4,3.0,-2.0,0,0,3.0,-2.0,2.0,Takedown,2.0,1.0".to_string(),
        ]);
        let out = signals(&table, &schema);
        // Borealis sits next to Acme's takedown
        assert!(out[1][0].contains(&"Ricochet Risk".to_string()));
        assert!(out[1][0].contains(&"Cautious Schadenfreude".to_string()));
        // Acme itself carries the modifier: Narrative Shaping
        assert!(out[0][0].contains(&"Narrative Shaping".to_string()));
    }

    #[test]
    fn test_cap_keeps_highest_severity() {
        let ranked = rank_and_cap(
            vec![
                Candidate::new(EntitySignal::SecondFiddle, 3.0, 2.0, 10),
                Candidate::new(EntitySignal::NarrativeShaping, 3.0, 2.0, 10),
                Candidate::new(EntitySignal::PeerPressure, 3.0, 2.0, 10),
                Candidate::new(EntitySignal::StrategicFallout, 3.0, 2.0, 10),
                Candidate::new(EntitySignal::NarrativeVacuum, 3.0, 2.0, 10),
            ],
            3,
        );
        assert_eq!(
            ranked,
            vec![
                "Narrative Shaping".to_string(),
                "Strategic Fallout".to_string(),
                "Second Fiddle".to_string(),
            ]
        );
    }

    #[test]
    fn test_tie_break_is_stable_then_structural() {
        // Same severity: PolarizedFraming (6,2) vs DeepeningExposure (6,1)
        let ranked = rank_and_cap(
            vec![
                Candidate::new(EntitySignal::DeepeningExposure, 3.0, 2.0, 10),
                Candidate::new(EntitySignal::PolarizedFraming, 3.0, 2.0, 10),
            ],
            3,
        );
        assert_eq!(ranked[0], "Polarized Framing");
    }

    #[test]
    fn test_strategic_fallout_lookback() {
        let mut rows = Vec::new();
        // Prior window: takedown with healthy quality
        for _ in 0..3 {
            rows.push("2025-01-15,Herald,4,3.0,-2.0,0,0,3.0,-2.0,3.0,Takedown,0,0".to_string());
        }
        // Current window: quality slid by more than half a point
        for _ in 0..3 {
            rows.push("2025-03-01,Herald,4,3.0,-1.0,0,0,2.0,-1.0,2.4,Light Jab,0,0".to_string());
        }
        let (table, schema) = build(&rows);
        let out = signals(&table, &schema);
        assert!(out[0][0].contains(&"Strategic Fallout".to_string()));
    }

    #[test]
    fn test_cap_is_enforced_everywhere() {
        let (table, schema) = build(&[
            "2025-03-01,Herald,5,3.0,-2.0,2.5,-2.5,4.0,-3.0,2.0,Narrative Shaper,2.0,2.5"
                .to_string(),
        ]);
        let out = signals(&table, &schema);
        for entity in &out {
            for row in entity {
                assert!(row.len() <= ENTITY_SIGNAL_CAP);
            }
        }
    }
}
