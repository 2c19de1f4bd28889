//! Pipeline Module
//!
//! The two diagnostic passes plus the validator and emitter:
//! - Pass 1 annotates presence, normalized sentiment, states, modifiers,
//!   central narrative, entity counts, and validation notes
//! - Pass 2 attaches topic, narrative, and entity signal columns
//!
//! Both passes take an immutable input table and return a new table with the
//! same rows in the same order; source cells are never rewritten. Only
//! schema resolution can abort a run.

use tracing::info;

use crate::classify::{
    central_narrative, entity_modifier, entity_state, gated_sentiment, is_present,
    narrative_state, topic_state, EntityState, ModifierContext,
};
use crate::schema::{SchemaError, SchemaMap, SchemaResolver};
use crate::signals::{
    compute_entity_signals, compute_narrative_signals, compute_topic_signals, parse_dates,
    split_windows, SignalConfig,
};
use crate::table::{Table, TableError};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Engine error type. Only schema resolution and table I/O can fail.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Required bindings could not be resolved
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// Table read or write failure
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Engine result type
pub type Result<T> = std::result::Result<T, EngineError>;

// ============================================================================
// DERIVED COLUMN NAMES
// ============================================================================

/// Topic presence column
pub const TOPIC_PRESENT: &str = "Topic_Present";
/// Topic normalized-sentiment column
pub const TOPIC_SENTIMENT_NORMALIZED: &str = "Topic_Sentiment_Normalized";
/// Topic signals column
pub const TOPIC_SIGNALS: &str = "Topic_Signals";
/// Central-narrative key column
pub const CENTRAL_NARRATIVE_KEY: &str = "Central_Narrative_Key";
/// Central-narrative prominence column
pub const CENTRAL_NARRATIVE_PROMINENCE: &str = "Central_Narrative_Prominence";
/// Central-narrative sentiment column
pub const CENTRAL_NARRATIVE_SENTIMENT: &str = "Central_Narrative_Sentiment";
/// Tracked-entity count column
pub const TRACKED_ENTITIES: &str = "tracked_entities_in_article";
/// Prominent tracked-entity count column
pub const PROMINENT_ENTITIES: &str = "prominent_tracked_entities_in_article";
/// Validation notes column
pub const VALIDATION_NOTES: &str = "validation_notes";
/// Row validity column
pub const IS_VALID_ROW: &str = "is_valid_row";

fn bool_cell(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

fn number_cell(value: f64) -> String {
    format!("{value}")
}

// ============================================================================
// DIAGNOSTIC ENGINE
// ============================================================================

/// Facade over schema resolution and the two passes.
///
/// # Example
///
/// ```rust,ignore
/// use resonance_core::{DiagnosticEngine, Table};
///
/// let table = Table::from_path("coverage.csv")?;
/// let engine = DiagnosticEngine::new();
/// let pass1 = engine.pass1(&table)?;
/// let pass2 = engine.pass2(&pass1)?;
/// pass2.write_path("Signals_coverage.csv")?;
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    resolver: SchemaResolver,
    signal_config: SignalConfig,
}

impl DiagnosticEngine {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self {
            resolver: SchemaResolver::new(),
            signal_config: SignalConfig::default(),
        }
    }

    /// Create an engine with an explicit signal configuration.
    pub fn with_config(signal_config: SignalConfig) -> Self {
        Self {
            resolver: SchemaResolver::new(),
            signal_config,
        }
    }

    /// Resolve the table's schema without running a pass.
    pub fn resolve(&self, table: &Table) -> Result<SchemaMap> {
        Ok(self.resolver.resolve(table.columns())?)
    }

    /// Pass 1: states, modifiers, central narrative, counts, validation.
    pub fn pass1(&self, table: &Table) -> Result<Table> {
        let schema = self.resolve(table)?;
        info!(
            target: "resonance::pipeline",
            rows = table.len(),
            entities = schema.entities.len(),
            narratives = schema.narratives.len(),
            "running pass 1"
        );
        Ok(annotate_pass1(table, &schema))
    }

    /// Pass 2: topic, narrative, and entity signal columns.
    ///
    /// Runs on the Pass-1 output when available, or directly on raw input.
    pub fn pass2(&self, table: &Table) -> Result<Table> {
        let schema = self.resolve(table)?;
        info!(
            target: "resonance::pipeline",
            rows = table.len(),
            "running pass 2"
        );
        Ok(annotate_pass2(table, &schema, &self.signal_config))
    }

    /// Run both passes; returns `(pass1_output, pass2_output)`.
    pub fn run(&self, table: &Table) -> Result<(Table, Table)> {
        let pass1 = self.pass1(table)?;
        let pass2 = self.pass2(&pass1)?;
        Ok((pass1, pass2))
    }
}

// ============================================================================
// PASS 1
// ============================================================================

fn annotate_pass1(table: &Table, schema: &SchemaMap) -> Table {
    let mut out = table.clone();
    let rows = table.len();

    // ---- Topic ----
    let topic_prom: Vec<f64> = (0..rows)
        .map(|r| table.number(r, &schema.topic_prominence))
        .collect();
    let topic_sent: Vec<f64> = (0..rows)
        .map(|r| {
            gated_sentiment(topic_prom[r], table.number(r, &schema.topic_sentiment))
        })
        .collect();

    out.set_column(
        TOPIC_PRESENT,
        topic_prom.iter().map(|&p| bool_cell(is_present(p))).collect(),
    );
    out.set_column(
        TOPIC_SENTIMENT_NORMALIZED,
        topic_sent
            .iter()
            .map(|&s| number_cell(crate::classify::weak_collapse(s)))
            .collect(),
    );
    out.set_column(
        &schema.topic_state_column(),
        fill_states(table, schema.topic_state.as_deref(), |r| {
            topic_state(topic_prom[r], topic_sent[r]).as_str().to_string()
        }),
    );

    // ---- Narratives ----
    for narrative in &schema.narratives {
        let proms: Vec<f64> = (0..rows)
            .map(|r| table.number(r, &narrative.prominence))
            .collect();
        let sents: Vec<f64> = (0..rows)
            .map(|r| gated_sentiment(proms[r], table.number(r, &narrative.sentiment)))
            .collect();

        out.set_column(
            &narrative.present_column(),
            proms.iter().map(|&p| bool_cell(is_present(p))).collect(),
        );
        out.set_column(
            &narrative.normalized_column(),
            sents
                .iter()
                .map(|&s| number_cell(crate::classify::weak_collapse(s)))
                .collect(),
        );
        out.set_column(
            &narrative.state_column(),
            fill_states(table, narrative.state.as_deref(), |r| {
                narrative_state(proms[r], sents[r]).as_str().to_string()
            }),
        );
    }

    // ---- Central narrative and per-row narrative aggregates ----
    let mut central_keys = Vec::with_capacity(rows);
    let mut central_proms = Vec::with_capacity(rows);
    let mut central_sents = Vec::with_capacity(rows);
    let mut max_narr_prom = Vec::with_capacity(rows);
    for r in 0..rows {
        let candidates: Vec<(&str, f64, f64)> = schema
            .narratives
            .iter()
            .map(|n| {
                (
                    n.key.as_str(),
                    table.number(r, &n.prominence),
                    table.number(r, &n.sentiment),
                )
            })
            .collect();
        max_narr_prom.push(
            candidates
                .iter()
                .map(|(_, p, _)| *p)
                .fold(0.0, f64::max),
        );
        match central_narrative(candidates) {
            Some(central) => {
                central_keys.push(central.key);
                central_proms.push(number_cell(central.prominence));
                central_sents.push(number_cell(central.sentiment));
            }
            None => {
                central_keys.push(String::new());
                central_proms.push(number_cell(0.0));
                central_sents.push(number_cell(0.0));
            }
        }
    }
    out.set_column(CENTRAL_NARRATIVE_KEY, central_keys);
    out.set_column(CENTRAL_NARRATIVE_PROMINENCE, central_proms.clone());
    out.set_column(CENTRAL_NARRATIVE_SENTIMENT, central_sents.clone());

    // ---- Entity counts ----
    let entity_proms: Vec<Vec<f64>> = schema
        .entities
        .iter()
        .map(|e| (0..rows).map(|r| table.number(r, &e.prominence)).collect())
        .collect();
    let tracked: Vec<usize> = (0..rows)
        .map(|r| entity_proms.iter().filter(|p| p[r] > 0.0).count())
        .collect();
    let prominent: Vec<usize> = (0..rows)
        .map(|r| entity_proms.iter().filter(|p| p[r] >= 2.0).count())
        .collect();
    out.set_column(
        TRACKED_ENTITIES,
        tracked.iter().map(|c| c.to_string()).collect(),
    );
    out.set_column(
        PROMINENT_ENTITIES,
        prominent.iter().map(|c| c.to_string()).collect(),
    );

    // ---- Entity states and modifiers ----
    let outlet: Vec<f64> = (0..rows)
        .map(|r| table.number(r, &schema.outlet_tier))
        .collect();

    for (e, entity) in schema.entities.iter().enumerate() {
        let proms = &entity_proms[e];
        let sents: Vec<f64> = (0..rows)
            .map(|r| gated_sentiment(proms[r], table.number(r, &entity.sentiment)))
            .collect();

        out.set_column(
            &entity.present_column(),
            proms.iter().map(|&p| bool_cell(is_present(p))).collect(),
        );
        out.set_column(
            &entity.normalized_column(),
            sents
                .iter()
                .map(|&s| number_cell(crate::classify::weak_collapse(s)))
                .collect(),
        );

        // Preserve non-empty pre-existing states; fill the rest
        let mut final_states: Vec<EntityState> = Vec::with_capacity(rows);
        let mut state_cells: Vec<String> = Vec::with_capacity(rows);
        for r in 0..rows {
            let existing = entity
                .state
                .as_deref()
                .and_then(|column| table.value(r, column))
                .map(str::trim)
                .filter(|v| !v.is_empty());
            match existing {
                Some(value) => {
                    final_states.push(EntityState::parse_name(value));
                    state_cells.push(value.to_string());
                }
                None => {
                    let computed =
                        entity_state(topic_prom[r], proms[r], sents[r], max_narr_prom[r]);
                    final_states.push(computed);
                    state_cells.push(computed.as_str().to_string());
                }
            }
        }
        out.set_column(&entity.state_column(), state_cells);

        // Modifiers are always recomputed from the final state
        let modifiers: Vec<String> = (0..rows)
            .map(|r| {
                let peers_ge_2 = entity_proms
                    .iter()
                    .enumerate()
                    .filter(|(p, _)| *p != e)
                    .filter(|(_, proms)| proms[r] >= 2.0)
                    .count();
                let context = ModifierContext {
                    prominence: proms[r],
                    sentiment: sents[r],
                    outlet: outlet[r],
                    topic_prominence: topic_prom[r],
                    topic_sentiment: topic_sent[r],
                    narrative_prominence: crate::table::coerce_number(&central_proms[r]),
                    narrative_sentiment: crate::table::coerce_number(&central_sents[r]),
                    peers_ge_2,
                };
                entity_modifier(final_states[r], &context)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default()
            })
            .collect();
        out.set_column(&entity.modifier_column(), modifiers);
    }

    // ---- Validation ----
    let mut notes_column = Vec::with_capacity(rows);
    let mut valid_column = Vec::with_capacity(rows);
    for r in 0..rows {
        let raw_topic_prom = table.number(r, &schema.topic_prominence);
        let raw_topic_sent = table.number(r, &schema.topic_sentiment);
        let mut notes: Vec<&str> = Vec::new();
        if !(0.0..=5.0).contains(&raw_topic_prom) {
            notes.push("topic_prominence_out_of_range");
        }
        if !(-4.0..=4.0).contains(&raw_topic_sent) {
            notes.push("topic_sentiment_out_of_range");
        }
        if outlet[r] != 0.0 && !(1.0..=5.0).contains(&outlet[r]) {
            notes.push("outlet_score_out_of_range");
        }
        if prominent[r] > tracked[r] {
            notes.push("prominent_count_exceeds_tracked");
        }
        valid_column.push(bool_cell(notes.is_empty()));
        notes_column.push(notes.join(","));
    }
    out.set_column(VALIDATION_NOTES, notes_column);
    out.set_column(IS_VALID_ROW, valid_column);

    out
}

fn fill_states<F>(table: &Table, existing_column: Option<&str>, compute: F) -> Vec<String>
where
    F: Fn(usize) -> String,
{
    (0..table.len())
        .map(|r| {
            let existing = existing_column
                .and_then(|column| table.value(r, column))
                .map(str::trim)
                .filter(|v| !v.is_empty());
            match existing {
                Some(value) => value.to_string(),
                None => compute(r),
            }
        })
        .collect()
}

// ============================================================================
// PASS 2
// ============================================================================

fn annotate_pass2(table: &Table, schema: &SchemaMap, config: &SignalConfig) -> Table {
    let mut out = table.clone();

    let dates = parse_dates(table, schema);
    let split = split_windows(&dates, config.as_of, config.window_days);

    let topic = compute_topic_signals(table, schema, &dates, split.as_ref());
    let narratives = compute_narrative_signals(table, schema, &dates, split.as_ref());
    let entities = compute_entity_signals(
        table,
        schema,
        &dates,
        split.as_ref(),
        config.entity_signal_cap,
    );

    out.set_column(
        TOPIC_SIGNALS,
        merge_signal_column(table, TOPIC_SIGNALS, &topic),
    );
    for (narrative, signals) in schema.narratives.iter().zip(&narratives) {
        let column = narrative.signals_column();
        out.set_column(&column, merge_signal_column(table, &column, signals));
    }
    for (entity, signals) in schema.entities.iter().zip(&entities) {
        let column = entity.signals_column();
        out.set_column(&column, merge_signal_column(table, &column, signals));
    }

    out
}

/// Merge computed signals into any pre-existing signal cells as an ordered,
/// de-duplicated list, serialized with `", "`.
fn merge_signal_column(table: &Table, column: &str, computed: &[Vec<String>]) -> Vec<String> {
    (0..table.len())
        .map(|r| {
            let mut merged: Vec<String> = Vec::new();
            if let Some(existing) = table.value(r, column) {
                for piece in existing.split(", ") {
                    let piece = piece.trim();
                    if !piece.is_empty() && !merged.iter().any(|m| m == piece) {
                        merged.push(piece.to_string());
                    }
                }
            }
            for signal in &computed[r] {
                if !merged.iter().any(|m| m == signal) {
                    merged.push(signal.clone());
                }
            }
            merged.join(", ")
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
