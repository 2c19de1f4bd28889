//! # Resonance Core
//!
//! Earned-media diagnostic engine. Ingests a table of news articles annotated
//! with prominence and sentiment scores at three granularities (overall
//! topic, named narratives, named entities) and emits the same table enriched
//! with categorical **states**, **modifiers**, and windowed **signals**:
//!
//! - **Schema discovery**: tolerant, deterministic binding of logical fields
//!   to physical CSV columns across two header dialects, with a typo ladder
//!   and fuzzy matching for data columns only
//! - **Pass 1 (Diagnostic Assignment)**: per-row presence, normalized
//!   sentiment, state cascades, and state-gated modifier cascades
//! - **Pass 2 (Windowed Signals)**: rolling 30-day current/prior comparison
//!   producing topic, narrative, and entity signal tags, ranked and capped
//!
//! The core is single-threaded, synchronous, and batch-oriented. Output row
//! order always equals input row order, and only schema resolution aborts a
//! run.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use resonance_core::{DiagnosticEngine, Table};
//!
//! let table = Table::from_path("coverage.csv")?;
//! let engine = DiagnosticEngine::new();
//!
//! // Pass 1: states and modifiers
//! let pass1 = engine.pass1(&table)?;
//!
//! // Pass 2: windowed signals on top of the Pass-1 output
//! let pass2 = engine.pass2(&pass1)?;
//! pass2.write_path("Signals_coverage.csv")?;
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod classify;
pub mod pipeline;
pub mod schema;
pub mod signals;
pub mod table;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Table model
pub use table::{coerce_number, parse_number, Table, TableError};

// Schema discovery
pub use schema::{
    EntityBinding, HeaderDialect, NarrativeBinding, SchemaError, SchemaMap, SchemaResolver,
};

// Pass-1 classification
pub use classify::{
    central_narrative, entity_modifier, entity_state, gated_sentiment, is_present,
    narrative_state, topic_state, weak_collapse, CentralNarrative, EntityModifier, EntityState,
    ModifierContext, NarrativeState, TopicState,
};

// Pass-2 signals
pub use signals::{
    parse_date, split_windows, EntitySignal, SignalConfig, WindowBounds, WindowSplit,
    ENTITY_SIGNAL_CAP, WINDOW_DAYS,
};

// Pipeline facade
pub use pipeline::{DiagnosticEngine, EngineError, Result};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        DiagnosticEngine, EngineError, EntityState, Result, SchemaError, SchemaMap,
        SchemaResolver, SignalConfig, Table,
    };
}
