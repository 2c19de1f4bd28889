//! Schema Module
//!
//! Header discovery and canonical field→column binding:
//! - Two supported header dialects (prefix and coded), detected together
//! - Tolerance ladder: exact match, known typo substitutions, fuzzy
//!   similarity at 0.8 for data columns only
//! - Contamination guard: state/modifier label columns never bind fuzzily
//! - Human-readable mapping preview plus JSON serialization
//!
//! Resolution is a pure function of the header list: the same headers always
//! produce the same `SchemaMap`.

mod fuzzy;
mod resolver;

pub use fuzzy::{normalize_data, normalize_label, ColumnMatch, HeaderIndex, MatchKind, FUZZY_THRESHOLD};
pub use resolver::{ResolverConfig, SchemaResolver};

use serde::{Deserialize, Serialize};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Schema resolution error. The only fatal error in the engine.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// One or more required bindings could not be resolved
    #[error(
        "required fields could not be bound: [{}]; available columns: [{}]",
        missing.join(", "),
        available.join(", ")
    )]
    MissingFields {
        /// Logical fields that failed to bind
        missing: Vec<String>,
        /// Every column name present in the input, in order
        available: Vec<String>,
    },
}

/// Schema result type
pub type Result<T> = std::result::Result<T, SchemaError>;

// ============================================================================
// BINDINGS
// ============================================================================

pub(crate) fn sanitize_key(key: &str) -> String {
    key.trim().replace(' ', "_")
}

/// Canonical column bindings for one tracked entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityBinding {
    /// Display key, e.g. `BMW` (prefix dialect) or the coded name/id
    pub key: String,
    /// Physical prominence column
    pub prominence: String,
    /// Physical sentiment column
    pub sentiment: String,
    /// Physical description column, when present
    pub description: Option<String>,
    /// Physical quality-score column, when present
    pub quality_score: Option<String>,
    /// Physical state column, when present (exact/known-typo match only)
    pub state: Option<String>,
    /// Physical modifier column, when present (exact/known-typo match only)
    pub modifier: Option<String>,
}

impl EntityBinding {
    fn stem(&self) -> String {
        format!("Entity_{}", sanitize_key(&self.key))
    }

    /// Derived presence column name.
    pub fn present_column(&self) -> String {
        format!("{}_Present", self.stem())
    }

    /// Derived normalized-sentiment column name.
    pub fn normalized_column(&self) -> String {
        format!("{}_Sentiment_Normalized", self.stem())
    }

    /// State output column: the bound input column when one exists, else a
    /// canonical derived column.
    pub fn state_column(&self) -> String {
        self.state
            .clone()
            .unwrap_or_else(|| format!("{}_State", self.stem()))
    }

    /// Modifier output column: the bound input column when one exists, else a
    /// canonical derived column.
    pub fn modifier_column(&self) -> String {
        self.modifier
            .clone()
            .unwrap_or_else(|| format!("{}_Modifier", self.stem()))
    }

    /// Signals output column.
    pub fn signals_column(&self) -> String {
        format!("{}_Signals", self.stem())
    }
}

/// Canonical column bindings for one tracked narrative.
///
/// Narratives keep their discovery order; that order is the tie-precedence
/// list used by central-narrative selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeBinding {
    /// Display key, e.g. `Performance` or `Message_1`
    pub key: String,
    /// Physical prominence column
    pub prominence: String,
    /// Physical sentiment column
    pub sentiment: String,
    /// Physical description column, when present
    pub description: Option<String>,
    /// Physical state column, when present (exact/known-typo match only)
    pub state: Option<String>,
}

impl NarrativeBinding {
    fn stem(&self) -> String {
        format!("Narrative_{}", sanitize_key(&self.key))
    }

    /// Derived presence column name.
    pub fn present_column(&self) -> String {
        format!("{}_Present", self.stem())
    }

    /// Derived normalized-sentiment column name.
    pub fn normalized_column(&self) -> String {
        format!("{}_Sentiment_Normalized", self.stem())
    }

    /// State output column: the bound input column when one exists, else a
    /// canonical derived column.
    pub fn state_column(&self) -> String {
        self.state
            .clone()
            .unwrap_or_else(|| format!("{}_State", self.stem()))
    }

    /// Signals output column.
    pub fn signals_column(&self) -> String {
        format!("{}_Signals", self.stem())
    }
}

// ============================================================================
// SCHEMA MAP
// ============================================================================

/// Which header dialect the input uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderDialect {
    /// `Entity_<Name>_<Field>` / `Narrative_<Name>_<Field>` headers
    Prefix,
    /// `<k>_<Name> - Company-Level <Field>` / `O_M_<k>prom` style headers
    Coded,
    /// Both dialects present in one header row
    Mixed,
}

impl HeaderDialect {
    /// String form for previews.
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderDialect::Prefix => "prefix",
            HeaderDialect::Coded => "coded",
            HeaderDialect::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for HeaderDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validated canonical mapping from logical fields to physical columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaMap {
    /// Detected header dialect
    pub dialect: HeaderDialect,
    /// Physical topic prominence column
    pub topic_prominence: String,
    /// Physical topic sentiment column
    pub topic_sentiment: String,
    /// Physical topic state column, when present
    pub topic_state: Option<String>,
    /// Physical outlet-tier column
    pub outlet_tier: String,
    /// Physical date column, when present
    pub date: Option<String>,
    /// Physical publication column, when present
    pub publication: Option<String>,
    /// Physical body-length column, when present (validator only)
    pub body_length: Option<String>,
    /// Entity bindings in discovery order
    pub entities: Vec<EntityBinding>,
    /// Narrative bindings in discovery order (the tie-precedence list)
    pub narratives: Vec<NarrativeBinding>,
    /// Tolerated substitutions, fallbacks, and dropped partial subjects
    pub warnings: Vec<String>,
}

impl SchemaMap {
    /// Topic state output column: bound input column or the canonical name.
    pub fn topic_state_column(&self) -> String {
        self.topic_state
            .clone()
            .unwrap_or_else(|| "Topic_State".to_string())
    }

    /// JSON form of the mapping, for machine consumers.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable mapping preview: dialect, bindings, and every
    /// tolerated substitution.
    pub fn preview(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Detected header dialect: {}\n", self.dialect));
        out.push_str(&format!(
            "Topic: prominence <- \"{}\", sentiment <- \"{}\"",
            self.topic_prominence, self.topic_sentiment
        ));
        if let Some(state) = &self.topic_state {
            out.push_str(&format!(", state <- \"{state}\""));
        }
        out.push('\n');
        out.push_str(&format!("Outlet tier <- \"{}\"\n", self.outlet_tier));
        if let Some(date) = &self.date {
            out.push_str(&format!("Date <- \"{date}\"\n"));
        }
        if let Some(publication) = &self.publication {
            out.push_str(&format!("Publication <- \"{publication}\"\n"));
        }

        out.push_str(&format!("Entities ({}):\n", self.entities.len()));
        for entity in &self.entities {
            out.push_str(&format!(
                "  {}: prominence <- \"{}\", sentiment <- \"{}\"",
                entity.key, entity.prominence, entity.sentiment
            ));
            if let Some(quality) = &entity.quality_score {
                out.push_str(&format!(", quality <- \"{quality}\""));
            }
            if let Some(state) = &entity.state {
                out.push_str(&format!(", state <- \"{state}\""));
            }
            if let Some(modifier) = &entity.modifier {
                out.push_str(&format!(", modifier <- \"{modifier}\""));
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "Narratives ({}), in tie-precedence order:\n",
            self.narratives.len()
        ));
        for narrative in &self.narratives {
            out.push_str(&format!(
                "  {}: prominence <- \"{}\", sentiment <- \"{}\"\n",
                narrative.key, narrative.prominence, narrative.sentiment
            ));
        }

        if !self.warnings.is_empty() {
            out.push_str("Tolerated substitutions and fallbacks:\n");
            for warning in &self.warnings {
                out.push_str(&format!("  - {warning}\n"));
            }
        }
        out
    }
}

// ============================================================================
// TESTS
// ============================================================================
