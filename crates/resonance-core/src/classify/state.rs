//! State cascades for topic, narratives, and entities.
//!
//! Inputs are coerced prominence and presence-gated raw sentiment. Each
//! cascade is an ordered `(predicate, label)` table; the first matching rule
//! wins. A cascade that falls through ends at `Undetermined`, which is a
//! published value, not an error.

use serde::{Deserialize, Serialize};

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Prominence at or above which a subject is central to the article
pub const CENTRAL_PROMINENCE: f64 = 2.5;

/// Sentiment below which central coverage is high risk
pub const HIGH_RISK_SENTIMENT: f64 = -2.0;

/// Entity prominence at or above which positive coverage reads as leading
pub const LEADER_PROMINENCE: f64 = 3.0;

// ============================================================================
// TOPIC STATE
// ============================================================================

/// Per-row posture of the overall topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicState {
    /// Topic not present on the row
    Absent,
    /// Central and strongly negative
    HighRisk,
    /// Central and mildly negative
    Risky,
    /// Central and non-negative
    Healthy,
    /// Peripheral and negative
    AmbientRisk,
    /// Peripheral and non-negative
    Niche,
    /// No rule matched
    Undetermined,
}

impl TopicState {
    /// Published string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicState::Absent => "Absent",
            TopicState::HighRisk => "High Risk",
            TopicState::Risky => "Risky",
            TopicState::Healthy => "Healthy",
            TopicState::AmbientRisk => "Ambient Risk",
            TopicState::Niche => "Niche",
            TopicState::Undetermined => "Undetermined",
        }
    }
}

impl std::fmt::Display for TopicState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// NARRATIVE STATE
// ============================================================================

/// Per-row posture of a tracked narrative.
///
/// Same cascade as [`TopicState`]; the peripheral non-negative slot is
/// published as `Peripheral` in the narrative taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeState {
    /// Narrative not present on the row
    Absent,
    /// Central and strongly negative
    HighRisk,
    /// Central and mildly negative
    Risky,
    /// Central and non-negative
    Healthy,
    /// Peripheral and negative
    AmbientRisk,
    /// Peripheral and non-negative
    Peripheral,
    /// No rule matched
    Undetermined,
}

impl NarrativeState {
    /// Published string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            NarrativeState::Absent => "Absent",
            NarrativeState::HighRisk => "High Risk",
            NarrativeState::Risky => "Risky",
            NarrativeState::Healthy => "Healthy",
            NarrativeState::AmbientRisk => "Ambient Risk",
            NarrativeState::Peripheral => "Peripheral",
            NarrativeState::Undetermined => "Undetermined",
        }
    }
}

impl std::fmt::Display for NarrativeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ENTITY STATE
// ============================================================================

/// Per-row posture of a tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityState {
    /// Entity absent and no narrative carries the story
    Absent,
    /// Entity absent while a narrative is live on the row
    OffStage,
    /// Present with negative sentiment
    UnderFire,
    /// Central with positive sentiment
    Leader,
    /// Present but peripheral with positive sentiment
    SupportingPlayer,
    /// No rule matched
    Undetermined,
}

impl EntityState {
    /// Published string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityState::Absent => "Absent",
            EntityState::OffStage => "Off-Stage",
            EntityState::UnderFire => "Under Fire",
            EntityState::Leader => "Leader",
            EntityState::SupportingPlayer => "Supporting Player",
            EntityState::Undetermined => "Undetermined",
        }
    }

    /// Parse a published state string, e.g. from a pre-existing state cell.
    /// Unknown strings land in `Undetermined`.
    pub fn parse_name(s: &str) -> Self {
        match s.trim() {
            "Absent" => EntityState::Absent,
            "Off-Stage" => EntityState::OffStage,
            "Under Fire" => EntityState::UnderFire,
            "Leader" => EntityState::Leader,
            "Supporting Player" => EntityState::SupportingPlayer,
            _ => EntityState::Undetermined,
        }
    }
}

impl std::fmt::Display for EntityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CASCADES
// ============================================================================

struct StateRule<S> {
    matches: fn(prominence: f64, sentiment: f64) -> bool,
    label: S,
}

const TOPIC_RULES: &[StateRule<TopicState>] = &[
    StateRule {
        matches: |p, _| p == 0.0,
        label: TopicState::Absent,
    },
    StateRule {
        matches: |p, s| p >= CENTRAL_PROMINENCE && s < HIGH_RISK_SENTIMENT,
        label: TopicState::HighRisk,
    },
    StateRule {
        matches: |p, s| p >= CENTRAL_PROMINENCE && (HIGH_RISK_SENTIMENT..0.0).contains(&s),
        label: TopicState::Risky,
    },
    StateRule {
        matches: |p, s| p >= CENTRAL_PROMINENCE && s >= 0.0,
        label: TopicState::Healthy,
    },
    StateRule {
        matches: |p, s| p < CENTRAL_PROMINENCE && s < 0.0,
        label: TopicState::AmbientRisk,
    },
    StateRule {
        matches: |p, s| p < CENTRAL_PROMINENCE && s >= 0.0,
        label: TopicState::Niche,
    },
];

const NARRATIVE_RULES: &[StateRule<NarrativeState>] = &[
    StateRule {
        matches: |p, _| p == 0.0,
        label: NarrativeState::Absent,
    },
    StateRule {
        matches: |p, s| p >= CENTRAL_PROMINENCE && s < HIGH_RISK_SENTIMENT,
        label: NarrativeState::HighRisk,
    },
    StateRule {
        matches: |p, s| p >= CENTRAL_PROMINENCE && (HIGH_RISK_SENTIMENT..0.0).contains(&s),
        label: NarrativeState::Risky,
    },
    StateRule {
        matches: |p, s| p >= CENTRAL_PROMINENCE && s >= 0.0,
        label: NarrativeState::Healthy,
    },
    StateRule {
        matches: |p, s| p < CENTRAL_PROMINENCE && s < 0.0,
        label: NarrativeState::AmbientRisk,
    },
    StateRule {
        matches: |p, s| p < CENTRAL_PROMINENCE && s >= 0.0,
        label: NarrativeState::Peripheral,
    },
];

fn first_state_match<S: Copy>(
    rules: &[StateRule<S>],
    fallback: S,
    prominence: f64,
    sentiment: f64,
) -> S {
    rules
        .iter()
        .find(|rule| (rule.matches)(prominence, sentiment))
        .map(|rule| rule.label)
        .unwrap_or(fallback)
}

/// Classify the topic on a row from its coerced prominence and gated sentiment.
pub fn topic_state(prominence: f64, sentiment: f64) -> TopicState {
    first_state_match(TOPIC_RULES, TopicState::Undetermined, prominence, sentiment)
}

/// Classify a narrative on a row from its coerced prominence and gated sentiment.
pub fn narrative_state(prominence: f64, sentiment: f64) -> NarrativeState {
    first_state_match(
        NARRATIVE_RULES,
        NarrativeState::Undetermined,
        prominence,
        sentiment,
    )
}

/// Classify an entity on a row.
///
/// `max_narrative_prominence` is the maximum narrative prominence on the same
/// row; it decides whether an absent entity is merely `Absent` or `Off-Stage`
/// while a narrative carries the story.
pub fn entity_state(
    topic_prominence: f64,
    prominence: f64,
    sentiment: f64,
    max_narrative_prominence: f64,
) -> EntityState {
    if topic_prominence > 0.0 && prominence == 0.0 {
        return if max_narrative_prominence > 0.0 {
            EntityState::OffStage
        } else {
            EntityState::Absent
        };
    }
    if prominence > 0.0 && sentiment < 0.0 {
        return EntityState::UnderFire;
    }
    if prominence >= LEADER_PROMINENCE && sentiment > 0.0 {
        return EntityState::Leader;
    }
    if prominence > 0.0 && prominence < LEADER_PROMINENCE && sentiment > 0.0 {
        return EntityState::SupportingPlayer;
    }
    EntityState::Undetermined
}

// ============================================================================
// TESTS
// ============================================================================
