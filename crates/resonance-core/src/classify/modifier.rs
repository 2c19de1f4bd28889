//! Entity modifier cascades, dispatched on the entity's final state.
//!
//! Modifiers are always recomputed from the final state and current-row
//! features, even when the state cell was pre-existing. An empty modifier
//! means no rule matched; that is a published outcome, not an error.

use serde::{Deserialize, Serialize};

// ============================================================================
// MODIFIER ENUM
// ============================================================================

/// Fine-grained qualifier for an entity on a row, gated by entity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityModifier {
    // -------- Absent --------
    /// Topic too quiet to matter to the entity
    NotRelevant,
    /// Positive topic coverage drifting past the entity
    NarrativeDrift,
    /// Negative topic coverage the entity is absent from
    FramingRisk,

    // -------- Off-Stage --------
    /// Peers own the live narrative
    CompetitorLed,
    /// A strong friendly narrative with nobody on stage
    MissedOpportunity,
    /// Negative narrative crowded with prominent peers
    GuiltByAssociation,
    /// Negative narrative carried by a single prominent peer
    InnocentBystander,
    /// Strong negative narrative with no prominent peer at all
    ReporterLedRisk,
    /// Weak narrative, no peers: simply not covered
    Overlooked,

    // -------- Supporting Player --------
    /// Strong outlet, strong sentiment
    StrategicSignal,
    /// Strong outlet, mild sentiment
    LowHeatVisibility,
    /// Weak outlet, strong sentiment
    CheckTheBox,
    /// Weak outlet, mild sentiment
    BackgroundNoise,

    // -------- Under Fire --------
    /// Maximum-prominence hit in a top outlet
    NarrativeShaper,
    /// Prominent, harsh, tier-4 outlet
    Takedown,
    /// Prominent, harsh, mid-tier outlet
    BodyBlow,
    /// Notable, harsh, lower-tier outlet
    Stinger,
    /// Notable but mild negative
    LightJab,
    /// Marginal mention, harsh sentiment
    CollateralDamage,
    /// Marginal mention, mild negative
    PeripheralHit,

    // -------- Leader --------
    /// Maximum-prominence win in a top outlet
    NarrativeSetter,
    /// High-prominence win in a strong outlet
    Breakthrough,
    /// Prominent, clearly positive, solid outlet
    GreatStory,
    /// Prominent and positive with a softer combination
    GoodStory,
    /// Prominent and merely non-negative
    RoutinePositive,
}

impl EntityModifier {
    /// Published string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityModifier::NotRelevant => "Not Relevant",
            EntityModifier::NarrativeDrift => "Narrative Drift",
            EntityModifier::FramingRisk => "Framing Risk",
            EntityModifier::CompetitorLed => "Competitor-Led",
            EntityModifier::MissedOpportunity => "Missed Opportunity",
            EntityModifier::GuiltByAssociation => "Guilt by Association",
            EntityModifier::InnocentBystander => "Innocent Bystander",
            EntityModifier::ReporterLedRisk => "Reporter-Led Risk",
            EntityModifier::Overlooked => "Overlooked",
            EntityModifier::StrategicSignal => "Strategic Signal",
            EntityModifier::LowHeatVisibility => "Low-Heat Visibility",
            EntityModifier::CheckTheBox => "Check the Box",
            EntityModifier::BackgroundNoise => "Background Noise",
            EntityModifier::NarrativeShaper => "Narrative Shaper",
            EntityModifier::Takedown => "Takedown",
            EntityModifier::BodyBlow => "Body Blow",
            EntityModifier::Stinger => "Stinger",
            EntityModifier::LightJab => "Light Jab",
            EntityModifier::CollateralDamage => "Collateral Damage",
            EntityModifier::PeripheralHit => "Peripheral Hit",
            EntityModifier::NarrativeSetter => "Narrative Setter",
            EntityModifier::Breakthrough => "Breakthrough",
            EntityModifier::GreatStory => "Great Story",
            EntityModifier::GoodStory => "Good Story",
            EntityModifier::RoutinePositive => "Routine Positive",
        }
    }
}

impl std::fmt::Display for EntityModifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CENTRAL NARRATIVE
// ============================================================================

/// The narrative selected per row by the precedence-and-tie rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentralNarrative {
    /// Narrative key
    pub key: String,
    /// Coerced prominence of the winner
    pub prominence: f64,
    /// Coerced sentiment of the winner
    pub sentiment: f64,
}

/// Select the central narrative from `(key, prominence, sentiment)` triples
/// supplied in tie-precedence order.
///
/// Strictly greater prominence wins; on a tie the higher `|sentiment|` wins;
/// remaining ties keep the earlier narrative.
pub fn central_narrative<'a, I>(candidates: I) -> Option<CentralNarrative>
where
    I: IntoIterator<Item = (&'a str, f64, f64)>,
{
    let mut best: Option<CentralNarrative> = None;
    for (key, prominence, sentiment) in candidates {
        let replace = match &best {
            None => true,
            Some(current) => {
                prominence > current.prominence
                    || (prominence == current.prominence
                        && sentiment.abs() > current.sentiment.abs())
            }
        };
        if replace {
            best = Some(CentralNarrative {
                key: key.to_string(),
                prominence,
                sentiment,
            });
        }
    }
    best
}

// ============================================================================
// MODIFIER CONTEXT & CASCADES
// ============================================================================

/// Everything a modifier cascade may look at for one (entity, row) pair.
///
/// Sentiments are coerced raw values, presence-gated. `peers_ge_2` counts
/// *other* tracked entities on the row with prominence >= 2.0.
#[derive(Debug, Clone, Default)]
pub struct ModifierContext {
    /// Entity prominence
    pub prominence: f64,
    /// Entity sentiment (gated)
    pub sentiment: f64,
    /// Outlet tier
    pub outlet: f64,
    /// Topic prominence
    pub topic_prominence: f64,
    /// Topic sentiment (gated)
    pub topic_sentiment: f64,
    /// Central-narrative prominence
    pub narrative_prominence: f64,
    /// Central-narrative sentiment
    pub narrative_sentiment: f64,
    /// Count of other tracked entities with prominence >= 2.0
    pub peers_ge_2: usize,
}

type ModifierRule = (fn(&ModifierContext) -> bool, EntityModifier);

const ABSENT_RULES: &[ModifierRule] = &[
    (|c| c.topic_prominence < 2.0, EntityModifier::NotRelevant),
    (|c| c.topic_sentiment >= 0.0, EntityModifier::NarrativeDrift),
    (|_| true, EntityModifier::FramingRisk),
];

const OFF_STAGE_RULES: &[ModifierRule] = &[
    (
        |c| c.narrative_sentiment >= 0.0 && c.peers_ge_2 >= 1,
        EntityModifier::CompetitorLed,
    ),
    (
        |c| c.narrative_sentiment >= 0.0 && c.narrative_prominence >= 2.5 && c.peers_ge_2 == 0,
        EntityModifier::MissedOpportunity,
    ),
    (
        |c| c.narrative_sentiment < 0.0 && c.peers_ge_2 >= 2,
        EntityModifier::GuiltByAssociation,
    ),
    (
        |c| c.narrative_sentiment < 0.0 && c.peers_ge_2 == 1,
        EntityModifier::InnocentBystander,
    ),
    (
        |c| c.narrative_sentiment < 0.0 && c.narrative_prominence >= 2.5 && c.peers_ge_2 == 0,
        EntityModifier::ReporterLedRisk,
    ),
    (
        |c| c.narrative_prominence < 2.5 && c.peers_ge_2 == 0,
        EntityModifier::Overlooked,
    ),
];

const SUPPORTING_PLAYER_RULES: &[ModifierRule] = &[
    (
        |c| c.outlet >= 3.0 && c.sentiment >= 3.0,
        EntityModifier::StrategicSignal,
    ),
    (
        |c| c.outlet >= 3.0 && (0.5..3.0).contains(&c.sentiment),
        EntityModifier::LowHeatVisibility,
    ),
    (
        |c| c.outlet < 3.0 && c.sentiment >= 3.0,
        EntityModifier::CheckTheBox,
    ),
    (
        |c| c.outlet < 3.0 && (0.5..3.0).contains(&c.sentiment),
        EntityModifier::BackgroundNoise,
    ),
];

const UNDER_FIRE_RULES: &[ModifierRule] = &[
    (
        |c| c.prominence >= 4.0 && c.sentiment <= -3.0 && c.outlet == 5.0,
        EntityModifier::NarrativeShaper,
    ),
    (
        |c| c.prominence >= 3.0 && c.sentiment <= -2.0 && c.outlet == 4.0,
        EntityModifier::Takedown,
    ),
    (
        |c| c.prominence >= 3.0 && c.sentiment <= -2.0 && c.outlet > 2.0,
        EntityModifier::BodyBlow,
    ),
    (
        |c| c.prominence >= 2.0 && c.sentiment <= -2.0 && c.outlet <= 3.0,
        EntityModifier::Stinger,
    ),
    (
        |c| c.prominence >= 2.0 && c.sentiment > -2.0 && c.sentiment < 0.0,
        EntityModifier::LightJab,
    ),
    (
        |c| c.prominence < 2.0 && c.sentiment <= -2.0,
        EntityModifier::CollateralDamage,
    ),
    (
        |c| c.prominence < 2.0 && c.sentiment > -2.0 && c.sentiment < 0.0,
        EntityModifier::PeripheralHit,
    ),
    // Bridge for the high-outlet gap left by the cascade above:
    // 2 <= prominence < 3, harsh sentiment, outlet >= 4
    (
        |c| (2.0..3.0).contains(&c.prominence) && c.sentiment <= -2.0 && c.outlet >= 4.0,
        EntityModifier::Stinger,
    ),
];

const LEADER_RULES: &[ModifierRule] = &[
    (
        |c| c.prominence >= 4.0 && c.sentiment >= 3.0 && c.outlet == 5.0,
        EntityModifier::NarrativeSetter,
    ),
    (
        |c| c.prominence >= 4.0 && c.sentiment >= 3.0 && c.outlet >= 4.0,
        EntityModifier::Breakthrough,
    ),
    (
        |c| c.prominence >= 3.0 && c.sentiment >= 2.0 && c.outlet >= 3.0,
        EntityModifier::GreatStory,
    ),
    (
        |c| {
            c.prominence >= 3.0
                && ((c.outlet >= 3.0 && (1.0..2.0).contains(&c.sentiment))
                    || (c.outlet < 3.0 && c.sentiment >= 2.0))
        },
        EntityModifier::GoodStory,
    ),
    (
        |c| c.prominence >= 3.0 && c.sentiment >= 0.0,
        EntityModifier::RoutinePositive,
    ),
];

fn first_modifier_match(rules: &[ModifierRule], context: &ModifierContext) -> Option<EntityModifier> {
    rules
        .iter()
        .find(|(matches, _)| matches(context))
        .map(|(_, label)| *label)
}

/// Assign the modifier for an entity given its final state and row context.
///
/// Returns `None` when no rule matches; the emitter publishes that as an
/// empty cell.
pub fn entity_modifier(
    state: crate::classify::EntityState,
    context: &ModifierContext,
) -> Option<EntityModifier> {
    use crate::classify::EntityState;
    let rules: &[ModifierRule] = match state {
        EntityState::Absent => ABSENT_RULES,
        EntityState::OffStage => OFF_STAGE_RULES,
        EntityState::SupportingPlayer => SUPPORTING_PLAYER_RULES,
        EntityState::UnderFire => UNDER_FIRE_RULES,
        EntityState::Leader => LEADER_RULES,
        EntityState::Undetermined => return None,
    };
    first_modifier_match(rules, context)
}

// ============================================================================
// TESTS
// ============================================================================
