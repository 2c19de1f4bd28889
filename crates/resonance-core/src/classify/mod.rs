//! Classification Module
//!
//! Pass-1 diagnostics:
//! - Row normalization (presence, weak-collapse, presence gating)
//! - State cascades for topic, narratives, and entities
//! - State-gated entity modifier cascades with central-narrative selection
//!
//! Every cascade is an ordered rule table evaluated top to bottom with
//! short-circuit on first match, so each state has a single testable surface.

mod modifier;
mod normalize;
mod state;

pub use modifier::{
    central_narrative, entity_modifier, CentralNarrative, EntityModifier, ModifierContext,
};
pub use normalize::{gated_sentiment, is_present, weak_collapse};
pub use state::{
    entity_state, narrative_state, topic_state, EntityState, NarrativeState, TopicState,
};
