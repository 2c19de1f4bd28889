//! End-to-end test support for the Resonance diagnostic engine.

pub mod fixtures;
