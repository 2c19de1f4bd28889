//! Schema robustness end-to-end: known typo drift must not change the
//! diagnostics, and near-miss label columns must never bind.

use resonance_core::{DiagnosticEngine, Table};

const CLEAN: &str = "\
Date,Publication,Outlet score,Topic_Prominence,Topic_Sentiment,\
Narrative_Momentum_Prominence,Narrative_Momentum_Sentiment,\
Entity_Acme_Prominence,Entity_Acme_Sentiment\n\
2025-03-01,Herald,4,3.0,-2.5,2.0,-2.0,3.0,-2.0\n\
2025-03-02,Courier,2,1.5,0.5,0,0,0,0\n";

const DERIVED_COLUMNS: [&str; 9] = [
    "Topic_Present",
    "Topic_State",
    "Narrative_Momentum_State",
    "Entity_Acme_Present",
    "Entity_Acme_Sentiment_Normalized",
    "Entity_Acme_State",
    "Entity_Acme_Modifier",
    "tracked_entities_in_article",
    "is_valid_row",
];

#[test]
fn misspelled_prominence_header_yields_identical_diagnostics() {
    let drifted = CLEAN.replace("Entity_Acme_Prominence", "Enity_Acme_Prominence");

    let engine = DiagnosticEngine::new();
    let clean_out = engine
        .pass1(&Table::from_reader(CLEAN.as_bytes()).unwrap())
        .unwrap();
    let drifted_out = engine
        .pass1(&Table::from_reader(drifted.as_bytes()).unwrap())
        .unwrap();

    for column in DERIVED_COLUMNS {
        for r in 0..clean_out.len() {
            assert_eq!(
                clean_out.value(r, column),
                drifted_out.value(r, column),
                "column {column} differs at row {r}"
            );
        }
    }
}

#[test]
fn drift_is_reported_in_the_mapping_preview() {
    let drifted = CLEAN.replace("Entity_Acme_Prominence", "Enity_Acme_Prominence");
    let schema = DiagnosticEngine::new()
        .resolve(&Table::from_reader(drifted.as_bytes()).unwrap())
        .unwrap();
    assert!(schema
        .warnings
        .iter()
        .any(|w| w.contains("Enity_Acme_Prominence")));
    assert!(schema.preview().contains("Enity_Acme_Prominence"));
}

#[test]
fn double_underscore_state_column_does_not_bind() {
    // A stray label column with a junk value must not leak into diagnostics
    let poisoned = CLEAN
        .replace(
            "Entity_Acme_Sentiment\n",
            "Entity_Acme_Sentiment,Entity_Acme__State\n",
        )
        .replace("3.0,-2.0\n", "3.0,-2.0,Leader\n")
        .replace("0,0\n", "0,0,Leader\n");

    let engine = DiagnosticEngine::new();
    let table = Table::from_reader(poisoned.as_bytes()).unwrap();
    let schema = engine.resolve(&table).unwrap();
    assert!(schema.entities[0].state.is_none());

    let out = engine.pass1(&table).unwrap();
    // The computed state lands in the canonical column, not the stray one
    assert_eq!(out.value(0, "Entity_Acme_State"), Some("Under Fire"));
    assert_eq!(out.value(0, "Entity_Acme__State"), Some("Leader"));
}

#[test]
fn correctly_bound_state_column_is_preserved() {
    let labelled = CLEAN
        .replace(
            "Entity_Acme_Sentiment\n",
            "Entity_Acme_Sentiment,Entity_Acme_State\n",
        )
        .replace("3.0,-2.0\n", "3.0,-2.0,Supporting Player\n")
        .replace("0,0\n", "0,0,\n");

    let out = DiagnosticEngine::new()
        .pass1(&Table::from_reader(labelled.as_bytes()).unwrap())
        .unwrap();
    // Row 0 keeps its pre-existing label; row 1's empty cell is filled
    assert_eq!(out.value(0, "Entity_Acme_State"), Some("Supporting Player"));
    assert_eq!(out.value(1, "Entity_Acme_State"), Some("Absent"));
}

#[test]
fn coded_dialect_round_trips_through_both_passes() {
    let coded = "\
Date,Publication,Orchestra_Pub_Tier,O_Overall - Overall-Level Prominence,O_Overall - Overall-Level Sentiment,\
O_M_1prom,O_M_1sent,1_Tesla - Company-Level Prominence,1_Tesla - Company-Level Sentiment\n\
2025-03-01,Herald,4,3.0,2.0,2.6,2.0,4.0,3.0\n\
2025-01-15,Courier,2,2.0,1.0,2.0,1.0,2.0,1.0\n";

    let engine = DiagnosticEngine::new();
    let (pass1, pass2) = engine
        .run(&Table::from_reader(coded.as_bytes()).unwrap())
        .unwrap();

    assert_eq!(pass1.value(0, "Entity_Tesla_State"), Some("Leader"));
    assert_eq!(pass1.value(0, "Entity_Tesla_Modifier"), Some("Breakthrough"));
    assert_eq!(pass1.value(0, "Narrative_Message_1_State"), Some("Healthy"));
    assert!(pass2.has_column("Entity_Tesla_Signals"));
    assert!(pass2.has_column("Narrative_Message_1_Signals"));
}

#[test]
fn missing_required_columns_is_the_only_fatal_error() {
    let headerless = "Date,Publication\n2025-03-01,Herald\n";
    let err = DiagnosticEngine::new()
        .resolve(&Table::from_reader(headerless.as_bytes()).unwrap())
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("topic prominence"));
    assert!(message.contains("available columns"));
}
