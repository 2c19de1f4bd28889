//! Pass-1 end-to-end scenarios: the canonical state/modifier seed cases plus
//! the universal invariants over a mixed table.

use resonance_core::DiagnosticEngine;
use resonance_e2e_tests::fixtures::{table, ArticleRow};

fn classify(row: ArticleRow) -> (String, String) {
    let out = DiagnosticEngine::new().pass1(&table(&[row])).unwrap();
    (
        out.value(0, "Entity_Acme_State").unwrap().to_string(),
        out.value(0, "Entity_Acme_Modifier").unwrap().to_string(),
    )
}

#[test]
fn scenario_off_stage_overlooked() {
    let (state, modifier) = classify(
        ArticleRow::new("2025-03-01")
            .outlet(4.0)
            .topic(3.0, 1.0)
            .narrative(2.0, 1.0),
    );
    assert_eq!(state, "Off-Stage");
    assert_eq!(modifier, "Overlooked");
}

#[test]
fn scenario_off_stage_guilt_by_association() {
    let (state, modifier) = classify(
        ArticleRow::new("2025-03-01")
            .outlet(4.0)
            .topic(3.0, -3.0)
            .narrative(2.8, -3.0)
            .borealis(2.5, -1.0)
            .cascade(2.5, -2.0),
    );
    assert_eq!(state, "Off-Stage");
    assert_eq!(modifier, "Guilt by Association");
}

#[test]
fn scenario_leader_narrative_setter() {
    let (state, modifier) = classify(
        ArticleRow::new("2025-03-01")
            .outlet(5.0)
            .topic(3.0, 2.0)
            .narrative(2.6, 2.0)
            .acme(4.0, 3.0),
    );
    assert_eq!(state, "Leader");
    assert_eq!(modifier, "Narrative Setter");
}

#[test]
fn scenario_under_fire_takedown() {
    let (state, modifier) = classify(
        ArticleRow::new("2025-03-01")
            .outlet(4.0)
            .topic(3.0, -2.5)
            .narrative(2.0, -2.0)
            .acme(3.0, -2.0),
    );
    assert_eq!(state, "Under Fire");
    assert_eq!(modifier, "Takedown");
}

#[test]
fn scenario_absent_not_relevant() {
    let (state, modifier) = classify(
        ArticleRow::new("2025-03-01")
            .outlet(3.0)
            .topic(1.5, 0.5),
    );
    assert_eq!(state, "Absent");
    assert_eq!(modifier, "Not Relevant");
}

#[test]
fn scenario_under_fire_peripheral_hit() {
    let (state, modifier) = classify(
        ArticleRow::new("2025-03-01")
            .outlet(2.0)
            .topic(3.0, -1.0)
            .acme(1.5, -0.5),
    );
    assert_eq!(state, "Under Fire");
    assert_eq!(modifier, "Peripheral Hit");
}

#[test]
fn scenario_under_fire_stinger_bridge() {
    // Notable prominence, harsh sentiment, top outlet: bridged into Stinger
    let (state, modifier) = classify(
        ArticleRow::new("2025-03-01")
            .outlet(4.0)
            .topic(3.0, -2.5)
            .acme(2.5, -2.5),
    );
    assert_eq!(state, "Under Fire");
    assert_eq!(modifier, "Stinger");
}

#[test]
fn scenario_leader_breakthrough_one_tier_down() {
    let (state, modifier) = classify(
        ArticleRow::new("2025-03-01")
            .outlet(4.0)
            .topic(3.0, 2.0)
            .narrative(2.6, 2.0)
            .acme(4.0, 3.0),
    );
    assert_eq!(state, "Leader");
    assert_eq!(modifier, "Breakthrough");
}

// ============================================================================
// UNIVERSAL INVARIANTS
// ============================================================================

const STATES: [&str; 6] = [
    "Absent",
    "Off-Stage",
    "Under Fire",
    "Leader",
    "Supporting Player",
    "Undetermined",
];

const MODIFIERS: [&str; 25] = [
    "Not Relevant",
    "Narrative Drift",
    "Framing Risk",
    "Competitor-Led",
    "Missed Opportunity",
    "Guilt by Association",
    "Innocent Bystander",
    "Reporter-Led Risk",
    "Overlooked",
    "Strategic Signal",
    "Low-Heat Visibility",
    "Check the Box",
    "Background Noise",
    "Narrative Shaper",
    "Takedown",
    "Body Blow",
    "Stinger",
    "Light Jab",
    "Collateral Damage",
    "Peripheral Hit",
    "Narrative Setter",
    "Breakthrough",
    "Great Story",
    "Good Story",
    "Routine Positive",
];

fn mixed_table() -> Vec<ArticleRow> {
    let mut rows = Vec::new();
    // Sweep a spread of prominence/sentiment/outlet combinations
    for (i, outlet) in [1.0, 2.0, 3.0, 4.0, 5.0].iter().enumerate() {
        for (j, sentiment) in [-3.5, -2.0, -0.5, 0.0, 0.5, 2.0, 3.5].iter().enumerate() {
            let prominence = ((i + j) % 6) as f64;
            rows.push(
                ArticleRow::new("2025-03-01")
                    .outlet(*outlet)
                    .topic(prominence, *sentiment)
                    .narrative((j % 4) as f64, *sentiment)
                    .acme(prominence, *sentiment)
                    .borealis(((i + 1) % 4) as f64, 1.0),
            );
        }
    }
    rows
}

#[test]
fn invariant_presence_iff_positive_prominence() {
    let rows = mixed_table();
    let out = DiagnosticEngine::new().pass1(&table(&rows)).unwrap();
    for (r, row) in rows.iter().enumerate() {
        let expected = row.acme.0 > 0.0;
        assert_eq!(
            out.value(r, "Entity_Acme_Present"),
            Some(if expected { "true" } else { "false" }),
            "presence mismatch at row {r}"
        );
    }
}

#[test]
fn invariant_states_and_modifiers_are_enumerated() {
    let out = DiagnosticEngine::new().pass1(&table(&mixed_table())).unwrap();
    for r in 0..out.len() {
        let state = out.value(r, "Entity_Acme_State").unwrap();
        assert!(STATES.contains(&state), "unexpected state {state:?}");

        let modifier = out.value(r, "Entity_Acme_Modifier").unwrap();
        assert!(
            modifier.is_empty() || MODIFIERS.contains(&modifier),
            "unexpected modifier {modifier:?}"
        );
    }
}

#[test]
fn invariant_absent_subjects_carry_no_positive_labels() {
    let out = DiagnosticEngine::new().pass1(&table(&mixed_table())).unwrap();
    for r in 0..out.len() {
        if out.value(r, "Entity_Acme_Present") == Some("false") {
            let state = out.value(r, "Entity_Acme_State").unwrap();
            assert!(
                matches!(state, "Absent" | "Off-Stage" | "Undetermined"),
                "absent entity got state {state:?}"
            );
        }
    }
}

#[test]
fn invariant_prominent_count_bounded_by_tracked() {
    let out = DiagnosticEngine::new().pass1(&table(&mixed_table())).unwrap();
    for r in 0..out.len() {
        let tracked: usize = out
            .value(r, "tracked_entities_in_article")
            .unwrap()
            .parse()
            .unwrap();
        let prominent: usize = out
            .value(r, "prominent_tracked_entities_in_article")
            .unwrap()
            .parse()
            .unwrap();
        assert!(prominent <= tracked);
    }
}
