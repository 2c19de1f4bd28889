//! Pass-2 end-to-end scenarios: window volume deltas, the fallout lookback,
//! the entity signal cap, and fixed-anchor idempotence.

use resonance_core::{DiagnosticEngine, SignalConfig};
use resonance_e2e_tests::fixtures::{table, ArticleRow};

fn volume_rows(current: usize, prior: usize) -> Vec<ArticleRow> {
    let mut rows = Vec::new();
    for _ in 0..current {
        rows.push(
            ArticleRow::new("2025-03-01")
                .topic(2.0, 1.0)
                .acme(2.0, 1.0),
        );
    }
    for _ in 0..prior {
        rows.push(
            ArticleRow::new("2025-01-15")
                .topic(2.0, 1.0)
                .acme(2.0, 1.0),
        );
    }
    rows
}

#[test]
fn topic_growing_at_13_over_10() {
    let out = DiagnosticEngine::new()
        .pass2(&table(&volume_rows(13, 10)))
        .unwrap();
    for r in 0..out.len() {
        let signals = out.value(r, "Topic_Signals").unwrap();
        assert!(signals.contains("Growing"), "row {r}: {signals:?}");
        assert!(!signals.contains("Fading"));
    }
}

#[test]
fn topic_fading_at_6_over_10() {
    let out = DiagnosticEngine::new()
        .pass2(&table(&volume_rows(6, 10)))
        .unwrap();
    let signals = out.value(0, "Topic_Signals").unwrap();
    assert!(signals.contains("Fading"), "{signals:?}");
    assert!(!signals.contains("Growing"));
}

#[test]
fn topic_steady_between_ratios() {
    // 11 current vs 10 prior sits between the fade and growth ratios
    let out = DiagnosticEngine::new()
        .pass2(&table(&volume_rows(11, 10)))
        .unwrap();
    let signals = out.value(0, "Topic_Signals").unwrap();
    assert!(!signals.contains("Growing"));
    assert!(!signals.contains("Fading"));
}

#[test]
fn strategic_fallout_after_prior_takedown() {
    let mut rows = Vec::new();
    // Prior window: a takedown with healthy quality coverage
    for _ in 0..3 {
        rows.push(
            ArticleRow::new("2025-01-15")
                .outlet(4.0)
                .topic(3.0, -2.5)
                .acme(3.0, -2.0)
                .acme_quality(3.0)
                .acme_modifier("Takedown"),
        );
    }
    // Current window: mean quality down 0.6
    for _ in 0..3 {
        rows.push(
            ArticleRow::new("2025-03-01")
                .outlet(3.0)
                .topic(2.0, -1.0)
                .acme(2.0, -1.0)
                .acme_quality(2.4),
        );
    }
    let out = DiagnosticEngine::new().pass2(&table(&rows)).unwrap();
    for r in 0..out.len() {
        let signals = out.value(r, "Entity_Acme_Signals").unwrap();
        assert!(signals.contains("Strategic Fallout"), "row {r}: {signals:?}");
    }
}

#[test]
fn no_fallout_when_quality_holds() {
    let mut rows = Vec::new();
    for _ in 0..3 {
        rows.push(
            ArticleRow::new("2025-01-15")
                .outlet(4.0)
                .topic(3.0, -2.5)
                .acme(3.0, -2.0)
                .acme_quality(3.0)
                .acme_modifier("Takedown"),
        );
    }
    for _ in 0..3 {
        rows.push(
            ArticleRow::new("2025-03-01")
                .topic(2.0, -1.0)
                .acme(2.0, -1.0)
                .acme_quality(2.8),
        );
    }
    let out = DiagnosticEngine::new().pass2(&table(&rows)).unwrap();
    assert!(!out
        .value(5, "Entity_Acme_Signals")
        .unwrap()
        .contains("Strategic Fallout"));
}

#[test]
fn entity_signal_cap_holds_under_pressure() {
    // A crowded article engineered to fire many candidates at once
    let rows = vec![
        ArticleRow::new("2025-03-01")
            .outlet(5.0)
            .topic(4.0, -3.0)
            .narrative(3.0, -3.0)
            .acme(4.5, 3.0)
            .borealis(3.5, -3.5)
            .cascade(0.5, 0.5),
        ArticleRow::new("2025-02-20")
            .outlet(4.0)
            .topic(3.0, -2.0)
            .narrative(2.0, -2.0)
            .acme(1.0, -1.0)
            .borealis(3.0, -2.0)
            .cascade(2.0, 1.0),
        ArticleRow::new("2025-01-10")
            .outlet(2.0)
            .topic(2.0, 1.0)
            .narrative(2.0, 1.0)
            .acme(4.0, 2.0)
            .borealis(1.0, 1.0)
            .cascade(0.0, 0.0),
    ];
    let out = DiagnosticEngine::new().pass2(&table(&rows)).unwrap();
    for r in 0..out.len() {
        for column in [
            "Entity_Acme_Signals",
            "Entity_Borealis_Signals",
            "Entity_Cascade_Signals",
        ] {
            let cell = out.value(r, column).unwrap();
            let count = cell.split(", ").filter(|s| !s.is_empty()).count();
            assert!(count <= 3, "{column} row {r} holds {count} signals: {cell:?}");
        }
    }
}

#[test]
fn pass2_fixed_anchor_is_idempotent() {
    let rows = volume_rows(5, 4);
    let config = SignalConfig {
        as_of: resonance_core::parse_date("2025-03-01"),
        ..SignalConfig::default()
    };
    let engine = DiagnosticEngine::with_config(config);
    let once = engine.pass2(&table(&rows)).unwrap();
    let twice = engine.pass2(&once).unwrap();
    assert_eq!(once.columns(), twice.columns());
    for r in 0..once.len() {
        for column in once.columns() {
            assert_eq!(once.value(r, column), twice.value(r, column));
        }
    }
}

#[test]
fn outputs_round_trip_through_csv() {
    let rows = volume_rows(13, 10);
    let (pass1, pass2) = DiagnosticEngine::new().run(&table(&rows)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Signals_coverage.csv");
    pass2.write_path(&path).unwrap();

    let reread = resonance_core::Table::from_path(&path).unwrap();
    assert_eq!(reread.len(), pass1.len());
    assert_eq!(reread.columns(), pass2.columns());
    // List-valued cells survive serialization as ", "-joined strings
    assert!(reread.value(0, "Topic_Signals").unwrap().contains("Growing"));
}

#[test]
fn unparseable_dates_still_get_article_signals() {
    let rows = vec![
        ArticleRow::new("sometime in march")
            .topic(4.0, 3.5)
            .acme(4.0, 3.0)
            .outlet(4.0),
        ArticleRow::new("2025-03-01").topic(2.0, 1.0).acme(2.0, 1.0),
    ];
    let out = DiagnosticEngine::new().pass2(&table(&rows)).unwrap();
    // The dateless row keeps its article-level tags
    assert!(out.value(0, "Topic_Signals").unwrap().contains("Hot"));
    assert!(out
        .value(0, "Entity_Acme_Signals")
        .unwrap()
        .contains("Narrative Shaping"));
}
