// Unit tests for semantic axes: resolution, antisymmetry, and the
// unscorable/unresolved outcomes.

use std::io::Cursor;

use cmv_corpus::semantic::{
    project_document, project_term, resolve_axis, AxisError, DocumentScore, EmbeddingProvider,
    EmbeddingTable, Pole, SemanticAxis,
};

const EPS: f64 = 1e-9;

fn table() -> EmbeddingTable {
    let text = "\
rich 1.0 0.0 0.2
wealthy 0.9 0.1 0.0
money 0.8 0.3 0.1
poor -1.0 0.0 0.1
broke -0.8 -0.2 0.0
tax 0.4 0.6 0.0
school -0.3 0.7 0.2
";
    EmbeddingTable::from_reader(Cursor::new(text)).unwrap()
}

fn wealth() -> SemanticAxis {
    SemanticAxis::new("wealth", ["poor", "broke"], ["rich", "wealthy"]).unwrap()
}

fn tokens(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

// ============================================================
// Resolution
// ============================================================

#[test]
fn direction_has_unit_length() {
    let resolved = resolve_axis(&wealth(), &table(), 0.5).unwrap();
    let length: f64 = resolved.direction.iter().map(|d| d * d).sum::<f64>().sqrt();
    assert!((length - 1.0).abs() < EPS);
    assert_eq!(resolved.direction.len(), table().dimension());
    assert_eq!(resolved.negative_coverage, 1.0);
    assert_eq!(resolved.positive_coverage, 1.0);
}

#[test]
fn pole_terms_land_on_their_side() {
    let t = table();
    let resolved = resolve_axis(&wealth(), &t, 0.5).unwrap();
    assert!(project_term("rich", &resolved, &t).unwrap() > 0.0);
    assert!(project_term("wealthy", &resolved, &t).unwrap() > 0.0);
    assert!(project_term("poor", &resolved, &t).unwrap() < 0.0);
    assert!(project_term("broke", &resolved, &t).unwrap() < 0.0);
    assert_eq!(project_term("unknown", &resolved, &t), None);
}

#[test]
fn axis_from_string_matches_constructor() {
    let parsed: SemanticAxis = "wealth=poor, broke:Rich,wealthy".parse().unwrap();
    assert_eq!(parsed, wealth());
}

#[test]
fn malformed_axis_strings_rejected() {
    for bad in ["wealth", "=poor:rich", "wealth=poor", "wealth=:rich", "wealth=poor:"] {
        assert!(bad.parse::<SemanticAxis>().is_err(), "{bad} parsed");
    }
}

#[test]
fn overlapping_poles_rejected() {
    let err = SemanticAxis::new("x", ["tax", "poor"], ["rich", "tax"]).unwrap_err();
    assert!(matches!(err, AxisError::OverlappingPoles { ref terms, .. } if terms == &["tax"]));
}

// ============================================================
// Antisymmetry
// ============================================================

#[test]
fn reversing_poles_negates_term_scores() {
    let t = table();
    let forward = resolve_axis(&wealth(), &t, 0.5).unwrap();
    let backward = resolve_axis(&wealth().reversed(), &t, 0.5).unwrap();

    for term in ["rich", "wealthy", "money", "poor", "broke", "tax", "school"] {
        let f = project_term(term, &forward, &t).unwrap();
        let b = project_term(term, &backward, &t).unwrap();
        assert!((f + b).abs() < EPS, "{term}: {f} vs {b}");
    }
}

#[test]
fn reversing_poles_negates_document_scores() {
    let t = table();
    let forward = resolve_axis(&wealth(), &t, 0.5).unwrap();
    let backward = resolve_axis(&wealth().reversed(), &t, 0.5).unwrap();
    let doc = tokens(&["tax", "money", "school", "whatever"]);

    let f = project_document(&doc, &forward, &t).score().unwrap();
    let b = project_document(&doc, &backward, &t).score().unwrap();
    assert!((f + b).abs() < EPS);
}

// ============================================================
// Document projection
// ============================================================

#[test]
fn document_score_is_mean_of_known_tokens() {
    let t = table();
    let resolved = resolve_axis(&wealth(), &t, 0.5).unwrap();
    let doc = tokens(&["rich", "poor", "gibberish"]);

    let expected = (project_term("rich", &resolved, &t).unwrap()
        + project_term("poor", &resolved, &t).unwrap())
        / 2.0;

    match project_document(&doc, &resolved, &t) {
        DocumentScore::Scored {
            score,
            in_vocabulary,
            total_tokens,
        } => {
            assert!((score - expected).abs() < EPS);
            assert_eq!(in_vocabulary, 2);
            assert_eq!(total_tokens, 3);
        }
        other => panic!("expected a score, got {other:?}"),
    }
}

#[test]
fn no_known_tokens_is_unscorable_not_zero() {
    let t = table();
    let resolved = resolve_axis(&wealth(), &t, 0.5).unwrap();

    let score = project_document(&tokens(&["zzz", "qqq"]), &resolved, &t);
    assert_eq!(score, DocumentScore::Unscorable { total_tokens: 2 });
    assert_eq!(score.score(), None);
    assert!(!score.is_scorable());

    let empty = project_document(&[], &resolved, &t);
    assert_eq!(empty, DocumentScore::Unscorable { total_tokens: 0 });
}

// ============================================================
// Unresolved axes
// ============================================================

#[test]
fn low_pole_coverage_is_unresolved() {
    // one of three positive terms known: 33% < 50%
    let axis = SemanticAxis::new("wealth", ["poor"], ["rich", "opulent", "affluent"]).unwrap();
    match resolve_axis(&axis, &table(), 0.5) {
        Err(AxisError::Unresolved(e)) => {
            assert_eq!(e.axis, "wealth");
            assert_eq!(e.pole, Pole::Positive);
            assert_eq!(e.found, 1);
            assert_eq!(e.total, 3);
            assert_eq!(e.missing, vec!["opulent".to_string(), "affluent".to_string()]);
        }
        other => panic!("expected unresolved, got {other:?}"),
    }
}

#[test]
fn coverage_at_threshold_resolves() {
    let axis = SemanticAxis::new("wealth", ["poor", "destitute"], ["rich"]).unwrap();
    let resolved = resolve_axis(&axis, &table(), 0.5).unwrap();
    assert!((resolved.negative_coverage - 0.5).abs() < EPS);
}

#[test]
fn no_pole_terms_known_is_unresolved_even_at_zero_threshold() {
    let axis = SemanticAxis::new("mood", ["sad"], ["happy"]).unwrap();
    let err = resolve_axis(&axis, &table(), 0.0).unwrap_err();
    assert!(matches!(err, AxisError::Unresolved(ref e) if e.pole == Pole::Negative));
}

#[test]
fn coinciding_pole_means_are_degenerate() {
    let mut t = EmbeddingTable::new(2);
    t.insert("up", vec![1.0, 1.0]).unwrap();
    t.insert("down", vec![1.0, 1.0]).unwrap();
    let axis = SemanticAxis::new("flat", ["down"], ["up"]).unwrap();
    assert!(matches!(
        resolve_axis(&axis, &t, 0.5),
        Err(AxisError::Degenerate { .. })
    ));
}
