// Unit tests for comparative term frequency.

use cmv_corpus::analysis::frequency::{
    compare, DistinctivenessScoring, FrequencyConfig, TermStats,
};

fn stats(label: &str, docs: &[&[&str]]) -> TermStats {
    let mut s = TermStats::new(label);
    for doc in docs {
        let tokens: Vec<String> = doc.iter().map(|t| t.to_string()).collect();
        s.add_document(&tokens);
    }
    s
}

fn find<'a>(
    terms: &'a [cmv_corpus::analysis::frequency::DistinctiveTerm],
    term: &str,
) -> &'a cmv_corpus::analysis::frequency::DistinctiveTerm {
    terms.iter().find(|t| t.term == term).unwrap()
}

// ============================================================
// Scoring
// ============================================================

#[test]
fn three_vs_one_scores_two() {
    let a = stats("posts", &[&["tax", "tax"], &["tax", "cut"]]);
    let b = stats("comments", &[&["tax", "no"]]);

    let cmp = compare(&a, &b, &FrequencyConfig::default());
    let tax = find(&cmp.a.distinctive, "tax");
    assert_eq!(tax.count, 3);
    assert_eq!(tax.other_count, 1);
    assert!((tax.score - 2.0).abs() < 1e-12);

    // and the mirror image from the other side
    let tax_b = find(&cmp.b.distinctive, "tax");
    assert!((tax_b.score - 0.5).abs() < 1e-12);
}

#[test]
fn larger_epsilon_pulls_scores_toward_one() {
    let a = stats("a", &[&["tax", "tax", "tax"]]);
    let b = stats("b", &[&["tax"]]);

    let small = compare(&a, &b, &FrequencyConfig::default());
    let large = compare(
        &a,
        &b,
        &FrequencyConfig {
            scoring: DistinctivenessScoring::SmoothedRatio { epsilon: 10.0 },
            top_k: None,
        },
    );
    let s = find(&small.a.distinctive, "tax").score;
    let l = find(&large.a.distinctive, "tax").score;
    assert!(l < s);
    assert!(l > 1.0);
}

#[test]
fn absent_terms_score_finitely() {
    let a = stats("a", &[&["only", "here"]]);
    let b = stats("b", &[]);
    let cmp = compare(&a, &b, &FrequencyConfig::default());
    assert!(cmp.a.distinctive.iter().all(|t| t.score.is_finite()));
    assert!(cmp.b.distinctive.is_empty());
}

// ============================================================
// Uniqueness
// ============================================================

#[test]
fn unique_terms_never_appear_in_other_slice() {
    let a = stats("a", &[&["tax", "cut", "burden"], &["burden"]]);
    let b = stats("b", &[&["tax", "school"]]);
    let cmp = compare(&a, &b, &FrequencyConfig::default());

    for u in &cmp.a.unique {
        assert!(a.count(&u.term) > 0);
        assert_eq!(b.count(&u.term), 0);
    }
    let terms: Vec<&str> = cmp.a.unique.iter().map(|u| u.term.as_str()).collect();
    assert_eq!(terms, vec!["burden", "cut"]);
    assert_eq!(cmp.a.unique[0].document_frequency, 2);

    let terms_b: Vec<&str> = cmp.b.unique.iter().map(|u| u.term.as_str()).collect();
    assert_eq!(terms_b, vec!["school"]);
}

// ============================================================
// Determinism and ties
// ============================================================

#[test]
fn equal_scores_break_by_count_then_term() {
    // a: (3+1)/(1+1) = 2, d: (1+1)/(0+1) = 2, b/c: 2/1 = 2
    let a = stats("a", &[&["a", "a", "a", "d", "c", "b"]]);
    let b = stats("b", &[&["a"]]);
    let cmp = compare(&a, &b, &FrequencyConfig::default());

    let order: Vec<&str> = cmp.a.distinctive.iter().map(|t| t.term.as_str()).collect();
    assert_eq!(order, vec!["a", "b", "c", "d"]);
}

#[test]
fn ranking_is_deterministic() {
    let docs_a: &[&[&str]] = &[
        &["remote", "work", "office", "time"],
        &["commute", "time", "money", "work"],
        &["office", "culture"],
    ];
    let docs_b: &[&[&str]] = &[&["work", "junior", "mentor"], &["office", "time"]];

    let first = compare(
        &stats("a", docs_a),
        &stats("b", docs_b),
        &FrequencyConfig::default(),
    );
    for _ in 0..10 {
        let again = compare(
            &stats("a", docs_a),
            &stats("b", docs_b),
            &FrequencyConfig::default(),
        );
        assert_eq!(first, again);
    }
}

#[test]
fn scores_never_increase_down_the_list() {
    let a = stats("a", &[&["x", "x", "y", "z", "z", "z", "w"]]);
    let b = stats("b", &[&["x", "z", "q", "q"]]);
    let cmp = compare(&a, &b, &FrequencyConfig::default());
    for pair in cmp.a.distinctive.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

// ============================================================
// Counting invariants
// ============================================================

#[test]
fn document_frequency_bounded_by_counts_and_documents() {
    let s = stats(
        "a",
        &[&["tax", "tax", "cut"], &["tax"], &[], &["school", "cut", "cut"]],
    );
    assert_eq!(s.documents, 4);
    for (_, counts) in s.terms() {
        assert!(counts.document_frequency <= s.documents as u64);
        assert!(counts.raw_count >= counts.document_frequency);
    }
    assert_eq!(s.top_terms(2), vec![("cut".to_string(), 3), ("tax".to_string(), 3)]);
}
