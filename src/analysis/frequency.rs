// Comparative term frequency.
//
// Raw counts are dominated by corpus size (posts carry far more text than
// comments), so slices are contrasted with a smoothed ratio instead:
//
//   score(term, A vs B) = (count_A + eps) / (count_B + eps)
//
// Every ranking breaks ties by raw count (descending) and then by the term
// itself, so two runs over the same input always agree.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::corpus::models::Document;

/// Counts for one term within one slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TermCount {
    /// Total occurrences across the slice
    pub raw_count: u64,
    /// Number of documents containing the term at least once
    pub document_frequency: u64,
}

/// Term frequency table for a named slice of documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermStats {
    pub label: String,
    pub documents: usize,
    pub total_tokens: u64,
    terms: BTreeMap<String, TermCount>,
}

impl TermStats {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            documents: 0,
            total_tokens: 0,
            terms: BTreeMap::new(),
        }
    }

    /// Count the tokens of documents (normally produced by `Corpus::tokenize`).
    pub fn from_documents<'a, I>(label: impl Into<String>, documents: I) -> Self
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut stats = Self::new(label);
        for doc in documents {
            stats.add_document(&doc.tokens);
        }
        stats
    }

    pub fn add_document(&mut self, tokens: &[String]) {
        self.documents += 1;
        self.total_tokens += tokens.len() as u64;

        let mut seen: HashSet<&str> = HashSet::new();
        for token in tokens {
            let entry = self.terms.entry(token.clone()).or_default();
            entry.raw_count += 1;
            if seen.insert(token.as_str()) {
                entry.document_frequency += 1;
            }
        }
    }

    pub fn get(&self, term: &str) -> Option<TermCount> {
        self.terms.get(term).copied()
    }

    /// Raw count of `term`, 0 when absent.
    pub fn count(&self, term: &str) -> u64 {
        self.terms.get(term).map_or(0, |c| c.raw_count)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    /// Terms in lexicographic order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, &TermCount)> {
        self.terms.iter().map(|(t, c)| (t.as_str(), c))
    }

    /// The `k` most frequent terms, ties broken by term.
    pub fn top_terms(&self, k: usize) -> Vec<(String, u64)> {
        let mut all: Vec<(String, u64)> = self
            .terms
            .iter()
            .map(|(t, c)| (t.clone(), c.raw_count))
            .collect();
        all.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        all.truncate(k);
        all
    }
}

/// How over-representation of a term in one slice is measured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistinctivenessScoring {
    /// `(count_here + eps) / (count_other + eps)`
    SmoothedRatio { epsilon: f64 },
    /// Ratio of per-token rates. Epsilon is scaled by the larger slice's
    /// token total so it stays comparable to the smoothed ratio.
    RateRatio { epsilon: f64 },
}

impl Default for DistinctivenessScoring {
    fn default() -> Self {
        DistinctivenessScoring::SmoothedRatio { epsilon: 1.0 }
    }
}

impl DistinctivenessScoring {
    pub fn score(&self, count_here: u64, total_here: u64, count_other: u64, total_other: u64) -> f64 {
        match *self {
            DistinctivenessScoring::SmoothedRatio { epsilon } => {
                (count_here as f64 + epsilon) / (count_other as f64 + epsilon)
            }
            DistinctivenessScoring::RateRatio { epsilon } => {
                let total_here = total_here.max(1) as f64;
                let total_other = total_other.max(1) as f64;
                let eps = epsilon / total_here.max(total_other);
                (count_here as f64 / total_here + eps) / (count_other as f64 / total_other + eps)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrequencyConfig {
    pub scoring: DistinctivenessScoring,
    /// Truncate each ranked list to this many entries
    pub top_k: Option<usize>,
}

/// A term ranked by how distinctive it is for a slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistinctiveTerm {
    pub term: String,
    pub score: f64,
    /// Raw count in this slice
    pub count: u64,
    /// Raw count in the other slice
    pub other_count: u64,
}

/// A term that never occurs in the other slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueTerm {
    pub term: String,
    pub count: u64,
    pub document_frequency: u64,
}

/// Rankings for one side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceRanking {
    pub slice: String,
    pub other: String,
    pub distinctive: Vec<DistinctiveTerm>,
    pub unique: Vec<UniqueTerm>,
}

/// Both sides of a two-slice comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub scoring: DistinctivenessScoring,
    pub a: SliceRanking,
    pub b: SliceRanking,
}

/// Contrast the term distributions of two slices.
pub fn compare(a: &TermStats, b: &TermStats, config: &FrequencyConfig) -> Comparison {
    Comparison {
        scoring: config.scoring,
        a: rank_slice(a, b, config),
        b: rank_slice(b, a, config),
    }
}

fn rank_slice(here: &TermStats, other: &TermStats, config: &FrequencyConfig) -> SliceRanking {
    let mut distinctive: Vec<DistinctiveTerm> = here
        .terms()
        .map(|(term, counts)| {
            let other_count = other.count(term);
            DistinctiveTerm {
                term: term.to_string(),
                score: config.scoring.score(
                    counts.raw_count,
                    here.total_tokens,
                    other_count,
                    other.total_tokens,
                ),
                count: counts.raw_count,
                other_count,
            }
        })
        .collect();
    distinctive.sort_by(|x, y| {
        y.score
            .total_cmp(&x.score)
            .then_with(|| by_count_then_term(x.count, &x.term, y.count, &y.term))
    });

    let mut unique: Vec<UniqueTerm> = here
        .terms()
        .filter(|(term, _)| other.count(term) == 0)
        .map(|(term, counts)| UniqueTerm {
            term: term.to_string(),
            count: counts.raw_count,
            document_frequency: counts.document_frequency,
        })
        .collect();
    unique.sort_by(|x, y| by_count_then_term(x.count, &x.term, y.count, &y.term));

    if let Some(k) = config.top_k {
        distinctive.truncate(k);
        unique.truncate(k);
    }

    SliceRanking {
        slice: here.label.clone(),
        other: other.label.clone(),
        distinctive,
        unique,
    }
}

fn by_count_then_term(count_x: u64, term_x: &str, count_y: u64, term_y: &str) -> Ordering {
    count_y.cmp(&count_x).then_with(|| term_x.cmp(term_y))
}
