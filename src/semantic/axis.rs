// Semantic axis resolution and projection.
//
// An axis runs from a negative pole to a positive pole, each a set of terms.
// Its direction is mean(positive vectors) - mean(negative vectors), scaled
// to unit length. Projections are dot products with that direction, so
// swapping the poles negates every score.
//
// A document with no in-vocabulary tokens is Unscorable. It is never scored
// 0.0, which would read as "neutral".

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::embeddings::{dot, mean_vector, norm, EmbeddingProvider};

/// Fraction of each pole that must have embeddings by default.
pub const DEFAULT_MIN_COVERAGE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pole {
    Negative,
    Positive,
}

impl std::fmt::Display for Pole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pole::Negative => write!(f, "negative"),
            Pole::Positive => write!(f, "positive"),
        }
    }
}

/// Not enough pole terms have embeddings to compute the axis.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error(
    "axis `{axis}`: {pole} pole has {found} of {total} terms in the embedding table \
     (minimum coverage {min_coverage})"
)]
pub struct UnresolvedAxisError {
    pub axis: String,
    pub pole: Pole,
    pub found: usize,
    pub total: usize,
    pub min_coverage: f64,
    /// Pole terms with no embedding
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AxisError {
    #[error("axis `{axis}`: {pole} pole is empty")]
    EmptyPole { axis: String, pole: Pole },

    #[error("axis `{axis}`: terms appear on both poles: {}", .terms.join(", "))]
    OverlappingPoles { axis: String, terms: Vec<String> },

    #[error(transparent)]
    Unresolved(#[from] UnresolvedAxisError),

    #[error("axis `{axis}`: pole means coincide, direction is undefined")]
    Degenerate { axis: String },

    #[error("invalid axis `{input}`: {message} (expected name=neg1,neg2:pos1,pos2)")]
    Syntax { input: String, message: String },
}

/// A named bipolar direction defined by two disjoint term sets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticAxis {
    name: String,
    negative: Vec<String>,
    positive: Vec<String>,
}

impl SemanticAxis {
    /// Build an axis. Terms are trimmed, lowercased and deduplicated
    /// (first occurrence kept). Fails on an empty pole or shared terms.
    pub fn new<N, P, S>(name: impl Into<String>, negative: N, positive: P) -> Result<Self, AxisError>
    where
        N: IntoIterator<Item = S>,
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.into();
        let negative = clean_terms(negative);
        let positive = clean_terms(positive);

        if negative.is_empty() {
            return Err(AxisError::EmptyPole {
                axis: name,
                pole: Pole::Negative,
            });
        }
        if positive.is_empty() {
            return Err(AxisError::EmptyPole {
                axis: name,
                pole: Pole::Positive,
            });
        }

        let neg_set: BTreeSet<&str> = negative.iter().map(String::as_str).collect();
        let shared: Vec<String> = positive
            .iter()
            .filter(|t| neg_set.contains(t.as_str()))
            .cloned()
            .collect();
        if !shared.is_empty() {
            return Err(AxisError::OverlappingPoles {
                axis: name,
                terms: shared,
            });
        }

        Ok(Self {
            name,
            negative,
            positive,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn negative(&self) -> &[String] {
        &self.negative
    }

    pub fn positive(&self) -> &[String] {
        &self.positive
    }

    /// The same axis with its poles swapped.
    pub fn reversed(&self) -> Self {
        Self {
            name: self.name.clone(),
            negative: self.positive.clone(),
            positive: self.negative.clone(),
        }
    }
}

fn clean_terms<I, S>(terms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for term in terms {
        let term = term.as_ref().trim().to_lowercase();
        if !term.is_empty() && !out.contains(&term) {
            out.push(term);
        }
    }
    out
}

impl FromStr for SemanticAxis {
    type Err = AxisError;

    /// Parse `name=neg1,neg2:pos1,pos2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = |message: &str| AxisError::Syntax {
            input: s.to_string(),
            message: message.to_string(),
        };

        let (name, poles) = s.split_once('=').ok_or_else(|| syntax("missing `=`"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(syntax("empty axis name"));
        }
        let (negative, positive) = poles
            .split_once(':')
            .ok_or_else(|| syntax("missing `:` between poles"))?;

        SemanticAxis::new(name, negative.split(','), positive.split(','))
    }
}

/// An axis with a computed unit direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedAxis {
    pub name: String,
    pub direction: Vec<f64>,
    /// Fraction of negative pole terms with embeddings
    pub negative_coverage: f64,
    /// Fraction of positive pole terms with embeddings
    pub positive_coverage: f64,
}

/// Compute an axis direction from the embedding table.
pub fn resolve_axis<P>(
    axis: &SemanticAxis,
    provider: &P,
    min_coverage: f64,
) -> Result<ResolvedAxis, AxisError>
where
    P: EmbeddingProvider + ?Sized,
{
    let (neg_mean, negative_coverage) = pole_mean(axis, Pole::Negative, provider, min_coverage)?;
    let (pos_mean, positive_coverage) = pole_mean(axis, Pole::Positive, provider, min_coverage)?;

    let mut direction: Vec<f64> = pos_mean.iter().zip(&neg_mean).map(|(p, n)| p - n).collect();
    let length = norm(&direction);
    if length < f64::EPSILON {
        return Err(AxisError::Degenerate {
            axis: axis.name.clone(),
        });
    }
    for d in &mut direction {
        *d /= length;
    }

    debug!(
        axis = %axis.name,
        negative_coverage,
        positive_coverage,
        "Resolved semantic axis"
    );

    Ok(ResolvedAxis {
        name: axis.name.clone(),
        direction,
        negative_coverage,
        positive_coverage,
    })
}

fn pole_mean<P>(
    axis: &SemanticAxis,
    pole: Pole,
    provider: &P,
    min_coverage: f64,
) -> Result<(Vec<f64>, f64), UnresolvedAxisError>
where
    P: EmbeddingProvider + ?Sized,
{
    let terms = match pole {
        Pole::Negative => &axis.negative,
        Pole::Positive => &axis.positive,
    };
    let missing: Vec<String> = terms
        .iter()
        .filter(|t| provider.vector(t).is_none())
        .cloned()
        .collect();
    let found = terms.len() - missing.len();
    let coverage = found as f64 / terms.len() as f64;

    let unresolved = || UnresolvedAxisError {
        axis: axis.name.clone(),
        pole,
        found,
        total: terms.len(),
        min_coverage,
        missing: missing.clone(),
    };

    if found == 0 || coverage < min_coverage {
        return Err(unresolved());
    }
    let (mean, _) =
        mean_vector(provider, terms.iter().map(String::as_str)).ok_or_else(unresolved)?;
    Ok((mean, coverage))
}

/// Project one term. None when the term has no embedding.
pub fn project_term<P>(term: &str, axis: &ResolvedAxis, provider: &P) -> Option<f64>
where
    P: EmbeddingProvider + ?Sized,
{
    provider.vector(term).map(|v| dot(v, &axis.direction))
}

/// Projection outcome for a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentScore {
    Scored {
        score: f64,
        in_vocabulary: usize,
        total_tokens: usize,
    },
    /// No token of the document has an embedding
    Unscorable { total_tokens: usize },
}

impl DocumentScore {
    pub fn score(&self) -> Option<f64> {
        match self {
            DocumentScore::Scored { score, .. } => Some(*score),
            DocumentScore::Unscorable { .. } => None,
        }
    }

    pub fn is_scorable(&self) -> bool {
        matches!(self, DocumentScore::Scored { .. })
    }
}

/// Project a document: the mean of its in-vocabulary token vectors, dotted
/// with the axis direction.
pub fn project_document<P>(tokens: &[String], axis: &ResolvedAxis, provider: &P) -> DocumentScore
where
    P: EmbeddingProvider + ?Sized,
{
    match mean_vector(provider, tokens.iter().map(String::as_str)) {
        Some((mean, in_vocabulary)) => DocumentScore::Scored {
            score: dot(&mean, &axis.direction),
            in_vocabulary,
            total_tokens: tokens.len(),
        },
        None => DocumentScore::Unscorable {
            total_tokens: tokens.len(),
        },
    }
}
