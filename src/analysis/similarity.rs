// Post-to-comments similarity within each conversation.
//
// Lexical similarity is the cosine between the post's term counts and the
// pooled term counts of its comments. Semantic similarity is the cosine
// between their mean word vectors, when an embedding table is available.
// A conversation without comments (or without usable tokens) has no score,
// which is different from a score of 0.0.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::linkage::ConversationGroup;
use crate::semantic::embeddings::{cosine, mean_vector, EmbeddingProvider};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSimilarity {
    pub post_id: String,
    pub comment_count: usize,
    /// Cosine of term counts, in [0, 1]
    pub lexical: Option<f64>,
    /// Cosine of mean embeddings, in [-1, 1]
    pub semantic: Option<f64>,
}

/// Score one conversation group.
pub fn group_similarity(
    group: &ConversationGroup<'_>,
    embeddings: Option<&dyn EmbeddingProvider>,
) -> GroupSimilarity {
    let post_tokens: Vec<&str> = group.post.tokens.iter().map(String::as_str).collect();
    let comment_tokens: Vec<&str> = group
        .comments
        .iter()
        .flat_map(|c| c.tokens.iter().map(String::as_str))
        .collect();

    let has_both = !post_tokens.is_empty() && !comment_tokens.is_empty();

    let lexical = has_both.then(|| {
        cosine_from_counts(&term_counts(&post_tokens), &term_counts(&comment_tokens))
    });

    let semantic = match embeddings {
        Some(provider) if has_both => {
            let post_mean = mean_vector(provider, post_tokens.iter().copied());
            let comment_mean = mean_vector(provider, comment_tokens.iter().copied());
            match (post_mean, comment_mean) {
                (Some((a, _)), Some((b, _))) => Some(cosine(&a, &b)),
                _ => None,
            }
        }
        _ => None,
    };

    GroupSimilarity {
        post_id: group.post_id().to_string(),
        comment_count: group.comments.len(),
        lexical,
        semantic,
    }
}

fn term_counts<'t>(tokens: &[&'t str]) -> HashMap<&'t str, f64> {
    let mut counts = HashMap::new();
    for &t in tokens {
        *counts.entry(t).or_insert(0.0) += 1.0;
    }
    counts
}

/// Cosine similarity between two sparse term weight maps, clamped to [0, 1].
///
/// Returns 0.0 when either side is empty or has zero magnitude.
pub fn cosine_from_counts(a: &HashMap<&str, f64>, b: &HashMap<&str, f64>) -> f64 {
    let keys: HashSet<&&str> = a.keys().chain(b.keys()).collect();
    if keys.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0;
    for key in keys {
        dot += a.get(*key).copied().unwrap_or(0.0) * b.get(*key).copied().unwrap_or(0.0);
    }
    let mag_a: f64 = a.values().map(|v| v * v).sum::<f64>().sqrt();
    let mag_b: f64 = b.values().map(|v| v * v).sum::<f64>().sqrt();

    let denom = mag_a * mag_b;
    if denom < f64::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(0.0, 1.0)
    }
}
