// Engagement slicing: split conversations into high and low engagement.
//
// Groups strictly above the median of the chosen metric form the
// high-engagement slice; the rest (median included) form the low slice. Each
// slice counts the post and its linked comments.

use serde::Serialize;

use super::frequency::TermStats;
use crate::linkage::{ConversationGroup, Linkage};

pub const HIGH_ENGAGEMENT: &str = "high-engagement";
pub const LOW_ENGAGEMENT: &str = "low-engagement";

/// What "engagement" means for a conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementMetric {
    /// The post's own score (missing scores read as 0)
    #[default]
    PostScore,
    /// Reddit's reported comment count (missing counts read as 0)
    NumComments,
    /// Comments actually linked in this corpus
    LinkedComments,
}

impl EngagementMetric {
    pub fn value(&self, group: &ConversationGroup<'_>) -> f64 {
        match self {
            EngagementMetric::PostScore => group.post.score_or_default() as f64,
            EngagementMetric::NumComments => group.post.num_comments.unwrap_or(0) as f64,
            EngagementMetric::LinkedComments => group.comments.len() as f64,
        }
    }
}

/// Result of splitting groups at the median of a metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementSplit {
    pub metric: EngagementMetric,
    pub median: f64,
    pub high: TermStats,
    pub low: TermStats,
    /// Post ids in the high slice, in group order
    pub high_posts: Vec<String>,
    pub low_posts: Vec<String>,
}

/// Split linked groups by engagement. Returns None when there are no groups.
pub fn split_by_engagement(linkage: &Linkage<'_>, metric: EngagementMetric) -> Option<EngagementSplit> {
    if linkage.groups.is_empty() {
        return None;
    }

    let mut values: Vec<f64> = linkage.groups.iter().map(|g| metric.value(g)).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    let median = median_of_sorted(&values);

    let mut high = TermStats::new(HIGH_ENGAGEMENT);
    let mut low = TermStats::new(LOW_ENGAGEMENT);
    let mut high_posts = Vec::new();
    let mut low_posts = Vec::new();

    for group in &linkage.groups {
        let (stats, ids) = if metric.value(group) > median {
            (&mut high, &mut high_posts)
        } else {
            (&mut low, &mut low_posts)
        };
        for doc in group.documents() {
            stats.add_document(&doc.tokens);
        }
        ids.push(group.post_id().to_string());
    }

    Some(EngagementSplit {
        metric,
        median,
        high,
        low,
        high_posts,
        low_posts,
    })
}

fn median_of_sorted(values: &[f64]) -> f64 {
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}
