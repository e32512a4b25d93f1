// Report aggregation: the single immutable result handed to presentation.
//
// Nothing is computed here. The aggregator tags each piece with where it
// came from (which slice, comparison, group or axis) and freezes the lot.

use serde::Serialize;

use crate::analysis::engagement::EngagementMetric;
use crate::analysis::frequency::{Comparison, TermStats};
use crate::analysis::keywords::SliceKeywords;
use crate::analysis::similarity::GroupSimilarity;
use crate::corpus::models::{DocType, LoadDiagnostics};
use crate::linkage::LinkageCoverage;
use crate::semantic::axis::DocumentScore;

/// Where a piece of the result came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    Slice { slice: String },
    Comparison { a: String, b: String },
    Group { post_id: String },
    Axis { axis: String },
}

/// A value tagged with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tagged<T> {
    pub provenance: Provenance,
    pub value: T,
}

impl<T> Tagged<T> {
    fn new(provenance: Provenance, value: T) -> Self {
        Self { provenance, value }
    }
}

/// One term's position on an axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermProjection {
    pub term: String,
    /// The slice whose distinctive-term list the term was taken from
    pub slice: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentProjection {
    pub doc_id: String,
    pub doc_type: DocType,
    pub score: DocumentScore,
}

/// Mean document score per document type, over scorable documents only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeMean {
    pub doc_type: DocType,
    pub mean: Option<f64>,
    pub scored: usize,
    pub unscorable: usize,
}

/// Projections for a resolved axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisProjection {
    pub negative_coverage: f64,
    pub positive_coverage: f64,
    pub terms: Vec<TermProjection>,
    pub documents: Vec<DocumentProjection>,
    pub means: Vec<TypeMean>,
}

impl AxisProjection {
    pub fn unscorable_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| !d.score.is_scorable())
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AxisReport {
    Resolved(AxisProjection),
    Unresolved { reason: String },
}

/// Engagement comparison between high and low conversations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementReport {
    pub metric: EngagementMetric,
    pub median: f64,
    pub high_posts: Vec<String>,
    pub low_posts: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorpusSummary {
    pub posts: usize,
    pub comments: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnresolvedAxis {
    pub axis: String,
    pub reason: String,
}

/// Visible gaps: everything skipped, defaulted or left unscored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub load: LoadDiagnostics,
    pub orphan_count: usize,
    pub orphan_ids: Vec<String>,
    pub unresolved_axes: Vec<UnresolvedAxis>,
    /// (axis, number of unscorable documents)
    pub unscorable_documents: Vec<(String, usize)>,
}

/// Raw outputs of the analysis components, before tagging.
#[derive(Debug, Clone)]
pub struct ReportParts {
    pub corpus: CorpusSummary,
    pub coverage: LinkageCoverage,
    pub term_stats: Vec<TermStats>,
    pub comparisons: Vec<Comparison>,
    pub keywords: Vec<SliceKeywords>,
    pub group_similarity: Vec<GroupSimilarity>,
    /// (axis name, report)
    pub axes: Vec<(String, AxisReport)>,
    pub engagement: Option<EngagementReport>,
    pub load_diagnostics: LoadDiagnostics,
    pub orphan_ids: Vec<String>,
}

/// The complete, immutable analysis output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    corpus: CorpusSummary,
    coverage: LinkageCoverage,
    term_stats: Vec<Tagged<TermStats>>,
    comparisons: Vec<Tagged<Comparison>>,
    keywords: Vec<Tagged<SliceKeywords>>,
    group_similarity: Vec<Tagged<GroupSimilarity>>,
    axes: Vec<Tagged<AxisReport>>,
    engagement: Option<EngagementReport>,
    diagnostics: Diagnostics,
}

impl AnalysisResult {
    /// Tag every part with its provenance and collect the diagnostics.
    pub fn assemble(parts: ReportParts) -> Self {
        let unresolved_axes = parts
            .axes
            .iter()
            .filter_map(|(axis, report)| match report {
                AxisReport::Unresolved { reason } => Some(UnresolvedAxis {
                    axis: axis.clone(),
                    reason: reason.clone(),
                }),
                AxisReport::Resolved(_) => None,
            })
            .collect();
        let unscorable_documents = parts
            .axes
            .iter()
            .filter_map(|(axis, report)| match report {
                AxisReport::Resolved(p) => Some((axis.clone(), p.unscorable_count())),
                AxisReport::Unresolved { .. } => None,
            })
            .collect();

        let diagnostics = Diagnostics {
            load: parts.load_diagnostics,
            orphan_count: parts.orphan_ids.len(),
            orphan_ids: parts.orphan_ids,
            unresolved_axes,
            unscorable_documents,
        };

        Self {
            corpus: parts.corpus,
            coverage: parts.coverage,
            term_stats: parts
                .term_stats
                .into_iter()
                .map(|s| Tagged::new(Provenance::Slice { slice: s.label.clone() }, s))
                .collect(),
            comparisons: parts
                .comparisons
                .into_iter()
                .map(|c| {
                    let provenance = Provenance::Comparison {
                        a: c.a.slice.clone(),
                        b: c.b.slice.clone(),
                    };
                    Tagged::new(provenance, c)
                })
                .collect(),
            keywords: parts
                .keywords
                .into_iter()
                .map(|k| Tagged::new(Provenance::Slice { slice: k.slice.clone() }, k))
                .collect(),
            group_similarity: parts
                .group_similarity
                .into_iter()
                .map(|g| Tagged::new(Provenance::Group { post_id: g.post_id.clone() }, g))
                .collect(),
            axes: parts
                .axes
                .into_iter()
                .map(|(axis, report)| Tagged::new(Provenance::Axis { axis }, report))
                .collect(),
            engagement: parts.engagement,
            diagnostics,
        }
    }

    pub fn corpus(&self) -> CorpusSummary {
        self.corpus
    }

    pub fn coverage(&self) -> LinkageCoverage {
        self.coverage
    }

    pub fn term_stats(&self) -> &[Tagged<TermStats>] {
        &self.term_stats
    }

    pub fn comparisons(&self) -> &[Tagged<Comparison>] {
        &self.comparisons
    }

    pub fn keywords(&self) -> &[Tagged<SliceKeywords>] {
        &self.keywords
    }

    pub fn group_similarity(&self) -> &[Tagged<GroupSimilarity>] {
        &self.group_similarity
    }

    pub fn axes(&self) -> &[Tagged<AxisReport>] {
        &self.axes
    }

    pub fn engagement(&self) -> Option<&EngagementReport> {
        self.engagement.as_ref()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Term stats for a slice label.
    pub fn slice(&self, label: &str) -> Option<&TermStats> {
        self.term_stats
            .iter()
            .map(|t| &t.value)
            .find(|s| s.label == label)
    }

    /// The comparison whose first slice is `a` and second is `b`.
    pub fn comparison(&self, a: &str, b: &str) -> Option<&Comparison> {
        self.comparisons
            .iter()
            .map(|t| &t.value)
            .find(|c| c.a.slice == a && c.b.slice == b)
    }

    /// The report for a named axis.
    pub fn axis(&self, name: &str) -> Option<&AxisReport> {
        self.axes
            .iter()
            .find(|t| matches!(&t.provenance, Provenance::Axis { axis } if axis == name))
            .map(|t| &t.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_parts() -> ReportParts {
        ReportParts {
            corpus: CorpusSummary {
                posts: 0,
                comments: 0,
            },
            coverage: LinkageCoverage {
                groups: 0,
                groups_with_comments: 0,
                groups_without_comments: 0,
                linked_comments: 0,
                orphan_comments: 0,
            },
            term_stats: vec![],
            comparisons: vec![],
            keywords: vec![],
            group_similarity: vec![],
            axes: vec![],
            engagement: None,
            load_diagnostics: LoadDiagnostics::default(),
            orphan_ids: vec![],
        }
    }

    #[test]
    fn test_assemble_tags_slices() {
        let mut parts = empty_parts();
        parts.term_stats.push(TermStats::new("posts"));
        let result = AnalysisResult::assemble(parts);
        assert_eq!(
            result.term_stats()[0].provenance,
            Provenance::Slice {
                slice: "posts".to_string()
            }
        );
        assert!(result.slice("posts").is_some());
        assert!(result.slice("comments").is_none());
    }

    #[test]
    fn test_assemble_collects_unresolved_axes() {
        let mut parts = empty_parts();
        parts.axes.push((
            "politics".to_string(),
            AxisReport::Unresolved {
                reason: "no vectors".to_string(),
            },
        ));
        parts.orphan_ids = vec!["c9".to_string()];
        let result = AnalysisResult::assemble(parts);
        let diag = result.diagnostics();
        assert_eq!(diag.orphan_count, 1);
        assert_eq!(diag.unresolved_axes.len(), 1);
        assert_eq!(diag.unresolved_axes[0].axis, "politics");
        assert!(diag.unscorable_documents.is_empty());
        assert!(matches!(
            result.axis("politics"),
            Some(AxisReport::Unresolved { .. })
        ));
    }
}
