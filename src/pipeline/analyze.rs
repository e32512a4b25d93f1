// Analysis pipeline: linkage, frequency contrasts, similarity, axes.
//
// Pure function of its inputs. The corpus must already be tokenized (see
// `prepare_corpus` or `Corpus::tokenize`). Axis failures are recorded per
// axis and never stop the remaining axes.

use tracing::{info, warn};

use crate::analysis::engagement::{split_by_engagement, EngagementMetric};
use crate::analysis::frequency::{compare, Comparison, FrequencyConfig, TermStats};
use crate::analysis::keywords::top_keywords;
use crate::analysis::similarity::group_similarity;
use crate::corpus::models::{Corpus, DocType};
use crate::linkage::{build_groups, LinkageConfig};
use crate::report::{
    AnalysisResult, AxisProjection, AxisReport, CorpusSummary, DocumentProjection,
    EngagementReport, ReportParts, TermProjection, TypeMean,
};
use crate::semantic::axis::{
    project_document, project_term, resolve_axis, ResolvedAxis, SemanticAxis,
    DEFAULT_MIN_COVERAGE,
};
use crate::semantic::embeddings::EmbeddingProvider;

pub const POSTS_SLICE: &str = "posts";
pub const COMMENTS_SLICE: &str = "comments";

/// Knobs for a full analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub linkage: LinkageConfig,
    pub frequency: FrequencyConfig,
    pub engagement_metric: EngagementMetric,
    /// TF-IDF keywords kept per slice
    pub keywords: usize,
    /// Minimum fraction of each pole that needs embeddings
    pub min_pole_coverage: f64,
    /// Distinctive terms per slice projected onto each axis
    pub projected_terms: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            linkage: LinkageConfig::default(),
            frequency: FrequencyConfig {
                top_k: Some(25),
                ..Default::default()
            },
            engagement_metric: EngagementMetric::default(),
            keywords: 15,
            min_pole_coverage: DEFAULT_MIN_COVERAGE,
            projected_terms: 10,
        }
    }
}

/// Run every analysis component and assemble the result.
pub fn analyze(
    corpus: &Corpus,
    embeddings: Option<&dyn EmbeddingProvider>,
    axes: &[SemanticAxis],
    settings: &AnalysisSettings,
) -> AnalysisResult {
    // Step 1: link comments to posts
    let linkage = build_groups(corpus.documents(), &settings.linkage);

    // Step 2: posts vs comments. Orphans stay in the comments slice.
    let posts = TermStats::from_documents(POSTS_SLICE, corpus.posts());
    let comments = TermStats::from_documents(COMMENTS_SLICE, corpus.comments());
    let by_type = compare(&posts, &comments, &settings.frequency);

    let mut term_stats = vec![posts, comments];
    let mut comparisons = vec![by_type];

    // Step 3: high vs low engagement conversations
    let engagement = split_by_engagement(&linkage, settings.engagement_metric).map(|split| {
        comparisons.push(compare(&split.high, &split.low, &settings.frequency));
        let report = EngagementReport {
            metric: split.metric,
            median: split.median,
            high_posts: split.high_posts,
            low_posts: split.low_posts,
        };
        term_stats.push(split.high);
        term_stats.push(split.low);
        report
    });

    // Step 4: TF-IDF keywords per document type
    let keywords = vec![
        top_keywords(POSTS_SLICE, corpus.posts(), settings.keywords),
        top_keywords(COMMENTS_SLICE, corpus.comments(), settings.keywords),
    ];

    // Step 5: post/comment similarity for each conversation
    let group_similarity = linkage
        .groups
        .iter()
        .map(|g| group_similarity(g, embeddings))
        .collect();

    // Step 6: semantic axes
    let axis_reports = axes
        .iter()
        .map(|axis| {
            let report = match embeddings {
                Some(provider) => axis_report(corpus, axis, provider, &comparisons[0], settings),
                None => AxisReport::Unresolved {
                    reason: "no embedding table supplied".to_string(),
                },
            };
            (axis.name().to_string(), report)
        })
        .collect();

    let result = AnalysisResult::assemble(ReportParts {
        corpus: CorpusSummary {
            posts: corpus.post_count(),
            comments: corpus.comment_count(),
        },
        coverage: linkage.coverage(),
        term_stats,
        comparisons,
        keywords,
        group_similarity,
        axes: axis_reports,
        engagement,
        load_diagnostics: corpus.diagnostics().clone(),
        orphan_ids: linkage.orphans.iter().map(|d| d.doc_id.clone()).collect(),
    });

    info!(
        posts = result.corpus().posts,
        comments = result.corpus().comments,
        orphans = result.diagnostics().orphan_count,
        axes = axes.len(),
        unresolved_axes = result.diagnostics().unresolved_axes.len(),
        "Analysis complete"
    );

    result
}

fn axis_report(
    corpus: &Corpus,
    axis: &SemanticAxis,
    provider: &dyn EmbeddingProvider,
    by_type: &Comparison,
    settings: &AnalysisSettings,
) -> AxisReport {
    let resolved = match resolve_axis(axis, provider, settings.min_pole_coverage) {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!(axis = %axis.name(), error = %e, "Axis unresolved");
            return AxisReport::Unresolved {
                reason: e.to_string(),
            };
        }
    };

    // Unknown terms are skipped; they have no position on the axis.
    let mut terms = Vec::new();
    for ranking in [&by_type.a, &by_type.b] {
        for t in ranking.distinctive.iter().take(settings.projected_terms) {
            if let Some(score) = project_term(&t.term, &resolved, provider) {
                terms.push(TermProjection {
                    term: t.term.clone(),
                    slice: ranking.slice.clone(),
                    score,
                });
            }
        }
    }

    let documents: Vec<DocumentProjection> = corpus
        .documents()
        .iter()
        .map(|d| DocumentProjection {
            doc_id: d.doc_id.clone(),
            doc_type: d.doc_type,
            score: project_document(&d.tokens, &resolved, provider),
        })
        .collect();

    let means = [DocType::Post, DocType::Comment]
        .into_iter()
        .map(|doc_type| type_mean(&documents, doc_type))
        .collect();

    let ResolvedAxis {
        negative_coverage,
        positive_coverage,
        ..
    } = resolved;

    AxisReport::Resolved(AxisProjection {
        negative_coverage,
        positive_coverage,
        terms,
        documents,
        means,
    })
}

fn type_mean(documents: &[DocumentProjection], doc_type: DocType) -> TypeMean {
    let of_type = documents.iter().filter(|d| d.doc_type == doc_type);
    let scores: Vec<f64> = of_type.clone().filter_map(|d| d.score.score()).collect();
    let unscorable = of_type.count() - scores.len();

    TypeMean {
        doc_type,
        mean: (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64),
        scored: scores.len(),
        unscorable,
    }
}
