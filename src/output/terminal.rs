// Colored terminal output for analysis results.
//
// This module handles all terminal-specific formatting. main.rs delegates
// here after the pipeline returns.

use colored::Colorize;

use super::format_score;
use crate::analysis::frequency::SliceRanking;
use crate::corpus::models::LoadDiagnostics;
use crate::linkage::LinkageCoverage;
use crate::report::{AnalysisResult, AxisReport, Diagnostics, Provenance};

/// Display the whole analysis.
pub fn display_analysis(result: &AnalysisResult, top: usize) {
    let corpus = result.corpus();
    println!(
        "\n{}",
        format!(
            "=== CMV Corpus Analysis ({} posts, {} comments) ===",
            corpus.posts, corpus.comments
        )
        .bold()
    );

    display_coverage(&result.coverage());

    for tagged in result.comparisons() {
        let cmp = &tagged.value;
        println!(
            "\n{}",
            format!("--- {} vs {} ---", cmp.a.slice, cmp.b.slice).bold()
        );
        display_ranking(&cmp.a, top);
        display_ranking(&cmp.b, top);
    }

    if let Some(engagement) = result.engagement() {
        println!(
            "\n  Engagement split on {:?} at median {:.1}: {} high / {} low",
            engagement.metric,
            engagement.median,
            engagement.high_posts.len(),
            engagement.low_posts.len()
        );
    }

    println!("\n{}", "--- TF-IDF keywords ---".bold());
    for tagged in result.keywords() {
        let words: Vec<&str> = tagged
            .value
            .keywords
            .iter()
            .take(top)
            .map(|k| k.term.as_str())
            .collect();
        println!("  {:<10} {}", tagged.value.slice, words.join(", ").dimmed());
    }

    display_similarity(result);
    display_axes(result, top);
    display_diagnostics(result.diagnostics());
}

/// Display linkage coverage counts.
pub fn display_coverage(coverage: &LinkageCoverage) {
    println!();
    println!(
        "  Conversations: {} ({} with comments, {} without)",
        coverage.groups, coverage.groups_with_comments, coverage.groups_without_comments
    );
    let orphans = if coverage.orphan_comments > 0 {
        coverage.orphan_comments.to_string().yellow()
    } else {
        coverage.orphan_comments.to_string().green()
    };
    println!(
        "  Comments: {} linked, {} orphaned",
        coverage.linked_comments, orphans
    );
}

fn display_ranking(ranking: &SliceRanking, top: usize) {
    println!(
        "\n  Most distinctive in {} (vs {}):",
        ranking.slice.bold(),
        ranking.other
    );
    for (i, term) in ranking.distinctive.iter().take(top).enumerate() {
        println!(
            "    {:>2}. {:<24} {:>7.2}  ({} vs {})",
            i + 1,
            term.term,
            term.score,
            term.count,
            term.other_count
        );
    }
    if !ranking.unique.is_empty() {
        let unique: Vec<String> = ranking
            .unique
            .iter()
            .take(top)
            .map(|u| format!("{} ({})", u.term, u.count))
            .collect();
        println!("    Only in {}: {}", ranking.slice, unique.join(", ").dimmed());
    }
}

fn display_similarity(result: &AnalysisResult) {
    let scored: Vec<f64> = result
        .group_similarity()
        .iter()
        .filter_map(|g| g.value.lexical)
        .collect();
    if scored.is_empty() {
        return;
    }
    let mean = scored.iter().sum::<f64>() / scored.len() as f64;
    let semantic: Vec<f64> = result
        .group_similarity()
        .iter()
        .filter_map(|g| g.value.semantic)
        .collect();
    let semantic_mean =
        (!semantic.is_empty()).then(|| semantic.iter().sum::<f64>() / semantic.len() as f64);

    println!("\n{}", "--- Post/comment similarity ---".bold());
    println!(
        "  Lexical mean {:.3} over {} conversations  |  Semantic mean {}",
        mean,
        scored.len(),
        format_score(semantic_mean)
    );
}

fn display_axes(result: &AnalysisResult, top: usize) {
    if result.axes().is_empty() {
        return;
    }
    println!("\n{}", "--- Semantic axes ---".bold());

    for tagged in result.axes() {
        let Provenance::Axis { axis } = &tagged.provenance else {
            continue;
        };
        match &tagged.value {
            AxisReport::Unresolved { reason } => {
                println!("  {} {}", axis.bold(), "unresolved".red());
                println!("    {}", reason.dimmed());
            }
            AxisReport::Resolved(projection) => {
                println!(
                    "  {} (pole coverage {:.0}% / {:.0}%)",
                    axis.bold(),
                    projection.negative_coverage * 100.0,
                    projection.positive_coverage * 100.0
                );
                for mean in &projection.means {
                    println!(
                        "    {:<8} mean {}  ({} scored, {} unscorable)",
                        mean.doc_type.as_str(),
                        colorize_score(mean.mean),
                        mean.scored,
                        mean.unscorable
                    );
                }
                let mut terms: Vec<_> = projection.terms.iter().collect();
                terms.sort_by(|a, b| b.score.total_cmp(&a.score));
                for term in terms.iter().take(top) {
                    println!(
                        "    {:<24} {}  [{}]",
                        term.term,
                        colorize_score(Some(term.score)),
                        term.slice.dimmed()
                    );
                }
            }
        }
    }
}

fn display_diagnostics(diag: &Diagnostics) {
    let load: &LoadDiagnostics = &diag.load;
    let has_issues = load.skipped_rows() > 0
        || !load.defaulted_scores.is_empty()
        || load.duplicate_posts > 0
        || load.duplicate_comments > 0
        || diag.orphan_count > 0
        || !diag.unresolved_axes.is_empty();
    if !has_issues {
        return;
    }

    println!("\n{}", "--- Diagnostics ---".bold());
    if !load.encoding_errors.is_empty() {
        println!(
            "  {} {} rows skipped (invalid UTF-8)",
            "!".yellow(),
            load.encoding_errors.len()
        );
    }
    if !load.malformed_rows.is_empty() {
        println!(
            "  {} {} rows skipped (malformed)",
            "!".yellow(),
            load.malformed_rows.len()
        );
    }
    if !load.defaulted_scores.is_empty() {
        println!(
            "  {} {} documents had no score (read as 0)",
            "~".yellow(),
            load.defaulted_scores.len()
        );
    }
    if load.duplicate_posts > 0 || load.duplicate_comments > 0 {
        println!(
            "  {} duplicates retained: {} posts, {} comments",
            "~".yellow(),
            load.duplicate_posts,
            load.duplicate_comments
        );
    }
    if diag.orphan_count > 0 {
        println!(
            "  {} {} orphaned comments (parent post not in corpus)",
            "~".yellow(),
            diag.orphan_count
        );
    }
    for unresolved in &diag.unresolved_axes {
        println!("  {} axis {} unresolved", "!".red(), unresolved.axis);
    }
}

/// Negative scores lean to the negative pole, positive to the positive one.
fn colorize_score(score: Option<f64>) -> colored::ColoredString {
    let text = format_score(score);
    match score {
        Some(s) if s > 0.0 => text.bright_blue(),
        Some(s) if s < 0.0 => text.bright_magenta(),
        Some(_) => text.normal(),
        None => text.dimmed(),
    }
}
