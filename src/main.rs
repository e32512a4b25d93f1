use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use cmv_corpus::config::Config;
use cmv_corpus::linkage::build_groups;
use cmv_corpus::semantic::{EmbeddingProvider, EmbeddingTable, SemanticAxis};
use cmv_corpus::text::normalize::normalize;
use cmv_corpus::text::stopwords::BundledStopwords;

/// cmv-corpus: link r/ChangeMyView posts to their comments and compare
/// how the two talk.
#[derive(Parser)]
#[command(name = "cmv-corpus", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis and print a report
    Analyze {
        /// Posts CSV (overrides CMV_POSTS_PATH)
        #[arg(long)]
        posts: Option<PathBuf>,

        /// Comments CSV (overrides CMV_COMMENTS_PATH)
        #[arg(long)]
        comments: Option<PathBuf>,

        /// Word embeddings in GloVe/word2vec text format
        #[arg(long)]
        embeddings: Option<PathBuf>,

        /// Semantic axis as name=neg1,neg2:pos1,pos2 (repeatable)
        #[arg(long = "axis", value_name = "AXIS")]
        axes: Vec<String>,

        /// Length of each ranked term list
        #[arg(long)]
        top_k: Option<usize>,

        /// Also write the full result as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Show how posts and comments link up
    Link {
        #[arg(long)]
        posts: Option<PathBuf>,

        #[arg(long)]
        comments: Option<PathBuf>,
    },

    /// Print the normalized tokens of a piece of text
    Normalize {
        /// The text to normalize
        text: String,
    },
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cmv_corpus=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            posts,
            comments,
            embeddings,
            axes,
            top_k,
            json,
        } => {
            let mut config = Config::load()?;
            apply_paths(&mut config, posts, comments);
            if let Some(path) = embeddings {
                config.embeddings_path = Some(path);
            }
            if let Some(k) = top_k {
                config.top_k = k;
            }
            config.validate()?;

            let axes = axes
                .iter()
                .map(|a| a.parse::<SemanticAxis>())
                .collect::<Result<Vec<_>, _>>()?;

            let corpus = cmv_corpus::pipeline::prepare_corpus(&config, &BundledStopwords)?;

            let table = match &config.embeddings_path {
                Some(path) => {
                    println!("Loading embeddings from {}...", path.display());
                    Some(EmbeddingTable::load(path).with_context(|| {
                        format!("Failed to load embeddings from {}", path.display())
                    })?)
                }
                None => {
                    if !axes.is_empty() {
                        println!(
                            "{}",
                            "No embeddings configured; axes will be reported as unresolved."
                                .yellow()
                        );
                    }
                    None
                }
            };
            let provider = table.as_ref().map(|t| t as &dyn EmbeddingProvider);

            let result = cmv_corpus::pipeline::analyze(
                &corpus,
                provider,
                &axes,
                &config.analysis_settings(),
            );

            cmv_corpus::output::terminal::display_analysis(&result, config.top_k.min(15));

            if let Some(path) = json {
                cmv_corpus::output::write_json(&result, &path)?;
                info!(path = %path.display(), "Wrote JSON result");
                println!("\nFull result written to {}", path.display());
            }
        }

        Commands::Link { posts, comments } => {
            let mut config = Config::load()?;
            apply_paths(&mut config, posts, comments);

            let corpus = cmv_corpus::pipeline::prepare_corpus(&config, &BundledStopwords)?;
            let linkage = build_groups(corpus.documents(), &config.analysis_settings().linkage);

            println!(
                "\n{}",
                format!(
                    "=== Linkage ({} posts, {} comments) ===",
                    corpus.post_count(),
                    corpus.comment_count()
                )
                .bold()
            );
            cmv_corpus::output::terminal::display_coverage(&linkage.coverage());
        }

        Commands::Normalize { text } => {
            let config = Config::load()?;
            let options = config.normalizer_options(&BundledStopwords)?;
            let tokens = normalize(&text, &options);
            println!("{}", tokens.join(" "));
        }
    }

    Ok(())
}

fn apply_paths(config: &mut Config, posts: Option<PathBuf>, comments: Option<PathBuf>) {
    if let Some(path) = posts {
        config.posts_path = path;
    }
    if let Some(path) = comments {
        config.comments_path = path;
    }
}
