// Corpus preparation: load both CSV exports and normalize every document.

use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::config::Config;
use crate::corpus::loader::load_corpus;
use crate::corpus::models::Corpus;
use crate::text::stopwords::StopwordProvider;

/// Load the configured posts and comments and tokenize them.
pub fn prepare_corpus(config: &Config, stopwords: &dyn StopwordProvider) -> Result<Corpus> {
    let options = config.normalizer_options(stopwords)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!(
        "Loading {} and {}",
        config.posts_path.display(),
        config.comments_path.display()
    ));

    let loaded = load_corpus(&config.posts_path, &config.comments_path, &config.loader)
        .with_context(|| {
            format!(
                "Failed to load corpus from {} and {}",
                config.posts_path.display(),
                config.comments_path.display()
            )
        });
    let mut corpus = match loaded {
        Ok(corpus) => corpus,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };

    spinner.set_message("Normalizing text");
    corpus.tokenize(&options);
    spinner.finish_and_clear();

    let tokens: usize = corpus.documents().iter().map(|d| d.tokens.len()).sum();
    info!(
        documents = corpus.documents().len(),
        tokens,
        stopwords = options.stopwords.len(),
        "Corpus normalized"
    );

    Ok(corpus)
}
