use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::analysis::frequency::{DistinctivenessScoring, FrequencyConfig};
use crate::corpus::loader::LoaderConfig;
use crate::linkage::{CommentOrder, LinkageConfig};
use crate::pipeline::AnalysisSettings;
use crate::semantic::axis::DEFAULT_MIN_COVERAGE;
use crate::text::normalize::NormalizerOptions;
use crate::text::stopwords::StopwordProvider;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. CLI flags
/// override individual values after loading.
#[derive(Debug, Clone)]
pub struct Config {
    pub posts_path: PathBuf,
    pub comments_path: PathBuf,
    /// GloVe / word2vec text file. Axes stay unresolved without it.
    pub embeddings_path: Option<PathBuf>,
    /// Stopword language; None disables stopword removal
    pub stopword_language: Option<String>,
    pub min_token_length: usize,
    /// Additive smoothing for distinctiveness ratios
    pub smoothing: f64,
    pub min_pole_coverage: f64,
    /// Length of each ranked term list
    pub top_k: usize,
    pub comment_order: CommentOrder,
    /// CSV column names, overridable per column
    pub loader: LoaderConfig,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn load() -> Result<Self> {
        let stopword_language = match env::var("CMV_STOPWORD_LANGUAGE") {
            Ok(lang) if lang.eq_ignore_ascii_case("none") || lang.trim().is_empty() => None,
            Ok(lang) => Some(lang),
            Err(_) => Some("english".to_string()),
        };

        let comment_order = match env::var("CMV_COMMENT_ORDER").as_deref() {
            Ok("score") => CommentOrder::ScoreDescending,
            Ok("input") | Err(_) => CommentOrder::Input,
            Ok(other) => anyhow::bail!(
                "CMV_COMMENT_ORDER must be `input` or `score`, got `{other}`"
            ),
        };

        let config = Self {
            posts_path: env::var("CMV_POSTS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/submissions.csv")),
            comments_path: env::var("CMV_COMMENTS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/comments.csv")),
            embeddings_path: env::var("CMV_EMBEDDINGS_PATH").ok().map(PathBuf::from),
            stopword_language,
            min_token_length: parse_env("CMV_MIN_TOKEN_LENGTH", 2)?,
            smoothing: parse_env("CMV_SMOOTHING", 1.0)?,
            min_pole_coverage: parse_env("CMV_MIN_POLE_COVERAGE", DEFAULT_MIN_COVERAGE)?,
            top_k: parse_env("CMV_TOP_K", 25)?,
            comment_order,
            loader: loader_columns(|name| env::var(name).ok()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges. Call again after applying CLI overrides.
    pub fn validate(&self) -> Result<()> {
        if !(self.smoothing > 0.0) {
            anyhow::bail!("Smoothing must be positive, got {}", self.smoothing);
        }
        if !(self.min_pole_coverage > 0.0 && self.min_pole_coverage <= 1.0) {
            anyhow::bail!(
                "Minimum pole coverage must be in (0, 1], got {}",
                self.min_pole_coverage
            );
        }
        Ok(())
    }

    /// Normalizer options with stopwords fetched from `provider`.
    pub fn normalizer_options(&self, provider: &dyn StopwordProvider) -> Result<NormalizerOptions> {
        let options = NormalizerOptions::default().with_min_token_length(self.min_token_length);
        match &self.stopword_language {
            Some(lang) => {
                let stopwords = provider
                    .stopwords(lang)
                    .with_context(|| format!("Failed to load stopwords for `{lang}`"))?;
                Ok(options.with_stopwords(stopwords))
            }
            None => Ok(options),
        }
    }

    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            linkage: LinkageConfig {
                comment_order: self.comment_order,
            },
            frequency: FrequencyConfig {
                scoring: DistinctivenessScoring::SmoothedRatio {
                    epsilon: self.smoothing,
                },
                top_k: Some(self.top_k),
            },
            min_pole_coverage: self.min_pole_coverage,
            ..AnalysisSettings::default()
        }
    }
}

/// Column overrides for exports laid out differently from the defaults.
/// The scraper's comments file, for one, names the parent column `post_id`
/// (`CMV_COMMENT_PARENT_COLUMN=post_id`).
fn loader_columns(lookup: impl Fn(&str) -> Option<String>) -> LoaderConfig {
    let mut loader = LoaderConfig::default();
    let columns = [
        ("CMV_POST_ID_COLUMN", &mut loader.posts.id),
        ("CMV_POST_TITLE_COLUMN", &mut loader.posts.title),
        ("CMV_POST_TEXT_COLUMN", &mut loader.posts.selftext),
        ("CMV_POST_SCORE_COLUMN", &mut loader.posts.score),
        ("CMV_POST_NUM_COMMENTS_COLUMN", &mut loader.posts.num_comments),
        ("CMV_COMMENT_BODY_COLUMN", &mut loader.comments.body),
        ("CMV_COMMENT_SCORE_COLUMN", &mut loader.comments.score),
        ("CMV_COMMENT_PARENT_COLUMN", &mut loader.comments.link_id),
    ];
    for (name, column) in columns {
        if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
            *column = value.trim().to_string();
        }
    }
    if let Some(id) = lookup("CMV_COMMENT_ID_COLUMN").filter(|v| !v.trim().is_empty()) {
        loader.comments.id_candidates.insert(0, id.trim().to_string());
    }
    loader
}

fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value `{raw}`")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::text::stopwords::StaticStopwords;

    fn config() -> Config {
        Config {
            posts_path: PathBuf::from("posts.csv"),
            comments_path: PathBuf::from("comments.csv"),
            embeddings_path: None,
            stopword_language: Some("english".to_string()),
            min_token_length: 3,
            smoothing: 0.5,
            min_pole_coverage: 0.5,
            top_k: 10,
            comment_order: CommentOrder::ScoreDescending,
            loader: LoaderConfig::default(),
        }
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let mut c = config();
        assert!(c.validate().is_ok());
        c.smoothing = 0.0;
        assert!(c.validate().is_err());
        c.smoothing = 1.0;
        c.min_pole_coverage = 1.5;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_normalizer_options_use_provider() {
        let provider = StaticStopwords::new(["the"]);
        let options = config().normalizer_options(&provider).unwrap();
        assert!(options.remove_stopwords);
        assert!(options.stopwords.contains("the"));
        assert_eq!(options.min_token_length, 3);

        let mut no_stopwords = config();
        no_stopwords.stopword_language = None;
        let options = no_stopwords.normalizer_options(&provider).unwrap();
        assert!(!options.remove_stopwords);
    }

    #[test]
    fn test_analysis_settings_carry_values() {
        let settings = config().analysis_settings();
        assert_eq!(settings.frequency.top_k, Some(10));
        assert_eq!(
            settings.frequency.scoring,
            DistinctivenessScoring::SmoothedRatio { epsilon: 0.5 }
        );
        assert_eq!(settings.linkage.comment_order, CommentOrder::ScoreDescending);
    }

    #[test]
    fn test_loader_columns_default_when_unset() {
        let loader = loader_columns(|_| None);
        assert_eq!(loader.posts.id, "id");
        assert_eq!(loader.posts.selftext, "selftext");
        assert_eq!(loader.comments.link_id, "link_id");
        assert_eq!(loader.comments.id_candidates, vec!["id", "comment_id"]);
    }

    #[test]
    fn test_loader_columns_overridden() {
        let env: HashMap<&str, &str> = [
            ("CMV_COMMENT_PARENT_COLUMN", " post_id "),
            ("CMV_POST_TEXT_COLUMN", "body"),
            ("CMV_COMMENT_ID_COLUMN", "name"),
            ("CMV_POST_ID_COLUMN", ""),
        ]
        .into_iter()
        .collect();
        let loader = loader_columns(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(loader.comments.link_id, "post_id");
        assert_eq!(loader.posts.selftext, "body");
        // blank values fall back to the default
        assert_eq!(loader.posts.id, "id");
        assert_eq!(loader.comments.id_candidates[0], "name");
    }
}
