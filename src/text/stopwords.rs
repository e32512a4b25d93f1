// Stopword providers: injected into the normalizer, never hard-coded there.

use std::collections::HashSet;

use anyhow::Result;
use stop_words::{get, LANGUAGE};

/// Source of stopword sets by language name.
pub trait StopwordProvider {
    /// Lowercase stopwords for `language` (e.g. "english", "en").
    fn stopwords(&self, language: &str) -> Result<HashSet<String>>;
}

/// Stopword lists bundled with the `stop-words` crate.
pub struct BundledStopwords;

impl StopwordProvider for BundledStopwords {
    fn stopwords(&self, language: &str) -> Result<HashSet<String>> {
        let lang = match language.trim().to_lowercase().as_str() {
            "english" | "en" => LANGUAGE::English,
            "french" | "fr" => LANGUAGE::French,
            "german" | "de" => LANGUAGE::German,
            "spanish" | "es" => LANGUAGE::Spanish,
            "italian" | "it" => LANGUAGE::Italian,
            "portuguese" | "pt" => LANGUAGE::Portuguese,
            other => anyhow::bail!(
                "Unsupported stopword language `{other}` \
                 (expected english, french, german, spanish, italian or portuguese)"
            ),
        };

        let words: Vec<String> = get(lang);
        Ok(words.into_iter().map(|w| w.to_lowercase()).collect())
    }
}

/// A fixed in-memory stopword set, returned for every language.
#[derive(Debug, Clone, Default)]
pub struct StaticStopwords {
    words: HashSet<String>,
}

impl StaticStopwords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }
}

impl StopwordProvider for StaticStopwords {
    fn stopwords(&self, _language: &str) -> Result<HashSet<String>> {
        Ok(self.words.clone())
    }
}
