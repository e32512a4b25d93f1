// Deterministic text normalizer.
//
// The stages always run in this order, because later stages assume the
// earlier ones already ran (stopword lists are lowercase, the length filter
// measures cleaned tokens):
//
//   1. URL / markup stripping
//   2. lowercasing
//   3. punctuation stripping
//   4. whitespace tokenization
//   5. stopword removal
//   6. minimum length filter
//
// Each stage can be switched off except tokenization. `normalize` holds no
// state between calls.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex_lite::Regex;

/// `[link text](target)` keeps the link text.
static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("markdown link pattern is valid")
});

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:https?://|www\.)\S+").expect("url pattern is valid")
});

/// Reddit exports keep HTML entities (`&gt;` for quotes, `&amp;`, `&#x200B;`).
static HTML_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:[a-zA-Z]+|#[0-9]+|#[xX][0-9a-fA-F]+);").expect("entity pattern is valid")
});

/// Normalizer switches. The stopword set is supplied by the caller,
/// typically from a `StopwordProvider`.
#[derive(Debug, Clone)]
pub struct NormalizerOptions {
    pub lowercase: bool,
    pub strip_punctuation: bool,
    /// Strip URLs and markup (markdown links, HTML entities)
    pub strip_urls: bool,
    pub remove_stopwords: bool,
    /// Tokens shorter than this many characters are dropped
    pub min_token_length: usize,
    /// Lowercase stopwords, used when `remove_stopwords` is set
    pub stopwords: HashSet<String>,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            lowercase: true,
            strip_punctuation: true,
            strip_urls: true,
            remove_stopwords: false,
            min_token_length: 1,
            stopwords: HashSet::new(),
        }
    }
}

impl NormalizerOptions {
    /// Enable stopword removal with the given set.
    pub fn with_stopwords(mut self, stopwords: HashSet<String>) -> Self {
        self.stopwords = stopwords;
        self.remove_stopwords = true;
        self
    }

    pub fn with_min_token_length(mut self, min_token_length: usize) -> Self {
        self.min_token_length = min_token_length;
        self
    }
}

/// Turn raw text into a normalized token sequence.
///
/// Empty or whitespace-only input yields an empty sequence.
pub fn normalize(raw_text: &str, options: &NormalizerOptions) -> Vec<String> {
    if raw_text.trim().is_empty() {
        return Vec::new();
    }

    let mut text = if options.strip_urls {
        strip_markup(raw_text)
    } else {
        raw_text.to_string()
    };

    if options.lowercase {
        text = text.to_lowercase();
    }

    if options.strip_punctuation {
        text = strip_punctuation(&text);
    }

    text.split_whitespace()
        .filter(|t| !(options.remove_stopwords && options.stopwords.contains(*t)))
        .filter(|t| t.chars().count() >= options.min_token_length)
        .map(str::to_string)
        .collect()
}

fn strip_markup(text: &str) -> String {
    // Nested links ("[[a](b)](c)") unwrap one level per pass. Every pass
    // shortens the text, so this terminates.
    let mut text = text.to_string();
    while MARKDOWN_LINK.is_match(&text) {
        text = MARKDOWN_LINK.replace_all(&text, "$1").into_owned();
    }
    let text = URL.replace_all(&text, " ");
    HTML_ENTITY.replace_all(&text, " ").into_owned()
}

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

/// Replace punctuation with spaces. An apostrophe between two alphanumerics
/// is kept (as `'`) so contractions still match stopword lists.
fn strip_punctuation(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() || c.is_whitespace() {
            out.push(c);
        } else if is_apostrophe(c)
            && i > 0
            && chars[i - 1].is_alphanumeric()
            && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric())
        {
            out.push('\'');
        } else {
            out.push(' ');
        }
    }

    out
}
