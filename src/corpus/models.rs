// Data models: the validated records every downstream component consumes.
//
// Rows are checked once at load time. Absent values stay absent (Option)
// instead of turning into sentinel zeros or NaNs.

use serde::{Deserialize, Serialize};

use super::error::{EncodingError, RowIssue};
use crate::text::normalize::{normalize, NormalizerOptions};

/// Which table a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Post,
    Comment,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Post => "post",
            DocType::Comment => "comment",
        }
    }
}

impl std::fmt::Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One post or one comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: String,
    pub doc_type: DocType,
    /// Post: title and selftext joined by a blank line. Comment: body.
    /// Empty when the source field was missing.
    pub raw_text: String,
    /// Post title on its own (posts only)
    pub title: Option<String>,
    /// The post this comment replies to (comments only)
    pub parent_id: Option<String>,
    /// None when the source score was missing or not a number
    pub score: Option<i64>,
    /// Comment count reported by Reddit (posts only)
    pub num_comments: Option<u32>,
    /// Normalized tokens, filled by `Corpus::tokenize`
    pub tokens: Vec<String>,
    /// 1-based data row in the source table
    pub row: usize,
}

impl Document {
    /// Score with the documented default of 0 for missing values.
    pub fn score_or_default(&self) -> i64 {
        self.score.unwrap_or(0)
    }

    pub fn is_post(&self) -> bool {
        self.doc_type == DocType::Post
    }

    pub fn is_comment(&self) -> bool {
        self.doc_type == DocType::Comment
    }
}

/// Everything that went wrong (without aborting) while loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadDiagnostics {
    pub encoding_errors: Vec<EncodingError>,
    pub malformed_rows: Vec<RowIssue>,
    /// Documents whose score was missing and now reads as 0
    pub defaulted_scores: Vec<String>,
    /// Posts sharing an id with an earlier post
    pub duplicate_posts: usize,
    /// Comments sharing an (id, link_id) pair with an earlier comment
    pub duplicate_comments: usize,
}

impl LoadDiagnostics {
    pub fn skipped_rows(&self) -> usize {
        self.encoding_errors.len() + self.malformed_rows.len()
    }
}

/// The owned document collection produced by the loader.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    diagnostics: LoadDiagnostics,
}

impl Corpus {
    pub fn new(documents: Vec<Document>, diagnostics: LoadDiagnostics) -> Self {
        Self {
            documents,
            diagnostics,
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn diagnostics(&self) -> &LoadDiagnostics {
        &self.diagnostics
    }

    pub fn posts(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter().filter(|d| d.is_post())
    }

    pub fn comments(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter().filter(|d| d.is_comment())
    }

    pub fn post_count(&self) -> usize {
        self.posts().count()
    }

    pub fn comment_count(&self) -> usize {
        self.comments().count()
    }

    /// Run the normalizer over every document, replacing its tokens.
    pub fn tokenize(&mut self, options: &NormalizerOptions) {
        for doc in &mut self.documents {
            doc.tokens = normalize(&doc.raw_text, options);
        }
    }
}
