// TF-IDF keyword extraction per slice.
//
// Uses the `keyword_extraction` crate with each document as its own TF-IDF
// document, so words spread evenly across a slice are downweighted and words
// concentrated in a few documents rise. Input is the already-normalized token
// sequence rejoined with spaces, which is why no stopword list is passed here.

use keyword_extraction::tf_idf::{TfIdf, TfIdfParams};
use serde::Serialize;
use tracing::debug;

use crate::corpus::models::Document;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyword {
    pub term: String,
    pub score: f32,
}

/// The top TF-IDF keywords of a slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceKeywords {
    pub slice: String,
    pub keywords: Vec<Keyword>,
}

/// Extract the `n` best TF-IDF keywords from a slice's documents.
///
/// Documents without tokens are ignored; an empty slice yields no keywords.
pub fn top_keywords<'a, I>(label: impl Into<String>, documents: I, n: usize) -> SliceKeywords
where
    I: IntoIterator<Item = &'a Document>,
{
    let slice = label.into();
    let texts: Vec<String> = documents
        .into_iter()
        .filter(|d| !d.tokens.is_empty())
        .map(|d| d.tokens.join(" "))
        .collect();

    if texts.is_empty() || n == 0 {
        return SliceKeywords {
            slice,
            keywords: Vec::new(),
        };
    }

    let no_stop_words: Vec<String> = Vec::new();
    let params = TfIdfParams::UnprocessedDocuments(&texts, &no_stop_words, None);
    let tfidf = TfIdf::new(params);

    // Rank every word, then cut: the crate's own order for equal scores
    // follows its hash map and changes between runs.
    let vocabulary_bound: usize = texts.iter().map(String::len).sum();
    let mut keywords: Vec<Keyword> = tfidf
        .get_ranked_word_scores(vocabulary_bound)
        .into_iter()
        .map(|(term, score)| Keyword { term, score })
        .collect();
    keywords.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.term.cmp(&b.term)));
    keywords.truncate(n);

    debug!(
        slice = %slice,
        documents = texts.len(),
        keywords = keywords.len(),
        "Extracted TF-IDF keywords"
    );

    SliceKeywords { slice, keywords }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::models::DocType;

    fn doc(tokens: &[&str]) -> Document {
        Document {
            doc_id: "d".to_string(),
            doc_type: DocType::Comment,
            raw_text: tokens.join(" "),
            title: None,
            parent_id: None,
            score: None,
            num_comments: None,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            row: 1,
        }
    }

    #[test]
    fn test_empty_slice_has_no_keywords() {
        let docs = vec![doc(&[])];
        let out = top_keywords("comments", &docs, 5);
        assert_eq!(out.slice, "comments");
        assert!(out.keywords.is_empty());
    }

    #[test]
    fn test_keywords_truncated_and_ordered() {
        let docs = vec![
            doc(&["tax", "burden", "workers"]),
            doc(&["remote", "work", "office"]),
            doc(&["cats", "dogs", "tax"]),
        ];
        let out = top_keywords("posts", &docs, 2);
        assert_eq!(out.keywords.len(), 2);
        assert!(out.keywords[0].score >= out.keywords[1].score);
    }
}
