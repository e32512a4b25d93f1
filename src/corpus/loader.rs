// CSV loader for the posts and comments exports.
//
// Every row is validated into a Document exactly once. Missing text becomes
// an empty string, missing scores become None (and are counted), and rows
// that cannot be decoded are recorded and skipped so one bad row never sinks
// the whole load. A missing required column is the only fatal data error.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use tracing::{debug, info, warn};

use super::error::{EncodingError, LoadError, RowIssue, SchemaError};
use super::models::{Corpus, DocType, Document, LoadDiagnostics};

const POSTS_TABLE: &str = "posts";
const COMMENTS_TABLE: &str = "comments";

/// Reddit's fullname prefix for submissions (`t3_abc123`).
const SUBMISSION_PREFIX: &str = "t3_";

/// Body text Reddit leaves behind for deleted or removed content.
const PLACEHOLDER_TEXTS: &[&str] = &["[deleted]", "[removed]"];

/// Column names for the posts table. All of them are required.
#[derive(Debug, Clone)]
pub struct PostColumns {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub score: String,
    pub num_comments: String,
}

impl Default for PostColumns {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            title: "title".to_string(),
            selftext: "selftext".to_string(),
            score: "score".to_string(),
            num_comments: "num_comments".to_string(),
        }
    }
}

/// Column names for the comments table.
#[derive(Debug, Clone)]
pub struct CommentColumns {
    pub body: String,
    pub score: String,
    pub link_id: String,
    /// Optional id columns, first match wins. Ids are synthesized from the
    /// row number when none is present.
    pub id_candidates: Vec<String>,
}

impl Default for CommentColumns {
    fn default() -> Self {
        Self {
            body: "body".to_string(),
            score: "score".to_string(),
            link_id: "link_id".to_string(),
            id_candidates: vec!["id".to_string(), "comment_id".to_string()],
        }
    }
}

/// Loader settings.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub posts: PostColumns,
    pub comments: CommentColumns,
    /// Treat `[deleted]` / `[removed]` bodies as empty text
    pub blank_placeholders: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            posts: PostColumns::default(),
            comments: CommentColumns::default(),
            blank_placeholders: true,
        }
    }
}

/// Load both tables from disk.
pub fn load_corpus(
    posts_path: &Path,
    comments_path: &Path,
    config: &LoaderConfig,
) -> Result<Corpus, LoadError> {
    let posts = open(posts_path)?;
    let comments = open(comments_path)?;
    load_from_readers(posts, comments, config)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load both tables from any readers (files, in-memory buffers in tests).
///
/// Posts come first in the resulting corpus, then comments, each in input
/// order.
pub fn load_from_readers<P: Read, C: Read>(
    posts: P,
    comments: C,
    config: &LoaderConfig,
) -> Result<Corpus, LoadError> {
    let mut diagnostics = LoadDiagnostics::default();
    let mut documents = read_posts(posts, config, &mut diagnostics)?;
    let post_count = documents.len();
    documents.extend(read_comments(comments, config, &mut diagnostics)?);

    info!(
        posts = post_count,
        comments = documents.len() - post_count,
        skipped_rows = diagnostics.skipped_rows(),
        defaulted_scores = diagnostics.defaulted_scores.len(),
        duplicate_posts = diagnostics.duplicate_posts,
        duplicate_comments = diagnostics.duplicate_comments,
        "Loaded corpus"
    );

    Ok(Corpus::new(documents, diagnostics))
}

fn read_posts<R: Read>(
    reader: R,
    config: &LoaderConfig,
    diagnostics: &mut LoadDiagnostics,
) -> Result<Vec<Document>, LoadError> {
    let cols = &config.posts;
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = read_headers(&mut rdr, POSTS_TABLE)?;

    let idx = |name: &str| require_column(&headers, POSTS_TABLE, name);
    let id_idx = idx(&cols.id)?;
    let title_idx = idx(&cols.title)?;
    let selftext_idx = idx(&cols.selftext)?;
    let score_idx = idx(&cols.score)?;
    let num_comments_idx = idx(&cols.num_comments)?;

    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut documents = Vec::new();

    for (i, result) in rdr.byte_records().enumerate() {
        let row = i + 1;
        let Some(record) = next_record(result, POSTS_TABLE, row, diagnostics)? else {
            continue;
        };

        let fields = decode_fields(
            &record,
            &[
                (id_idx, cols.id.as_str()),
                (title_idx, cols.title.as_str()),
                (selftext_idx, cols.selftext.as_str()),
                (score_idx, cols.score.as_str()),
                (num_comments_idx, cols.num_comments.as_str()),
            ],
            POSTS_TABLE,
            row,
            diagnostics,
        );
        let Some([id, title, selftext, score, num_comments]) = fields.map(to_array::<5>) else {
            continue;
        };

        let doc_id = id.map(str::trim).unwrap_or_default().to_string();
        if doc_id.is_empty() {
            warn!(row, "Skipping post row without an id");
            diagnostics.malformed_rows.push(RowIssue {
                table: POSTS_TABLE.to_string(),
                row,
                message: format!("empty `{}` value", cols.id),
            });
            continue;
        }

        if !seen_ids.insert(doc_id.clone()) {
            diagnostics.duplicate_posts += 1;
            debug!(doc_id = %doc_id, row, "Duplicate post id retained");
        }

        let title = clean_text(title, config.blank_placeholders);
        let selftext = clean_text(selftext, config.blank_placeholders);
        let score = parse_score(score);
        if score.is_none() {
            diagnostics.defaulted_scores.push(doc_id.clone());
        }

        documents.push(Document {
            raw_text: join_post_text(&title, &selftext),
            title: (!title.is_empty()).then_some(title),
            doc_id,
            doc_type: DocType::Post,
            parent_id: None,
            score,
            num_comments: parse_count(num_comments),
            tokens: Vec::new(),
            row,
        });
    }

    Ok(documents)
}

fn read_comments<R: Read>(
    reader: R,
    config: &LoaderConfig,
    diagnostics: &mut LoadDiagnostics,
) -> Result<Vec<Document>, LoadError> {
    let cols = &config.comments;
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = read_headers(&mut rdr, COMMENTS_TABLE)?;

    let body_idx = require_column(&headers, COMMENTS_TABLE, &cols.body)?;
    let score_idx = require_column(&headers, COMMENTS_TABLE, &cols.score)?;
    let link_idx = require_column(&headers, COMMENTS_TABLE, &cols.link_id)?;
    let id_column = cols
        .id_candidates
        .iter()
        .find_map(|name| find_column(&headers, name).map(|i| (i, name.as_str())));

    let mut seen_pairs: HashSet<(String, Option<String>)> = HashSet::new();
    let mut documents = Vec::new();

    for (i, result) in rdr.byte_records().enumerate() {
        let row = i + 1;
        let Some(record) = next_record(result, COMMENTS_TABLE, row, diagnostics)? else {
            continue;
        };

        let mut wanted = vec![
            (body_idx, cols.body.as_str()),
            (score_idx, cols.score.as_str()),
            (link_idx, cols.link_id.as_str()),
        ];
        if let Some(id_col) = id_column {
            wanted.push(id_col);
        }
        let Some(fields) = decode_fields(&record, &wanted, COMMENTS_TABLE, row, diagnostics)
        else {
            continue;
        };

        let parent_id = fields[2]
            .map(str::trim)
            .filter(|s| !s.is_empty() && !is_nan(s))
            .map(|s| s.strip_prefix(SUBMISSION_PREFIX).unwrap_or(s).to_string());

        let doc_id = fields
            .get(3)
            .copied()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("comment-{row}"));

        if !seen_pairs.insert((doc_id.clone(), parent_id.clone())) {
            diagnostics.duplicate_comments += 1;
            debug!(doc_id = %doc_id, row, "Duplicate comment retained");
        }

        let score = parse_score(fields[1]);
        if score.is_none() {
            diagnostics.defaulted_scores.push(doc_id.clone());
        }

        documents.push(Document {
            doc_id,
            doc_type: DocType::Comment,
            raw_text: clean_text(fields[0], config.blank_placeholders),
            title: None,
            parent_id,
            score,
            num_comments: None,
            tokens: Vec::new(),
            row,
        });
    }

    Ok(documents)
}

fn read_headers<R: Read>(rdr: &mut csv::Reader<R>, table: &str) -> Result<Vec<String>, LoadError> {
    let raw = rdr.byte_headers().map_err(|source| LoadError::Csv {
        table: table.to_string(),
        source,
    })?;
    Ok(raw
        .iter()
        .map(|h| {
            String::from_utf8_lossy(h)
                .trim_start_matches('\u{feff}')
                .trim()
                .to_string()
        })
        .collect())
}

fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn require_column(headers: &[String], table: &str, name: &str) -> Result<usize, SchemaError> {
    find_column(headers, name).ok_or_else(|| SchemaError {
        table: table.to_string(),
        column: name.to_string(),
    })
}

/// Unwrap one CSV record. Parse errors become a RowIssue; I/O errors abort.
fn next_record(
    result: csv::Result<ByteRecord>,
    table: &str,
    row: usize,
    diagnostics: &mut LoadDiagnostics,
) -> Result<Option<ByteRecord>, LoadError> {
    match result {
        Ok(record) => Ok(Some(record)),
        Err(e) if e.is_io_error() => Err(LoadError::Csv {
            table: table.to_string(),
            source: e,
        }),
        Err(e) => {
            warn!(table, row, error = %e, "Skipping malformed row");
            diagnostics.malformed_rows.push(RowIssue {
                table: table.to_string(),
                row,
                message: e.to_string(),
            });
            Ok(None)
        }
    }
}

/// Decode the requested columns as UTF-8. A field missing from a short row is
/// None. Returns None (and records an EncodingError) if any field fails.
fn decode_fields<'r>(
    record: &'r ByteRecord,
    columns: &[(usize, &str)],
    table: &str,
    row: usize,
    diagnostics: &mut LoadDiagnostics,
) -> Option<Vec<Option<&'r str>>> {
    let mut out = Vec::with_capacity(columns.len());
    for &(idx, name) in columns {
        match record.get(idx).map(std::str::from_utf8) {
            None => out.push(None),
            Some(Ok(s)) => out.push(Some(s)),
            Some(Err(_)) => {
                let err = EncodingError {
                    table: table.to_string(),
                    row,
                    column: name.to_string(),
                };
                warn!(error = %err, "Skipping row");
                diagnostics.encoding_errors.push(err);
                return None;
            }
        }
    }
    Some(out)
}

fn to_array<const N: usize>(fields: Vec<Option<&str>>) -> [Option<&str>; N] {
    let mut out = [None; N];
    for (slot, value) in out.iter_mut().zip(fields) {
        *slot = value;
    }
    out
}

fn is_nan(s: &str) -> bool {
    s.eq_ignore_ascii_case("nan")
}

/// Missing, NaN, and (optionally) deleted-placeholder text all become "".
fn clean_text(raw: Option<&str>, blank_placeholders: bool) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    let trimmed = raw.trim();
    if is_nan(trimmed) || (blank_placeholders && PLACEHOLDER_TEXTS.contains(&trimmed)) {
        return String::new();
    }
    raw.to_string()
}

fn join_post_text(title: &str, selftext: &str) -> String {
    match (title.is_empty(), selftext.is_empty()) {
        (true, _) => selftext.to_string(),
        (false, true) => title.to_string(),
        (false, false) => format!("{title}\n\n{selftext}"),
    }
}

/// Integer scores, tolerating pandas-style floats ("10.0"). Anything else is
/// treated as missing.
fn parse_score(raw: Option<&str>) -> Option<i64> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.round() as i64)
}

fn parse_count(raw: Option<&str>) -> Option<u32> {
    parse_score(raw).and_then(|v| u32::try_from(v).ok())
}
