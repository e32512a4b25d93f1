// Word embedding lookup.
//
// The projector never loads or trains embeddings itself. Callers pass an
// EmbeddingProvider explicitly, so tests can use a tiny synthetic table and
// the CLI can use a GloVe-style text file. A missing token is simply
// unknown, never an error.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

/// Token → fixed-length vector lookup.
pub trait EmbeddingProvider: Send + Sync {
    /// Length of every vector this provider returns.
    fn dimension(&self) -> usize;

    /// The vector for a token, if known. Lookup is case-insensitive.
    fn vector(&self, token: &str) -> Option<&[f64]>;
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("vector for `{token}` has {found} dimensions, expected {expected}")]
    DimensionMismatch {
        token: String,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("failed to read embeddings from {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// In-memory embedding table.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingTable {
    dimension: usize,
    vectors: HashMap<String, Vec<f64>>,
}

impl EmbeddingTable {
    /// An empty table. The dimension is fixed by the first insert when 0.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
        }
    }

    /// Insert a vector under the lowercased token. The first vector wins when
    /// a token appears twice (cased and uncased GloVe variants).
    pub fn insert(&mut self, token: &str, vector: Vec<f64>) -> Result<(), EmbeddingError> {
        if self.dimension == 0 {
            self.dimension = vector.len();
        }
        if vector.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                token: token.to_string(),
                expected: self.dimension,
                found: vector.len(),
            });
        }
        self.vectors.entry(token.to_lowercase()).or_insert(vector);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Parse word2vec/GloVe text format: `token v1 v2 ...` per line, with an
    /// optional `count dimension` header line.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, EmbeddingError> {
        let mut table = Self::new(0);

        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line.map_err(|e| EmbeddingError::Parse {
                line: line_no,
                message: e.to_string(),
            })?;
            let mut parts = line.split_whitespace();
            let Some(token) = parts.next() else {
                continue;
            };
            let values: Vec<&str> = parts.collect();

            if line_no == 1 && values.len() == 1 && token.parse::<usize>().is_ok() {
                debug!(header = %line, "Skipping word2vec header");
                continue;
            }
            if values.is_empty() {
                return Err(EmbeddingError::Parse {
                    line: line_no,
                    message: format!("token `{token}` has no vector"),
                });
            }

            let vector = values
                .iter()
                .map(|v| v.parse::<f64>())
                .collect::<Result<Vec<f64>, _>>()
                .map_err(|e| EmbeddingError::Parse {
                    line: line_no,
                    message: format!("bad value for `{token}`: {e}"),
                })?;
            table.insert(token, vector)?;
        }

        Ok(table)
    }

    /// Load a text embedding file from disk.
    pub fn load(path: &Path) -> Result<Self, EmbeddingError> {
        let file = File::open(path).map_err(|source| EmbeddingError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            tokens = table.len(),
            dimension = table.dimension,
            "Loaded embedding table"
        );
        Ok(table)
    }
}

impl EmbeddingProvider for EmbeddingTable {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn vector(&self, token: &str) -> Option<&[f64]> {
        // Keys are stored lowercased; normalized tokens hit on the first lookup.
        match self.vectors.get(token) {
            Some(vector) => Some(vector.as_slice()),
            None if token.chars().any(char::is_uppercase) => self
                .vectors
                .get(&token.to_lowercase())
                .map(Vec::as_slice),
            None => None,
        }
    }
}

/// Mean of the vectors of all in-vocabulary tokens, with the number of
/// tokens that contributed. None when no token is known.
pub fn mean_vector<'t, P, I>(provider: &P, tokens: I) -> Option<(Vec<f64>, usize)>
where
    P: EmbeddingProvider + ?Sized,
    I: IntoIterator<Item = &'t str>,
{
    let mut sum = vec![0.0_f64; provider.dimension()];
    let mut found = 0usize;

    for token in tokens {
        if let Some(v) = provider.vector(token) {
            for (s, x) in sum.iter_mut().zip(v) {
                *s += x;
            }
            found += 1;
        }
    }

    if found == 0 {
        return None;
    }
    let n = found as f64;
    for s in &mut sum {
        *s /= n;
    }
    Some((sum, found))
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Cosine similarity in [-1, 1]; 0.0 for mismatched, empty, or zero vectors.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let denom = norm(a) * norm(b);
    if denom < f64::EPSILON {
        0.0
    } else {
        (dot(a, b) / denom).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_reader_with_header() {
        let text = "2 3\nTax 1 0 0\nspending 0 1 0\n";
        let table = EmbeddingTable::from_reader(text.as_bytes()).unwrap();
        assert_eq!(table.dimension(), 3);
        assert_eq!(table.len(), 2);
        assert_eq!(table.vector("tax"), Some(&[1.0, 0.0, 0.0][..]));
        assert!(table.vector("unknown").is_none());
    }

    #[test]
    fn test_vector_lookup_ignores_case() {
        let mut table = EmbeddingTable::new(2);
        table.insert("Tax", vec![1.0, 0.0]).unwrap();
        assert_eq!(table.vector("tax"), Some(&[1.0, 0.0][..]));
        assert_eq!(table.vector("Tax"), Some(&[1.0, 0.0][..]));
        assert_eq!(table.vector("TAX"), Some(&[1.0, 0.0][..]));
        assert!(table.vector("Taxes").is_none());
    }

    #[test]
    fn test_from_reader_dimension_mismatch() {
        let text = "a 1 0\nb 1 0 0\n";
        let err = EmbeddingTable::from_reader(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_from_reader_bad_value() {
        let text = "a 1 x\n";
        assert!(matches!(
            EmbeddingTable::from_reader(text.as_bytes()),
            Err(EmbeddingError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_mean_vector_skips_unknown() {
        let mut table = EmbeddingTable::new(2);
        table.insert("a", vec![1.0, 0.0]).unwrap();
        table.insert("b", vec![0.0, 1.0]).unwrap();
        let (mean, found) = mean_vector(&table, ["a", "b", "zzz"]).unwrap();
        assert_eq!(found, 2);
        assert!((mean[0] - 0.5).abs() < 1e-12);
        assert!((mean[1] - 0.5).abs() < 1e-12);
        assert!(mean_vector(&table, ["zzz"]).is_none());
    }

    #[test]
    fn test_cosine_edges() {
        assert!((cosine(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-12);
        assert!((cosine(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-12);
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine(&[1.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine(&[], &[]), 0.0);
    }
}
