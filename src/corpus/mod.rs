// Corpus loading: CSV exports of posts and comments into validated documents.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{EncodingError, LoadError, RowIssue, SchemaError};
pub use loader::{load_corpus, load_from_readers, CommentColumns, LoaderConfig, PostColumns};
pub use models::{Corpus, DocType, Document, LoadDiagnostics};
