// Semantic axes: projecting terms and documents onto bipolar directions in
// an externally supplied word embedding space.

pub mod axis;
pub mod embeddings;

pub use axis::{
    project_document, project_term, resolve_axis, AxisError, DocumentScore, Pole, ResolvedAxis,
    SemanticAxis, UnresolvedAxisError,
};
pub use embeddings::{EmbeddingError, EmbeddingProvider, EmbeddingTable};
