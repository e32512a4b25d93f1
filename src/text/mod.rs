// Text normalization: cleaning and tokenization shared by posts and comments.

pub mod normalize;
pub mod stopwords;
