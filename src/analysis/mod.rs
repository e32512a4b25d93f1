// Comparative analysis: term frequency contrasts, engagement slices,
// TF-IDF keywords and per-conversation similarity.

pub mod engagement;
pub mod frequency;
pub mod keywords;
pub mod similarity;
