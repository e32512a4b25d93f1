// cmv-corpus: post-comment linkage and comparative corpus analysis for
// r/ChangeMyView exports.
//
// This is the library root. Each module corresponds to one stage of the
// analysis pipeline; `pipeline` wires them together.

pub mod analysis;
pub mod config;
pub mod corpus;
pub mod linkage;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod semantic;
pub mod text;
