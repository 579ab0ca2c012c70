//! Semantic cross-linking of vault notes.
//!
//! # Architecture
//!
//! - `ranker`: cosine similarity matrix and threshold/top-k selection
//! - `mutator`: appends new wiki links under a "Related Notes" heading
//! - `pipeline`: scan → embed → rank → link, strictly sequential

pub mod mutator;
pub mod pipeline;
pub mod ranker;

pub use pipeline::LinkerPipeline;
