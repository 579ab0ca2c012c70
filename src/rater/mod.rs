//! Note quality rating.
//!
//! Each note is sent to the generation model, which answers with a 1-10
//! rating and one suggestion. Both land in the note's YAML frontmatter.
//! Notes that already carry a rating are never sent.

pub mod frontmatter;
pub mod pipeline;
pub mod prompt;

pub use pipeline::RatePipeline;
