pub mod enhancer;
pub mod formatter;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod scoring;
pub mod validation;

pub use pipeline::{MatchOptions, MatchPipeline};
