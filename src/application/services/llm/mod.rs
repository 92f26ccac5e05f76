//! Prompt construction and response normalization for story generation

pub mod prompt_builder;
pub mod response_parser;
pub mod schemas;

pub use prompt_builder::{EpisodeContext, GenerationPrompt};
pub use response_parser::ParseError;
