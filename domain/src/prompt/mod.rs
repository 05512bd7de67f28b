//! Prompt domain
//!
//! System prompts offered to model backends and the tool-result summary
//! folded back into the conversation after each iteration.

mod template;

pub use template::PromptTemplate;
