//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod orchestration_service;
pub mod process_prompt;
