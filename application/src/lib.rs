//! Application layer for cloudgenie
//!
//! This crate contains the tool orchestration loop, the result cache, port
//! definitions and application configuration. It depends only on the domain
//! layer.

pub mod cache;
pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use cache::{CacheEntry, ResultCache};
pub use config::OrchestrationParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    model_adapter::{AdapterError, ModelAdapter},
    progress::{NoProgress, OrchestrationProgress},
    tool_protocol::{ProtocolError, ServerInfo, ToolProtocolClient},
};
pub use use_cases::orchestration_service::{HealthReport, OrchestrationService, ToolInfo};
pub use use_cases::process_prompt::{ProcessPromptError, ProcessPromptInput, ProcessPromptUseCase};
