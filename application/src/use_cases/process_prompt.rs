//! Process Prompt use case.
//!
//! Drives one user prompt through the bounded tool loop:
//!
//! 1. Ask the [`ModelAdapter`] for the next step
//! 2. No invocations → done, return the text
//! 3. Otherwise resolve every invocation concurrently (cache first, then the
//!    [`ToolProtocolClient`]), fold the results back into the conversation
//! 4. Repeat until the model stops requesting tools or the iteration ceiling
//!    is reached
//!
//! Tool failures never abort the loop: they become error [`ToolResult`]s the
//! model gets to see. Only adapter failures and cancellation end the call
//! with an error.

use crate::cache::{CacheEntry, ResultCache};
use crate::config::OrchestrationParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::model_adapter::{AdapterError, ModelAdapter};
use crate::ports::progress::{NoProgress, OrchestrationProgress};
use crate::ports::tool_protocol::{ProtocolError, ToolProtocolClient};
use cloudgenie_domain::util::{preview, truncate_str};
use cloudgenie_domain::{
    CacheKey, Conversation, ConversationTurn, ITERATION_LIMIT_MESSAGE, OrchestrationMetadata,
    OrchestrationOutcome, OrchestrationState, PromptTemplate, Termination, ToolCatalog,
    ToolInvocation, ToolResult,
};
use futures::future::join_all;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can end an orchestration call.
#[derive(Error, Debug)]
pub enum ProcessPromptError {
    #[error("Model adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Tool endpoint connection error: {0}")]
    Connection(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl ProcessPromptError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProcessPromptError::Cancelled)
    }
}

/// Input for the [`ProcessPromptUseCase`].
#[derive(Debug, Clone)]
pub struct ProcessPromptInput {
    /// The user's request.
    pub prompt: String,
}

impl ProcessPromptInput {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Per-call counters, folded into [`OrchestrationMetadata`] at the end.
#[derive(Debug, Default)]
struct LoopStats {
    iterations: usize,
    cache_hits: usize,
    cache_misses: usize,
    finish_reason: Option<String>,
}

/// Use case for running one prompt through the tool loop.
///
/// The catalog is a snapshot taken when the use case is built; it is not
/// refreshed between calls.
pub struct ProcessPromptUseCase {
    adapter: Arc<dyn ModelAdapter>,
    client: Arc<dyn ToolProtocolClient>,
    cache: Arc<ResultCache>,
    catalog: ToolCatalog,
    params: OrchestrationParams,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl Clone for ProcessPromptUseCase {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
            client: self.client.clone(),
            cache: self.cache.clone(),
            catalog: self.catalog.clone(),
            params: self.params.clone(),
            conversation_logger: self.conversation_logger.clone(),
        }
    }
}

impl ProcessPromptUseCase {
    pub fn new(
        adapter: Arc<dyn ModelAdapter>,
        client: Arc<dyn ToolProtocolClient>,
        cache: Arc<ResultCache>,
        catalog: ToolCatalog,
    ) -> Self {
        Self {
            adapter,
            client,
            cache,
            catalog,
            params: OrchestrationParams::default(),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_params(mut self, params: OrchestrationParams) -> Self {
        self.params = params;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn params(&self) -> &OrchestrationParams {
        &self.params
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: ProcessPromptInput,
        cancellation: &CancellationToken,
    ) -> Result<OrchestrationOutcome, ProcessPromptError> {
        self.execute_with_progress(input, &NoProgress, cancellation)
            .await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: ProcessPromptInput,
        progress: &dyn OrchestrationProgress,
        cancellation: &CancellationToken,
    ) -> Result<OrchestrationOutcome, ProcessPromptError> {
        info!(
            "Processing prompt with {} tools: {}",
            self.catalog.len(),
            preview(&input.prompt, 100)
        );

        let max_iterations = self.params.max_iterations;
        let mut conversation = Conversation::new();
        let mut invocations: Vec<ToolInvocation> = Vec::new();
        let mut results: Vec<ToolResult> = Vec::new();
        let mut stats = LoopStats::default();
        let mut current_prompt = input.prompt;

        for iteration in 1..=max_iterations {
            if cancellation.is_cancelled() {
                return Err(ProcessPromptError::Cancelled);
            }

            debug!("{}", OrchestrationState::AwaitingModel { iteration });
            progress.on_iteration_start(iteration, max_iterations);

            let response = tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    info!("Orchestration cancelled while awaiting model");
                    return Err(ProcessPromptError::Cancelled);
                }
                response = self.adapter.chat(&current_prompt, &self.catalog, conversation.turns()) => response?,
            };
            stats.iterations = iteration;
            stats.finish_reason = Some(response.termination_reason.to_string());

            self.conversation_logger.log(ConversationEvent::new(
                "model_response",
                json!({
                    "iteration": iteration,
                    "provider": self.adapter.name(),
                    "text": response.text,
                    "tool_calls": response.invocations.len(),
                    "finish_reason": response.termination_reason.as_str(),
                }),
            ));

            conversation.push(ConversationTurn::user(current_prompt));
            conversation.push(ConversationTurn::assistant(
                response.text.clone(),
                response.invocations.clone(),
            ));

            if !response.has_invocations() {
                debug!("{}", OrchestrationState::Done { iterations: iteration });
                let outcome =
                    self.build_outcome(response.text, invocations, results, Termination::Done, stats);
                progress.on_complete(&outcome);
                return Ok(outcome);
            }

            debug!(
                "{}",
                OrchestrationState::AwaitingTools {
                    iteration,
                    pending: response.invocations.len()
                }
            );

            let resolutions = response
                .invocations
                .iter()
                .map(|invocation| self.resolve(invocation, iteration, progress));

            let resolved = tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    info!("Orchestration cancelled while awaiting tools");
                    return Err(ProcessPromptError::Cancelled);
                }
                resolved = join_all(resolutions) => resolved,
            };

            let mut iteration_results = Vec::with_capacity(resolved.len());
            for (invocation, result) in response.invocations.into_iter().zip(resolved) {
                if result.cached {
                    stats.cache_hits += 1;
                } else {
                    stats.cache_misses += 1;
                }
                invocations.push(invocation);
                iteration_results.push(result);
            }

            current_prompt = PromptTemplate::tool_results(&iteration_results);
            results.extend(iteration_results.iter().cloned());
            conversation.push(ConversationTurn::tool_results(iteration_results));
        }

        warn!(
            "Reached maximum tool iterations ({}) with tools still requested",
            max_iterations
        );
        debug!(
            "{}",
            OrchestrationState::IterationLimitReached {
                iterations: stats.iterations
            }
        );
        let outcome = self.build_outcome(
            ITERATION_LIMIT_MESSAGE.to_string(),
            invocations,
            results,
            Termination::IterationLimitReached,
            stats,
        );
        progress.on_complete(&outcome);
        Ok(outcome)
    }

    /// Resolve one invocation into exactly one result.
    ///
    /// Served from cache when a live entry exists; otherwise dispatched to
    /// the tool client under the per-call timeout. Never fails.
    async fn resolve(
        &self,
        invocation: &ToolInvocation,
        iteration: usize,
        progress: &dyn OrchestrationProgress,
    ) -> ToolResult {
        progress.on_tool_call(invocation);
        self.conversation_logger.log(ConversationEvent::new(
            "tool_call",
            json!({
                "iteration": iteration,
                "id": invocation.id,
                "name": invocation.name,
                "arguments": invocation.arguments_json(),
            }),
        ));

        let key = CacheKey::fingerprint(&invocation.name, &invocation.arguments);
        let result = match self.cache.get(&key) {
            Some(entry) => {
                debug!(tool = %invocation.name, key = %key, "cache hit");
                cached_result(invocation, entry)
            }
            None => {
                debug!(tool = %invocation.name, key = %key, "cache miss");
                self.dispatch(invocation, key).await
            }
        };

        self.conversation_logger.log(ConversationEvent::new(
            "tool_result",
            json!({
                "iteration": iteration,
                "id": result.invocation_id,
                "name": result.tool_name,
                "is_error": result.is_error,
                "cached": result.cached,
                "content": result.content,
            }),
        ));
        progress.on_tool_result(&result);
        result
    }

    async fn dispatch(&self, invocation: &ToolInvocation, key: CacheKey) -> ToolResult {
        let timeout = self.params.call_timeout;
        let call = self.client.call_tool(&invocation.name, &invocation.arguments);

        let outcome = match tokio::time::timeout(timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ProtocolError::Timeout(timeout)),
        };

        match outcome {
            Ok(outcome) if outcome.is_error => {
                let content = outcome.render();
                warn!(
                    "Tool {} reported an error: {}",
                    invocation.name,
                    truncate_str(&content, 200)
                );
                ToolResult::failure(&invocation.id, &invocation.name, content)
            }
            Ok(outcome) => {
                let content = outcome.render();
                self.cache.set(key, content.clone(), false);
                ToolResult::success(&invocation.id, &invocation.name, content)
            }
            Err(e) => {
                warn!("Tool {} failed: {}", invocation.name, e);
                ToolResult::failure(
                    &invocation.id,
                    &invocation.name,
                    format!("Error calling tool {}: {}", invocation.name, e),
                )
            }
        }
    }

    fn build_outcome(
        &self,
        final_text: String,
        invocations: Vec<ToolInvocation>,
        results: Vec<ToolResult>,
        termination: Termination,
        stats: LoopStats,
    ) -> OrchestrationOutcome {
        info!(
            "Orchestration finished after {} iteration(s): {} tool call(s), {} cache hit(s)",
            stats.iterations,
            invocations.len(),
            stats.cache_hits
        );
        OrchestrationOutcome {
            final_text,
            invocations,
            results,
            termination,
            metadata: OrchestrationMetadata {
                iterations: stats.iterations,
                cache_hits: stats.cache_hits,
                cache_misses: stats.cache_misses,
                tools_available: self.catalog.len(),
                provider: self.adapter.name().to_string(),
                finish_reason: stats.finish_reason,
                max_reached: termination == Termination::IterationLimitReached,
                cache_stats: self.cache.stats(),
            },
        }
    }
}

/// Replay a cache entry for `invocation`, keeping its error flag.
fn cached_result(invocation: &ToolInvocation, entry: CacheEntry) -> ToolResult {
    ToolResult {
        is_error: entry.is_error,
        ..ToolResult::success(&invocation.id, &invocation.name, entry.content)
    }
    .with_cached(true)
}
