//! [`ChunkSink`] and [`ToolInvoker`] implementations bridging a
//! `postMessage` turn back into the orchestrator: persisting throttled
//! progress events, and authorizing/dispatching tool calls with their
//! bracketing `toolCall`/`toolResult` events.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex as AsyncMutex;

use hearth_core::{AgentId, Event, EventPayload, RunStage, SessionId, ToolErrorPayload, ToolResultPayload};
use hearth_tools::{ToolContext, ToolFailure, ToolInvocationResult};

use crate::config::PostMessageConfig;
use crate::model_provider::{ChunkSink, ToolInvocationRequest, ToolInvoker};
use crate::orchestrator::SessionOrchestrator;
use crate::runtime_state::SessionRuntime;

/// Streams cumulative assistant text into the session's runtime buffer,
/// persisting a throttled `runStatus(responding, expandedText)` progress
/// event when enough new text has accumulated (spec's "do not persist every
/// chunk" rule).
pub(crate) struct OrchestratorChunkSink {
    orchestrator: Arc<SessionOrchestrator>,
    agent_id: AgentId,
    session_id: SessionId,
    runtime: Arc<SessionRuntime>,
    accumulator: Arc<AsyncMutex<Vec<Event>>>,
    config: PostMessageConfig,
}

impl OrchestratorChunkSink {
    pub(crate) fn new(
        orchestrator: Arc<SessionOrchestrator>,
        agent_id: AgentId,
        session_id: SessionId,
        runtime: Arc<SessionRuntime>,
        accumulator: Arc<AsyncMutex<Vec<Event>>>,
        config: PostMessageConfig,
    ) -> Self {
        Self { orchestrator, agent_id, session_id, runtime, accumulator, config }
    }
}

#[async_trait]
impl ChunkSink for OrchestratorChunkSink {
    async fn on_chunk(&self, partial: &str) -> bool {
        if self.runtime.is_interrupted() {
            return false;
        }

        let mut buffer = self.runtime.buffer.lock().await;
        buffer.text = partial.to_string();

        let new_chars = buffer.text.chars().count().saturating_sub(buffer.last_persisted_len);
        let no_prior_persist = buffer.last_persisted_at.is_none();
        let interval_elapsed = buffer
            .last_persisted_at
            .is_some_and(|last| last.elapsed() >= self.config.progress_persist_min_interval);

        if no_prior_persist || new_chars >= self.config.progress_persist_min_chars || interval_elapsed {
            buffer.last_persisted_len = buffer.text.chars().count();
            buffer.last_persisted_at = Some(Instant::now());
            let snapshot = buffer.text.clone();
            drop(buffer);

            let event = Event::new(
                self.agent_id.clone(),
                self.session_id.clone(),
                Utc::now(),
                EventPayload::RunStatus {
                    stage: RunStage::Responding,
                    label: String::new(),
                    details: String::new(),
                    expanded_text: Some(snapshot),
                },
            );
            if let Ok(()) = self
                .orchestrator
                .append_events(&self.agent_id, &self.session_id, std::slice::from_ref(&event))
                .map(|_| ())
            {
                self.accumulator.lock().await.push(event);
            }
        }

        !self.runtime.interrupted.load(Ordering::SeqCst)
    }
}

/// Authorizes and dispatches a mid-turn tool call, appending its bracketing
/// `toolCall` and `toolResult` events to the turn's accumulator.
pub(crate) struct OrchestratorToolInvoker {
    orchestrator: Arc<SessionOrchestrator>,
    agent_id: AgentId,
    session_id: SessionId,
    accumulator: Arc<AsyncMutex<Vec<Event>>>,
}

impl OrchestratorToolInvoker {
    pub(crate) fn new(
        orchestrator: Arc<SessionOrchestrator>,
        agent_id: AgentId,
        session_id: SessionId,
        accumulator: Arc<AsyncMutex<Vec<Event>>>,
    ) -> Self {
        Self { orchestrator, agent_id, session_id, accumulator }
    }

    async fn record(&self, event: Event) {
        let appended = self
            .orchestrator
            .append_events(&self.agent_id, &self.session_id, std::slice::from_ref(&event));
        if appended.is_ok() {
            self.accumulator.lock().await.push(event);
        }
    }
}

#[async_trait]
impl ToolInvoker for OrchestratorToolInvoker {
    async fn on_tool(&self, request: ToolInvocationRequest) -> ToolInvocationResult {
        self.record(Event::new(
            self.agent_id.clone(),
            self.session_id.clone(),
            Utc::now(),
            EventPayload::ToolCall {
                tool: request.tool.clone(),
                arguments: request.arguments.clone(),
                reason: request.reason.clone(),
            },
        ))
        .await;

        let policy = match self.orchestrator.tools_policy.read(&self.agent_id) {
            Ok(policy) => policy,
            Err(e) => return self.finish_denied(&request.tool, ToolFailure::storage_failure(e.to_string())).await,
        };

        let decision = match hearth_auth::authorize(&self.orchestrator.tools_policy, &self.agent_id, &request.tool) {
            Ok(decision) => decision,
            Err(e) => {
                return self
                    .finish_denied(&request.tool, ToolFailure::storage_failure(e.to_string()))
                    .await
            },
        };
        if !decision.allowed {
            let failure = decision
                .error
                .map(|e| ToolFailure { code: e.code, message: e.message, retryable: e.retryable })
                .unwrap_or_else(|| ToolFailure::command_denied(request.tool.clone()));
            return self.finish_denied(&request.tool, failure).await;
        }

        let ctx = self.orchestrator.tool_context(&self.agent_id, &self.session_id, &policy);
        let outcome = hearth_tools::execute(&self.orchestrator.tool_registry, &request.tool, request.arguments, &ctx).await;

        self.record(Event::new(
            self.agent_id.clone(),
            self.session_id.clone(),
            Utc::now(),
            EventPayload::ToolResult(ToolResultPayload {
                tool: outcome.tool.clone(),
                ok: outcome.ok,
                data: outcome.data.clone(),
                error: outcome.error.as_ref().map(|e| ToolErrorPayload {
                    code: e.code.clone(),
                    message: e.message.clone(),
                    retryable: e.retryable,
                }),
                duration_ms: outcome.duration_ms,
            }),
        ))
        .await;

        outcome
    }
}

impl OrchestratorToolInvoker {
    async fn finish_denied(&self, tool: &str, failure: ToolFailure) -> ToolInvocationResult {
        let result = ToolInvocationResult {
            tool: tool.to_string(),
            ok: false,
            data: None,
            error: Some(failure.clone()),
            duration_ms: 0,
        };
        self.record(Event::new(
            self.agent_id.clone(),
            self.session_id.clone(),
            Utc::now(),
            EventPayload::ToolResult(ToolResultPayload {
                tool: tool.to_string(),
                ok: false,
                data: None,
                error: Some(ToolErrorPayload {
                    code: failure.code,
                    message: failure.message,
                    retryable: failure.retryable,
                }),
                duration_ms: 0,
            }),
        ))
        .await;
        result
    }
}
