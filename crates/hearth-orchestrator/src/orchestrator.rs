//! Session Orchestrator (4.F): `createSession`, `postMessage`,
//! `controlSession`.
//!
//! Generalizes the teacher's `AgentRuntime::run_loop` shape — stream model
//! output, collect tool calls, execute them, repeat, all behind a per-turn
//! `ToolContext` — to the abstract [`crate::model_provider::ModelProvider`]
//! interface instead of a concrete LLM SDK. Mirrors the teacher's
//! `Arc::new_cyclic`/`self_arc` trick so the orchestrator can hand a
//! `SessionRouter` trait object to its own tools without a two-step
//! construct-then-wire dance.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};

use chrono::Utc;
use tokio::sync::Mutex as AsyncMutex;

use hearth_catalog::{AgentCatalogStore, DocName, ToolsPolicyStore};
use hearth_core::{
    truncate_chars, AgentId, AttachmentRef, Event, EventPayload, MessageRole, MessageSegment,
    RunControlAction, RunStage, SessionId, SessionSummary, MAX_SESSION_TITLE_LEN,
};
use hearth_process::ProcessRegistry;
use hearth_storage::{AttachmentUpload, EventLogStore, PersistenceSink};
use hearth_tools::{ToolContext, ToolRegistry};
use hearth_workspace::WorkspaceBoundary;

use crate::config::{looks_like_search, PostMessageConfig, BOOTSTRAP_MARKER};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::model_provider::{channel_id, ChannelSnapshot, ModelProvider, ModelRequest, RouteDecision};
use crate::router::OrchestratorRouter;
use crate::session_io::{OrchestratorChunkSink, OrchestratorToolInvoker};
use crate::runtime_state::SessionRuntime;

/// `createSession` request.
#[derive(Debug, Clone, Default)]
pub struct CreateSessionRequest {
    /// Explicit session id; generated when absent.
    pub id: Option<SessionId>,
    /// Title; defaulted to `Session <first8>` when absent/blank.
    pub title: Option<String>,
    /// Parent session id, if this is a sub-session.
    pub parent_session_id: Option<SessionId>,
}

/// `postMessage` request.
#[derive(Debug, Clone, Default)]
pub struct PostMessageRequest {
    /// Id of the user on whose behalf this turn runs.
    pub user_id: String,
    /// Raw message content, trimmed before use.
    pub content: String,
    /// Attachment uploads to persist alongside the user message.
    pub attachments: Vec<AttachmentUpload>,
    /// `true` to spawn a child session at the end of this turn.
    pub spawn_sub_session: bool,
}

/// The result of a completed `postMessage` call.
#[derive(Debug, Clone)]
pub struct PostMessageOutcome {
    /// The session's summary after this turn's events were appended.
    pub summary: SessionSummary,
    /// Every event this call appended, in append order.
    pub appended_events: Vec<Event>,
    /// The provider's routing decision, passed through verbatim.
    pub route_decision: RouteDecision,
}

/// `true` if `text` matches the assistant-error heuristic spec §4.F step 9
/// names: a literal provider-error prefix, or text suggestive of a failure.
fn looks_like_error(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.starts_with("model provider error:")
        || lower.starts_with("error:")
        || lower.contains(" failed")
        || lower.contains("exception")
}

/// Drives session orchestration: bootstrap, turn execution, pause/resume/
/// interrupt, all serialized per session (see §5's serial-actor model,
/// realized here as one `op_lock` per session rather than a mailbox task).
pub struct SessionOrchestrator {
    pub(crate) event_log: EventLogStore,
    pub(crate) catalog: Arc<AgentCatalogStore>,
    pub(crate) tools_policy: Arc<ToolsPolicyStore>,
    pub(crate) tool_registry: Arc<ToolRegistry>,
    pub(crate) processes: Arc<ProcessRegistry>,
    pub(crate) workspace: WorkspaceBoundary,
    pub(crate) sink: Arc<PersistenceSink>,
    pub(crate) provider: Arc<dyn ModelProvider>,
    pub(crate) config: PostMessageConfig,
    runtimes: AsyncMutex<HashMap<String, Arc<SessionRuntime>>>,
    self_arc: RwLock<Option<Weak<SessionOrchestrator>>>,
}

impl SessionOrchestrator {
    /// Construct an orchestrator wrapped in `Arc`, pre-wiring its own
    /// self-reference so [`Self::tool_context`] can hand out a
    /// `SessionRouter` without a separate `set_self_arc` call.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new_arc(
        event_log: EventLogStore,
        catalog: Arc<AgentCatalogStore>,
        tools_policy: Arc<ToolsPolicyStore>,
        tool_registry: Arc<ToolRegistry>,
        processes: Arc<ProcessRegistry>,
        workspace: WorkspaceBoundary,
        sink: Arc<PersistenceSink>,
        provider: Arc<dyn ModelProvider>,
        config: PostMessageConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            event_log,
            catalog,
            tools_policy,
            tool_registry,
            processes,
            workspace,
            sink,
            provider,
            config,
            runtimes: AsyncMutex::new(HashMap::new()),
            self_arc: RwLock::new(Some(weak.clone())),
        })
    }

    fn self_arc(&self) -> Option<Arc<Self>> {
        self.self_arc.read().ok()?.as_ref()?.upgrade()
    }

    async fn runtime_for(&self, session_id: &SessionId) -> Arc<SessionRuntime> {
        let mut runtimes = self.runtimes.lock().await;
        Arc::clone(
            runtimes
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(SessionRuntime::default())),
        )
    }

    /// Build the [`ToolContext`] a turn or sub-tool invocation runs under,
    /// injecting `self` as a `SessionRouter` when the self-reference is
    /// available.
    pub(crate) fn tool_context(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
        policy: &hearth_catalog::ToolsPolicy,
    ) -> ToolContext {
        let router = self
            .self_arc()
            .map(|arc| Arc::new(OrchestratorRouter(arc)) as Arc<dyn hearth_tools::SessionRouter>);
        ToolContext {
            agent_id: agent_id.clone(),
            session_id: session_id.clone(),
            workspace: self.workspace.clone(),
            guardrails: policy.guardrails.clone(),
            processes: Arc::clone(&self.processes),
            catalog: Arc::clone(&self.catalog),
            router,
        }
    }

    /// Append `events` to the log, mirroring each into the persistence sink
    /// on a best-effort basis (4.I never sits on the critical path).
    pub(crate) fn append_events(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
        events: &[Event],
    ) -> OrchestratorResult<SessionSummary> {
        let summary = self.event_log.append(agent_id, session_id, events)?;
        for event in events {
            let sink = Arc::clone(&self.sink);
            let event = event.clone();
            tokio::spawn(async move { sink.record_event(&event).await });
        }
        Ok(summary)
    }

    fn channel_id(&self, agent_id: &AgentId, session_id: &SessionId) -> String {
        channel_id(agent_id, session_id)
    }

    /// Bootstrap: if the channel has no system message carrying
    /// [`BOOTSTRAP_MARKER`], append one containing the agent's four doc
    /// bodies; otherwise no-op. Idempotent.
    async fn ensure_bootstrap(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
    ) -> OrchestratorResult<()> {
        let channel = self.channel_id(agent_id, session_id);

        if let Some(snapshot) = self.provider.channel_state(&channel).await {
            if has_bootstrap(&snapshot) {
                return Ok(());
            }
        }

        let user_doc = self.catalog.read_doc(agent_id, DocName::User)?;
        let agents_doc = self.catalog.read_doc(agent_id, DocName::Agents)?;
        let soul_doc = self.catalog.read_doc(agent_id, DocName::Soul)?;
        let identity_doc = self.catalog.read_doc(agent_id, DocName::Identity)?;

        let content = format!(
            "{BOOTSTRAP_MARKER}\n\n# User\n{user_doc}\n# Agents\n{agents_doc}\n# Soul\n{soul_doc}\n# Identity\n{identity_doc}"
        );
        self.provider.append_system_message(&channel, &content).await;
        Ok(())
    }

    /// `createSession(agentId, req)`.
    ///
    /// # Errors
    ///
    /// `storageFailure` if post-create bootstrap fails (the new session is
    /// rolled back); propagates the event log's own errors otherwise.
    pub async fn create_session(
        &self,
        agent_id: &AgentId,
        req: CreateSessionRequest,
    ) -> OrchestratorResult<SessionSummary> {
        let session_id = req.id.unwrap_or_else(SessionId::generate);

        if let Some(parent) = &req.parent_session_id {
            if parent == &session_id {
                return Err(OrchestratorError::InvalidPayload(
                    "a session cannot be its own parent".to_string(),
                ));
            }
        }

        let title = req
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("Session {}", session_id.short()));
        let title = truncate_chars(&title, MAX_SESSION_TITLE_LEN);

        let created = Event::new(
            agent_id.clone(),
            session_id.clone(),
            Utc::now(),
            EventPayload::SessionCreated {
                title,
                parent_session_id: req.parent_session_id.as_ref().map(SessionId::to_string),
            },
        );
        let summary = self.event_log.create(agent_id, &session_id, &[created])?;

        if let Err(e) = self.ensure_bootstrap(agent_id, &session_id).await {
            let _ = self.event_log.delete(agent_id, &session_id);
            return Err(OrchestratorError::StorageFailure(e.to_string()));
        }

        Ok(summary)
    }

    /// `sessions.list` / the router's `list_sessions` — delegates straight
    /// to the event log.
    ///
    /// # Errors
    ///
    /// Propagates the event log's own errors.
    pub fn list_sessions(&self, agent_id: &AgentId) -> OrchestratorResult<Vec<SessionSummary>> {
        Ok(self.event_log.list_sessions(agent_id)?)
    }

    /// `sessions.history` — full summary + event replay.
    ///
    /// # Errors
    ///
    /// `sessionNotFound` if the session does not exist.
    pub fn load_history(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
    ) -> OrchestratorResult<(SessionSummary, Vec<Event>)> {
        Ok(self.event_log.load(agent_id, session_id)?)
    }

    /// `sessions.status` — latest `runStatus` stage (default `"idle"`, a
    /// derived-surface value with no [`RunStage`] counterpart) plus a live
    /// process count.
    ///
    /// # Errors
    ///
    /// `sessionNotFound` if the session does not exist.
    pub async fn session_status(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
    ) -> OrchestratorResult<serde_json::Value> {
        let (summary, events) = self.event_log.load(agent_id, session_id)?;

        let stage = events
            .iter()
            .rev()
            .find_map(|e| match &e.payload {
                EventPayload::RunStatus { stage, .. } => {
                    serde_json::to_value(stage).ok().and_then(|v| v.as_str().map(str::to_string))
                },
                _ => None,
            })
            .unwrap_or_else(|| "idle".to_string());

        let active_processes = self
            .processes
            .list(session_id.as_str())
            .await
            .map(|procs| procs.iter().filter(|p| p.running).count())
            .unwrap_or(0);

        Ok(serde_json::json!({
            "summary": summary,
            "stage": stage,
            "activeProcesses": active_processes,
        }))
    }

    /// `postMessage(agentId, sessionId, req)` — the full step-by-step
    /// algorithm: bootstrap, validate, persist attachments, initial status
    /// batch, drive the provider, finalize.
    ///
    /// # Errors
    ///
    /// `invalidPayload` if both `content` and `attachments` are empty;
    /// otherwise propagates storage or model-provider failures.
    pub async fn post_message(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
        req: PostMessageRequest,
    ) -> OrchestratorResult<PostMessageOutcome> {
        self.ensure_bootstrap(agent_id, session_id).await?;

        let content = req.content.trim().to_string();
        if content.is_empty() && req.attachments.is_empty() {
            return Err(OrchestratorError::InvalidPayload(
                "content or attachments required".to_string(),
            ));
        }

        let attachments: Vec<AttachmentRef> = self
            .event_log
            .persist_attachments(agent_id, session_id, &req.attachments)?;

        let runtime = self.runtime_for(session_id).await;
        let _op_guard = runtime.op_lock.lock().await;
        runtime.reset_for_new_turn().await;

        let mut segments = Vec::new();
        if !content.is_empty() {
            segments.push(MessageSegment::Text { text: content.clone() });
        }
        for attachment in &attachments {
            segments.push(MessageSegment::Attachment { attachment: attachment.clone() });
        }

        let now = Utc::now();
        let mut initial_batch = vec![
            Event::new(
                agent_id.clone(),
                session_id.clone(),
                now,
                EventPayload::Message {
                    role: MessageRole::User,
                    segments,
                    user_id: req.user_id.clone(),
                },
            ),
            Event::new(
                agent_id.clone(),
                session_id.clone(),
                now,
                EventPayload::RunStatus {
                    stage: RunStage::Thinking,
                    label: String::new(),
                    details: String::new(),
                    expanded_text: None,
                },
            ),
        ];
        if looks_like_search(&content, !attachments.is_empty()) {
            initial_batch.push(Event::new(
                agent_id.clone(),
                session_id.clone(),
                now,
                EventPayload::RunStatus {
                    stage: RunStage::Searching,
                    label: String::new(),
                    details: String::new(),
                    expanded_text: None,
                },
            ));
        }
        initial_batch.push(Event::new(
            agent_id.clone(),
            session_id.clone(),
            now,
            EventPayload::RunStatus {
                stage: RunStage::Responding,
                label: String::new(),
                details: String::new(),
                expanded_text: None,
            },
        ));

        let mut appended_events = initial_batch.clone();
        self.append_events(agent_id, session_id, &initial_batch)?;

        let channel = self.channel_id(agent_id, session_id);
        let accumulator: Arc<AsyncMutex<Vec<Event>>> = Arc::new(AsyncMutex::new(Vec::new()));

        let chunk_sink = OrchestratorChunkSink::new(
            self.self_arc().ok_or_else(|| {
                OrchestratorError::StorageFailure(
                    "orchestrator self-reference unavailable".to_string(),
                )
            })?,
            agent_id.clone(),
            session_id.clone(),
            Arc::clone(&runtime),
            Arc::clone(&accumulator),
            self.config.clone(),
        );
        let tool_invoker = OrchestratorToolInvoker::new(
            self.self_arc().ok_or_else(|| {
                OrchestratorError::StorageFailure(
                    "orchestrator self-reference unavailable".to_string(),
                )
            })?,
            agent_id.clone(),
            session_id.clone(),
            Arc::clone(&accumulator),
        );

        let model_req = ModelRequest {
            user_id: req.user_id.clone(),
            content: if content.is_empty() {
                "(attachment-only message)".to_string()
            } else {
                content.clone()
            },
        };

        let route_decision = self
            .provider
            .post_message(&channel, model_req, &chunk_sink, &tool_invoker)
            .await
            .map_err(|e| OrchestratorError::ModelProvider(e.0))?;

        appended_events.extend(accumulator.lock().await.drain(..));

        let assistant_text = {
            let buffer = runtime.buffer.lock().await;
            let streamed = buffer.text.trim().to_string();
            if !streamed.is_empty() {
                streamed
            } else {
                drop(buffer);
                self.last_non_bootstrap_system_message(&channel)
                    .await
                    .unwrap_or_else(|| "Done.".to_string())
            }
        };

        let mut final_batch = Vec::new();
        if req.spawn_sub_session {
            let now = Utc::now();
            let title = format!("Sub-session {}", now.format("%H:%M"));
            let child = self
                .create_session(
                    agent_id,
                    CreateSessionRequest {
                        id: None,
                        title: Some(title.clone()),
                        parent_session_id: Some(session_id.clone()),
                    },
                )
                .await?;
            final_batch.push(Event::new(
                agent_id.clone(),
                session_id.clone(),
                Utc::now(),
                EventPayload::SubSession {
                    session_id: child.id.clone(),
                    title,
                },
            ));
        }

        if !assistant_text.is_empty() {
            final_batch.push(Event::new(
                agent_id.clone(),
                session_id.clone(),
                Utc::now(),
                EventPayload::Message {
                    role: MessageRole::Assistant,
                    segments: vec![MessageSegment::Text { text: assistant_text.clone() }],
                    user_id: "agent".to_string(),
                },
            ));
        }

        let interrupted = runtime.is_interrupted();
        let final_status = if interrupted {
            EventPayload::RunStatus {
                stage: RunStage::Interrupted,
                label: String::new(),
                details: String::new(),
                expanded_text: None,
            }
        } else if looks_like_error(&assistant_text) {
            EventPayload::RunStatus {
                stage: RunStage::Interrupted,
                label: "Error".to_string(),
                details: String::new(),
                expanded_text: None,
            }
        } else {
            EventPayload::RunStatus {
                stage: RunStage::Done,
                label: String::new(),
                details: String::new(),
                expanded_text: None,
            }
        };
        final_batch.push(Event::new(agent_id.clone(), session_id.clone(), Utc::now(), final_status));

        let summary = self.append_events(agent_id, session_id, &final_batch)?;
        appended_events.extend(final_batch);

        Ok(PostMessageOutcome { summary, appended_events, route_decision })
    }

    async fn last_non_bootstrap_system_message(&self, channel: &str) -> Option<String> {
        let snapshot = self.provider.channel_state(channel).await?;
        snapshot
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::System && !m.content.contains(BOOTSTRAP_MARKER))
            .map(|m| m.content.clone())
    }

    /// `controlSession(action)`: appends a `runControl` event and the
    /// corresponding `runStatus`. `interrupt` also sets the in-memory flag
    /// the next `onChunk` of an in-flight turn checks.
    ///
    /// # Errors
    ///
    /// `sessionNotFound` if the session does not exist.
    pub async fn control_session(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
        action: RunControlAction,
    ) -> OrchestratorResult<SessionSummary> {
        if action == RunControlAction::Interrupt {
            let runtime = self.runtime_for(session_id).await;
            runtime.interrupted.store(true, std::sync::atomic::Ordering::SeqCst);
        }

        let now = Utc::now();
        let control_event =
            Event::new(agent_id.clone(), session_id.clone(), now, EventPayload::RunControl { action });

        let status_payload = match action {
            RunControlAction::Pause => EventPayload::RunStatus {
                stage: RunStage::Paused,
                label: String::new(),
                details: String::new(),
                expanded_text: None,
            },
            RunControlAction::Resume => EventPayload::RunStatus {
                stage: RunStage::Thinking,
                label: "Resumed".to_string(),
                details: String::new(),
                expanded_text: None,
            },
            RunControlAction::Interrupt => EventPayload::RunStatus {
                stage: RunStage::Interrupted,
                label: String::new(),
                details: String::new(),
                expanded_text: None,
            },
        };
        let status_event = Event::new(agent_id.clone(), session_id.clone(), now, status_payload);

        Ok(self.append_events(agent_id, session_id, &[control_event, status_event])?)
    }
}

fn has_bootstrap(snapshot: &ChannelSnapshot) -> bool {
    snapshot
        .messages
        .iter()
        .any(|m| m.role == MessageRole::System && m.content.contains(BOOTSTRAP_MARKER))
}
