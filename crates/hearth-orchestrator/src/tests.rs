//! Integration-style tests driving [`SessionOrchestrator`] against a mock
//! [`ModelProvider`], mirroring the tool crate's own `test_support`-backed
//! fixtures rather than hitting a real LLM.

use std::sync::Arc;

use async_trait::async_trait;
use hearth_catalog::{AgentCatalogStore, CreateAgentRequest, ToolsPolicyStore};
use hearth_core::{AgentId, RunControlAction, RunStage, SessionId};
use hearth_process::ProcessRegistry;
use hearth_storage::{EventLogStore, PersistenceSink};
use hearth_tools::ToolRegistry;
use hearth_workspace::WorkspaceBoundary;
use tempfile::TempDir;
use tokio::sync::Mutex as AsyncMutex;

use crate::model_provider::{
    ChannelMessage, ChannelSnapshot, ChunkSink, ModelProvider, ModelProviderError, ModelRequest,
    RouteDecision, ToolInvoker,
};
use crate::orchestrator::{CreateSessionRequest, PostMessageRequest, SessionOrchestrator};
use crate::PostMessageConfig;

/// A provider that streams a fixed reply in two chunks and never calls
/// tools, recording every channel it has seen a system message appended to.
struct ScriptedProvider {
    reply: String,
    channels: AsyncMutex<std::collections::HashMap<String, ChannelSnapshot>>,
}

impl ScriptedProvider {
    fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            channels: AsyncMutex::new(std::collections::HashMap::new()),
        }
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn post_message(
        &self,
        channel_id: &str,
        req: ModelRequest,
        chunks: &(dyn ChunkSink),
        _tools: &(dyn ToolInvoker),
    ) -> Result<RouteDecision, ModelProviderError> {
        {
            let mut channels = self.channels.lock().await;
            let snapshot = channels.entry(channel_id.to_string()).or_default();
            snapshot.messages.push(ChannelMessage {
                role: hearth_core::MessageRole::User,
                content: req.content,
            });
        }

        let half = self.reply.len() / 2;
        if !chunks.on_chunk(&self.reply[..half]).await {
            return Ok(RouteDecision { label: "interrupted".to_string(), detail: None });
        }
        if !chunks.on_chunk(&self.reply).await {
            return Ok(RouteDecision { label: "interrupted".to_string(), detail: None });
        }

        let mut channels = self.channels.lock().await;
        let snapshot = channels.entry(channel_id.to_string()).or_default();
        snapshot.messages.push(ChannelMessage {
            role: hearth_core::MessageRole::Assistant,
            content: self.reply.clone(),
        });

        Ok(RouteDecision { label: "default".to_string(), detail: None })
    }

    async fn channel_state(&self, channel_id: &str) -> Option<ChannelSnapshot> {
        self.channels.lock().await.get(channel_id).cloned()
    }

    async fn append_system_message(&self, channel_id: &str, content: &str) {
        let mut channels = self.channels.lock().await;
        let snapshot = channels.entry(channel_id.to_string()).or_default();
        snapshot.messages.push(ChannelMessage {
            role: hearth_core::MessageRole::System,
            content: content.to_string(),
        });
    }

    async fn update_model_provider(&self, _channel_id: &str, _model: &str) {}
}

fn setup(reply: &str) -> (TempDir, Arc<SessionOrchestrator>, AgentId) {
    let dir = TempDir::new().unwrap();
    let agents_root = dir.path().join("agents");
    let agent_id = AgentId::new("a1").unwrap();

    let catalog = Arc::new(AgentCatalogStore::new(&agents_root));
    catalog
        .create_agent(CreateAgentRequest {
            id: agent_id.clone(),
            display_name: "Test Agent".to_string(),
            role: "assistant".to_string(),
            selected_model: None,
        })
        .unwrap();

    let tools_policy = Arc::new(ToolsPolicyStore::new(&agents_root));
    let event_log = EventLogStore::new(&agents_root);
    let tool_registry = Arc::new(ToolRegistry::with_defaults());
    let processes = Arc::new(ProcessRegistry::new());
    let workspace = WorkspaceBoundary::new(dir.path());
    let sink = Arc::new(PersistenceSink::disabled());
    let provider = Arc::new(ScriptedProvider::new(reply));

    let orchestrator = SessionOrchestrator::new_arc(
        event_log,
        catalog,
        tools_policy,
        tool_registry,
        processes,
        workspace,
        sink,
        provider,
        PostMessageConfig::default(),
    );

    (dir, orchestrator, agent_id)
}

#[tokio::test]
async fn post_message_appends_user_and_assistant_turns() {
    let (_dir, orchestrator, agent_id) = setup("Hello there, this is the scripted reply.");

    let summary = orchestrator
        .create_session(&agent_id, CreateSessionRequest::default())
        .await
        .unwrap();
    let session_id = SessionId::new(summary.id.as_str()).unwrap();

    let outcome = orchestrator
        .post_message(
            &agent_id,
            &session_id,
            PostMessageRequest {
                user_id: "u1".to_string(),
                content: "hi".to_string(),
                attachments: Vec::new(),
                spawn_sub_session: false,
            },
        )
        .await
        .unwrap();

    let (_summary, events) = orchestrator.load_history(&agent_id, &session_id).unwrap();
    assert!(events.iter().any(|e| e.is_message()));
    assert!(outcome
        .appended_events
        .iter()
        .any(|e| matches!(e.payload, hearth_core::EventPayload::RunStatus { stage: RunStage::Done, .. })));
    assert_eq!(outcome.route_decision.label, "default");
}

#[tokio::test]
async fn bootstrap_runs_exactly_once_per_channel() {
    let (_dir, orchestrator, agent_id) = setup("first reply");
    let summary = orchestrator
        .create_session(&agent_id, CreateSessionRequest::default())
        .await
        .unwrap();
    let session_id = SessionId::new(summary.id.as_str()).unwrap();

    for _ in 0..2 {
        orchestrator
            .post_message(
                &agent_id,
                &session_id,
                PostMessageRequest {
                    user_id: "u1".to_string(),
                    content: "hi again".to_string(),
                    attachments: Vec::new(),
                    spawn_sub_session: false,
                },
            )
            .await
            .unwrap();
    }

    let channel = crate::model_provider::channel_id(&agent_id, &session_id);
    let snapshot = orchestrator.provider.channel_state(&channel).await.unwrap();
    let bootstrap_count = snapshot
        .messages
        .iter()
        .filter(|m| {
            m.role == hearth_core::MessageRole::System
                && m.content.contains(crate::config::BOOTSTRAP_MARKER)
        })
        .count();
    assert_eq!(bootstrap_count, 1);
}

#[tokio::test]
async fn control_session_interrupt_sets_runtime_flag_and_appends_events() {
    let (_dir, orchestrator, agent_id) = setup("reply");
    let summary = orchestrator
        .create_session(&agent_id, CreateSessionRequest::default())
        .await
        .unwrap();
    let session_id = SessionId::new(summary.id.as_str()).unwrap();

    let updated = orchestrator
        .control_session(&agent_id, &session_id, RunControlAction::Interrupt)
        .await
        .unwrap();
    assert_eq!(updated.message_count, 0);

    let (_summary, events) = orchestrator.load_history(&agent_id, &session_id).unwrap();
    assert!(events.iter().any(|e| matches!(
        e.payload,
        hearth_core::EventPayload::RunStatus { stage: RunStage::Interrupted, .. }
    )));
}

#[tokio::test]
async fn create_session_rejects_self_parenting() {
    let (_dir, orchestrator, agent_id) = setup("reply");
    let session_id = SessionId::generate();
    let result = orchestrator
        .create_session(
            &agent_id,
            CreateSessionRequest {
                id: Some(session_id.clone()),
                title: None,
                parent_session_id: Some(session_id),
            },
        )
        .await;
    assert!(result.is_err());
}
