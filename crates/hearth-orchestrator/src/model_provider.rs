//! The abstract `ModelProvider` interface the orchestrator drives, and the
//! small callback trait objects `postMessage` threads through it — the same
//! `Arc<dyn Trait>` injection shape the teacher threads a `Frontend`
//! implementation through `run_turn_streaming`.

use async_trait::async_trait;
use hearth_core::MessageRole;
use hearth_tools::ToolInvocationResult;
use serde_json::Value;

/// A request handed to [`ModelProvider::post_message`].
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// Id of the user on whose behalf this turn runs.
    pub user_id: String,
    /// The user's message content, or a placeholder when attachments-only.
    pub content: String,
}

/// One message as the provider's channel currently holds it.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    /// Who authored the message.
    pub role: MessageRole,
    /// The message's text content.
    pub content: String,
}

/// A read-only view of a provider channel's current message history.
#[derive(Debug, Clone, Default)]
pub struct ChannelSnapshot {
    /// Messages in the channel, oldest first.
    pub messages: Vec<ChannelMessage>,
}

/// A tool call the provider wants the orchestrator to dispatch.
#[derive(Debug, Clone)]
pub struct ToolInvocationRequest {
    /// The tool id to invoke.
    pub tool: String,
    /// Arguments to pass to the tool.
    pub arguments: Value,
    /// Optional free-text reason supplied by the model.
    pub reason: Option<String>,
}

/// Opaque routing decision a provider may return from `postMessage`,
/// surfaced to the caller verbatim alongside the appended events.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct RouteDecision {
    /// Short label identifying the route taken, e.g. `"default"`.
    pub label: String,
    /// Provider-specific detail, opaque to the orchestrator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

/// Errors a [`ModelProvider`] may report back to the orchestrator.
#[derive(Debug, Clone, thiserror::Error)]
#[error("model provider error: {0}")]
pub struct ModelProviderError(pub String);

/// Receives cumulative streamed assistant text from a `postMessage` call.
///
/// Mirrors the teacher's `Frontend::show_status`-style callback: implemented
/// by the orchestrator, handed to the provider as a trait object so the
/// provider never depends on the orchestrator crate.
#[async_trait]
pub trait ChunkSink: Send + Sync {
    /// `partial` is the cumulative assistant text streamed so far. Returns
    /// `false` when the provider should stop (the session was interrupted).
    async fn on_chunk(&self, partial: &str) -> bool;
}

/// Dispatches a tool call requested mid-turn by the provider.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Run `request` through authorization and the tool executor, appending
    /// the bracketing `toolCall`/`toolResult` events.
    async fn on_tool(&self, request: ToolInvocationRequest) -> ToolInvocationResult;
}

/// The abstract model backend the orchestrator drives. Implementations own
/// whatever LLM SDK or channel state is needed; the core never depends on a
/// concrete provider.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Stream one model turn for `channel_id`. `chunks` receives cumulative
    /// assistant text as it streams; `tools` dispatches any tool calls the
    /// model makes mid-turn.
    async fn post_message(
        &self,
        channel_id: &str,
        req: ModelRequest,
        chunks: &(dyn ChunkSink),
        tools: &(dyn ToolInvoker),
    ) -> Result<RouteDecision, ModelProviderError>;

    /// A snapshot of the channel's current message history, if the channel
    /// is known to the provider.
    async fn channel_state(&self, channel_id: &str) -> Option<ChannelSnapshot>;

    /// Append a system message to the channel (used for bootstrap).
    async fn append_system_message(&self, channel_id: &str, content: &str);

    /// Switch the model backing this channel at runtime.
    async fn update_model_provider(&self, channel_id: &str, model: &str);
}

/// `agent:<agentId>:session:<sessionId>`, the channel id convention every
/// provider call is scoped by.
#[must_use]
pub fn channel_id(agent_id: &hearth_core::AgentId, session_id: &hearth_core::SessionId) -> String {
    format!("agent:{agent_id}:session:{session_id}")
}
