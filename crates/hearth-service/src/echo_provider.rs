//! A minimal [`ModelProvider`] that echoes the user's message back in two
//! chunks. Real provider SDKs sit outside the orchestrator core by design,
//! so this binary needs a stand-in backend to actually drive a turn.

use std::collections::HashMap;

use async_trait::async_trait;
use hearth_core::MessageRole;
use hearth_orchestrator::{
    ChannelMessage, ChannelSnapshot, ChunkSink, ModelProvider, ModelProviderError, ModelRequest,
    RouteDecision, ToolInvoker,
};
use tokio::sync::Mutex;

/// Keeps one [`ChannelSnapshot`] per channel id and replies with
/// `"Echo: <content>"`, streamed in two chunks so the progress-persist and
/// interrupt paths have something to exercise.
#[derive(Default)]
pub struct EchoModelProvider {
    channels: Mutex<HashMap<String, ChannelSnapshot>>,
}

#[async_trait]
impl ModelProvider for EchoModelProvider {
    async fn post_message(
        &self,
        channel_id: &str,
        req: ModelRequest,
        chunks: &(dyn ChunkSink),
        _tools: &(dyn ToolInvoker),
    ) -> Result<RouteDecision, ModelProviderError> {
        {
            let mut channels = self.channels.lock().await;
            channels.entry(channel_id.to_string()).or_default().messages.push(ChannelMessage {
                role: MessageRole::User,
                content: req.content.clone(),
            });
        }

        let reply = format!("Echo: {}", req.content);
        let half = reply.len() / 2;
        if !chunks.on_chunk(&reply[..half]).await {
            return Ok(RouteDecision { label: "interrupted".to_string(), detail: None });
        }
        if !chunks.on_chunk(&reply).await {
            return Ok(RouteDecision { label: "interrupted".to_string(), detail: None });
        }

        let mut channels = self.channels.lock().await;
        channels.entry(channel_id.to_string()).or_default().messages.push(ChannelMessage {
            role: MessageRole::Assistant,
            content: reply,
        });

        Ok(RouteDecision { label: "echo".to_string(), detail: None })
    }

    async fn channel_state(&self, channel_id: &str) -> Option<ChannelSnapshot> {
        self.channels.lock().await.get(channel_id).cloned()
    }

    async fn append_system_message(&self, channel_id: &str, content: &str) {
        let mut channels = self.channels.lock().await;
        channels.entry(channel_id.to_string()).or_default().messages.push(ChannelMessage {
            role: MessageRole::System,
            content: content.to_string(),
        });
    }

    async fn update_model_provider(&self, _channel_id: &str, _model: &str) {}
}
