//! Session lifecycle commands: create, list, inspect, post a message,
//! control a run, and tail a live stream.

use std::sync::Arc;

use anyhow::{Context, Result};
use hearth_core::{AgentId, RunControlAction, SessionId};
use hearth_orchestrator::{CreateSessionRequest, PostMessageRequest, SessionOrchestrator};
use hearth_storage::EventLogStore;
use hearth_stream::{encode_sse, spawn_session_stream, stream_open_comment, StreamConfig, StreamUpdate};
use tokio_util::sync::CancellationToken;

use crate::output::{print_value, Format};

/// `sessions create`.
pub async fn create(
    orchestrator: &SessionOrchestrator,
    agent_id: AgentId,
    id: Option<SessionId>,
    title: Option<String>,
    parent: Option<SessionId>,
    format: Format,
) -> Result<()> {
    let summary = orchestrator
        .create_session(&agent_id, CreateSessionRequest { id, title, parent_session_id: parent })
        .await
        .with_context(|| format!("creating session for agent {agent_id}"))?;
    print_value(&summary, format);
    Ok(())
}

/// `sessions list`.
pub fn list(orchestrator: &SessionOrchestrator, agent_id: AgentId, format: Format) -> Result<()> {
    let sessions = orchestrator
        .list_sessions(&agent_id)
        .with_context(|| format!("listing sessions for agent {agent_id}"))?;
    print_value(&sessions, format);
    Ok(())
}

/// `sessions show` — summary plus full event history.
pub fn show(
    orchestrator: &SessionOrchestrator,
    agent_id: AgentId,
    session_id: SessionId,
    format: Format,
) -> Result<()> {
    let (summary, events) = orchestrator
        .load_history(&agent_id, &session_id)
        .with_context(|| format!("loading session {session_id}"))?;
    print_value(&serde_json::json!({ "summary": summary, "events": events }), format);
    Ok(())
}

/// `sessions status`.
pub async fn status(
    orchestrator: &SessionOrchestrator,
    agent_id: AgentId,
    session_id: SessionId,
    format: Format,
) -> Result<()> {
    let status = orchestrator
        .session_status(&agent_id, &session_id)
        .await
        .with_context(|| format!("reading status of session {session_id}"))?;
    print_value(&status, format);
    Ok(())
}

/// `sessions post` — run one `postMessage` turn to completion.
#[allow(clippy::too_many_arguments)]
pub async fn post(
    orchestrator: &SessionOrchestrator,
    agent_id: AgentId,
    session_id: SessionId,
    user_id: String,
    content: String,
    spawn_sub_session: bool,
    format: Format,
) -> Result<()> {
    let req = PostMessageRequest { user_id, content, attachments: Vec::new(), spawn_sub_session };
    let outcome = orchestrator
        .post_message(&agent_id, &session_id, req)
        .await
        .with_context(|| format!("posting message to session {session_id}"))?;
    print_value(
        &serde_json::json!({
            "summary": outcome.summary,
            "events": outcome.appended_events,
            "routeDecision": outcome.route_decision,
        }),
        format,
    );
    Ok(())
}

/// `sessions control`.
pub async fn control(
    orchestrator: &SessionOrchestrator,
    agent_id: AgentId,
    session_id: SessionId,
    action: RunControlAction,
    format: Format,
) -> Result<()> {
    let summary = orchestrator
        .control_session(&agent_id, &session_id, action)
        .await
        .with_context(|| format!("controlling session {session_id}"))?;
    print_value(&summary, format);
    Ok(())
}

/// `sessions stream` — tail a session's live updates as server-sent-events
/// frames until the session closes, errors, or the process is interrupted.
pub async fn stream(event_log: Arc<EventLogStore>, agent_id: AgentId, session_id: SessionId) -> Result<()> {
    let cancel = CancellationToken::new();
    let mut rx = spawn_session_stream(event_log, agent_id, session_id, StreamConfig::default(), cancel.clone());

    print!("{}", stream_open_comment());
    let mut last_cursor = 0usize;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                break;
            },
            update = rx.recv() => {
                let Some(update) = update else { break };
                let is_terminal =
                    matches!(update, StreamUpdate::SessionClosed { .. } | StreamUpdate::SessionError { .. });
                if let Some(cursor) = update.cursor() {
                    last_cursor = cursor;
                }
                print!("{}", encode_sse(&update, last_cursor));
                if is_terminal {
                    break;
                }
            },
        }
    }

    Ok(())
}
