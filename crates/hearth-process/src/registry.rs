//! A per-session registry of managed background processes.
//!
//! Owned by exactly one actor; callers serialize `start`/`stop`/`cleanup`
//! per session (see the orchestrator's dispatch model), while `status` and
//! `list` are safe to call concurrently from stream subscribers since every
//! returned [`ManagedProcessInfo`] is a snapshot, not a handle into the
//! live table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{ProcessError, ProcessResult};

/// A snapshot of one managed process's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedProcessInfo {
    /// Process id, unique within its owning session.
    pub id: String,
    /// The command that was run.
    pub command: String,
    /// Arguments passed to the command.
    pub args: Vec<String>,
    /// Working directory, if one was set.
    pub cwd: Option<PathBuf>,
    /// When the process was started.
    pub started_at: DateTime<Utc>,
    /// When the process was observed to exit, if it has.
    pub finished_at: Option<DateTime<Utc>>,
    /// Exit code, once observed.
    pub exit_code: Option<i32>,
    /// Whether the process is still running, as of the last refresh.
    pub running: bool,
}

struct ProcessEntry {
    child: Child,
    info: ManagedProcessInfo,
}

/// A per-session map from process id to managed record.
#[derive(Default)]
pub struct ProcessRegistry {
    sessions: Mutex<HashMap<String, HashMap<String, ProcessEntry>>>,
}

impl ProcessRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Start a new process for `session_id`.
    ///
    /// # Errors
    ///
    /// [`ProcessError::ProcessLimitReached`] if the session already has
    /// `max_processes` live processes; [`ProcessError::LaunchFailed`] if the
    /// command cannot be spawned.
    pub async fn start(
        &self,
        session_id: &str,
        command: &str,
        args: &[String],
        cwd: Option<PathBuf>,
        max_processes: u32,
    ) -> ProcessResult<ManagedProcessInfo> {
        let mut sessions = self.sessions.lock().await;
        let processes = sessions.entry(session_id.to_string()).or_default();

        Self::refresh_all(processes).await;

        let live_count = processes.values().filter(|p| p.info.running).count();
        if live_count as u32 >= max_processes {
            return Err(ProcessError::ProcessLimitReached);
        }

        let mut cmd = Command::new(command);
        cmd.args(args).stdout(Stdio::null()).stderr(Stdio::null());
        if let Some(cwd) = &cwd {
            cmd.current_dir(cwd);
        }

        let child = cmd
            .spawn()
            .map_err(|e| ProcessError::LaunchFailed(e.to_string()))?;

        let id = uuid::Uuid::new_v4().to_string();
        let info = ManagedProcessInfo {
            id: id.clone(),
            command: command.to_string(),
            args: args.to_vec(),
            cwd,
            started_at: Utc::now(),
            finished_at: None,
            exit_code: None,
            running: true,
        };

        info!(session_id, process_id = %id, command, "process started");
        processes.insert(id, ProcessEntry { child, info: info.clone() });

        Ok(info)
    }

    /// Get the current status of one process, refreshing it first.
    ///
    /// # Errors
    ///
    /// [`ProcessError::ProcessNotFound`] if no such process is registered.
    pub async fn status(&self, session_id: &str, process_id: &str) -> ProcessResult<ManagedProcessInfo> {
        let mut sessions = self.sessions.lock().await;
        let processes = sessions
            .get_mut(session_id)
            .ok_or_else(|| ProcessError::ProcessNotFound(process_id.to_string()))?;

        let entry = processes
            .get_mut(process_id)
            .ok_or_else(|| ProcessError::ProcessNotFound(process_id.to_string()))?;
        Self::refresh_one(entry).await;

        Ok(entry.info.clone())
    }

    /// Terminate a running process, waiting for it to exit.
    ///
    /// Stopping an already-exited process is not an error: its final
    /// status is simply returned.
    ///
    /// # Errors
    ///
    /// [`ProcessError::ProcessNotFound`] if no such process is registered.
    pub async fn stop(&self, session_id: &str, process_id: &str) -> ProcessResult<ManagedProcessInfo> {
        let mut sessions = self.sessions.lock().await;
        let processes = sessions
            .get_mut(session_id)
            .ok_or_else(|| ProcessError::ProcessNotFound(process_id.to_string()))?;

        let entry = processes
            .get_mut(process_id)
            .ok_or_else(|| ProcessError::ProcessNotFound(process_id.to_string()))?;

        if entry.info.running {
            if let Err(e) = entry.child.kill().await {
                warn!(session_id, process_id, error = %e, "failed to kill process");
            }
            Self::refresh_one(entry).await;
        }

        Ok(entry.info.clone())
    }

    /// List every process the session has ever started, refreshing each
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error only if internal state is unexpectedly missing.
    pub async fn list(&self, session_id: &str) -> ProcessResult<Vec<ManagedProcessInfo>> {
        let mut sessions = self.sessions.lock().await;
        let Some(processes) = sessions.get_mut(session_id) else {
            return Ok(Vec::new());
        };
        Self::refresh_all(processes).await;
        Ok(processes.values().map(|p| p.info.clone()).collect())
    }

    /// Terminate every live process for a session and discard its records.
    pub async fn cleanup(&self, session_id: &str) {
        let mut sessions = self.sessions.lock().await;
        if let Some(mut processes) = sessions.remove(session_id) {
            for (process_id, entry) in &mut processes {
                if entry.info.running {
                    if let Err(e) = entry.child.kill().await {
                        warn!(session_id, process_id, error = %e, "failed to kill process during cleanup");
                    }
                    let _ = entry.child.wait().await;
                }
            }
        }
    }

    /// Terminate every live process across every session.
    pub async fn shutdown(&self) {
        let session_ids: Vec<String> = {
            let sessions = self.sessions.lock().await;
            sessions.keys().cloned().collect()
        };
        for session_id in session_ids {
            self.cleanup(&session_id).await;
        }
    }

    async fn refresh_one(entry: &mut ProcessEntry) {
        if !entry.info.running {
            return;
        }
        match entry.child.try_wait() {
            Ok(Some(status)) => {
                entry.info.running = false;
                entry.info.exit_code = status.code();
                entry.info.finished_at = Some(Utc::now());
            },
            Ok(None) => {},
            Err(e) => {
                warn!(error = %e, "failed to poll process exit status");
            },
        }
    }

    async fn refresh_all(processes: &mut HashMap<String, ProcessEntry>) {
        for entry in processes.values_mut() {
            Self::refresh_one(entry).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_then_status_reports_running() {
        let registry = ProcessRegistry::new();
        let info = registry
            .start("s1", "sleep", &["1".to_string()], None, 4)
            .await
            .unwrap();
        assert!(info.running);

        let status = registry.status("s1", &info.id).await.unwrap();
        assert!(status.running);
    }

    #[tokio::test]
    async fn process_quota_blocks_then_unblocks_after_stop() {
        let registry = ProcessRegistry::new();
        let a = registry
            .start("s1", "sleep", &["5".to_string()], None, 1)
            .await
            .unwrap();

        let result = registry
            .start("s1", "sleep", &["5".to_string()], None, 1)
            .await;
        assert!(matches!(result, Err(ProcessError::ProcessLimitReached)));

        registry.stop("s1", &a.id).await.unwrap();

        let b = registry
            .start("s1", "sleep", &["5".to_string()], None, 1)
            .await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn stop_observes_exit_code() {
        let registry = ProcessRegistry::new();
        let info = registry
            .start("s1", "sh", &["-c".to_string(), "exit 0".to_string()], None, 4)
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let status = registry.status("s1", &info.id).await.unwrap();
        assert!(!status.running);
        assert_eq!(status.exit_code, Some(0));
    }

    #[tokio::test]
    async fn status_unknown_process_is_not_found() {
        let registry = ProcessRegistry::new();
        let result = registry.status("s1", "nonexistent").await;
        assert!(matches!(result, Err(ProcessError::ProcessNotFound(_))));
    }

    #[tokio::test]
    async fn cleanup_removes_session_records() {
        let registry = ProcessRegistry::new();
        let info = registry
            .start("s1", "sleep", &["5".to_string()], None, 4)
            .await
            .unwrap();
        registry.cleanup("s1").await;

        let result = registry.status("s1", &info.id).await;
        assert!(matches!(result, Err(ProcessError::ProcessNotFound(_))));
    }

    #[tokio::test]
    async fn launch_failed_for_missing_binary() {
        let registry = ProcessRegistry::new();
        let result = registry
            .start("s1", "/no/such/binary-xyz", &[], None, 4)
            .await;
        assert!(matches!(result, Err(ProcessError::LaunchFailed(_))));
    }
}
