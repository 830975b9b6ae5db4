//! Agent Catalog Store: per-agent directory scaffold of a summary, a config
//! file, and four markdown documents that seed every session's bootstrap
//! context.

use chrono::Utc;
use hearth_core::{AgentId, AgentSummary};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{CatalogError, CatalogResult};

/// One of the four markdown documents every agent carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocName {
    /// Notes about the human the agent serves.
    User,
    /// Notes about other agents it collaborates with.
    Agents,
    /// The agent's standing instructions / personality.
    Soul,
    /// The agent's own identity description.
    Identity,
}

impl DocName {
    fn filename(self) -> &'static str {
        match self {
            DocName::User => "User.md",
            DocName::Agents => "Agents.md",
            DocName::Soul => "Soul.md",
            DocName::Identity => "Identity.md",
        }
    }

    fn default_template(self) -> &'static str {
        match self {
            DocName::User => "# User\n\n_No notes yet._\n",
            DocName::Agents => "# Agents\n\n_No collaborating agents recorded yet._\n",
            DocName::Soul => "# Soul\n\n_No standing instructions recorded yet._\n",
            DocName::Identity => "# Identity\n\n_No identity recorded yet._\n",
        }
    }
}

/// Normalize line endings to `\n` and ensure the content ends with exactly
/// one trailing newline.
fn normalize(content: &str) -> String {
    let unified = content.replace("\r\n", "\n").replace('\r', "\n");
    let trimmed = unified.trim_end_matches('\n');
    format!("{trimmed}\n")
}

/// On-disk `config.json` shape: `{id, displayName, role, createdAt, selectedModel?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentConfig {
    id: AgentId,
    display_name: String,
    role: String,
    created_at: chrono::DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected_model: Option<String>,
}

impl From<&AgentSummary> for AgentConfig {
    fn from(summary: &AgentSummary) -> Self {
        Self {
            id: summary.id.clone(),
            display_name: summary.display_name.clone(),
            role: summary.role.clone(),
            created_at: summary.created_at,
            selected_model: summary.selected_model.clone(),
        }
    }
}

/// Request to create a new agent.
#[derive(Debug, Clone)]
pub struct CreateAgentRequest {
    /// Stable agent id.
    pub id: AgentId,
    /// Display name.
    pub display_name: String,
    /// Free-text role.
    pub role: String,
    /// Selected model id, if any.
    pub selected_model: Option<String>,
}

/// Per-agent directory store under `<workspaceRoot>/agents/`.
#[derive(Debug, Clone)]
pub struct AgentCatalogStore {
    agents_root: PathBuf,
}

impl AgentCatalogStore {
    /// Create a store rooted at `<workspaceRoot>/agents`.
    #[must_use]
    pub fn new(agents_root: impl Into<PathBuf>) -> Self {
        Self {
            agents_root: agents_root.into(),
        }
    }

    /// The agents root directory.
    #[must_use]
    pub fn agents_root(&self) -> &Path {
        &self.agents_root
    }

    /// Directory for a given agent.
    #[must_use]
    pub fn agent_dir(&self, agent_id: &AgentId) -> PathBuf {
        self.agents_root.join(agent_id.as_str())
    }

    fn try_scaffold(&self, dir: &Path, req: &CreateAgentRequest) -> CatalogResult<AgentSummary> {
        std::fs::create_dir_all(dir.join("sessions"))?;
        std::fs::create_dir_all(dir.join("tools"))?;

        let summary = AgentSummary {
            id: req.id.clone(),
            display_name: req.display_name.clone(),
            role: req.role.clone(),
            created_at: Utc::now(),
            selected_model: req.selected_model.clone(),
        };

        let agent_json = serde_json::to_string_pretty(&summary)
            .map_err(|e| CatalogError::StorageFailure(e.to_string()))?;
        std::fs::write(dir.join("agent.json"), agent_json)?;

        let config = AgentConfig::from(&summary);
        let config_json = serde_json::to_string_pretty(&config)
            .map_err(|e| CatalogError::StorageFailure(e.to_string()))?;
        std::fs::write(dir.join("config.json"), config_json)?;

        for doc in [DocName::User, DocName::Agents, DocName::Soul, DocName::Identity] {
            std::fs::write(dir.join(doc.filename()), doc.default_template())?;
        }

        crate::tools_policy::ToolsPolicyStore::new(self.agents_root.clone())
            .write_default(&req.id)?;

        Ok(summary)
    }

    /// Scaffold a brand new agent directory: `agent.json`, `config.json`,
    /// the four markdown documents, an empty `sessions/` directory, and a
    /// default `tools/tools.json`.
    ///
    /// The whole layout is written as one logical transaction: if anything
    /// fails after the directory is created, the partial directory is
    /// removed.
    ///
    /// # Errors
    ///
    /// [`CatalogError::AlreadyExists`] if the agent directory already
    /// exists; otherwise a storage failure is propagated after rollback.
    pub fn create_agent(&self, req: CreateAgentRequest) -> CatalogResult<AgentSummary> {
        let dir = self.agent_dir(&req.id);
        if dir.exists() {
            return Err(CatalogError::AlreadyExists(req.id.to_string()));
        }

        match self.try_scaffold(&dir, &req) {
            Ok(summary) => {
                debug!(agent_id = %req.id, "agent created");
                Ok(summary)
            },
            Err(e) => {
                if let Err(cleanup_err) = std::fs::remove_dir_all(&dir) {
                    warn!(
                        agent_id = %req.id,
                        error = %cleanup_err,
                        "failed to roll back partially created agent directory"
                    );
                }
                Err(e)
            },
        }
    }

    /// Load an agent's summary from `agent.json`.
    ///
    /// # Errors
    ///
    /// [`CatalogError::AgentNotFound`] if the directory or file is missing.
    pub fn get_agent(&self, agent_id: &AgentId) -> CatalogResult<AgentSummary> {
        let path = self.agent_dir(agent_id).join("agent.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|_| CatalogError::AgentNotFound(agent_id.to_string()))?;
        serde_json::from_str(&content).map_err(|e| CatalogError::StorageFailure(e.to_string()))
    }

    /// List every agent in the catalog, sorted by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the agents root cannot be read.
    pub fn list_agents(&self) -> CatalogResult<Vec<AgentSummary>> {
        if !self.agents_root.is_dir() {
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        for entry in std::fs::read_dir(&self.agents_root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let Ok(agent_id) = AgentId::new(name) else {
                continue;
            };
            if let Ok(summary) = self.get_agent(&agent_id) {
                summaries.push(summary);
            }
        }

        summaries.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(summaries)
    }

    /// Delete an agent and everything under its directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    pub fn delete_agent(&self, agent_id: &AgentId) -> CatalogResult<()> {
        let dir = self.agent_dir(agent_id);
        if dir.is_dir() {
            std::fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }

    /// Read one of an agent's four markdown documents.
    ///
    /// If the file is missing, a default template is substituted (without
    /// being written to disk). `Identity.md` additionally falls back to the
    /// legacy `Identity.id` file, promoting its content to markdown, before
    /// falling back to the default template. Line endings are always
    /// normalized to `\n` with exactly one trailing newline.
    ///
    /// # Errors
    ///
    /// [`CatalogError::AgentNotFound`] if the agent directory does not exist.
    pub fn read_doc(&self, agent_id: &AgentId, doc: DocName) -> CatalogResult<String> {
        let dir = self.agent_dir(agent_id);
        if !dir.is_dir() {
            return Err(CatalogError::AgentNotFound(agent_id.to_string()));
        }

        let path = dir.join(doc.filename());
        if let Ok(content) = std::fs::read_to_string(&path) {
            return Ok(normalize(&content));
        }

        if doc == DocName::Identity {
            let legacy_path = dir.join("Identity.id");
            if let Ok(legacy) = std::fs::read_to_string(&legacy_path) {
                return Ok(normalize(&legacy));
            }
        }

        Ok(normalize(doc.default_template()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, AgentCatalogStore) {
        let dir = TempDir::new().unwrap();
        let store = AgentCatalogStore::new(dir.path());
        (dir, store)
    }

    fn req(id: &str) -> CreateAgentRequest {
        CreateAgentRequest {
            id: AgentId::new(id).unwrap(),
            display_name: "A".to_string(),
            role: "R".to_string(),
            selected_model: None,
        }
    }

    #[test]
    fn create_then_list_round_trips() {
        let (_dir, store) = store();
        store.create_agent(req("a1")).unwrap();

        let agents = store.list_agents().unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].id.as_str(), "a1");
        assert_eq!(agents[0].display_name, "A");

        let agent_dir = store.agent_dir(&AgentId::new("a1").unwrap());
        assert!(agent_dir.join("agent.json").exists());
        assert!(agent_dir.join("config.json").exists());
        assert!(agent_dir.join("User.md").exists());
        assert!(agent_dir.join("Agents.md").exists());
        assert!(agent_dir.join("Soul.md").exists());
        assert!(agent_dir.join("Identity.md").exists());
        assert!(agent_dir.join("sessions").is_dir());
        assert!(agent_dir.join("tools/tools.json").exists());
    }

    #[test]
    fn create_agent_twice_fails() {
        let (_dir, store) = store();
        store.create_agent(req("a1")).unwrap();
        assert!(matches!(
            store.create_agent(req("a1")),
            Err(CatalogError::AlreadyExists(_))
        ));
    }

    #[test]
    fn missing_doc_falls_back_to_default_template() {
        let (_dir, store) = store();
        store.create_agent(req("a1")).unwrap();
        let agent_id = AgentId::new("a1").unwrap();
        std::fs::remove_file(store.agent_dir(&agent_id).join("Soul.md")).unwrap();

        let doc = store.read_doc(&agent_id, DocName::Soul).unwrap();
        assert!(doc.contains("Soul"));
        assert!(doc.ends_with('\n') && !doc.ends_with("\n\n"));
    }

    #[test]
    fn identity_id_promoted_when_identity_md_missing() {
        let (_dir, store) = store();
        store.create_agent(req("a1")).unwrap();
        let agent_id = AgentId::new("a1").unwrap();
        let dir = store.agent_dir(&agent_id);
        std::fs::remove_file(dir.join("Identity.md")).unwrap();
        std::fs::write(dir.join("Identity.id"), "legacy-identity-value").unwrap();

        let doc = store.read_doc(&agent_id, DocName::Identity).unwrap();
        assert_eq!(doc, "legacy-identity-value\n");
    }

    #[test]
    fn read_doc_normalizes_line_endings_and_trailing_newline() {
        let (_dir, store) = store();
        store.create_agent(req("a1")).unwrap();
        let agent_id = AgentId::new("a1").unwrap();
        let dir = store.agent_dir(&agent_id);
        std::fs::write(dir.join("User.md"), "line1\r\nline2\r\n\n\n").unwrap();

        let doc = store.read_doc(&agent_id, DocName::User).unwrap();
        assert_eq!(doc, "line1\nline2\n");
    }

    #[test]
    fn delete_agent_removes_directory() {
        let (_dir, store) = store();
        store.create_agent(req("a1")).unwrap();
        let agent_id = AgentId::new("a1").unwrap();
        store.delete_agent(&agent_id).unwrap();
        assert!(matches!(
            store.get_agent(&agent_id),
            Err(CatalogError::AgentNotFound(_))
        ));
    }
}
