//! Hearth - self-hosted agent session orchestrator
//!
//! A thin CLI front end over the orchestrator core (components A-I):
//! it resolves a workspace directory, wires the full component stack via
//! [`wiring::build`], and dispatches one command per invocation. There is
//! no daemon and no HTTP framing here — both are out of scope for the
//! core (spec.md §1) and would sit in front of this binary in a full
//! deployment.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hearth_core::{AgentId, RunControlAction, SessionId};

mod commands;
mod echo_provider;
mod output;
mod wiring;

use commands::{agents, sessions};
use output::Format;

/// Hearth session orchestrator CLI.
#[derive(Parser)]
#[command(name = "hearth")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Workspace root directory (defaults to the current directory).
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Output format: `pretty` (default) or `json`.
    #[arg(long, global = true, default_value = "pretty")]
    format: String,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the agent catalog (component B/C).
    Agents {
        #[command(subcommand)]
        command: AgentCommands,
    },
    /// Manage sessions and drive turns (component F/G).
    Sessions {
        #[command(subcommand)]
        command: SessionCommands,
    },
}

#[derive(Subcommand)]
enum AgentCommands {
    /// Create a new agent.
    Create {
        /// Stable agent id.
        id: AgentId,
        /// Display name.
        #[arg(long)]
        display_name: String,
        /// Free-text role description.
        #[arg(long)]
        role: String,
        /// Selected model identifier.
        #[arg(long)]
        model: Option<String>,
    },
    /// List all agents in the workspace.
    List,
    /// Show an agent's resolved tools policy.
    Policy {
        /// Agent id.
        id: AgentId,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Create a new session for an agent.
    Create {
        /// Owning agent id.
        agent_id: AgentId,
        /// Explicit session id (generated if omitted).
        #[arg(long)]
        id: Option<SessionId>,
        /// Session title.
        #[arg(long)]
        title: Option<String>,
        /// Parent session id, for sub-sessions.
        #[arg(long)]
        parent: Option<SessionId>,
    },
    /// List an agent's sessions.
    List {
        /// Owning agent id.
        agent_id: AgentId,
    },
    /// Show a session's summary and full event history.
    Show {
        /// Owning agent id.
        agent_id: AgentId,
        /// Session id.
        session_id: SessionId,
    },
    /// Show a session's live status (run stage, active process count).
    Status {
        /// Owning agent id.
        agent_id: AgentId,
        /// Session id.
        session_id: SessionId,
    },
    /// Post a message and run one turn to completion.
    Post {
        /// Owning agent id.
        agent_id: AgentId,
        /// Session id.
        session_id: SessionId,
        /// Message content.
        content: String,
        /// User id attributed to the message.
        #[arg(long, default_value = "cli")]
        user_id: String,
        /// Spawn a sub-session once the turn completes.
        #[arg(long)]
        spawn_sub_session: bool,
    },
    /// Send a pause, resume, or interrupt control signal.
    Control {
        /// Owning agent id.
        agent_id: AgentId,
        /// Session id.
        session_id: SessionId,
        /// Control action.
        #[arg(value_enum)]
        action: ControlAction,
    },
    /// Tail a session's live updates as server-sent-events frames.
    Stream {
        /// Owning agent id.
        agent_id: AgentId,
        /// Session id.
        session_id: SessionId,
    },
}

/// CLI-facing mirror of [`RunControlAction`] so clap can derive a
/// `ValueEnum` without that derive leaking into the core crate.
#[derive(Clone, Copy, clap::ValueEnum)]
enum ControlAction {
    /// Pause the session.
    Pause,
    /// Resume a paused session.
    Resume,
    /// Interrupt the in-flight turn.
    Interrupt,
}

impl From<ControlAction> for RunControlAction {
    fn from(action: ControlAction) -> Self {
        match action {
            ControlAction::Pause => RunControlAction::Pause,
            ControlAction::Resume => RunControlAction::Resume,
            ControlAction::Interrupt => RunControlAction::Interrupt,
        }
    }
}

fn init_logging(verbose: bool) {
    let mut config = hearth_telemetry::LogConfig::default();
    if verbose {
        config.level = "debug".to_string();
    }
    if let Err(err) = hearth_telemetry::setup_logging(&config) {
        eprintln!("warning: failed to initialize logging: {err}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let format = Format::parse(&cli.format);
    let workspace_root = match cli.workspace {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let workspace = wiring::build(&workspace_root);

    match cli.command {
        Commands::Agents { command } => match command {
            AgentCommands::Create { id, display_name, role, model } => {
                agents::create(&workspace.catalog, id, display_name, role, model, format)?;
            },
            AgentCommands::List => {
                agents::list(&workspace.catalog, format)?;
            },
            AgentCommands::Policy { id } => {
                agents::policy(&workspace.tools_policy, id, format)?;
            },
        },
        Commands::Sessions { command } => match command {
            SessionCommands::Create { agent_id, id, title, parent } => {
                sessions::create(&workspace.orchestrator, agent_id, id, title, parent, format).await?;
            },
            SessionCommands::List { agent_id } => {
                sessions::list(&workspace.orchestrator, agent_id, format)?;
            },
            SessionCommands::Show { agent_id, session_id } => {
                sessions::show(&workspace.orchestrator, agent_id, session_id, format)?;
            },
            SessionCommands::Status { agent_id, session_id } => {
                sessions::status(&workspace.orchestrator, agent_id, session_id, format).await?;
            },
            SessionCommands::Post { agent_id, session_id, content, user_id, spawn_sub_session } => {
                sessions::post(
                    &workspace.orchestrator,
                    agent_id,
                    session_id,
                    user_id,
                    content,
                    spawn_sub_session,
                    format,
                )
                .await?;
            },
            SessionCommands::Control { agent_id, session_id, action } => {
                sessions::control(&workspace.orchestrator, agent_id, session_id, action.into(), format).await?;
            },
            SessionCommands::Stream { agent_id, session_id } => {
                sessions::stream(Arc::clone(&workspace.event_log), agent_id, session_id).await?;
            },
        },
    }

    Ok(())
}
