//! Handoff message schema shared by every workflow agent.
//!
//! A [`HandoffMessage`] is the only unit of communication between stages.
//! Messages are immutable once constructed: an agent that receives one
//! replies with a fresh message rather than mutating its input.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Task name the supervisor expects on the initial user request.
pub const TASK_RESEARCH_COMPANY: &str = "research_company";
/// Task name the researcher expects on its handoff.
pub const TASK_COMPANY_RESEARCH: &str = "company_research";
/// Task name the document creator expects on its handoff.
pub const TASK_CREATE_REPORT: &str = "create_report";

/// Closed set of agents a message can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentName {
    Supervisor,
    Researcher,
    DocumentCreator,
}

impl AgentName {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentName::Supervisor => "supervisor",
            AgentName::Researcher => "researcher",
            AgentName::DocumentCreator => "document_creator",
        }
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of the task a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Structured message passed between agents in the workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffMessage {
    /// Logical name of the current task.
    pub task_name: String,
    /// Task-specific data; shape depends on `task_name`.
    pub payload: Value,
    /// Which agent must process this message next. `None` once the workflow
    /// has terminated and control returns to the caller.
    pub next_agent: Option<AgentName>,
    pub status: TaskStatus,
    /// Set by the document creator once a report file has been written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Failure description; present only when `status` is [`TaskStatus::Failed`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HandoffMessage {
    pub fn new(
        task_name: impl Into<String>,
        payload: Value,
        next_agent: Option<AgentName>,
        status: TaskStatus,
    ) -> Self {
        Self {
            task_name: task_name.into(),
            payload,
            next_agent,
            status,
            file_path: None,
            error: None,
        }
    }

    /// Failed reply, always routed back toward the supervisor. A failed
    /// message never carries a forward routing target.
    pub fn failed(task_name: impl Into<String>, payload: Value, error: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            payload,
            next_agent: Some(AgentName::Supervisor),
            status: TaskStatus::Failed,
            file_path: None,
            error: Some(error.into()),
        }
    }

    /// Completed reply addressed back to the supervisor.
    pub fn completed(task_name: impl Into<String>, payload: Value) -> Self {
        Self {
            task_name: task_name.into(),
            payload,
            next_agent: Some(AgentName::Supervisor),
            status: TaskStatus::Completed,
            file_path: None,
            error: None,
        }
    }

    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}
