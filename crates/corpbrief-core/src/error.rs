use thiserror::Error;

use crate::message::AgentName;

/// Core error type for corpbrief.
///
/// Every stage converts these into a failed [`crate::HandoffMessage`] at its
/// own boundary; none of them escape an agent's `run`.
#[derive(Debug, Error)]
pub enum CorpbriefError {
    #[error("{agent} received message addressed to {}", display_target(.addressed))]
    Addressing {
        agent: AgentName,
        addressed: Option<AgentName>,
    },
    #[error("{agent} cannot handle task_name={task_name}")]
    UnsupportedTask { agent: AgentName, task_name: String },
    #[error("{0}")]
    Validation(String),
    #[error("search request failed: {0}")]
    Search(String),
    #[error("completion request failed: {0}")]
    Completion(String),
    #[error("extraction reply was not parseable JSON: {0}")]
    Schema(String),
    #[error("report output failed: {0}")]
    Output(String),
    #[error("missing environment variable: {0}")]
    MissingSecret(String),
    #[error("configuration error: {0}")]
    InvalidConfiguration(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn display_target(addressed: &Option<AgentName>) -> String {
    match addressed {
        Some(agent) => agent.to_string(),
        None => "nobody".to_string(),
    }
}
