//! Workflow agents: supervisor routing, company research, and report writing.

mod document_creator;
mod researcher;
mod supervisor;

pub use document_creator::DocumentCreatorAgent;
pub use researcher::{ResearcherAgent, Topic};
pub use supervisor::SupervisorAgent;

use corpbrief_core::{AgentName, HandoffMessage};

/// A workflow stage. Each agent consumes a handoff addressed to it and
/// replies with a new message; errors never escape `run`.
#[async_trait::async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> AgentName;

    async fn run(&self, message: HandoffMessage) -> HandoffMessage;
}
