//! Core contracts for the corpbrief research workflow.
//!
//! Provides the handoff message schema shared by every agent, the
//! schema-enforced research record, clients for the external search and
//! chat-completion services, environment configuration, and report file
//! output.

mod config;
mod error;
mod llm;
mod message;
mod report;
mod research;
mod search;

pub use config::{Config, LlmSettings, SearchSettings, SecretValue, require_env};
pub use error::CorpbriefError;
pub use llm::{CompletionClient, OpenAiCompletions};
pub use message::{
    AgentName, HandoffMessage, TASK_COMPANY_RESEARCH, TASK_CREATE_REPORT, TASK_RESEARCH_COMPANY,
    TaskStatus,
};
pub use report::write_report_file;
pub use research::ResearchRecord;
pub use search::{SearchClient, SearchHit, SearchResponse, SourceRef, TavilySearch};
