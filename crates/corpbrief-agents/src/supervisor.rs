//! Supervisor agent owning the fixed handoff workflow.
//!
//! Workflow (fixed order):
//! User -> Supervisor -> Researcher -> Supervisor -> DocumentCreator ->
//! Supervisor -> User. The supervisor routes work, short-circuits on the
//! first failure, and assembles the final user-facing result. It performs
//! none of the specialist work itself.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{info, warn};

use corpbrief_core::{
    AgentName, CompletionClient, CorpbriefError, HandoffMessage, TASK_COMPANY_RESEARCH,
    TASK_CREATE_REPORT, TASK_RESEARCH_COMPANY, TaskStatus,
};

use crate::Agent;

const SUPERVISOR_SYSTEM_PROMPT: &str = "You are a supervisor agent coordinating a research workflow. \
Your job is to understand the user request and pass clear, concise instructions to specialized agents. \
Do NOT perform their tasks yourself.";

/// Coordinator for the three-stage research workflow. Holds no state across
/// invocations.
pub struct SupervisorAgent {
    llm: Arc<dyn CompletionClient>,
    researcher: Arc<dyn Agent>,
    document_creator: Arc<dyn Agent>,
}

impl SupervisorAgent {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        researcher: Arc<dyn Agent>,
        document_creator: Arc<dyn Agent>,
    ) -> Self {
        Self {
            llm,
            researcher,
            document_creator,
        }
    }

    /// Restate the user request as a short research instruction. The text is
    /// not forwarded; only the company name goes downstream.
    async fn interpret_request(&self, company: &str) -> Result<String, CorpbriefError> {
        let user = format!(
            "User request: Research the company {company}\n\n\
             Summarize the request as a short research instruction for a researcher agent."
        );
        let instruction = self.llm.complete(SUPERVISOR_SYSTEM_PROMPT, &user).await?;
        Ok(instruction.trim().to_string())
    }

    /// Drive the workflow to a terminal message. Precondition violations and
    /// internal errors surface as `Err`; stage failures are already terminal
    /// and come back as `Ok` failed messages.
    async fn drive(&self, message: &HandoffMessage) -> Result<HandoffMessage, CorpbriefError> {
        if message.next_agent != Some(AgentName::Supervisor) {
            return Err(CorpbriefError::Addressing {
                agent: AgentName::Supervisor,
                addressed: message.next_agent,
            });
        }
        if message.task_name != TASK_RESEARCH_COMPANY {
            return Err(CorpbriefError::UnsupportedTask {
                agent: AgentName::Supervisor,
                task_name: message.task_name.clone(),
            });
        }
        let company = message
            .payload
            .get("company_name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|company| !company.is_empty())
            .ok_or_else(|| {
                CorpbriefError::Validation(
                    "supervisor requires 'company_name' in payload to start workflow".to_string(),
                )
            })?;

        let _instruction = self.interpret_request(company).await?;

        info!(company, "handing off to researcher");
        let to_researcher = HandoffMessage::new(
            TASK_COMPANY_RESEARCH,
            json!({"company_name": company}),
            Some(AgentName::Researcher),
            TaskStatus::InProgress,
        );
        let researched = self.researcher.run(to_researcher).await;
        if !researched.is_completed() {
            warn!(error = researched.error.as_deref(), "researcher failed");
            let error = researched
                .error
                .clone()
                .unwrap_or_else(|| "researcher did not complete successfully".to_string());
            return Ok(HandoffMessage::failed(
                message.task_name.clone(),
                serde_json::to_value(&researched)?,
                error,
            ));
        }

        let research = researched.payload;

        info!(company, "handing off to document creator");
        let to_document_creator = HandoffMessage::new(
            TASK_CREATE_REPORT,
            json!({"company_name": company, "research": research}),
            Some(AgentName::DocumentCreator),
            TaskStatus::InProgress,
        );
        let written = self.document_creator.run(to_document_creator).await;
        let file_path = written.file_path.clone().filter(|path| !path.is_empty());
        if !written.is_completed() || file_path.is_none() {
            warn!(error = written.error.as_deref(), "document creator failed");
            let error = written
                .error
                .clone()
                .unwrap_or_else(|| "document creator did not produce a file".to_string());
            return Ok(HandoffMessage::failed(
                message.task_name.clone(),
                serde_json::to_value(&written)?,
                error,
            ));
        }

        // Terminal reply: control returns to the caller, so no next agent.
        Ok(HandoffMessage {
            task_name: message.task_name.clone(),
            payload: json!({
                "message": format!("Research report for {company} created successfully."),
                "research": research,
            }),
            next_agent: None,
            status: TaskStatus::Completed,
            file_path,
            error: None,
        })
    }
}

#[async_trait::async_trait]
impl Agent for SupervisorAgent {
    fn name(&self) -> AgentName {
        AgentName::Supervisor
    }

    /// Run the full workflow. Never returns an error: anything raised during
    /// orchestration becomes a failed message wrapping the original input.
    async fn run(&self, message: HandoffMessage) -> HandoffMessage {
        match self.drive(&message).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "workflow aborted at supervisor boundary");
                let original = serde_json::to_value(&message).unwrap_or(Value::Null);
                HandoffMessage::failed(message.task_name, original, err.to_string())
            }
        }
    }
}
