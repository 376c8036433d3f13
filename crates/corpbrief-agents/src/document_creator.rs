//! Document creator agent: renders structured research into a markdown
//! report file.
//!
//! It receives only structured research data and is solely responsible for
//! formatting and file creation.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::info;

use corpbrief_core::{
    AgentName, CompletionClient, CorpbriefError, HandoffMessage, TASK_CREATE_REPORT,
    write_report_file,
};

use crate::Agent;

const FORMATTING_SYSTEM_PROMPT: &str = "You are a document creation assistant. \
Given structured research data about a company, craft a clear, well-organized markdown report. \
Use headings, bullet points, and short paragraphs. \
You must ONLY use the information present in the JSON. \
Do NOT fabricate products, numbers, or boilerplate text like 'No detailed summary available', \
'Not available', or 'No products listed'. \
If a field's value is an empty string or an empty list, you may omit that section instead of \
filling it with placeholder prose. \
If the JSON includes a non-empty 'sources' list of URL strings, add a '## Sources' section and \
render each source URL as a markdown bullet in the form '- URL'. \
If the 'sources' list is empty or missing, still include a '## Sources' section containing \
exactly the sentence 'No sources were provided.'. \
Do not invent, rewrite, or paraphrase this sentence. \
Never write the phrase 'Details were limited in the research results.' anywhere in the report.";

/// Agent that turns a research payload into a report file on disk.
pub struct DocumentCreatorAgent {
    llm: Arc<dyn CompletionClient>,
    output_dir: PathBuf,
}

impl DocumentCreatorAgent {
    pub fn new(llm: Arc<dyn CompletionClient>, output_dir: PathBuf) -> Self {
        Self { llm, output_dir }
    }

    fn validate<'m>(
        &self,
        message: &'m HandoffMessage,
    ) -> Result<(&'m str, &'m Value), CorpbriefError> {
        if message.next_agent != Some(AgentName::DocumentCreator) {
            return Err(CorpbriefError::Addressing {
                agent: AgentName::DocumentCreator,
                addressed: message.next_agent,
            });
        }
        if message.task_name != TASK_CREATE_REPORT {
            return Err(CorpbriefError::UnsupportedTask {
                agent: AgentName::DocumentCreator,
                task_name: message.task_name.clone(),
            });
        }

        let company = message
            .payload
            .get("company_name")
            .and_then(Value::as_str)
            .filter(|company| !company.is_empty());
        let research = message.payload.get("research");
        company.zip(research).ok_or_else(|| {
            CorpbriefError::Validation(
                "document creator requires 'company_name' and 'research' in payload".to_string(),
            )
        })
    }

    async fn create(&self, company: &str, research: &Value) -> Result<PathBuf, CorpbriefError> {
        let research_json = serde_json::to_string_pretty(research)?;
        let user = format!(
            "Company name: {company}\n\n\
             Structured research JSON:\n{research_json}\n\n\
             Write the full markdown report now."
        );
        let markdown = self.llm.complete(FORMATTING_SYSTEM_PROMPT, &user).await?;

        let path = write_report_file(&markdown, company, &self.output_dir)?;
        info!(company, path = %path.display(), "report created");
        Ok(path)
    }
}

#[async_trait::async_trait]
impl Agent for DocumentCreatorAgent {
    fn name(&self) -> AgentName {
        AgentName::DocumentCreator
    }

    async fn run(&self, message: HandoffMessage) -> HandoffMessage {
        let (company, research) = match self.validate(&message) {
            Ok(validated) => validated,
            Err(err) => {
                return HandoffMessage::failed(
                    message.task_name.clone(),
                    message.payload.clone(),
                    err.to_string(),
                );
            }
        };

        match self.create(company, research).await {
            Ok(path) => HandoffMessage::completed(
                message.task_name.clone(),
                json!({"message": format!("Report created for {company}.")}),
            )
            .with_file_path(path.display().to_string()),
            Err(err) => HandoffMessage::failed(
                message.task_name.clone(),
                message.payload.clone(),
                err.to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use tempfile::tempdir;

    use corpbrief_core::TaskStatus;

    struct ScriptedCompletions {
        reply: String,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedCompletions {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl CompletionClient for ScriptedCompletions {
        async fn complete(&self, _system: &str, user: &str) -> Result<String, CorpbriefError> {
            self.calls.lock().unwrap().push(user.to_string());
            Ok(self.reply.clone())
        }
    }

    fn report_request() -> HandoffMessage {
        HandoffMessage::new(
            TASK_CREATE_REPORT,
            json!({
                "company_name": "Acme",
                "research": {"company": "Acme", "summary": "Makes widgets."},
            }),
            Some(AgentName::DocumentCreator),
            TaskStatus::InProgress,
        )
    }

    #[tokio::test]
    async fn writes_report_and_replies_with_file_path() {
        let dir = tempdir().unwrap();
        let llm = ScriptedCompletions::new("# Acme\n\nMakes widgets.");
        let agent = DocumentCreatorAgent::new(llm.clone(), dir.path().to_path_buf());

        let reply = agent.run(report_request()).await;
        assert_eq!(reply.status, TaskStatus::Completed);
        assert_eq!(reply.next_agent, Some(AgentName::Supervisor));

        let path = reply.file_path.expect("file path must be set");
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "# Acme\n\nMakes widgets.");
        assert_eq!(reply.payload["message"], json!("Report created for Acme."));

        // The research JSON is passed through to the formatting call.
        let prompt = llm.calls.lock().unwrap().last().cloned().unwrap();
        assert!(prompt.contains("Makes widgets."));
    }

    #[tokio::test]
    async fn rejects_message_not_addressed_to_it() {
        let dir = tempdir().unwrap();
        let llm = ScriptedCompletions::new("unused");
        let agent = DocumentCreatorAgent::new(llm.clone(), dir.path().to_path_buf());

        let mut message = report_request();
        message.next_agent = Some(AgentName::Supervisor);

        let reply = agent.run(message).await;
        assert_eq!(reply.status, TaskStatus::Failed);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn requires_research_in_payload() {
        let dir = tempdir().unwrap();
        let llm = ScriptedCompletions::new("unused");
        let agent = DocumentCreatorAgent::new(llm.clone(), dir.path().to_path_buf());

        let mut message = report_request();
        message.payload = json!({"company_name": "Acme"});

        let reply = agent.run(message).await;
        assert_eq!(reply.status, TaskStatus::Failed);
        assert!(
            reply
                .error
                .unwrap()
                .contains("requires 'company_name' and 'research'")
        );
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn formatting_failure_becomes_a_failed_message() {
        struct FailingCompletions;

        #[async_trait::async_trait]
        impl CompletionClient for FailingCompletions {
            async fn complete(&self, _system: &str, _user: &str) -> Result<String, CorpbriefError> {
                Err(CorpbriefError::Completion("model unavailable".to_string()))
            }
        }

        let dir = tempdir().unwrap();
        let agent = DocumentCreatorAgent::new(Arc::new(FailingCompletions), dir.path().to_path_buf());

        let reply = agent.run(report_request()).await;
        assert_eq!(reply.status, TaskStatus::Failed);
        assert!(reply.error.unwrap().contains("model unavailable"));
    }
}
