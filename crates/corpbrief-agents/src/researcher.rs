//! Researcher agent: fans out topic searches for a company and structures
//! the findings into a [`ResearchRecord`].
//!
//! The search service is queried once per topic, concurrently. The merge
//! (text collection and source canonicalization) always iterates
//! [`Topic::ALL`] in its fixed order, so output ordering never depends on
//! which network call finished first. The completion service is invoked
//! exactly once, only to structure the pre-fetched texts into JSON.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use corpbrief_core::{
    AgentName, CompletionClient, CorpbriefError, HandoffMessage, ResearchRecord, SearchClient,
    SearchResponse, TASK_COMPANY_RESEARCH,
};

use crate::Agent;

/// Bounded result count requested per topic query.
const RESULTS_PER_TOPIC: usize = 5;

const EXTRACTION_SYSTEM_PROMPT: &str = "You are a company research extraction engine. \
You are given pre-fetched web search texts for a company. \
Using ONLY the provided texts and URLs, you must produce strict JSON with keys: \
company, summary, products, financials, competitors.\n\
- 'summary': 1-3 paragraphs summarizing the company and its main business, if possible.\n\
- 'products': list of key product or solution names (strings). If you cannot identify any, use an empty list [].\n\
- 'financials': short prose summarizing revenue/profit/financial highlights. If nothing concrete is found, use an empty string ''.\n\
- 'competitors': list of competitor company names (strings). If you cannot identify any, use an empty list [].\n\
The 'sources' field is populated programmatically from the search results; do NOT attempt to create or modify it in the JSON.\n\
Do NOT use boilerplate placeholders like 'No information found', 'Data not available', or 'Details were limited'. \
When information is sparse, return '' (empty string) or [] (empty list) for that field instead. \
Return ONLY valid JSON and nothing else.";

/// Fixed research categories, merged in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Overview,
    Products,
    Financials,
    Competitors,
    News,
}

impl Topic {
    /// Canonical traversal order for merging per-topic results.
    pub const ALL: [Topic; 5] = [
        Topic::Overview,
        Topic::Products,
        Topic::Financials,
        Topic::Competitors,
        Topic::News,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Topic::Overview => "overview",
            Topic::Products => "products",
            Topic::Financials => "financials",
            Topic::Competitors => "competitors",
            Topic::News => "news",
        }
    }

    fn heading(&self) -> &'static str {
        match self {
            Topic::Overview => "Overview",
            Topic::Products => "Products",
            Topic::Financials => "Financials",
            Topic::Competitors => "Competitors",
            Topic::News => "News",
        }
    }

    /// Deterministic search query for a company under this topic.
    pub fn query(&self, company: &str) -> String {
        match self {
            Topic::Overview => format!("{company} company overview background"),
            Topic::Products => format!("{company} products services offerings list"),
            Topic::Financials => format!("{company} financial results revenue profit growth"),
            Topic::Competitors => format!("{company} main competitors market analysis alternatives"),
            Topic::News => format!("Latest news about {company}"),
        }
    }
}

/// Agent responsible solely for researching one company.
pub struct ResearcherAgent {
    search: Arc<dyn SearchClient>,
    llm: Arc<dyn CompletionClient>,
}

impl ResearcherAgent {
    pub fn new(search: Arc<dyn SearchClient>, llm: Arc<dyn CompletionClient>) -> Self {
        Self { search, llm }
    }

    fn validate(&self, message: &HandoffMessage) -> Result<String, CorpbriefError> {
        if message.next_agent != Some(AgentName::Researcher) {
            return Err(CorpbriefError::Addressing {
                agent: AgentName::Researcher,
                addressed: message.next_agent,
            });
        }
        if message.task_name != TASK_COMPANY_RESEARCH {
            return Err(CorpbriefError::UnsupportedTask {
                agent: AgentName::Researcher,
                task_name: message.task_name.clone(),
            });
        }
        message
            .payload
            .get("company_name")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|company| !company.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                CorpbriefError::Validation(
                    "researcher requires 'company_name' in payload".to_string(),
                )
            })
    }

    async fn research(&self, company: &str) -> Result<ResearchRecord, CorpbriefError> {
        let responses = self.fetch_all(company).await?;

        let texts = section_texts(&responses);
        let sources = canonical_sources(&responses);
        info!(
            company,
            source_count = sources.len(),
            "search fan-out complete"
        );

        let prompt = build_extraction_prompt(company, &texts, &sources);
        let reply = self.llm.complete(EXTRACTION_SYSTEM_PROMPT, &prompt).await?;

        ResearchRecord::from_extraction_reply(&reply, company, sources)
    }

    /// Run all five topic queries concurrently. The returned array is in
    /// [`Topic::ALL`] order regardless of completion order; the first
    /// failure aborts the whole fan-out.
    async fn fetch_all(&self, company: &str) -> Result<[SearchResponse; 5], CorpbriefError> {
        let (overview, products, financials, competitors, news) = tokio::try_join!(
            self.fetch(Topic::Overview, company),
            self.fetch(Topic::Products, company),
            self.fetch(Topic::Financials, company),
            self.fetch(Topic::Competitors, company),
            self.fetch(Topic::News, company),
        )?;
        Ok([overview, products, financials, competitors, news])
    }

    async fn fetch(&self, topic: Topic, company: &str) -> Result<SearchResponse, CorpbriefError> {
        let query = topic.query(company);
        debug!(topic = topic.label(), %query, "dispatching topic search");
        self.search.search(&query, RESULTS_PER_TOPIC).await
    }
}

#[async_trait::async_trait]
impl Agent for ResearcherAgent {
    fn name(&self) -> AgentName {
        AgentName::Researcher
    }

    async fn run(&self, message: HandoffMessage) -> HandoffMessage {
        let company = match self.validate(&message) {
            Ok(company) => company,
            Err(err) => {
                return HandoffMessage::failed(message.task_name, message.payload, err.to_string());
            }
        };

        match self.research(&company).await {
            Ok(record) => match serde_json::to_value(&record) {
                Ok(payload) => HandoffMessage::completed(message.task_name, payload),
                Err(err) => HandoffMessage::failed(
                    message.task_name,
                    message.payload,
                    CorpbriefError::from(err).to_string(),
                ),
            },
            Err(err) => {
                HandoffMessage::failed(message.task_name, message.payload, err.to_string())
            }
        }
    }
}

/// Per-topic text blobs, aligned with [`Topic::ALL`].
fn section_texts(responses: &[SearchResponse; 5]) -> [String; 5] {
    std::array::from_fn(|index| collect_text(&responses[index]))
}

/// Combine a response's answer and result contents into one text blob.
/// An empty blob is valid; it just means the topic turned up nothing.
fn collect_text(response: &SearchResponse) -> String {
    let mut parts: Vec<&str> = Vec::new();

    if let Some(answer) = response.answer.as_deref() {
        let answer = answer.trim();
        if !answer.is_empty() {
            parts.push(answer);
        }
    }
    for hit in &response.results {
        if let Some(content) = hit.content.as_deref() {
            if !content.is_empty() {
                parts.push(content);
            }
        }
    }

    parts.join("\n\n")
}

/// Canonical source list: first-seen order across topics (in [`Topic::ALL`]
/// order) and across each topic's results (in returned order), duplicates
/// dropped.
fn canonical_sources(responses: &[SearchResponse; 5]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut sources = Vec::new();

    for response in responses {
        for hit in &response.results {
            let Some(url) = hit.url_candidate() else {
                continue;
            };
            if seen.insert(url.to_string()) {
                sources.push(url.to_string());
            }
        }
    }

    sources
}

fn build_extraction_prompt(company: &str, texts: &[String; 5], sources: &[String]) -> String {
    let mut prompt = format!("Company name: {company}\n");
    for (topic, text) in Topic::ALL.iter().zip(texts) {
        prompt.push_str(&format!("\n{} texts:\n{text}\n", topic.heading()));
    }
    prompt.push_str(&format!(
        "\nCandidate source URLs (one per line):\n{}\n",
        sources.join("\n")
    ));
    prompt.push_str(
        "\nIdentify competitors based on the inferred industry. \
         If the company is a tech company, list tech competitors. \
         If it is a cybersecurity company, list cybersecurity competitors. \
         Only use the content provided.\n\nProduce the strict JSON now.",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use corpbrief_core::{SearchHit, TaskStatus};

    #[derive(Default)]
    struct ScriptedSearch {
        responses: HashMap<String, SearchResponse>,
        fail_query: Option<String>,
        calls: AtomicUsize,
    }

    impl ScriptedSearch {
        fn with_response(mut self, query: String, response: SearchResponse) -> Self {
            self.responses.insert(query, response);
            self
        }

        fn failing_on(mut self, query: String) -> Self {
            self.fail_query = Some(query);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl SearchClient for ScriptedSearch {
        async fn search(
            &self,
            query: &str,
            _max_results: usize,
        ) -> Result<SearchResponse, CorpbriefError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_query.as_deref() == Some(query) {
                return Err(CorpbriefError::Search("scripted outage".to_string()));
            }
            Ok(self.responses.get(query).cloned().unwrap_or_default())
        }
    }

    struct ScriptedCompletions {
        reply: String,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedCompletions {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn last_user_prompt(&self) -> Option<String> {
            self.prompts
                .lock()
                .unwrap()
                .last()
                .map(|(_, user)| user.clone())
        }
    }

    #[async_trait::async_trait]
    impl CompletionClient for ScriptedCompletions {
        async fn complete(&self, system: &str, user: &str) -> Result<String, CorpbriefError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            Ok(self.reply.clone())
        }
    }

    fn hit_with_url(url: &str, content: &str) -> SearchHit {
        SearchHit {
            url: Some(url.to_string()),
            content: Some(content.to_string()),
            ..SearchHit::default()
        }
    }

    fn hit_with_link(link: &str, content: &str) -> SearchHit {
        SearchHit {
            link: Some(link.to_string()),
            content: Some(content.to_string()),
            ..SearchHit::default()
        }
    }

    fn research_request(company: serde_json::Value) -> HandoffMessage {
        HandoffMessage::new(
            TASK_COMPANY_RESEARCH,
            json!({"company_name": company}),
            Some(AgentName::Researcher),
            TaskStatus::InProgress,
        )
    }

    #[test]
    fn topic_queries_embed_the_company_name() {
        for topic in Topic::ALL {
            let query = topic.query("Acme");
            assert!(query.contains("Acme"), "{query}");
        }
        let labels: Vec<&str> = Topic::ALL.iter().map(Topic::label).collect();
        assert_eq!(
            labels,
            ["overview", "products", "financials", "competitors", "news"]
        );
    }

    #[test]
    fn collect_text_merges_answer_then_contents() {
        let response = SearchResponse {
            answer: Some("  An answer.  ".to_string()),
            results: vec![
                hit_with_url("https://a.example", "First content"),
                SearchHit::default(),
                hit_with_url("https://b.example", "Second content"),
            ],
        };
        assert_eq!(
            collect_text(&response),
            "An answer.\n\nFirst content\n\nSecond content"
        );
    }

    #[test]
    fn collect_text_of_empty_topic_is_empty_not_an_error() {
        let response = SearchResponse {
            answer: Some("   ".to_string()),
            results: vec![SearchHit::default()],
        };
        assert_eq!(collect_text(&response), "");
    }

    #[test]
    fn canonical_sources_dedup_preserving_first_seen_order() {
        let mut responses: [SearchResponse; 5] = Default::default();
        responses[1].results = vec![
            hit_with_url("https://a.example/1", "one"),
            hit_with_url("https://a.example/2", "two"),
        ];
        responses[4].results = vec![
            hit_with_link("https://a.example/1", "dup"),
            hit_with_url("https://a.example/3", "three"),
        ];

        assert_eq!(
            canonical_sources(&responses),
            vec![
                "https://a.example/1".to_string(),
                "https://a.example/2".to_string(),
                "https://a.example/3".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn rejects_message_not_addressed_to_it() {
        let search = Arc::new(ScriptedSearch::default());
        let llm = Arc::new(ScriptedCompletions::new("{}"));
        let agent = ResearcherAgent::new(search.clone(), llm.clone());

        let mut message = research_request(json!("Acme"));
        message.next_agent = Some(AgentName::DocumentCreator);

        let reply = agent.run(message).await;
        assert_eq!(reply.status, TaskStatus::Failed);
        assert_eq!(search.calls(), 0);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn rejects_unexpected_task_name() {
        let search = Arc::new(ScriptedSearch::default());
        let llm = Arc::new(ScriptedCompletions::new("{}"));
        let agent = ResearcherAgent::new(search.clone(), llm.clone());

        let mut message = research_request(json!("Acme"));
        message.task_name = "summarize_market".to_string();

        let reply = agent.run(message).await;
        assert_eq!(reply.status, TaskStatus::Failed);
        assert!(reply.error.unwrap().contains("task_name=summarize_market"));
        assert_eq!(search.calls(), 0);
    }

    #[tokio::test]
    async fn requires_company_name_before_any_network_call() {
        let search = Arc::new(ScriptedSearch::default());
        let llm = Arc::new(ScriptedCompletions::new("{}"));
        let agent = ResearcherAgent::new(search.clone(), llm.clone());

        let reply = agent.run(research_request(json!("   "))).await;
        assert_eq!(reply.status, TaskStatus::Failed);
        assert!(reply.error.unwrap().contains("requires 'company_name'"));
        assert_eq!(search.calls(), 0);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn one_topic_failure_aborts_before_extraction() {
        let search = Arc::new(
            ScriptedSearch::default().failing_on(Topic::Financials.query("Acme")),
        );
        let llm = Arc::new(ScriptedCompletions::new("{}"));
        let agent = ResearcherAgent::new(search.clone(), llm.clone());

        let reply = agent.run(research_request(json!("Acme"))).await;
        assert_eq!(reply.status, TaskStatus::Failed);
        assert!(reply.error.unwrap().contains("scripted outage"));
        assert_eq!(llm.calls(), 0, "extraction must not run after a search failure");
    }

    #[tokio::test]
    async fn aggregates_record_with_canonical_sources() {
        let products = SearchResponse {
            answer: None,
            results: vec![hit_with_url("https://a.example/1", "Widgets")],
        };
        let news = SearchResponse {
            answer: None,
            results: vec![hit_with_link("https://a.example/1", "dup")],
        };
        let search = Arc::new(
            ScriptedSearch::default()
                .with_response(Topic::Products.query("Acme"), products)
                .with_response(Topic::News.query("Acme"), news),
        );
        let llm = Arc::new(ScriptedCompletions::new(
            r#"{"company": "Acme", "summary": "Makes widgets.", "products": ["Widgets"], "financials": "", "competitors": [], "sources": ["https://fabricated.example"]}"#,
        ));
        let agent = ResearcherAgent::new(search.clone(), llm.clone());

        let reply = agent.run(research_request(json!("Acme"))).await;
        assert_eq!(reply.status, TaskStatus::Completed);
        assert_eq!(reply.next_agent, Some(AgentName::Supervisor));
        assert_eq!(search.calls(), 5);
        assert_eq!(llm.calls(), 1);

        let record: ResearchRecord = serde_json::from_value(reply.payload).unwrap();
        assert_eq!(record.sources, vec!["https://a.example/1".to_string()]);
        assert_eq!(record.products, vec!["Widgets".to_string()]);

        let prompt = llm.last_user_prompt().unwrap();
        assert!(prompt.contains("Products texts:\nWidgets"));
        assert!(
            prompt.contains("Candidate source URLs (one per line):\nhttps://a.example/1"),
            "prompt must carry the canonical URL list verbatim"
        );
    }
}
