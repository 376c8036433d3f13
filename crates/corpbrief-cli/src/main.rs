use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;

use corpbrief_agents::{Agent, DocumentCreatorAgent, ResearcherAgent, SupervisorAgent};
use corpbrief_core::{
    AgentName, CompletionClient, Config, HandoffMessage, OpenAiCompletions, SearchClient,
    TASK_RESEARCH_COMPANY, TaskStatus, TavilySearch,
};

#[derive(Parser, Debug)]
#[command(
    name = "corpbrief",
    version,
    about = "Generate a company research report"
)]
struct Cli {}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,corpbrief_core=info,corpbrief_agents=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let _cli = Cli::parse();

    let rt = Runtime::new()?;
    rt.block_on(run())
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;

    print!("Enter a company name to research: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let company_name = line.trim().to_string();

    info!(company = %company_name, "starting research workflow");

    let llm: Arc<dyn CompletionClient> = Arc::new(OpenAiCompletions::new(config.llm));
    let search: Arc<dyn SearchClient> = Arc::new(TavilySearch::new(config.search.api_key));

    let researcher = Arc::new(ResearcherAgent::new(search, llm.clone()));
    let document_creator = Arc::new(DocumentCreatorAgent::new(llm.clone(), config.output_dir));
    let supervisor = SupervisorAgent::new(llm, researcher, document_creator);

    let initial_message = HandoffMessage::new(
        TASK_RESEARCH_COMPANY,
        json!({"company_name": company_name}),
        Some(AgentName::Supervisor),
        TaskStatus::Pending,
    );

    let final_message = supervisor.run(initial_message).await;

    if final_message.status != TaskStatus::Completed {
        println!("Workflow did not complete successfully.");
        if let Some(error) = &final_message.error {
            println!("Error: {error}");
        }
        return Ok(());
    }

    println!("Research report successfully created!");
    if let Some(file_path) = &final_message.file_path {
        println!("Report file: {file_path}");
    }
    Ok(())
}
