//! `genie search` — keyword lookup in the capability catalog.

use genie_agent::TestAgent;
use genie_config::AppConfig;

pub async fn run(mut config: AppConfig, query: &str) -> Result<(), Box<dyn std::error::Error>> {
    // A lookup never needs the model backend
    config.agent.use_llm = false;
    config.llm.embeddings = false;

    let agent = TestAgent::from_config(&config).await?;
    let docs = agent.capabilities(query).await?;
    agent.catalog().close().await;

    if docs.is_empty() {
        println!("No capabilities match \"{query}\"");
        return Ok(());
    }

    println!("{} result(s) for \"{query}\":\n", docs.len());
    for doc in &docs {
        println!("  {}", doc.qualified_name());
        if !doc.description.is_empty() {
            println!("      {}", doc.description);
        }
        if !doc.signature.is_empty() {
            println!("      {}", doc.signature);
        }
    }
    Ok(())
}
