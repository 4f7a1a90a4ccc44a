//! `genie run` — single-request or interactive mode.

use genie_agent::dialogue::HELP;
use genie_agent::{DialogueSession, TestAgent};
use genie_config::AppConfig;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(
    mut config: AppConfig,
    query: Option<String>,
    auto_exec: bool,
    no_llm: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if auto_exec {
        config.agent.auto_execute = true;
    }
    if no_llm {
        config.agent.use_llm = false;
        config.llm.embeddings = false;
    }

    let agent = Arc::new(TestAgent::from_config(&config).await?);
    let mut session = DialogueSession::new(agent);

    if let Some(query) = query {
        let result = session.ask(&query).await;
        println!("{}", result.render());
        if !result.success {
            return Err("request failed".into());
        }
        return Ok(());
    }

    let rule = "=".repeat(61);
    println!("{rule}");
    println!("Genie interactive session");
    println!("{rule}");
    println!("  LLM:          {}", if config.agent.use_llm { config.llm.model.as_str() } else { "off" });
    println!("  Auto-execute: {}", config.agent.auto_execute);
    println!("  Type 'help' for examples, 'exit' or 'quit' to leave.");
    println!("{rule}\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("genie > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        match query {
            "" => continue,
            "exit" | "quit" => break,
            "help" => {
                println!("{HELP}");
                continue;
            }
            _ => {}
        }

        println!("\nProcessing...");
        let result = session.ask(query).await;
        println!("{}", result.render());
    }

    println!("Goodbye!");
    Ok(())
}
