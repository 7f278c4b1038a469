//! Interactive console for the hospital assistant pipeline
//!
//! Run with: cargo run --bin careline-console [config.toml]

use std::io::{BufRead, Write};
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use careline_rag::config::ScorerKind;
use careline_rag::providers::{self, EmbeddingProvider, OllamaClient};
use careline_rag::{ChatConfig, ChatRequest, ChatService, KnowledgeIndex, ReferenceData};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "careline_rag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("Careline hospital assistant console. Type a question, or 'quit' to exit.\n");

    let config = match std::env::args().nth(1) {
        Some(path) => ChatConfig::from_file(path)?,
        None => ChatConfig::default(),
    };
    config.validate()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - LLM backend: {:?}", config.llm.backend);
    tracing::info!("  - Generation model: {}", config.llm.generate_model);
    tracing::info!("  - Scorer: {:?}", config.retrieval.scorer);

    let reference = Arc::new(ReferenceData::from_file(&config.knowledge.reference_path)?);
    let mut index = KnowledgeIndex::from_corpus_file(&config.knowledge.corpus_path)?;
    tracing::info!("Knowledge index built: {} chunks", index.len());

    let llm = providers::llm_from_config(&config.llm)?;
    let embedder: Option<Arc<dyn EmbeddingProvider>> = match config.retrieval.scorer {
        ScorerKind::Embedding => {
            let client = Arc::new(OllamaClient::new(&config.llm));
            index = index.with_embeddings(client.as_ref()).await?;
            tracing::info!("Chunk embeddings computed");
            Some(client)
        }
        ScorerKind::Lexical => None,
    };

    match llm.health_check().await {
        Ok(true) => tracing::info!("LLM backend '{}' ({}) is reachable", llm.name(), llm.model()),
        _ => tracing::warn!(
            "LLM backend '{}' is not reachable; answers will degrade to the fallback",
            llm.name()
        ),
    }

    let service = ChatService::new(&config, Arc::new(index), reference, llm, embedder)?;

    println!("Available topics:");
    for category in service.available_topics() {
        println!("  {}: {}", category.category, category.topics.join(", "));
    }
    println!("\nEmergency contacts:");
    for (name, contact) in service.emergency_contacts() {
        println!("  {}: {}", name, contact);
    }
    println!();

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("quit") || query.eq_ignore_ascii_case("exit") {
            break;
        }

        match service
            .process_chat(ChatRequest {
                query: query.to_string(),
            })
            .await
        {
            Ok(response) => {
                println!("\n{}\n", response.answer);
                println!("confidence: {}", serde_json::to_string(&response.confidence)?);
                if !response.citations.is_empty() {
                    println!("sources: {}", response.citations.join(", "));
                }
                if !response.safety_flags.is_empty() {
                    println!("flags: {}", serde_json::to_string(&response.safety_flags)?);
                }
                for question in &response.follow_up_questions {
                    println!("follow-up: {}", question);
                }
                println!();
            }
            Err(e) => println!("error: {}\n", e),
        }
    }

    Ok(())
}
