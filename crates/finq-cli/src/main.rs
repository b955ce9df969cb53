//! Financial-query assistant CLI
//!
//! An interactive chat interface over the orchestrator.
//!
//! # Usage
//!
//! ```bash
//! # Set up environment variables
//! export HF_API_TOKEN="hf_..."
//! export REDIS_URL="redis://localhost:6379"   # optional
//!
//! # Interactive mode
//! cargo run --bin finq
//!
//! # Single query mode
//! cargo run --bin finq -- "What is NVIDIA stock price?"
//! ```

use clap::Parser;
use finq_core::api::{DuckDuckGoSearch, YahooMarketData};
use finq_core::{
    AssistantConfig, CacheStore, ComparisonFormatter, ConversationMemory, DataFetcher,
    Orchestrator,
};
use finq_llm::{HuggingFaceConfig, HuggingFaceProvider};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Instant;

/// Financial-query assistant: real market data first, LLM formatting second
#[derive(Debug, Parser)]
#[command(name = "finq", version, about)]
struct Cli {
    /// Question to ask; starts an interactive session when omitted
    query: Vec<String>,
}

fn print_banner() {
    println!(
        r"
Financial Query Assistant
=========================
Ask about stocks and market news in natural language:
  What is the current stock price of NVIDIA?
  Latest Tesla news
  compare NVDA AMD INTC

Commands:
  compare <SYMBOLS...>  - side-by-side comparison (2-5 symbols)
  clear                 - clear cache and conversation memory
  quit                  - exit
"
    );
}

struct Assistant {
    orchestrator: Orchestrator,
    comparison: ComparisonFormatter,
    memory: ConversationMemory,
}

impl Assistant {
    async fn from_env() -> anyhow::Result<Self> {
        let config = Arc::new(AssistantConfig::default().with_env());
        config.validate()?;

        let api_token = env::var("HF_API_TOKEN").unwrap_or_default();
        if api_token.is_empty() {
            eprintln!("Warning: HF_API_TOKEN not set, responses will use raw data formatting");
        }

        let cache = CacheStore::connect(&config).await;
        let market = Arc::new(YahooMarketData::new(config.request_timeout));
        let fetcher = Arc::new(DataFetcher::new(market, cache.clone(), Arc::clone(&config)));
        let search = Arc::new(DuckDuckGoSearch::new(config.request_timeout));
        let llm = Arc::new(HuggingFaceProvider::with_config(HuggingFaceConfig::new(
            api_token,
        ))?);

        let orchestrator = Orchestrator::new(
            Arc::clone(&fetcher),
            search,
            llm,
            cache,
            Arc::clone(&config),
        );
        let comparison = ComparisonFormatter::new(fetcher);
        let memory = ConversationMemory::with_max_history(config.max_history);

        Ok(Self {
            orchestrator,
            comparison,
            memory,
        })
    }

    /// Answer one input line, routing commands where they apply
    async fn process(&mut self, input: &str) -> String {
        let response = if let Some(rest) = input.strip_prefix("compare ") {
            let symbols: Vec<String> = rest.split_whitespace().map(ToString::to_string).collect();
            self.comparison.compare(&symbols).await
        } else {
            self.orchestrator.query(input).await
        };

        self.memory.add_interaction(input, response.clone(), None);
        response
    }

    async fn clear(&mut self) {
        self.orchestrator.clear_cache().await;
        self.memory.clear();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "warn,finq_core=info".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let mut assistant = Assistant::from_env().await?;

    // Single query mode
    if !cli.query.is_empty() {
        let question = cli.query.join(" ");
        let start = Instant::now();
        let response = assistant.process(&question).await;
        println!("{response}");
        eprintln!("\n({:.2}s)", start.elapsed().as_secs_f64());
        return Ok(());
    }

    print_banner();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("You: ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "quit" | "exit" => {
                println!("Goodbye!");
                break;
            }
            "clear" => {
                assistant.clear().await;
                println!("Cache and memory cleared.\n");
                continue;
            }
            _ => {}
        }

        let start = Instant::now();
        let response = assistant.process(input).await;
        println!("\n{response}");
        println!("\n({:.2}s)\n", start.elapsed().as_secs_f64());
    }

    Ok(())
}
