//! CLI binary for vera.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use vera::{repl, OpenAiChat, VeraConfig};
use vera_web::WebAnswerer;

/// Vera: answers open questions from the web.
#[derive(Parser)]
#[command(name = "vera", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Answer one question and exit.
    Ask {
        /// The question.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Answer questions read line by line from stdin, sharing one cache.
    Repl,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Users can override with RUST_LOG=vera_web=trace to follow every stage.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vera=info,vera_web=info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => VeraConfig::from_file(path)?,
        None => VeraConfig::load_or_default(&VeraConfig::default_config_path())?,
    };

    let llm = OpenAiChat::new(&config.llm)?;
    let answerer = WebAnswerer::with_defaults(&config.web_search)?;
    tracing::debug!(?llm, "vera ready");

    match cli.command {
        Command::Ask { query } => {
            let query = query.join(" ");
            let answer = ask(&answerer, &config, &llm, &query).await;
            println!("{answer}");
            Ok(())
        }
        Command::Repl => run_repl(&answerer, &config, &llm).await,
    }
}

async fn ask(answerer: &WebAnswerer, config: &VeraConfig, llm: &OpenAiChat, query: &str) -> String {
    let mut sources = Vec::new();
    let answer = answerer
        .answer_from_web(query, &config.web_search, &config.system_prompt, llm, &mut sources)
        .await;
    tracing::info!(sources = sources.len(), "answered");
    answer
}

async fn run_repl(answerer: &WebAnswerer, config: &VeraConfig, llm: &OpenAiChat) -> anyhow::Result<()> {
    println!("Vera v{}", env!("CARGO_PKG_VERSION"));
    println!("Ask a question, or press Ctrl+D to quit.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(query) = repl::next_query(&mut lines).await? else {
            break;
        };
        let answer = ask(answerer, config, llm, &query).await;
        println!("{answer}\n");
    }
    Ok(())
}
