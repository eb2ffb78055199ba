use anyhow::Result;
use axum::Router;
use clap::Parser;
use newsqa_core::{IndexOptions, StopWordLanguage, DEFAULT_K};
use newsqa_server::{build_app, LlmConfig, ServerConfig};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus file (JSON array or JSONL) produced by the crawler
    #[arg(long, default_value = "./noticias.json")]
    corpus: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Default number of results per query
    #[arg(long, default_value_t = DEFAULT_K)]
    k: usize,
    /// Stop-word language: portuguese or english
    #[arg(long, default_value = "portuguese")]
    language: StopWordLanguage,
    /// Use 1 + ln(tf) term frequency instead of raw counts
    #[arg(long, default_value_t = false)]
    sublinear_tf: bool,
    /// Build the index on the first query instead of at startup
    #[arg(long, default_value_t = false)]
    lazy: bool,
    /// Base URL of the OpenAI-compatible chat API
    #[arg(long, default_value = "https://api.deepseek.com")]
    llm_base_url: String,
    /// Chat model used for answers
    #[arg(long, default_value = "deepseek-chat")]
    llm_model: String,
    /// API key; falls back to DEEPSEEK_API_KEY
    #[arg(long)]
    llm_api_key: Option<String>,
    /// Seconds to wait for the chat API before answering from the template
    #[arg(long, default_value_t = 30)]
    llm_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let config = ServerConfig {
        corpus: args.corpus.clone().into(),
        index: IndexOptions { language: args.language, sublinear_tf: args.sublinear_tf },
        default_k: args.k,
        eager: !args.lazy,
        llm: LlmConfig {
            base_url: args.llm_base_url,
            model: args.llm_model,
            api_key: args.llm_api_key.or_else(|| std::env::var("DEEPSEEK_API_KEY").ok()),
            timeout: Duration::from_secs(args.llm_timeout_secs),
            ..LlmConfig::default()
        },
        admin_token: std::env::var("ADMIN_TOKEN").ok(),
    };
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, corpus = %args.corpus, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
