use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use newsqa_core::summary::{truncate_chars, NO_RESULTS_MESSAGE};
use newsqa_core::{summarize_or_fallback, IndexOptions, JsonFileSource, SearchEngine, StopWordLanguage};
use newsqa_server::{select_summarizer, LlmConfig};
use tracing_subscriber::{fmt, EnvFilter};

const EXCERPT_CHARS: usize = 300;

#[derive(Parser)]
#[command(name = "newsqa")]
#[command(about = "Ask questions against a news corpus with TF-IDF retrieval", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// Corpus file (JSON array or JSONL)
    #[arg(long, default_value = "./noticias.json")]
    corpus: String,
    /// Stop-word language: portuguese or english
    #[arg(long, default_value = "portuguese")]
    language: StopWordLanguage,
    /// Use 1 + ln(tf) term frequency instead of raw counts
    #[arg(long, default_value_t = false)]
    sublinear_tf: bool,
}

impl CorpusArgs {
    fn engine(&self) -> Result<SearchEngine> {
        let engine = SearchEngine::new(
            JsonFileSource::new(&self.corpus),
            IndexOptions { language: self.language, sublinear_tf: self.sublinear_tf },
        );
        engine
            .ensure_index_built()
            .with_context(|| format!("failed to build index from {}", self.corpus))?;
        Ok(engine)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the corpus against a question and print the top matches
    Search {
        /// Free-text question
        question: String,
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Number of results to print
        #[arg(long, default_value_t = 5)]
        k: usize,
        /// Also print an answer (chat API if DEEPSEEK_API_KEY is set, template otherwise)
        #[arg(long, default_value_t = false)]
        summarize: bool,
    },
    /// Print corpus and vocabulary statistics
    Stats {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Number of most frequent terms to list
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { question, corpus, k, summarize } => search(&question, &corpus, k, summarize),
        Commands::Stats { corpus, top } => stats(&corpus, top),
    }
}

fn search(question: &str, corpus: &CorpusArgs, k: usize, summarize: bool) -> Result<()> {
    let engine = corpus.engine()?;
    let results = engine.search(question, k)?;
    tracing::info!(corpus = %corpus.corpus, k, hits = results.len(), "search finished");

    println!("Question: {question}");
    if results.is_empty() {
        println!("\n{NO_RESULTS_MESSAGE}");
        return Ok(());
    }
    for r in &results {
        println!("\nTitle: {}", r.title);
        println!("URL: {}", r.url);
        println!("Similarity score: {:.3}", r.score);
        println!("Excerpt: {} ...", truncate_chars(&r.body, EXCERPT_CHARS, ""));
    }

    if summarize {
        let llm = LlmConfig { api_key: std::env::var("DEEPSEEK_API_KEY").ok(), ..LlmConfig::default() };
        let summarizer = select_summarizer(&llm);
        println!("\nAnswer:\n{}", summarize_or_fallback(summarizer.as_ref(), question, &results));
    }
    Ok(())
}

fn stats(corpus: &CorpusArgs, top: usize) -> Result<()> {
    let engine = corpus.engine()?;
    let snapshot = engine.snapshot()?;
    let index = snapshot.index();
    tracing::debug!(corpus = %corpus.corpus, top, "printing stats");
    println!("documents: {}", snapshot.corpus().len());
    println!("vocabulary: {}", index.vocabulary().len());
    println!("stop words: {} ({})", index.options().language, index.options().language.stop_words().len());
    println!("\nmost common terms (document frequency):");
    for (term, df) in index.top_terms(top) {
        println!("  {df:>6}  {term}");
    }
    Ok(())
}
