use anyhow::{Context, Result};
use clap::Parser;
use reqwest::{Client, Url};
use serde::Serialize;
use std::fs::{self, File};
use std::future::Future;
use std::io::{BufWriter, Write};
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

mod extract;

use extract::{article_links, extract_article, Article, LinkRule};

const PORTAL: &str = "https://portal.ifpe.edu.br";

#[derive(Parser, Debug)]
#[command(name = "crawler")]
#[command(about = "Collect news articles from the IFPE portal into a JSON corpus")]
struct Cli {
    /// Restrict to one campus (e.g. igarassu); folds accents and lower-cases text
    #[arg(long)]
    campus: Option<String>,
    /// Listing base URL; derived from --campus when omitted
    #[arg(long)]
    base_url: Option<String>,
    /// Number of listing pages to read
    #[arg(long, default_value_t = 20)]
    pages: usize,
    /// Output JSON file path
    #[arg(long, default_value = "./noticias.json")]
    output: String,
    /// Articles fetched in parallel
    #[arg(long, default_value_t = 8)]
    concurrency: usize,
    /// Request timeout seconds
    #[arg(long, default_value_t = 12)]
    timeout_secs: u64,
    /// User-Agent string
    #[arg(long, default_value = "newsqa-crawler/0.1")]
    user_agent: String,
}

impl Cli {
    fn base_url(&self) -> String {
        match (&self.base_url, &self.campus) {
            (Some(base), _) => base.trim_end_matches('/').to_string(),
            (None, Some(slug)) => format!("{PORTAL}/{slug}/noticias"),
            (None, None) => format!("{PORTAL}/noticias"),
        }
    }

    fn rule(&self) -> LinkRule {
        match &self.campus {
            Some(slug) => LinkRule::campus(slug),
            None => LinkRule::portal(),
        }
    }
}

#[derive(Serialize)]
struct OutDoc<'a> {
    index: usize,
    #[serde(flatten)]
    article: &'a Article,
}

fn listing_pages(base: &str, pages: usize) -> Vec<String> {
    (1..=pages).map(|n| format!("{base}/page/{n}")).collect()
}

async fn fetch_html(client: &Client, url: &str) -> Result<String> {
    let resp = client.get(url).send().await?.error_for_status()?;
    Ok(resp.text().await?)
}

/// Fetch `links` `concurrency` at a time and append the extracted articles to
/// `collected` in link order. Failed fetches and records already present are
/// skipped.
async fn collect_articles<F, Fut>(
    links: &[String],
    concurrency: usize,
    fold: bool,
    collected: &mut Vec<Article>,
    fetch: F,
) where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    for chunk in links.chunks(concurrency.max(1)) {
        let handles: Vec<_> = chunk
            .iter()
            .cloned()
            .map(|link| {
                let pending = fetch(link.clone());
                tokio::spawn(async move {
                    let html = pending.await?;
                    Ok::<_, anyhow::Error>(extract_article(&link, &html, fold))
                })
            })
            .collect();
        for (link, handle) in chunk.iter().zip(handles) {
            match handle.await {
                Ok(Ok(article)) => {
                    if collected.contains(&article) {
                        tracing::info!(url = %link, "already collected, skipping");
                        continue;
                    }
                    tracing::info!(url = %link, title = %article.title, published = %article.published_at, "collected");
                    collected.push(article);
                }
                Ok(Err(e)) => tracing::warn!(url = %link, error = %e, "failed to read article"),
                Err(e) => tracing::warn!(url = %link, error = %e, "fetch task failed"),
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();

    let client = Client::builder()
        .user_agent(args.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()?;

    let base = args.base_url();
    let rule = args.rule();
    let fold = args.campus.is_some();
    let concurrency = args.concurrency.max(1);
    tracing::info!(%base, pages = args.pages, concurrency, fold, output = %args.output, "crawler starting");

    let mut collected: Vec<Article> = Vec::new();
    for page in listing_pages(&base, args.pages) {
        tracing::info!(%page, "reading listing page");
        let page_url = Url::parse(&page).with_context(|| format!("invalid listing url {page}"))?;
        let links = match fetch_html(&client, &page).await {
            Ok(html) => article_links(&page_url, &html, &rule),
            Err(e) => {
                tracing::warn!(%page, error = %e, "failed to read listing page");
                continue;
            }
        };
        if links.is_empty() {
            tracing::warn!(%page, "no news found on this page");
            continue;
        }

        let client = client.clone();
        collect_articles(&links, concurrency, fold, &mut collected, move |link| {
            let client = client.clone();
            async move { fetch_html(&client, &link).await }
        })
        .await;
    }

    if let Some(dir) = std::path::Path::new(&args.output).parent() {
        fs::create_dir_all(dir).ok();
    }
    let mut out = BufWriter::new(
        File::create(&args.output).with_context(|| format!("failed to create {}", args.output))?,
    );
    let records: Vec<OutDoc<'_>> = collected
        .iter()
        .enumerate()
        .map(|(index, article)| OutDoc { index, article })
        .collect();
    serde_json::to_writer_pretty(&mut out, &records)?;
    out.write_all(b"\n")?;
    out.flush()?;

    if records.is_empty() {
        tracing::warn!(output = %args.output, "no articles collected");
    }
    tracing::info!(total = records.len(), output = %args.output, "crawl complete");
    Ok(())
}
