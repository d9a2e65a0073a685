// Video discovery crawler
//
// Crawls from a seed URL within a depth or fetch budget and writes every
// discovered video as one JSON object per line.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use vidcrawl::config::{CrawlConfig, DedupStrategy};
use vidcrawl::utils::{DEFAULT_BLOOM_EXPECTED_ITEMS, DEFAULT_BLOOM_FP_RATE, DEFAULT_DEDUP_TTL};
use vidcrawl::{CrawlBudget, ShutdownHandle, crawl_to_writer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DedupArg {
    /// Exact set, entries expire after five minutes
    Exact,
    /// Bloom filter with fixed memory and no expiry
    Bloom,
}

#[derive(Parser, Debug)]
#[command(name = "vidcrawl", version, about = "Bounded crawler that streams discovered videos as JSON lines")]
#[command(group(ArgGroup::new("budget").required(true).args(["depth", "limit"])))]
struct Cli {
    /// URL to start crawling from
    #[arg(long, env = "VIDCRAWL_SEED_URL")]
    seed_url: String,

    /// Crawl this many hops from the seed (the seed itself counts as one)
    #[arg(long, env = "VIDCRAWL_DEPTH")]
    depth: Option<u32>,

    /// Stop after this many successful fetches
    #[arg(long, env = "VIDCRAWL_LIMIT")]
    limit: Option<usize>,

    /// Maximum concurrent fetches
    #[arg(long, env = "VIDCRAWL_CRAWLERS", default_value_t = 10)]
    crawlers: usize,

    /// Only follow links matching this regex
    #[arg(long, env = "VIDCRAWL_SEARCH", default_value = "^.*$")]
    search: String,

    /// Maximum queued URLs before the oldest half is dropped
    #[arg(long, env = "VIDCRAWL_FRONTIER_CAPACITY", default_value_t = 100_000)]
    frontier_capacity: usize,

    #[arg(long, value_enum, env = "VIDCRAWL_DEDUP", default_value_t = DedupArg::Exact)]
    dedup: DedupArg,

    /// Expected distinct URLs (bloom dedup only)
    #[arg(long)]
    bloom_items: Option<usize>,

    /// Target false-positive rate (bloom dedup only)
    #[arg(long)]
    bloom_fp_rate: Option<f64>,

    #[arg(long, env = "VIDCRAWL_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    fetch_timeout_secs: u64,

    /// Write records here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Look up metadata through the Data API instead of scraping pages
    #[arg(long, env = "YOUTUBE_AUTHORIZATION", hide_env_values = true)]
    youtube_api_key: Option<String>,
}

impl Cli {
    fn budget(&self) -> CrawlBudget {
        match (self.depth, self.limit) {
            (Some(depth), _) => CrawlBudget::Depth(depth),
            (None, Some(limit)) => CrawlBudget::Limit(limit),
            // clap enforces one of the two
            (None, None) => CrawlBudget::Depth(1),
        }
    }

    fn dedup_strategy(&self) -> DedupStrategy {
        match self.dedup {
            DedupArg::Exact => DedupStrategy::Expiring {
                ttl: DEFAULT_DEDUP_TTL,
            },
            DedupArg::Bloom => DedupStrategy::Probabilistic {
                expected_items: self.bloom_items.unwrap_or(DEFAULT_BLOOM_EXPECTED_ITEMS),
                false_positive_rate: self.bloom_fp_rate.unwrap_or(DEFAULT_BLOOM_FP_RATE),
            },
        }
    }

    fn into_config(self) -> Result<CrawlConfig> {
        let mut builder = CrawlConfig::builder()
            .seed_url(&self.seed_url)
            .budget(self.budget())
            .concurrency(self.crawlers)
            .workers(self.crawlers)
            .include_pattern(&self.search)
            .frontier_capacity(self.frontier_capacity)
            .dedup(self.dedup_strategy())
            .fetch_timeout_secs(self.fetch_timeout_secs);

        if let Some(api_key) = &self.youtube_api_key {
            builder = builder.youtube_api_key(api_key);
        }

        builder.build()
    }
}

async fn run(cli: Cli) -> Result<()> {
    let output = cli.output.clone();
    let config = cli.into_config().context("Invalid crawl configuration")?;

    let shutdown = ShutdownHandle::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("Interrupt received, finishing in-flight pages");
                shutdown.request();
            }
        }
    });

    let (summary, written) = match output {
        Some(path) => {
            let file = tokio::fs::File::create(&path)
                .await
                .with_context(|| format!("Failed to create {}", path.display()))?;
            crawl_to_writer(config, file, shutdown).await?
        }
        None => crawl_to_writer(config, tokio::io::stdout(), shutdown).await?,
    };

    log::info!(
        "Done: {} pages fetched, {} videos written{}",
        summary.pages_fetched,
        written,
        if summary.cancelled { " (interrupted)" } else { "" }
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
