mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

use reelmatch::catalog::{CatalogSource, PlaylistPublisher};
use reelmatch::config;
use reelmatch::metadata::providers::{ImdbClient, TvdbClient};
use reelmatch::metadata::{IdentifierResolver, KeywordFetcher, SeriesCache};
use reelmatch::model::MediaItem;
use reelmatch::pipeline::Scheduler;
use reelmatch::plex::PlexServer;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelmatch=trace,reqwest=debug".to_string()
        } else {
            "reelmatch=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Scan {
            keyword,
            playlist,
            section,
            concurrency,
            dry_run,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_scan(ScanArgs {
                keyword,
                playlist,
                section,
                concurrency,
                dry_run,
                config_path: cli.config,
            }))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("reelmatch {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

struct ScanArgs {
    keyword: String,
    playlist: String,
    section: Option<String>,
    concurrency: Option<usize>,
    dry_run: bool,
    config_path: Option<PathBuf>,
}

async fn run_scan(args: ScanArgs) -> Result<()> {
    let mut config = config::load_config_or_default(args.config_path.as_deref())?;

    // CLI overrides
    if let Some(section) = args.section {
        config.plex.section = section;
    }
    if let Some(limit) = args.concurrency {
        config.scan.concurrency = limit;
    }

    if config.plex.token.is_empty() {
        anyhow::bail!("Plex token is not configured (set [plex] token in the config file)");
    }

    let keyword = args.keyword.to_lowercase();
    let timeout = config.scan.request_timeout();
    let retry = config.scan.retry_policy();

    // Wire the pipeline: one shared client per provider, one series cache
    // per run.
    let plex = PlexServer::new(&config.plex, timeout)?;
    let tvdb = Arc::new(TvdbClient::new(&config.providers.tvdb, timeout));
    let imdb = Arc::new(ImdbClient::new(&config.providers.imdb, timeout));

    let series_cache = Arc::new(SeriesCache::new(
        tvdb,
        config.providers.tvdb.locale.clone(),
        retry,
    ));
    let resolver = Arc::new(IdentifierResolver::new(series_cache));
    let fetcher = Arc::new(KeywordFetcher::new(imdb, retry));
    let scheduler = Scheduler::new(resolver, fetcher, config.scan.concurrency);

    tracing::info!(section = %config.plex.section, "Listing catalog items");
    let items = plex.list_items().await?;

    let results = scheduler.run(items, &keyword).await;
    let matched: Vec<MediaItem> = results
        .into_iter()
        .filter(|r| r.matched)
        .map(|r| r.item)
        .collect();

    if matched.is_empty() {
        println!("No items matching \"{keyword}\"; playlist will not be created or updated.");
        return Ok(());
    }

    println!("{} items matching \"{keyword}\":", matched.len());
    for item in &matched {
        match item.year {
            Some(year) => println!("  {} ({})", item.title, year),
            None => println!("  {}", item.title),
        }
    }

    if args.dry_run {
        println!("[DRY RUN] Playlist \"{}\" not modified.", args.playlist);
        return Ok(());
    }

    plex.publish(&args.playlist, &matched).await?;
    println!("Playlist \"{}\" updated.", args.playlist);

    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Plex server: {}", config.plex.url);
            println!("  Section: {}", config.plex.section);
            println!("  Token configured: {}", !config.plex.token.is_empty());
            println!("  TVDb key configured: {}", !config.providers.tvdb.api_key.is_empty());
            println!("  Concurrency: {}", config.scan.concurrency);
            println!(
                "  Retry: {} attempts, {}s delay",
                config.scan.retry_attempts, config.scan.retry_delay_secs
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Plex server: {}", config.plex.url);
            println!("  Section: {}", config.plex.section);
        }
    }

    Ok(())
}
