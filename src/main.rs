use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

use token_scanner::api::{BackendClient, SupabaseClient, TokenDirectory};
use token_scanner::chart::BarChart;
use token_scanner::cli::{Cli, Command};
use token_scanner::config::Config;
use token_scanner::models::{format_market_cap, ResolvedToken, TokenSource, WatchlistEntry};
use token_scanner::resolver::{Resolution, TokenResolver};
use token_scanner::scanner::{ActivityScanner, TrackOutcome};
use token_scanner::watchlist::FileStore;

const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    token_scanner::logging::init(cli.log_file.as_deref(), cli.debug)?;

    let config_path = cli.config.clone().unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;
    info!("Configuration loaded.");

    let backend = Arc::new(BackendClient::new(&config.backend)?);

    match cli.command {
        Command::Search { query, resolve } => {
            let tokens = match SupabaseClient::new(&config.database) {
                Ok(directory) => directory.active_tokens().await?,
                Err(e) => {
                    warn!("Searching without local tokens: {}", e);
                    Vec::new()
                }
            };
            let resolver = TokenResolver::new(backend, &tokens, &[]);
            if resolve {
                print_resolution(resolver.resolve(&query).await?);
            } else {
                let suggestions = resolver.set_query(&query).await;
                if suggestions.is_empty() {
                    println!("No tokens found");
                }
                for token in suggestions.entries() {
                    println!("{:<10} {:<24} {}", token.display_symbol(), token.name, token.address);
                }
            }
        }
        command => {
            let directory = Arc::new(
                SupabaseClient::new(&config.database).context("The watchlist needs a configured database")?,
            );
            let storage = Arc::new(FileStore::open(config.storage.data_dir.clone())?);
            let scanner = ActivityScanner::new(directory, backend, storage, config.scanner.clone())?;
            run_watchlist_command(&scanner, command).await?;
        }
    }

    Ok(())
}

async fn run_watchlist_command(scanner: &ActivityScanner, command: Command) -> Result<()> {
    match command {
        Command::Track { symbol } => match scanner.track(&symbol, false).await? {
            TrackOutcome::Added(entry) => print_entry(&entry, false),
            TrackOutcome::AlreadyTracked => println!("{} is already tracked", symbol.to_uppercase()),
            TrackOutcome::AlreadyLoading => println!("{} is still loading", symbol.to_uppercase()),
        },
        Command::Remove { symbol } => {
            if scanner.untrack(&symbol).await? {
                println!("Removed {}", symbol.to_uppercase());
            } else {
                println!("{} is not tracked", symbol.to_uppercase());
            }
        }
        Command::List { chart } => {
            let entries = scanner.entries().await;
            if entries.is_empty() {
                println!("No tokens tracked");
            }
            for entry in &entries {
                print_entry(entry, chart);
            }
        }
        Command::Preload => {
            let report = scanner.preload_trending().await?;
            if report.skipped {
                println!("Trending tokens already loaded");
            }
            for symbol in &report.added {
                println!("Added {}", symbol);
            }
            for symbol in &report.failed {
                println!("Skipped {}", symbol);
            }
        }
        Command::Export { symbol, dir } => {
            let entry = scanner
                .entry(&symbol)
                .await
                .with_context(|| format!("{} is not tracked", symbol.to_uppercase()))?;
            let path = dir.join(Path::new(&entry.export_file_name()).with_extension("svg"));
            std::fs::write(&path, BarChart::new(&entry.history).to_svg())?;
            println!("Wrote {}", path.display());
        }
        Command::Search { .. } => bail!("search does not use the watchlist"),
    }
    Ok(())
}

fn print_resolution(resolution: Resolution) {
    match resolution {
        Resolution::Resolved(resolved) => print_token(&resolved),
        Resolution::WaitingForAddress { symbol } => {
            println!("\"{}\" is not a known token. Paste its contract address to look it up.", symbol)
        }
        Resolution::Stale | Resolution::Idle => {}
    }
}

fn print_token(resolved: &ResolvedToken) {
    let token = &resolved.token;
    let source = match resolved.source {
        TokenSource::Local => "local",
        TokenSource::External => "backend",
    };
    println!("{} ({}) [{}]", token.display_symbol(), token.name, source);
    println!("  address     {}", token.address);
    println!("  market cap  {}", format_market_cap(token.market_cap_usd));
    println!("  volume      {}", format_market_cap(token.volume_usd));
    println!("  liquidity   {}", format_market_cap(token.liquidity_usd));
    println!("  1h change   {:.2}%", token.price_change_1h);
    if let Some(score) = &token.wom_score {
        match score.band() {
            Some(band) => println!("  WOM score   {} ({:?})", score, band),
            None => println!("  WOM score   {}", score),
        }
    }
}

fn print_entry(entry: &WatchlistEntry, chart: bool) {
    let intervals: Vec<String> = entry
        .intervals
        .iter()
        .map(|(interval, count)| format!("{}={}", interval, count))
        .collect();
    println!("{:<10} total {:<6} {}", entry.token, entry.total, intervals.join(" "));
    if chart {
        print!("{}", BarChart::new(&entry.history).to_text());
    }
}
