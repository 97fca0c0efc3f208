use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List tokens matching a query
    Search {
        query: String,

        /// Resolve the query to a single token, asking the backend when no
        /// local token matches
        #[arg(long)]
        resolve: bool,
    },
    /// Add a token to the watchlist
    Track { symbol: String },
    /// Remove a token from the watchlist
    Remove { symbol: String },
    /// Show the watchlist
    List {
        /// Draw each entry's activity chart
        #[arg(long)]
        chart: bool,
    },
    /// Seed an empty watchlist with trending tokens
    Preload,
    /// Write a tracked token's activity chart as SVG
    Export {
        symbol: String,

        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}
