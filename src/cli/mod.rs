//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "roomrank",
    version,
    author = "neur0map",
    about = "Hybrid hotel search from the terminal",
    long_about = "Roomrank composes hybrid retrieval queries that blend a lexical signal with dense and \
                  sparse semantic signals, layers optional geo and rating filters on top, optionally \
                  rescores the fused candidates with a neural reranker, and renders the engine's hits \
                  for display."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/roomrank/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Profile to use (e.g., "staging")
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the hotels index with blended ranking signals
    Search {
        /// Search query text
        query: String,

        /// Weight for the dense embedding signal (zero mutes it)
        #[arg(long)]
        dense_weight: Option<f64>,

        /// Weight for the lexical signal (zero mutes it)
        #[arg(long)]
        lexical_weight: Option<f64>,

        /// Weight for the sparse semantic signal (zero mutes it)
        #[arg(long)]
        sparse_weight: Option<f64>,

        /// How the three signals are fused
        #[arg(long, value_parser = ["linear", "rrf"], default_value = "linear")]
        fusion: String,

        /// Candidate pool depth for rank fusion
        #[arg(long)]
        fusion_window: Option<u32>,

        /// Number of results to return
        #[arg(short, long, default_value = "20")]
        size: u32,

        /// Lexical field to match against (repeatable; defaults to the
        /// standard hotel fields)
        #[arg(long = "field")]
        fields: Vec<String>,

        /// Rescore the fused candidates with the neural reranker
        #[arg(long)]
        rerank: bool,

        /// How many fused candidates the reranker rescores
        #[arg(long)]
        rerank_window: Option<u32>,

        /// Minimum reranker score to keep a hit
        #[arg(long)]
        min_score: Option<f64>,

        /// Latitude for the geo filter
        #[arg(long)]
        lat: Option<f64>,

        /// Longitude for the geo filter
        #[arg(long)]
        lon: Option<f64>,

        /// Geo filter radius in kilometres (defaults to 10)
        #[arg(long)]
        radius: Option<f64>,

        /// Only hotels rated at least this highly
        #[arg(long)]
        min_rating: Option<f64>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Print the composed query document instead of executing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Execute a raw query document against the index
    Raw {
        /// Path to a JSON query document (reads stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Warm up the semantic inference models
    Warm,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
