use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::fetcher::FetcherConfig;

/// Output format for the taxonomy summary
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned plain-text report
    #[default]
    Human,
    /// Machine-readable JSON
    Json,
}

/// Resolve an XBRL report package and summarize its taxonomy set
#[derive(Parser, Debug, Clone)]
#[command(name = "xbrl-dts")]
#[command(about = "Load an XBRL manifest, instance, or schema and report the shape of its DTS")]
#[command(version)]
pub struct Cli {
    /// Entry document: manifest, instance, or taxonomy schema
    #[arg(help = "Path or URL of the entry document")]
    pub entry: String,

    /// Local EDINET taxonomy cache directory (overrides EDINET_TAXONOMY_DIR)
    #[arg(long = "taxonomy-dir")]
    pub taxonomy_dir: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout", default_value = "30")]
    pub timeout: u64,

    /// Number of retry attempts for failed downloads
    #[arg(long = "retry-attempts", default_value = "3")]
    pub retry_attempts: u32,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Fetcher configuration with CLI overrides applied.
    pub fn fetcher_config(&self) -> FetcherConfig {
        let mut config = FetcherConfig::default();
        if let Some(dir) = &self.taxonomy_dir {
            config.cache_root = dir.clone();
        }
        config.timeout_seconds = self.timeout;
        config.retry_attempts = self.retry_attempts;
        config
    }

    /// Default tracing filter derived from the verbosity flags.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "xbrl_dts=debug"
        } else {
            "xbrl_dts=info"
        }
    }
}
