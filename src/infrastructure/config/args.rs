use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "imgcache",
    version,
    about = "Fetch images through a bounded in-memory cache",
    long_about = None
)]
pub struct CliArgs {
    /// Image URLs to load.
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Maximum number of cached images.
    #[arg(long, env = "IMGCACHE_MAX_ENTRIES")]
    pub max_entries: Option<usize>,

    /// Maximum aggregate size of cached images in bytes.
    #[arg(long, env = "IMGCACHE_MAX_COST_BYTES")]
    pub max_cost_bytes: Option<u64>,

    /// Share one download between concurrent requests for the same URL.
    #[arg(long)]
    pub coalesce: Option<bool>,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// User agent header for image requests.
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Number of times to request each URL.
    #[arg(long, default_value_t = 2)]
    pub repeat: usize,
}
