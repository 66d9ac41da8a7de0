//! CLI arguments

use crate::config::PagerConfig;
use crate::types::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Page through SparkPost click events for gmail.com recipients
#[derive(Parser, Debug)]
#[command(name = "event-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML)
    #[arg(short = 'C', long, env = "EVENT_PAGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Delay between pages in milliseconds
    #[arg(long, env = "EVENT_PAGER_PAGE_DELAY_MS")]
    pub page_delay_ms: Option<u64>,

    /// Delay before retrying a rate-limited or failed page in milliseconds
    #[arg(long, env = "EVENT_PAGER_RETRY_DELAY_MS")]
    pub retry_delay_ms: Option<u64>,

    /// Consecutive retries allowed per page (default: unlimited)
    #[arg(long, env = "EVENT_PAGER_MAX_RETRIES")]
    pub max_retries: Option<u32>,

    /// Request timeout in seconds (0 disables the timeout)
    #[arg(long, env = "EVENT_PAGER_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Log level
    #[arg(long, env = "EVENT_PAGER_LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Verbose output (same as --log-level debug)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Effective log level
    pub fn log_level(&self) -> LogLevel {
        if self.verbose && self.log_level == LogLevel::Info {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }

    /// Apply flag values on top of file settings
    pub fn apply_overrides(&self, config: &mut PagerConfig) {
        if let Some(ms) = self.page_delay_ms {
            config.page_delay_ms = ms;
        }
        if let Some(ms) = self.retry_delay_ms {
            config.retry_delay_ms = ms;
        }
        if let Some(max) = self.max_retries {
            config.max_retries = Some(max);
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout_secs = secs;
        }
    }
}
