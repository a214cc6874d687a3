//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// InfluencePower - city council officials and voting records
///
/// Serves the InfluencePower REST API over a Supabase database, syncs
/// legislation and roll-call votes from the city clerk's Legistar API,
/// and ranks voting allies from the command line.
///
/// Examples:
///   influencepower serve --port 8080
///   influencepower sync --matter-limit 50
///   influencepower allies 1234 --format json
///   influencepower init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .influencepower.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Supabase project URL
    #[arg(long, value_name = "URL", env = "SUPABASE_URL", global = true)]
    pub supabase_url: Option<String>,

    /// Supabase service role key
    #[arg(
        long,
        value_name = "KEY",
        env = "SUPABASE_SERVICE_ROLE_KEY",
        hide_env_values = true,
        global = true
    )]
    pub supabase_key: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the REST API server
    Serve(ServeArgs),

    /// Pull bodies, matters, votes and events from Legistar into the database
    Sync(SyncArgs),

    /// Rank the officials who vote most like the given official
    Allies(AlliesArgs),

    /// Generate a default .influencepower.toml configuration file
    InitConfig,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, value_name = "PORT", env = "PORT")]
    pub port: Option<u16>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SyncArgs {
    /// Number of recent matters to pull
    #[arg(long, value_name = "COUNT")]
    pub matter_limit: Option<usize>,

    /// Number of recent events to pull
    #[arg(long, value_name = "COUNT")]
    pub event_limit: Option<usize>,

    /// Sync only these matter ids (comma-separated); skips events
    #[arg(long = "matter", value_name = "IDS", value_delimiter = ',')]
    pub matter_ids: Vec<i64>,

    /// Pause between per-matter requests, in milliseconds
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Legistar tenant base URL
    #[arg(long, value_name = "URL")]
    pub city_api_url: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct AlliesArgs {
    /// Person id of the official to compare against
    #[arg(value_name = "OFFICIAL_ID")]
    pub official_id: i64,

    /// Maximum number of allies to list
    #[arg(long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Output format for the allies report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown table (default)
    #[default]
    Markdown,
    /// JSON array
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref url) = self.supabase_url {
            if !is_http_url(url) {
                return Err("Supabase URL must start with 'http://' or 'https://'".to_string());
            }
        }

        match &self.command {
            Command::Serve(serve) => {
                if serve.port == Some(0) {
                    return Err("Port must be between 1 and 65535".to_string());
                }
            }
            Command::Sync(sync) => {
                if sync.matter_limit == Some(0) {
                    return Err("Matter limit must be at least 1".to_string());
                }
                if sync.event_limit == Some(0) {
                    return Err("Event limit must be at least 1".to_string());
                }
                if let Some(ref url) = sync.city_api_url {
                    if !is_http_url(url) {
                        return Err(
                            "City API URL must start with 'http://' or 'https://'".to_string()
                        );
                    }
                }
            }
            Command::Allies(allies) => {
                if allies.limit == Some(0) {
                    return Err("Ally limit must be at least 1".to_string());
                }
            }
            Command::InitConfig => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
