//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.influencepower.toml` files. The database service key is never read
//! from the file; it comes from the command line or environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".influencepower.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Hosted database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Legistar API settings.
    #[serde(default)]
    pub city_api: CityApiConfig,

    /// Voting alignment settings.
    #[serde(default)]
    pub alignment: AlignmentConfig,
}

/// Supabase / PostgREST settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    #[serde(default)]
    pub url: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_db_timeout")]
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_seconds: default_db_timeout(),
        }
    }
}

fn default_db_timeout() -> u64 {
    30
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Legistar client and sync settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityApiConfig {
    /// Tenant base URL.
    #[serde(default = "default_city_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_city_timeout")]
    pub timeout_seconds: u64,

    /// Pause between per-matter and per-event requests, in milliseconds.
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,

    /// Number of recent matters pulled per sync.
    #[serde(default = "default_matter_limit")]
    pub matter_limit: usize,

    /// Number of recent events pulled per sync.
    #[serde(default = "default_event_limit")]
    pub event_limit: usize,
}

impl Default for CityApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_city_url(),
            timeout_seconds: default_city_timeout(),
            request_delay_ms: default_request_delay(),
            matter_limit: default_matter_limit(),
            event_limit: default_event_limit(),
        }
    }
}

fn default_city_url() -> String {
    crate::cityapi::DEFAULT_BASE_URL.to_string()
}

fn default_city_timeout() -> u64 {
    crate::cityapi::client::DEFAULT_TIMEOUT_SECS
}

fn default_request_delay() -> u64 {
    100
}

fn default_matter_limit() -> usize {
    100
}

fn default_event_limit() -> usize {
    50
}

/// Voting alignment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentConfig {
    /// Maximum number of allies returned.
    #[serde(default = "default_ally_limit")]
    pub limit: usize,

    /// Bloc label for parties without an entry in `blocs`.
    #[serde(default = "default_bloc")]
    pub default_bloc: String,

    /// Party affiliation to bloc label.
    #[serde(default = "default_blocs")]
    pub blocs: BTreeMap<String, String>,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            limit: default_ally_limit(),
            default_bloc: default_bloc(),
            blocs: default_blocs(),
        }
    }
}

fn default_ally_limit() -> usize {
    crate::alignment::calculator::DEFAULT_ALLY_LIMIT
}

fn default_bloc() -> String {
    crate::alignment::blocs::DEFAULT_BLOC.to_string()
}

fn default_blocs() -> BTreeMap<String, String> {
    crate::alignment::blocs::default_labels()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.influencepower.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE_NAME);

        if path.exists() {
            Ok(Some(Self::load(&path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        use crate::cli::Command;

        if let Some(ref url) = args.supabase_url {
            self.database.url = Some(url.clone());
        }

        match &args.command {
            Command::Serve(serve) => {
                if let Some(ref host) = serve.host {
                    self.server.host = host.clone();
                }
                if let Some(port) = serve.port {
                    self.server.port = port;
                }
            }
            Command::Sync(sync) => {
                if let Some(ref url) = sync.city_api_url {
                    self.city_api.base_url = url.clone();
                }
                if let Some(limit) = sync.matter_limit {
                    self.city_api.matter_limit = limit;
                }
                if let Some(limit) = sync.event_limit {
                    self.city_api.event_limit = limit;
                }
                if let Some(delay) = sync.delay_ms {
                    self.city_api.request_delay_ms = delay;
                }
            }
            Command::Allies(allies) => {
                if let Some(limit) = allies.limit {
                    self.alignment.limit = limit;
                }
            }
            Command::InitConfig => {}
        }
    }

    /// Validate merged settings. Catches values the command line would
    /// have rejected but a config file can still carry.
    pub fn validate(&self) -> Result<(), String> {
        if self.alignment.limit == 0 {
            return Err("[alignment] limit must be at least 1".to_string());
        }
        if self.city_api.matter_limit == 0 {
            return Err("[city_api] matter_limit must be at least 1".to_string());
        }
        if self.city_api.event_limit == 0 {
            return Err("[city_api] event_limit must be at least 1".to_string());
        }
        if self.server.port == 0 {
            return Err("[server] port must be between 1 and 65535".to_string());
        }
        if let Some(ref url) = self.database.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("[database] url must start with 'http://' or 'https://'".to_string());
            }
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
