//! InfluencePower - city council officials and voting records
//!
//! A REST API over a Supabase database of officials, committees and
//! roll-call votes, a sync job that fills that database from the city's
//! Legistar API, and a voting-allies ranking available both over HTTP and
//! from the command line.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (configuration, database, sync stage failure, etc.)

mod alignment;
mod cityapi;
mod cli;
mod config;
mod models;
mod report;
mod server;
mod store;
mod sync;

use alignment::AlignmentSettings;
use anyhow::{bail, Context, Result};
use cityapi::CityClient;
use cli::{AlliesArgs, Args, Command, OutputFormat, SyncArgs};
use config::{Config, CONFIG_FILE_NAME};
use report::AlliesReport;
use std::path::Path;
use std::time::{Duration, Instant};
use store::PostgrestClient;
use sync::{SyncOptions, Syncer};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // init-config needs neither logging nor a database
    if let Command::InitConfig = args.command {
        return handle_init_config();
    }

    init_logging(&args);

    info!("InfluencePower v{}", env!("CARGO_PKG_VERSION"));
    debug!("Command: {:?}", args.command);

    match run(args).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Write a default .influencepower.toml in the working directory.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Set SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY, or add [database] url.");
    Ok(())
}

fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Dispatch the selected command. Returns the process exit code.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    if let Err(e) = config.validate() {
        bail!("Invalid configuration: {}", e);
    }

    match &args.command {
        Command::Serve(_) => run_serve(&args, &config).await,
        Command::Sync(sync_args) => run_sync(&args, sync_args, &config).await,
        Command::Allies(allies_args) => run_allies(&args, allies_args, &config).await,
        Command::InitConfig => Ok(0),
    }
}

async fn run_serve(args: &Args, config: &Config) -> Result<i32> {
    let db = connect_database(args, config)?;
    let state = server::AppState::new(db, AlignmentSettings::from(&config.alignment));

    println!(
        "🚀 InfluencePower API listening on http://{}:{}/api/v1",
        config.server.host, config.server.port
    );
    server::start(state, &config.server.host, config.server.port).await?;
    Ok(0)
}

async fn run_sync(args: &Args, sync_args: &SyncArgs, config: &Config) -> Result<i32> {
    let start_time = Instant::now();
    let db = connect_database(args, config)?;

    let city = CityClient::new(
        &config.city_api.base_url,
        Duration::from_secs(config.city_api.timeout_seconds),
    )
    .context("Failed to create Legistar client")?;

    println!("🔄 Syncing from {}", city.base_url());

    let options = SyncOptions {
        matter_limit: config.city_api.matter_limit,
        event_limit: config.city_api.event_limit,
        request_delay: Duration::from_millis(config.city_api.request_delay_ms),
        matter_ids: sync_args.matter_ids.clone(),
        show_progress: !args.quiet,
    };

    let summary = Syncer::new(&city, &db, options).run().await;

    println!("\n📊 Sync Summary:");
    for table in sync::SYNCED_TABLES {
        let count = summary.count(table);
        println!(
            "   {}: {} upserted, {} failed",
            table, count.upserted, count.failed
        );
    }
    println!("   persons seen: {}", summary.persons_seen);
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());

    if !summary.failed_stages.is_empty() {
        eprintln!(
            "\n⛔ Stages failed: {}",
            summary.failed_stages.join(", ")
        );
        return Ok(1);
    }

    println!("\n✅ Sync complete!");
    Ok(0)
}

async fn run_allies(args: &Args, allies_args: &AlliesArgs, config: &Config) -> Result<i32> {
    let db = connect_database(args, config)?;
    let settings = AlignmentSettings::from(&config.alignment);

    let ranking = alignment::calculate_allies(allies_args.official_id, &db, &db, &settings)
        .await
        .with_context(|| {
            format!(
                "Failed to compute allies for official {}",
                allies_args.official_id
            )
        })?;

    if ranking.skipped > 0 {
        warn!(
            "{} officials skipped because their votes could not be read",
            ranking.skipped
        );
    }

    let report = AlliesReport::new(allies_args.official_id, settings.limit, ranking);
    let output = match allies_args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    match allies_args.output {
        Some(ref path) => {
            report::write_report(&output, path)?;
            println!("✅ Report saved to: {}", path.display());
        }
        None => print!("{}", output),
    }

    if report.skipped > 0 {
        eprintln!("⚠️  Skipped officials: {}", report.skipped);
    }

    Ok(0)
}

/// Build the database client from config and the service key.
fn connect_database(args: &Args, config: &Config) -> Result<PostgrestClient> {
    let Some(ref url) = config.database.url else {
        bail!("Supabase URL not set (use --supabase-url, SUPABASE_URL or [database] url)");
    };
    let Some(ref key) = args.supabase_key else {
        bail!("Supabase service key not set (use --supabase-key or SUPABASE_SERVICE_ROLE_KEY)");
    };

    let db = PostgrestClient::new(
        url,
        key,
        Duration::from_secs(config.database.timeout_seconds),
    )
    .context("Failed to create database client")?;
    info!("Using database at {}", db.base_url());
    Ok(db)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
