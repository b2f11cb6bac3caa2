/*!
 * Hydrate CLI - Command Line Interface
 */

use clap::{Parser, Subcommand};
use hydrate::{
    config::{HydrateConfig, MembershipSource},
    error::{HydrateError, Result, EXIT_SUCCESS},
    logging, open_database, HydratedDatabase,
};
use hydrate_connect::{ReadPreference, Warmup, WriteConcern};
use hydrate_core_discovery::EndpointResolver;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "hydrate")]
#[command(version, about = "Database connections that follow a discovered server set", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short = 'c', long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Override the application name
    #[arg(long, global = true)]
    application: Option<String>,

    /// Override the database name
    #[arg(long, global = true)]
    database: Option<String>,

    /// Use a fixed endpoint instead of the configured membership source
    /// (can be specified multiple times)
    #[arg(long = "endpoint", value_name = "HOST:PORT", global = true)]
    endpoints: Vec<String>,

    /// Read preference for new connections
    #[arg(long, global = true)]
    read_preference: Option<ReadPreference>,

    /// Write concern for new connections
    #[arg(long, global = true)]
    write_concern: Option<WriteConcern>,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the application's current endpoint set
    Resolve,

    /// Open a collection once and print its handle
    Collection {
        /// Collection name
        name: String,
    },

    /// Keep requesting a collection and report every connection swap
    Watch {
        /// Collection name
        name: String,

        /// Seconds between requests (defaults to refresh_interval_secs)
        #[arg(long)]
        interval: Option<u64>,

        /// Stop after this many requests (runs forever when omitted)
        #[arg(long)]
        iterations: Option<u64>,
    },

    /// Write a default configuration file
    InitConfig {
        /// Destination path
        path: PathBuf,
    },
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::InitConfig { ref path } = cli.command {
        HydrateConfig::default().to_file(path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let config = load_config(&cli)?;
    logging::init_logging(&config)?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| HydrateError::Config(format!("Failed to start async runtime: {}", e)))?;

    runtime.block_on(async {
        match cli.command {
            Commands::Resolve => resolve(&config).await,
            Commands::Collection { ref name } => collection(&config, name).await,
            Commands::Watch {
                ref name,
                interval,
                iterations,
            } => watch(&config, name, interval, iterations).await,
            Commands::InitConfig { .. } => Ok(()),
        }
    })
}

/// Config file (explicit or default location) with command-line overrides applied
fn load_config(cli: &Cli) -> Result<HydrateConfig> {
    let mut config = match cli.config {
        Some(ref path) => HydrateConfig::from_file(path)?,
        None => match HydrateConfig::default_path() {
            Some(path) if path.exists() => HydrateConfig::from_file(&path)?,
            _ => HydrateConfig::default(),
        },
    };

    if let Some(ref application) = cli.application {
        config.application = application.clone();
    }
    if let Some(ref database) = cli.database {
        config.database = database.clone();
    }
    if !cli.endpoints.is_empty() {
        config.membership = MembershipSource::Static {
            endpoints: cli.endpoints.clone(),
        };
    }
    if let Some(read_preference) = cli.read_preference {
        config.read_preference = read_preference;
    }
    if let Some(write_concern) = cli.write_concern {
        config.write_concern = write_concern;
    }
    if cli.verbose {
        config.verbose = true;
    }

    config.validate()?;
    Ok(config)
}

async fn resolve(config: &HydrateConfig) -> Result<()> {
    let resolver = EndpointResolver::new(hydrate::membership::resolver_for(
        &config.application,
        &config.membership,
    ));
    let endpoints = resolver
        .resolve(&config.application)
        .await
        .map_err(hydrate_connect::ConnectError::from)?;

    println!("{}", serde_json::to_string_pretty(&endpoints)?);
    Ok(())
}

async fn collection(config: &HydrateConfig, name: &str) -> Result<()> {
    let database = open_database(config)?;
    let outcome = database.get_collection(name).await;
    if let Ok(ref handle) = outcome {
        println!("{}", serde_json::to_string_pretty(handle)?);
    }
    database.shutdown().await;
    outcome.map(|_| ()).map_err(HydrateError::from)
}

async fn watch(
    config: &HydrateConfig,
    name: &str,
    interval: Option<u64>,
    iterations: Option<u64>,
) -> Result<()> {
    let database = open_database(config)?;
    let interval = interval
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| config.refresh_interval());

    match database.initialize().await {
        Ok(Warmup::Built) => info!("Initial connection ready"),
        Ok(_) => {}
        Err(e) => warn!("Warm-up failed, will retry on first request: {}", e),
    }

    let mut generation = database.snapshot().await.generation;
    let mut requests = 0u64;

    loop {
        match database.get_collection(name).await {
            Ok(handle) => report_swap(&database, &mut generation, &handle).await,
            Err(e) => error!("Request for {} failed: {}", name, e),
        }

        requests += 1;
        if iterations.is_some_and(|limit| requests >= limit) {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    database.shutdown().await;
    Ok(())
}

async fn report_swap(
    database: &HydratedDatabase,
    generation: &mut u64,
    handle: &hydrate::CollectionHandle,
) {
    let snapshot = database.snapshot().await;
    if snapshot.generation != *generation {
        info!(
            "Swapped to connection {} at {} (generation {}, servers {})",
            handle.connection_id, handle.server, snapshot.generation, snapshot.endpoints
        );
        *generation = snapshot.generation;
    }
}
