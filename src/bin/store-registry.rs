use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;

use store_registry::{
    telemetry, ConfigError, FileKeyValueStore, HttpFetcher, InMemoryKeyValueStore, KeyValueStore,
    LocalStoreRepository, RegistryConfig, RegistryError, RemoteStoreSynchronizer, StoreRecord,
    StoreRegistry, SyncReport,
};

#[derive(Parser)]
#[command(name = "store-registry", version, about = "Inspect and synchronize the store registry")]
struct Cli {
    /// Path to a TOML config file (missing file = defaults)
    #[arg(long, global = true, value_name = "PATH", default_value = "store-registry.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bootstrap from seed and local data and print the registry
    List {
        /// Print the storefront listing (active, featured first) instead
        #[arg(long)]
        storefront: bool,
    },
    /// Bootstrap, run one remote sync pass, print the report and registry
    Sync,
}

#[derive(Serialize)]
struct SyncOutput {
    report: SyncReport,
    stores: Vec<StoreRecord>,
}

type SharedStore = Arc<dyn KeyValueStore>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    telemetry::init("store_registry=info");
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "store-registry failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), RegistryError> {
    let config = RegistryConfig::load(&cli.config)?;
    let registry = open_registry(&config);
    registry.bootstrap();

    match cli.command {
        Commands::List { storefront } => {
            let stores = if storefront {
                registry.listing(&config.listing.featured)
            } else {
                registry.snapshot()
            };
            println!("{}", serde_json::to_string_pretty(&stores)?);
        }
        Commands::Sync => {
            let fetcher = HttpFetcher::from_config(&config.remote).map_err(|error| {
                RegistryError::Config(ConfigError::Invalid(error.to_string()))
            })?;
            let synchronizer = RemoteStoreSynchronizer::new(
                registry.clone(),
                Arc::new(fetcher),
                config.remote.endpoints(),
            );
            let report = synchronizer.sync().await;
            let output = SyncOutput {
                report,
                stores: registry.snapshot(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn open_registry(config: &RegistryConfig) -> StoreRegistry<SharedStore> {
    let store: SharedStore = match &config.storage.path {
        Some(path) => {
            tracing::info!(path = %path.display(), "using file-backed storage");
            Arc::new(FileKeyValueStore::open(path))
        }
        None => {
            tracing::info!("using in-memory storage");
            Arc::new(InMemoryKeyValueStore::new())
        }
    };
    StoreRegistry::new(LocalStoreRepository::from_config(store, &config.storage))
}
