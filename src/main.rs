use clap::Parser;
use report_gateway::{
    AppState, Config, Credentials, InMemoryStore, LocatorResolver, ObjectStore, S3Store, Signer,
    StoreKind, Strategy, build_strategy, config::endpoint_url, create_app,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// Server configuration
const HOST: &str = "0.0.0.0";
const PORT: u16 = 9090;

// Default configuration values
const DEFAULT_REGION: &str = "us-east-1";

/// Report gateway: hands out delegated read access to report files in an object store
#[derive(Parser, Debug)]
#[command(name = "report-gateway")]
#[command(about = "Delegated-access gateway for report files stored in S3-compatible storage", long_about = None)]
struct Cli {
    /// Optional JSON/YAML configuration file (report catalog, strategy, timeouts)
    #[arg(short, long, env = "CONFIG_PATH")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "HOST", default_value = HOST)]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = PORT)]
    port: u16,

    /// Store access key id
    #[arg(long, env = "S3_ACCESS_KEY")]
    access_key: String,

    /// Store secret key
    #[arg(long, env = "S3_SECRET_KEY", hide_env_values = true)]
    secret_key: String,

    /// Store endpoint (host:port or full URL)
    #[arg(long, env = "S3_ADDRESS")]
    address: Option<String>,

    /// Store region
    #[arg(long, env = "S3_REGION", default_value = DEFAULT_REGION)]
    region: String,

    /// Use TLS when the address has no scheme
    #[arg(long, env = "S3_USE_TLS", default_value_t = false)]
    use_tls: bool,

    /// Location served for every identifier when no catalog is configured
    #[arg(long, env = "S3_FILE_PATH")]
    file_path: Option<String>,

    /// Delegation strategy (overridden by the config file if it sets one)
    #[arg(long, env = "DELEGATION_STRATEGY", value_enum, default_value_t = Strategy::Header)]
    strategy: Strategy,

    /// Store implementation
    ///
    /// `memory` starts empty unless `--memory-seed` is given, so the stream
    /// strategy answers 500 until objects exist.
    #[arg(long, env = "STORE", value_enum, default_value_t = StoreKind::S3)]
    store: StoreKind,

    /// Local file copied to every configured location of the in-memory store
    #[arg(long, env = "MEMORY_SEED")]
    memory_seed: Option<String>,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse command line arguments
    let cli = Cli::parse();

    // Load optional configuration file
    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(cfg) => {
                tracing::info!("Loaded configuration from {}", path);
                cfg
            }
            Err(e) => {
                tracing::error!("Failed to load config file '{}': {}", path, e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    // Resolve every configured location up front
    let resolver = match LocatorResolver::new(&config.reports, cli.file_path.as_deref()) {
        Ok(resolver) => resolver,
        Err(e) => {
            tracing::error!("Invalid report location: {}", e);
            std::process::exit(1);
        }
    };

    let strategy = config.strategy.unwrap_or(cli.strategy);
    if let Err(e) = resolver.check_strategy(strategy) {
        tracing::error!("Strategy {:?} cannot serve the configured reports: {}", strategy, e);
        std::process::exit(1);
    }

    let credentials = Credentials::new(cli.access_key, cli.secret_key);

    tracing::info!("Using strategy: {:?}", strategy);
    tracing::info!("Using access key: {}", credentials.access_key_id);
    tracing::info!("Report catalog entries: {}", resolver.len());

    let store: Arc<dyn ObjectStore> = match cli.store {
        StoreKind::S3 => {
            let endpoint = cli
                .address
                .as_deref()
                .map(|address| endpoint_url(address, cli.use_tls));
            tracing::info!(
                "Initializing S3 store (endpoint: {})",
                endpoint.as_deref().unwrap_or("default")
            );
            match S3Store::new("s3".to_string(), cli.region, endpoint, true, &credentials).await {
                Ok(store) => {
                    tracing::info!("✓ S3 store '{}' initialized successfully", store.name());
                    Arc::new(store)
                }
                Err(e) => {
                    tracing::error!("✗ Failed to initialize S3 store: {}", e);
                    std::process::exit(1);
                }
            }
        }
        StoreKind::Memory => {
            let store = InMemoryStore::new(credentials.clone());
            match &cli.memory_seed {
                Some(path) => match tokio::fs::read(path).await {
                    Ok(data) => {
                        let seeded = store.seed(resolver.locations(), data.into()).await;
                        tracing::info!("Seeded {} in-memory object(s) from {}", seeded, path);
                    }
                    Err(e) => {
                        tracing::error!("Failed to read memory seed '{}': {}", path, e);
                        std::process::exit(1);
                    }
                },
                None => tracing::warn!("Using in-memory store; it starts empty"),
            }
            Arc::new(store)
        }
    };

    let delegate = build_strategy(
        strategy,
        Signer::new(credentials),
        store,
        config.delegation_settings(),
    );

    let app = create_app(AppState::new(resolver, delegate));

    // Start server
    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Report gateway listening on {}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
