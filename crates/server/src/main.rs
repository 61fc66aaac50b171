use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use add2wallet_core::artifact::{ArtifactStore, FsArtifactStore};
use add2wallet_core::certificates::CertificateBundle;
use add2wallet_core::extract::FilenameExtractor;
use add2wallet_core::pdf::{PdfValidator, StructuralValidator};
use add2wallet_core::provision::ProvisionChain;
use add2wallet_core::signer::PassSigner;
use add2wallet_core::{
    create_authenticator, load_config, validate_config, Authenticator, JobStore, PassPipeline,
    SqliteJobStore,
};

use add2wallet_server::api::create_router;
use add2wallet_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("ADD2WALLET_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Version: {}", VERSION);
    info!("Auth method: {:?}", config.auth.method);
    info!("Database path: {:?}", config.database.path);

    // Log a config fingerprint so deploys are distinguishable in logs
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!("Config hash: {}", &config_hash[..16]);

    // Provision any required external tool before accepting traffic
    if let Some(ref tools) = config.tools {
        info!("Ensuring tool is available: {}", tools.tool);
        let chain = ProvisionChain::from_config(tools);
        let outcome = chain
            .ensure()
            .await
            .context("Tool provisioning failed")?;
        info!("Tool provisioning outcome: {:?}", outcome);
    }

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Create SQLite job store
    let jobs: Arc<dyn JobStore> = Arc::new(
        SqliteJobStore::new(&config.database.path).context("Failed to create job store")?,
    );
    info!("Job store initialized");

    // Create artifact store
    let artifacts: Arc<dyn ArtifactStore> =
        Arc::new(FsArtifactStore::new(config.storage.artifact_dir.clone()));
    info!("Artifact store at {:?}", config.storage.artifact_dir);

    // Load the certificate bundle; absent material means unsigned passes
    let bundle = CertificateBundle::load(&config.certificates)
        .context("Failed to load certificate bundle")?;
    let signing_enabled = bundle.is_some();
    let identifiers = bundle.as_ref().and_then(|b| b.identifiers());
    match (&bundle, &identifiers) {
        (Some(_), Some(ids)) => info!(
            "Signing enabled for {} (team {})",
            ids.pass_type_identifier, ids.team_identifier
        ),
        (Some(_), None) => info!(
            "Signing enabled, using configured identifiers ({})",
            config.wallet.pass_type_identifier
        ),
        (None, _) => info!("No certificate bundle, passes will be unsigned"),
    }
    let signer = PassSigner::new(bundle.map(Arc::new));

    // One validator shared by upload intake and the pipeline
    let pdf_validator: Arc<dyn PdfValidator> = Arc::new(StructuralValidator::new());

    // Create the pass pipeline
    let pipeline = Arc::new(PassPipeline::new(
        config.pipeline.clone(),
        Arc::clone(&jobs),
        Arc::clone(&artifacts),
        Arc::clone(&pdf_validator),
        Arc::new(FilenameExtractor::new()),
        signer,
        config.wallet.clone(),
        identifiers,
    ));
    info!(
        "Pipeline ready (max parallel jobs: {})",
        config.pipeline.max_parallel_jobs
    );

    // Create app state and router
    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        jobs,
        artifacts,
        pdf_validator,
        pipeline,
        signing_enabled,
    ));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
