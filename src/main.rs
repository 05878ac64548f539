//! PlantVillage Advisor Server
//!
//! Classifies uploaded leaf photos with an AlexNet model and asks the Gemini API
//! for remedy advice. Also serves the static frontend and a chat endpoint.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use plantvillage_advisor::advisor::upstream::{
    GeminiClient, GeminiConfig, DEFAULT_API_BASE, DEFAULT_MODEL,
};
use plantvillage_advisor::backend::backend_name;
use plantvillage_advisor::inference::ClassifierHandle;
use plantvillage_advisor::server::{router, AppState, ServerConfig};
use plantvillage_advisor::utils::{init_logging, LogConfig, LogLevel};

/// PlantVillage Advisor Server
#[derive(Parser, Debug)]
#[command(name = "plantvillage-advisor")]
#[command(version)]
#[command(about = "Plant disease classification and remedy advice server")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Classifier checkpoint (.mpk, .pt, .pth, .pkl or .tar)
    #[arg(long, env = "PLANT_MODEL_PATH", default_value = "models/alexnet.pkl")]
    model_path: PathBuf,

    /// Directory with index.html and static assets
    #[arg(long, env = "PLANT_STATIC_DIR", default_value = "static")]
    static_dir: PathBuf,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    gemini_model: String,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_API_BASE", default_value = DEFAULT_API_BASE)]
    gemini_api_base: String,

    /// Timeout for each upstream request, in seconds
    #[arg(long, default_value = "30")]
    upstream_timeout_secs: u64,

    /// Retries after an upstream timeout, transport error or 5xx
    #[arg(long, default_value = "0")]
    max_retries: u32,

    /// Largest accepted upload, in MiB
    #[arg(long, default_value = "10")]
    max_upload_mb: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Verbose logging (debug level, targets and thread ids)
    #[arg(short, long)]
    verbose: bool,

    /// Plain log output without colours, for log collectors
    #[arg(long, conflicts_with = "verbose")]
    production: bool,
}

impl Cli {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            model_path: self.model_path.clone(),
            static_dir: self.static_dir.clone(),
            max_upload_bytes: self.max_upload_mb * 1024 * 1024,
            gemini: GeminiConfig {
                api_key: self.gemini_api_key.clone().unwrap_or_default(),
                model: self.gemini_model.clone(),
                api_base: self.gemini_api_base.clone(),
                timeout: Duration::from_secs(self.upstream_timeout_secs),
                max_retries: self.max_retries,
                ..GeminiConfig::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let level = LogLevel::from_str(&cli.log_level);
    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else if cli.production {
        LogConfig::production().with_level(level)
    } else {
        LogConfig::default().with_level(level)
    };
    init_logging(&log_config).map_err(anyhow::Error::msg)?;

    // Build and check configuration
    let config = cli.server_config();
    config.validate().context("Invalid configuration")?;

    info!("PlantVillage Advisor v{}", plantvillage_advisor::VERSION);
    info!("Configuration:");
    info!("  Model path:   {:?}", config.model_path);
    info!("  Static dir:   {:?}", config.static_dir);
    info!("  Backend:      {}", backend_name());
    info!("  Gemini model: {}", config.gemini.model);
    info!("  Timeout:      {:?}", config.gemini.timeout);
    info!("  Upload limit: {} MiB", cli.max_upload_mb);

    if !config.static_dir.join("index.html").exists() {
        tracing::warn!(
            "No index.html in {:?}. GET / will return 404.",
            config.static_dir
        );
    }

    // Load model once; a failure leaves /analyze unavailable
    let classifier = ClassifierHandle::load(&config.model_path);
    let llm = GeminiClient::new(config.gemini.clone()).context("Failed to create Gemini client")?;

    let addr: SocketAddr = config.bind_address().parse()?;
    let state = Arc::new(AppState::new(config, classifier, Arc::new(llm)));
    let app = router(state);

    // Start server
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
