use canvass::config::AppConfig;
use canvass::engine::{Controller, Scheduler, SchedulerConfig};
use canvass::generator::HttpProposalGenerator;
use canvass::storage::{MemoryStore, Repositories};
use canvass::tooling::{ToolRegistry, ToolServer};
use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(
    name = "canvass",
    version,
    about = "Deterministic outreach-campaign engine"
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    info!("Starting canvass");
    let cli = Cli::parse();

    let config_path = cli.config.as_deref().map(Path::new);
    let file_config = AppConfig::load(config_path)?;
    if let Some(path) = config_path {
        info!(path = %path.display(), "Loaded configuration from file");
    } else {
        info!("Loaded configuration using default path");
    }

    let store = Arc::new(MemoryStore::new());
    let repos = Repositories::from_store(store);

    let registry = Arc::new(ToolRegistry::new());
    for server_config in &file_config.servers {
        let server = ToolServer::from_config(server_config);
        if let Err(err) = server.connect().await {
            warn!(server = %server.name(), %err, "tool server failed to connect; will retry on demand");
        }
        registry.register(server)?;
    }

    let generator = Arc::new(HttpProposalGenerator::from_config(&file_config.generator));
    let controller = Arc::new(
        Controller::new(repos.clone(), registry.clone(), generator)
            .with_recent_artifacts(file_config.engine.recent_artifacts_in_prompt),
    );

    let scheduler = Arc::new(Scheduler::new(
        controller,
        repos,
        Arc::new(canvass::notify::LogNotifier),
        SchedulerConfig {
            poll_interval: file_config.scheduler.poll_interval(),
            max_concurrent_campaigns: file_config.scheduler.max_concurrent_campaigns,
        },
    ));

    let runner = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run().await })
    };

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    scheduler.shutdown();
    runner.await?;
    registry.shutdown().await;
    info!("Engine stopped");
    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
