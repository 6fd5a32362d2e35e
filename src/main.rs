use anyhow::Context;
use clap::Parser;
use septic_lookup::adapters::storage::DEFAULT_SNAPSHOT_FILE;
use septic_lookup::core::bootstrap::seed_clients;
use septic_lookup::domain::ports::Repository;
use septic_lookup::utils::logger;
use septic_lookup::{
    router, AppState, CliConfig, FileStore, LocalStorage, LookupService, MemoryStore,
    ServiceConfig,
};
use std::sync::Arc;

async fn open_store(config: &ServiceConfig) -> anyhow::Result<Arc<dyn Repository>> {
    match &config.storage.path {
        Some(path) => {
            tokio::fs::create_dir_all(path)
                .await
                .with_context(|| format!("cannot create storage directory {}", path))?;

            let file_name = config
                .storage
                .snapshot_file
                .clone()
                .unwrap_or_else(|| DEFAULT_SNAPSHOT_FILE.to_string());
            let store = FileStore::open(LocalStorage::new(path), file_name.as_str())
                .await
                .with_context(|| format!("cannot load store snapshot from {}", path))?;

            tracing::info!("📁 Using file store at {}/{}", path, file_name);
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("Using in-memory store, data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(cli.verbose, cli.json_logs);

    tracing::info!("Starting septic-lookup");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = cli.load().inspect_err(|e| {
        tracing::error!("❌ Configuration validation failed: {}", e);
    })?;
    let addr = config.bind_addr()?;

    let store = open_store(&config).await?;
    let seeded = seed_clients(store.clients(), &config.clients).await?;
    if seeded > 0 {
        tracing::info!("Seeded {} API client(s) from configuration", seeded);
    }

    let lookup = LookupService::new(store, reqwest::Client::new());
    let app = router(AppState::new(lookup));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {}", addr))?;
    tracing::info!("🚀 Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
